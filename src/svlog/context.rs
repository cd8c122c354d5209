// Copyright (c) 2016-2021 Fabian Schuiki

//! The central data structures of the semantic analysis.
//!
//! The [`Compilation`] owns everything that outlives a single expression: the
//! arenas into which types, symbols, and bound expressions are allocated, the
//! root scope, the diagnostics emitted so far, and the drivers recorded by the
//! assignability checks. A [`BindContext`] is a cheap, copyable view of the
//! compilation that additionally carries the lexical scope and the flags that
//! describe where in the design an expression is being bound.
//!
//! # Example
//!
//! ```
//! # use sable_svlog::{Compilation, GlobalArenas};
//! let arena = GlobalArenas::default();
//! let comp = Compilation::new(&arena);
//! let int = comp.vector_type(sable_svlog::ty::Domain::TwoValued, true, 31, 0);
//! assert_eq!(int.bit_width(), 32);
//! ```

use crate::{
    assign::Driver,
    crate_prelude::*,
    eval::{EvalContext, EvalFlags},
    range::ConstantRange,
    symbol::{FormalArg, Lifetime, RandMode, Scope, Subroutine, Symbol, SymbolKind, Visibility},
    ty::{
        ClassType, CovergroupType, Domain, EnumType, Sign, StructType, Type, TypeKind,
        UnionType,
    },
};
use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
};
use typed_arena::Arena;

/// The arenas that allocate things in the compilation.
///
/// Use this struct whenever you want to allocate or internalize something
/// during semantic analysis.
#[derive(Default)]
pub struct GlobalArenas<'t> {
    types: Arena<TypeKind<'t>>,
    symbols: Arena<Symbol<'t>>,
    scopes: Arena<Scope<'t>>,
    exprs: Arena<Expr<'t>>,
    structs: Arena<StructType<'t>>,
    unions: Arena<UnionType<'t>>,
    enums: Arena<EnumType<'t>>,
    classes: Arena<ClassType<'t>>,
    covergroups: Arena<CovergroupType<'t>>,
    subroutines: Arena<Subroutine<'t>>,
    strings: Arena<String>,
}

impl<'t> GlobalArenas<'t> {
    /// Allocate a type.
    pub fn alloc_type(&'t self, ty: TypeKind<'t>) -> Type<'t> {
        self.types.alloc(ty)
    }

    /// Allocate a symbol.
    pub fn alloc_symbol(&'t self, sym: Symbol<'t>) -> &'t Symbol<'t> {
        self.symbols.alloc(sym)
    }

    /// Allocate a scope.
    pub fn alloc_scope(&'t self, scope: Scope<'t>) -> &'t Scope<'t> {
        self.scopes.alloc(scope)
    }

    /// Allocate a bound expression.
    pub fn alloc_expr(&'t self, expr: Expr<'t>) -> &'t Expr<'t> {
        self.exprs.alloc(expr)
    }

    /// Allocate a struct definition.
    pub fn alloc_struct(&'t self, def: StructType<'t>) -> &'t StructType<'t> {
        self.structs.alloc(def)
    }

    /// Allocate a union definition.
    pub fn alloc_union(&'t self, def: UnionType<'t>) -> &'t UnionType<'t> {
        self.unions.alloc(def)
    }

    /// Allocate an enum definition.
    pub fn alloc_enum(&'t self, def: EnumType<'t>) -> &'t EnumType<'t> {
        self.enums.alloc(def)
    }

    /// Allocate a class definition.
    pub fn alloc_class(&'t self, def: ClassType<'t>) -> &'t ClassType<'t> {
        self.classes.alloc(def)
    }

    /// Allocate a covergroup definition.
    pub fn alloc_covergroup(&'t self, def: CovergroupType<'t>) -> &'t CovergroupType<'t> {
        self.covergroups.alloc(def)
    }

    /// Allocate a subroutine declaration.
    pub fn alloc_subroutine(&'t self, def: Subroutine<'t>) -> &'t Subroutine<'t> {
        self.subroutines.alloc(def)
    }

    /// Allocate a string.
    pub fn alloc_str(&'t self, s: &str) -> &'t str {
        self.strings.alloc(s.to_owned())
    }
}

/// A compilation session.
///
/// Collects all diagnostics and drivers, and provides the constructors for
/// the types and symbols that expressions are bound against.
pub struct Compilation<'t> {
    /// The arena that owns all references.
    pub arena: &'t GlobalArenas<'t>,
    /// The outermost scope.
    pub root: &'t Scope<'t>,
    diags: RefCell<Vec<DiagBuilder2>>,
    drivers: RefCell<HashMap<NodeId, Vec<Driver>>>,
}

impl<'t> Compilation<'t> {
    /// Create a new compilation.
    pub fn new(arena: &'t GlobalArenas<'t>) -> Self {
        Compilation {
            arena,
            root: arena.alloc_scope(Scope::new(None)),
            diags: Default::default(),
            drivers: Default::default(),
        }
    }

    /// Return the diagnostics emitted so far.
    pub fn diagnostics(&self) -> Ref<Vec<DiagBuilder2>> {
        self.diags.borrow()
    }

    /// Remove and return the diagnostics emitted so far.
    pub fn take_diagnostics(&self) -> Vec<DiagBuilder2> {
        std::mem::take(&mut *self.diags.borrow_mut())
    }

    /// Check whether any error has been emitted.
    pub fn has_errors(&self) -> bool {
        self.diags
            .borrow()
            .iter()
            .any(|d| d.get_severity().is_error())
    }

    /// Create a bind context for the root scope.
    pub fn bind_context<'a>(&'a self) -> BindContext<'a, 't> {
        BindContext::new(self, self.root)
    }

    /// Create a new scope nested in `parent`.
    pub fn scope(&self, parent: &'t Scope<'t>) -> &'t Scope<'t> {
        self.arena.alloc_scope(Scope::new(Some(parent)))
    }

    // ----- Drivers ----------------------------------------------------------

    /// Record a driver of a symbol.
    ///
    /// Continuous drivers whose longest static prefixes overlap with an
    /// earlier continuous driver of the same symbol are an error.
    pub fn add_driver(&self, sym: &'t Symbol<'t>, driver: Driver) {
        trace!(
            "Adding driver of {} at {} ({:?})",
            sym.desc_full(),
            driver.span,
            driver.prefix
        );
        let mut drivers = self.drivers.borrow_mut();
        let list = drivers.entry(sym.id).or_insert_with(Vec::new);
        if driver.continuous {
            if let Some(other) = list
                .iter()
                .find(|other| other.continuous && other.overlaps(&driver))
            {
                self.emit(
                    DiagBuilder2::error(format!(
                        "{} has multiple continuous drivers",
                        sym.desc_full()
                    ))
                    .code(DiagCode::MultipleContinuousDrivers)
                    .span(driver.span)
                    .add_note("Previous driver here:")
                    .span(other.span),
                );
            }
        }
        list.push(driver);
    }

    /// Return the drivers recorded for a symbol.
    pub fn drivers_of(&self, sym: &Symbol<'t>) -> Vec<Driver> {
        self.drivers
            .borrow()
            .get(&sym.id)
            .cloned()
            .unwrap_or_default()
    }

    // ----- Symbols ----------------------------------------------------------

    /// Allocate a symbol without declaring it anywhere.
    pub fn symbol(&self, name: &str, kind: SymbolKind<'t>) -> &'t Symbol<'t> {
        self.arena.alloc_symbol(Symbol {
            id: NodeId::alloc(),
            name: self.arena.alloc_str(name),
            span: INVALID_SPAN,
            kind,
        })
    }

    /// Declare a symbol in the root scope.
    pub fn declare(&self, name: &str, kind: SymbolKind<'t>) -> &'t Symbol<'t> {
        let sym = self.symbol(name, kind);
        self.root.declare(sym);
        sym
    }

    /// Declare a static variable in the root scope.
    pub fn declare_var(&self, name: &str, ty: Type<'t>) -> &'t Symbol<'t> {
        self.declare(
            name,
            SymbolKind::Variable {
                ty,
                lifetime: Lifetime::Static,
            },
        )
    }

    /// Create a class property.
    pub fn class_property(
        &self,
        owner: NodeId,
        name: &str,
        ty: Type<'t>,
        visibility: Visibility,
        rand_mode: RandMode,
    ) -> &'t Symbol<'t> {
        self.symbol(
            name,
            SymbolKind::ClassProperty {
                ty,
                lifetime: Lifetime::Automatic,
                visibility,
                rand_mode,
                owner,
            },
        )
    }

    /// Create a method.
    pub fn method(
        &self,
        owner: Option<NodeId>,
        name: &str,
        return_ty: Type<'t>,
        is_static: bool,
        args: Vec<(&str, Type<'t>, bool)>,
    ) -> &'t Symbol<'t> {
        let args = args
            .into_iter()
            .map(|(name, ty, has_default)| FormalArg {
                name: self.arena.alloc_str(name),
                ty,
                has_default,
            })
            .collect();
        let def = self.arena.alloc_subroutine(Subroutine {
            return_ty,
            is_static,
            visibility: Visibility::Public,
            owner,
            args,
        });
        self.symbol(name, SymbolKind::Subroutine(def))
    }

    // ----- Types ------------------------------------------------------------

    /// Intern a type.
    pub fn intern_type(&self, ty: TypeKind<'t>) -> Type<'t> {
        self.arena.alloc_type(ty)
    }

    /// Create a simple bit vector type `[left:right]`.
    pub fn vector_type(&self, domain: Domain, signed: bool, left: i32, right: i32) -> Type<'t> {
        self.intern_type(TypeKind::BitVector {
            domain,
            sign: if signed { Sign::Signed } else { Sign::Unsigned },
            range: ConstantRange::new(left, right),
            dubbed: false,
        })
    }

    /// Create a packed array of `elem` with dimension `[left:right]`.
    pub fn packed_array_type(&self, elem: Type<'t>, left: i32, right: i32) -> Type<'t> {
        self.intern_type(TypeKind::PackedArray {
            elem,
            range: ConstantRange::new(left, right),
        })
    }

    /// Create a fixed-size unpacked array of `elem` with dimension
    /// `[left:right]`.
    pub fn unpacked_array_type(&self, elem: Type<'t>, left: i32, right: i32) -> Type<'t> {
        self.intern_type(TypeKind::UnpackedArray {
            elem,
            range: ConstantRange::new(left, right),
        })
    }

    /// Create a dynamic array of `elem`.
    pub fn dynamic_array_type(&self, elem: Type<'t>) -> Type<'t> {
        self.intern_type(TypeKind::DynamicArray(elem))
    }

    /// Create an associative array of `elem`, indexed by `index` or wildcard.
    pub fn associative_array_type(&self, elem: Type<'t>, index: Option<Type<'t>>) -> Type<'t> {
        self.intern_type(TypeKind::AssociativeArray { elem, index })
    }

    /// Create a queue of `elem`. A `max_bound` of 0 means unbounded.
    pub fn queue_type(&self, elem: Type<'t>, max_bound: u32) -> Type<'t> {
        self.intern_type(TypeKind::Queue { elem, max_bound })
    }

    /// Create a named alias of a type.
    pub fn named_type(&self, name: &str, ty: Type<'t>) -> Type<'t> {
        self.intern_type(TypeKind::Named(self.arena.alloc_str(name), ty))
    }

    /// Create a struct type.
    ///
    /// Unpacked fields are numbered in declaration order. Packed fields are
    /// laid out from the most significant bit down, so the last field sits at
    /// bit offset 0.
    pub fn struct_type(&self, packed: bool, signed: bool, fields: &[(&str, Type<'t>)]) -> Type<'t> {
        let offsets = self.field_offsets(packed, fields);
        let fields = fields
            .iter()
            .zip(offsets)
            .map(|(&(name, ty), offset)| self.field(name, ty, offset))
            .collect();
        let def = self.arena.alloc_struct(StructType {
            id: NodeId::alloc(),
            packed,
            sign: if signed { Sign::Signed } else { Sign::Unsigned },
            fields,
        });
        self.intern_type(TypeKind::Struct(def))
    }

    /// Create a union type.
    ///
    /// Members are numbered in declaration order; that number identifies the
    /// active member of an unpacked union value and the tag of a packed tagged
    /// union. Members of untagged packed unions all sit at offset 0. Packed
    /// tagged unions reserve enough tag bits above the widest member to encode
    /// the member index.
    pub fn union_type(&self, packed: bool, tagged: bool, fields: &[(&str, Type<'t>)]) -> Type<'t> {
        let fields: Vec<_> = fields
            .iter()
            .enumerate()
            .map(|(i, &(name, ty))| {
                let offset = if packed && !tagged { 0 } else { i as u32 };
                self.field(name, ty, offset)
            })
            .collect();
        let tag_bits = if packed && tagged && fields.len() > 1 {
            32 - (fields.len() as u32 - 1).leading_zeros()
        } else {
            0
        };
        let def = self.arena.alloc_union(UnionType {
            id: NodeId::alloc(),
            packed,
            tagged,
            tag_bits,
            fields,
        });
        self.intern_type(TypeKind::Union(def))
    }

    /// Create an enum type over `base`.
    pub fn enum_type(&self, base: Type<'t>, values: &[(&str, i64)]) -> Type<'t> {
        // The enum values refer to the enum type itself, which does not exist
        // yet; they carry the base type instead.
        let width = base.bit_width();
        let signed = base.is_signed();
        let values = values
            .iter()
            .map(|&(name, v)| {
                self.symbol(
                    name,
                    SymbolKind::EnumValue {
                        ty: base,
                        value: SvInt::new(width, v.into(), signed),
                    },
                )
            })
            .collect();
        let def = self.arena.alloc_enum(EnumType {
            id: NodeId::alloc(),
            base,
            values,
        });
        self.intern_type(TypeKind::Enum(def))
    }

    /// Create a class type.
    ///
    /// The members should have been created with `id` as their owner.
    pub fn class_type(
        &self,
        id: NodeId,
        name: &str,
        base: Option<Type<'t>>,
        members: Vec<&'t Symbol<'t>>,
    ) -> Type<'t> {
        let def = self.arena.alloc_class(ClassType {
            id,
            name: self.arena.alloc_str(name),
            base,
            members,
        });
        self.intern_type(TypeKind::Class(def))
    }

    /// Create a covergroup type.
    pub fn covergroup_type(&self, name: &str, body: Vec<&'t Symbol<'t>>) -> Type<'t> {
        let def = self.arena.alloc_covergroup(CovergroupType {
            id: NodeId::alloc(),
            name: self.arena.alloc_str(name),
            body,
        });
        self.intern_type(TypeKind::Covergroup(def))
    }

    fn field(&self, name: &str, ty: Type<'t>, offset: u32) -> &'t Symbol<'t> {
        self.symbol(
            name,
            SymbolKind::Field {
                ty,
                offset,
                rand_mode: RandMode::None,
            },
        )
    }

    fn field_offsets(&self, packed: bool, fields: &[(&str, Type<'t>)]) -> Vec<u32> {
        if !packed {
            return (0..fields.len() as u32).collect();
        }
        let mut offset = 0;
        let mut offsets: Vec<u32> = fields
            .iter()
            .rev()
            .map(|(_, ty)| {
                let this = offset;
                offset += ty.bit_width();
                this
            })
            .collect();
        offsets.reverse();
        offsets
    }
}

impl DiagEmitter for Compilation<'_> {
    fn emit(&self, diag: DiagBuilder2) {
        let sev = diag.get_severity();
        debug!("Emitting {}: {}", sev, diag.get_message());
        self.diags.borrow_mut().push(diag);

        if sev >= Severity::Warning && log_enabled!(log::Level::Trace) {
            trace!("{} raised at:\n{:?}", sev, backtrace::Backtrace::new());
        }
    }
}

bitflags::bitflags! {
    /// Describes where in the design an expression is being bound.
    pub struct BindFlags: u32 {
        /// Outside of procedural code, e.g. a continuous assignment.
        const NON_PROCEDURAL = 1 << 0;
        /// Inside an assertion expression.
        const ASSERTION_EXPR = 1 << 1;
        /// Inside a branch that is known to never be evaluated.
        const UNEVALUATED_BRANCH = 1 << 2;
        /// The `$` literal may appear as a whole expression.
        const ALLOW_UNBOUNDED_LITERAL = 1 << 3;
        /// The `$` literal may appear as an operand of `+` and `-`.
        const ALLOW_UNBOUNDED_LITERAL_ARITHMETIC = 1 << 4;
    }
}

/// The context an expression is bound in.
#[derive(Clone, Copy)]
pub struct BindContext<'a, 't> {
    /// The compilation.
    pub comp: &'a Compilation<'t>,
    /// The scope names are looked up in.
    pub scope: &'t Scope<'t>,
    /// Where in the design the expression appears.
    pub flags: BindFlags,
    /// The class whose method body the expression appears in.
    pub class: Option<&'t ClassType<'t>>,
}

impl<'a, 't> BindContext<'a, 't> {
    /// Create a new context for procedural code in `scope`.
    pub fn new(comp: &'a Compilation<'t>, scope: &'t Scope<'t>) -> Self {
        BindContext {
            comp,
            scope,
            flags: BindFlags::empty(),
            class: None,
        }
    }

    /// Return a copy of the context with additional flags set.
    pub fn with_flags(self, flags: BindFlags) -> Self {
        BindContext {
            flags: self.flags | flags,
            ..self
        }
    }

    /// Return a copy of the context with some flags cleared.
    pub fn without_flags(self, flags: BindFlags) -> Self {
        BindContext {
            flags: self.flags - flags,
            ..self
        }
    }

    /// Return a copy of the context that binds within a class body.
    pub fn within_class(self, class: &'t ClassType<'t>) -> Self {
        BindContext {
            class: Some(class),
            ..self
        }
    }

    /// Return a copy of the context that looks names up in `scope`.
    pub fn within_scope(self, scope: &'t Scope<'t>) -> Self {
        BindContext { scope, ..self }
    }

    /// Check whether the expression is bound in procedural code.
    pub fn is_procedural(&self) -> bool {
        !self.flags.contains(BindFlags::NON_PROCEDURAL)
    }

    /// Check whether the expression is in a branch that is never evaluated.
    pub fn in_unevaluated_branch(&self) -> bool {
        self.flags.contains(BindFlags::UNEVALUATED_BRANCH)
    }

    /// Allocate a bound expression.
    pub fn alloc(&self, span: Span, ty: Type<'t>, kind: ExprKind<'t>) -> &'t Expr<'t> {
        self.comp.arena.alloc_expr(Expr {
            id: NodeId::alloc(),
            span,
            ty,
            kind,
        })
    }

    /// Allocate an invalid expression wrapping `child`.
    pub fn bad_expr(&self, span: Span, child: Option<&'t Expr<'t>>) -> &'t Expr<'t> {
        self.alloc(span, &ERROR_TYPE, ExprKind::Invalid(child))
    }

    /// Try to evaluate an expression as a constant, discarding any
    /// diagnostics.
    pub fn try_eval(&self, expr: &'t Expr<'t>) -> Option<ConstantValue> {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let result = expr.eval(&mut ctx).ok();
        if result.is_none() {
            trace!("{} is not constant", expr.desc_full());
        }
        result
    }

    /// Evaluate an expression which must be a constant.
    pub fn eval(&self, expr: &'t Expr<'t>) -> Result<ConstantValue> {
        if expr.is_bad() {
            return Err(());
        }
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let result = expr.eval(&mut ctx);
        let diags = ctx.take_diagnostics();
        if result.is_err() && diags.is_empty() {
            self.emit(
                DiagBuilder2::error("expression is not constant")
                    .code(DiagCode::ExpressionNotConstant)
                    .span(expr.span),
            );
        }
        for d in diags {
            self.emit(d);
        }
        result
    }

    /// Evaluate an expression which must be a constant integer without
    /// unknown bits.
    pub fn eval_integer(&self, expr: &'t Expr<'t>) -> Option<i32> {
        if !self.require_integral(expr) {
            return None;
        }
        let value = self.eval(expr).ok()?;
        self.require_known_int(&value, expr.span)
    }

    /// Convert a constant to an `i32`, complaining about unknown bits.
    pub fn require_known_int(&self, value: &ConstantValue, span: Span) -> Option<i32> {
        let int = value.as_integer()?;
        if int.has_unknown() {
            self.emit(
                DiagBuilder2::error(format!("value `{}` must not have unknown bits", int))
                    .code(DiagCode::ValueMustNotBeUnknown)
                    .span(span),
            );
            return None;
        }
        int.as_i32()
    }

    /// Complain if an expression is not integral.
    pub fn require_integral(&self, expr: &'t Expr<'t>) -> bool {
        if expr.is_bad() {
            return false;
        }
        if !expr.ty.is_integral() {
            self.emit(
                DiagBuilder2::error(format!(
                    "expression of type `{}` must be integral",
                    expr.ty
                ))
                .code(DiagCode::ExprMustBeIntegral)
                .span(expr.span),
            );
            return false;
        }
        true
    }

    /// Complain if a value is not strictly positive.
    pub fn require_positive(&self, value: Option<i32>, span: Span) -> Option<i32> {
        match value {
            Some(v) if v > 0 => Some(v),
            Some(v) => {
                self.emit(
                    DiagBuilder2::error(format!("value must be positive; got {}", v))
                        .code(DiagCode::ValueMustBePositive)
                        .span(span),
                );
                None
            }
            None => None,
        }
    }
}

impl DiagEmitter for BindContext<'_, '_> {
    fn emit(&self, diag: DiagBuilder2) {
        self.comp.emit(diag)
    }
}
