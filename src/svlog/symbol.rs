// Copyright (c) 2016-2021 Fabian Schuiki

//! Symbols and lexical scopes.
//!
//! A symbol is anything that can be found by name: variables, nets, struct
//! fields, class members, coverage constructs, and so on. Symbols are
//! allocated in the [`GlobalArenas`](crate::GlobalArenas) and never change
//! after they have been declared.

use crate::{crate_prelude::*, ty::ERROR_TYPE};
use std::{cell::RefCell, collections::HashMap};

/// A named entity.
#[derive(Debug)]
pub struct Symbol<'t> {
    pub id: NodeId,
    pub name: &'t str,
    pub span: Span,
    pub kind: SymbolKind<'t>,
}

/// The different kinds of symbols.
#[derive(Debug)]
pub enum SymbolKind<'t> {
    /// A variable.
    Variable { ty: Type<'t>, lifetime: Lifetime },
    /// A net.
    Net {
        ty: Type<'t>,
        expansion: NetExpansion,
        /// Whether the net has a user-defined net type (`nettype`).
        user_defined: bool,
    },
    /// A parameter with its constant value.
    Parameter { ty: Type<'t>, value: ConstantValue },
    /// An iterator variable of an array manipulation method.
    Iterator { ty: Type<'t> },
    /// A field of a struct or a member of a union.
    ///
    /// The offset is the field's position for unpacked aggregates, and its
    /// bit offset from the least significant bit for packed ones.
    Field {
        ty: Type<'t>,
        offset: u32,
        rand_mode: RandMode,
    },
    /// A property of a class.
    ClassProperty {
        ty: Type<'t>,
        lifetime: Lifetime,
        visibility: Visibility,
        rand_mode: RandMode,
        /// The class that declares the property.
        owner: NodeId,
    },
    /// A task or function.
    Subroutine(&'t Subroutine<'t>),
    /// A constraint block of a class.
    ConstraintBlock { is_static: bool },
    /// A coverpoint of a covergroup.
    Coverpoint { body: Vec<&'t Symbol<'t>> },
    /// A cross of a covergroup.
    CoverCross { body: Vec<&'t Symbol<'t>> },
    /// A coverage bin.
    CoverageBin,
    /// A member of an enum.
    EnumValue { ty: Type<'t>, value: SvInt },
    /// A typedef.
    TypeAlias { ty: Type<'t> },
}

/// A task or function declaration.
#[derive(Debug)]
pub struct Subroutine<'t> {
    pub return_ty: Type<'t>,
    pub is_static: bool,
    pub visibility: Visibility,
    /// The class that declares the method, if any.
    pub owner: Option<NodeId>,
    pub args: Vec<FormalArg<'t>>,
}

/// A formal argument of a subroutine.
#[derive(Debug)]
pub struct FormalArg<'t> {
    pub name: &'t str,
    pub ty: Type<'t>,
    pub has_default: bool,
}

/// The storage lifetime of a variable or class property.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifetime {
    Static,
    Automatic,
}

/// The visibility of a class member.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Local,
}

/// The randomization mode of a class property or field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RandMode {
    None,
    Rand,
    RandC,
}

/// The bit expansion requested for a net.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NetExpansion {
    Default,
    Vectored,
    Scalared,
}

impl<'t> Symbol<'t> {
    /// Return the type of a value symbol, or the error type for symbols that
    /// do not carry a value.
    pub fn value_type(&self) -> Type<'t> {
        match self.kind {
            SymbolKind::Variable { ty, .. }
            | SymbolKind::Net { ty, .. }
            | SymbolKind::Parameter { ty, .. }
            | SymbolKind::Iterator { ty }
            | SymbolKind::Field { ty, .. }
            | SymbolKind::ClassProperty { ty, .. }
            | SymbolKind::EnumValue { ty, .. } => ty,
            _ => &ERROR_TYPE,
        }
    }

    /// Check whether the symbol carries a value and can appear in an
    /// expression.
    pub fn is_value(&self) -> bool {
        matches!(
            self.kind,
            SymbolKind::Variable { .. }
                | SymbolKind::Net { .. }
                | SymbolKind::Parameter { .. }
                | SymbolKind::Iterator { .. }
                | SymbolKind::Field { .. }
                | SymbolKind::ClassProperty { .. }
                | SymbolKind::EnumValue { .. }
        )
    }

    /// Return the randomization mode of the symbol.
    pub fn rand_mode(&self) -> RandMode {
        match self.kind {
            SymbolKind::Field { rand_mode, .. } | SymbolKind::ClassProperty { rand_mode, .. } => {
                rand_mode
            }
            _ => RandMode::None,
        }
    }

    /// Return the members of a coverpoint or cross.
    pub fn cover_body(&self) -> Option<&[&'t Symbol<'t>]> {
        match &self.kind {
            SymbolKind::Coverpoint { body } | SymbolKind::CoverCross { body } => Some(body),
            _ => None,
        }
    }
}

impl HasSpan for Symbol<'_> {
    fn span(&self) -> Span {
        self.span
    }
}

impl HasDesc for Symbol<'_> {
    fn desc(&self) -> &'static str {
        match self.kind {
            SymbolKind::Variable { .. } => "variable",
            SymbolKind::Net { .. } => "net",
            SymbolKind::Parameter { .. } => "parameter",
            SymbolKind::Iterator { .. } => "iterator",
            SymbolKind::Field { .. } => "field",
            SymbolKind::ClassProperty { .. } => "class property",
            SymbolKind::Subroutine(..) => "subroutine",
            SymbolKind::ConstraintBlock { .. } => "constraint block",
            SymbolKind::Coverpoint { .. } => "coverpoint",
            SymbolKind::CoverCross { .. } => "cover cross",
            SymbolKind::CoverageBin => "coverage bin",
            SymbolKind::EnumValue { .. } => "enum value",
            SymbolKind::TypeAlias { .. } => "typedef",
        }
    }

    fn desc_full(&self) -> String {
        format!("{} `{}`", self.desc(), self.name)
    }
}

/// A lexical scope.
///
/// Names are looked up in the scope itself first, then in its parents.
#[derive(Debug, Default)]
pub struct Scope<'t> {
    pub parent: Option<&'t Scope<'t>>,
    names: RefCell<HashMap<&'t str, &'t Symbol<'t>>>,
}

impl<'t> Scope<'t> {
    /// Create a new scope nested within `parent`.
    pub fn new(parent: Option<&'t Scope<'t>>) -> Self {
        Scope {
            parent,
            names: Default::default(),
        }
    }

    /// Declare a symbol in this scope, shadowing any earlier declaration of
    /// the same name.
    pub fn declare(&self, sym: &'t Symbol<'t>) {
        trace!("Declaring {} in scope", sym.desc_full());
        self.names.borrow_mut().insert(sym.name, sym);
    }

    /// Find a symbol in this scope only.
    pub fn find(&self, name: &str) -> Option<&'t Symbol<'t>> {
        self.names.borrow().get(name).cloned()
    }

    /// Find a symbol in this scope or any of its parents.
    pub fn lookup(&self, name: &str) -> Option<&'t Symbol<'t>> {
        self.find(name)
            .or_else(|| self.parent.and_then(|p| p.lookup(name)))
    }
}
