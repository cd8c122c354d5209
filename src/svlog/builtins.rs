// Copyright (c) 2016-2021 Fabian Schuiki

//! Built-in methods.
//!
//! Containers, strings, enums, and events come with a fixed set of methods
//! that are found by the type of the value they are called on. A few more
//! are attached to specific kinds of symbols, for example `rand_mode` on
//! randomized properties or `index` on the iterator of a `with` clause.

use crate::{
    assign::{self, AssignFlags},
    binder,
    crate_prelude::*,
    eval::{shape_mismatch, EvalContext},
    expr::{Call, Callee},
    symbol::{Lifetime, RandMode, Symbol, SymbolKind},
    syntax::{ExprSyntax, InvocationArgs},
    ty::{BIT_TYPE, INT_TYPE, REAL_TYPE, STRING_TYPE, VOID_TYPE},
    value::{AssociativeMap, MapKey},
};
use std::fmt;

/// A built-in method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SystemMethod {
    Size,
    Num,
    Delete,
    Exists,
    First,
    Last,
    PushBack,
    PushFront,
    PopBack,
    PopFront,
    Sum,
    Len,
    ToUpper,
    ToLower,
    EnumFirst,
    EnumLast,
    EnumNum,
    EnumName,
    Triggered,
    RandMode,
    ConstraintMode,
    GetCoverage,
    GetInstCoverage,
    IteratorIndex,
}

impl SystemMethod {
    /// The name of the method as written in source code.
    pub fn name(self) -> &'static str {
        use SystemMethod::*;
        match self {
            Size => "size",
            Num | EnumNum => "num",
            Delete => "delete",
            Exists => "exists",
            First | EnumFirst => "first",
            Last | EnumLast => "last",
            PushBack => "push_back",
            PushFront => "push_front",
            PopBack => "pop_back",
            PopFront => "pop_front",
            Sum => "sum",
            Len => "len",
            ToUpper => "toupper",
            ToLower => "tolower",
            EnumName => "name",
            Triggered => "triggered",
            RandMode => "rand_mode",
            ConstraintMode => "constraint_mode",
            GetCoverage => "get_coverage",
            GetInstCoverage => "get_inst_coverage",
            IteratorIndex => "index",
        }
    }

    /// The minimum and maximum number of arguments, not counting the object
    /// the method is called on.
    fn arg_count(self, receiver: Type) -> (usize, usize) {
        use SystemMethod::*;
        match self {
            Exists | PushBack | PushFront | First | Last => (1, 1),
            Delete if receiver.is_dynamic_array() => (0, 0),
            Delete | RandMode | ConstraintMode | IteratorIndex => (0, 1),
            _ => (0, 0),
        }
    }

    /// Whether the method modifies the object it is called on.
    fn is_mutating(self) -> bool {
        use SystemMethod::*;
        matches!(self, Delete | PushBack | PushFront | PopBack | PopFront)
    }
}

impl fmt::Display for SystemMethod {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Find a built-in method by the type of the value it is called on.
pub fn lookup_type_method(ty: Type, name: &str) -> Option<SystemMethod> {
    use SystemMethod::*;
    let ty = ty.unname();
    if ty.get_enum_def().is_some() {
        return match name {
            "first" => Some(EnumFirst),
            "last" => Some(EnumLast),
            "num" => Some(EnumNum),
            "name" => Some(EnumName),
            _ => None,
        };
    }
    if ty.is_string() {
        return match name {
            "len" => Some(Len),
            "toupper" => Some(ToUpper),
            "tolower" => Some(ToLower),
            _ => None,
        };
    }
    if matches!(ty, TypeKind::Event) {
        return match name {
            "triggered" => Some(Triggered),
            _ => None,
        };
    }
    if ty.is_associative_array() {
        return match name {
            "size" => Some(Size),
            "num" => Some(Num),
            "delete" => Some(Delete),
            "exists" => Some(Exists),
            "first" => Some(First),
            "last" => Some(Last),
            "sum" => Some(Sum),
            _ => None,
        };
    }
    if ty.is_queue() {
        return match name {
            "size" => Some(Size),
            "delete" => Some(Delete),
            "push_back" => Some(PushBack),
            "push_front" => Some(PushFront),
            "pop_back" => Some(PopBack),
            "pop_front" => Some(PopFront),
            "sum" => Some(Sum),
            _ => None,
        };
    }
    if ty.is_dynamic_array() {
        return match name {
            "size" => Some(Size),
            "delete" => Some(Delete),
            "sum" => Some(Sum),
            _ => None,
        };
    }
    if ty.is_unpacked_array() {
        return match name {
            "sum" => Some(Sum),
            _ => None,
        };
    }
    None
}

/// Find a built-in method attached to the symbol a value refers to.
pub fn lookup_symbol_method(sym: &Symbol, name: &str) -> Option<SystemMethod> {
    // `rand_mode` exists on every randomized property and field, and on
    // nothing else.
    if name == "rand_mode" {
        return match sym.rand_mode() {
            RandMode::None => None,
            _ => Some(SystemMethod::RandMode),
        };
    }
    match (&sym.kind, name) {
        (SymbolKind::ConstraintBlock { .. }, "constraint_mode") => {
            Some(SystemMethod::ConstraintMode)
        }
        (SymbolKind::Coverpoint { .. }, "get_coverage")
        | (SymbolKind::CoverCross { .. }, "get_coverage") => Some(SystemMethod::GetCoverage),
        (SymbolKind::Coverpoint { .. }, "get_inst_coverage")
        | (SymbolKind::CoverCross { .. }, "get_inst_coverage") => {
            Some(SystemMethod::GetInstCoverage)
        }
        (SymbolKind::Iterator { .. }, "index") => Some(SystemMethod::IteratorIndex),
        _ => None,
    }
}

fn check_arg_count(
    cx: &BindContext,
    name: &str,
    (min, max): (usize, usize),
    given: usize,
    span: Span,
) -> bool {
    if given > max {
        cx.emit(
            DiagBuilder2::error(format!(
                "too many arguments to `{}`; expected at most {}, got {}",
                name, max, given
            ))
            .code(DiagCode::TooManyArguments)
            .span(span),
        );
        false
    } else if given < min {
        cx.emit(
            DiagBuilder2::error(format!(
                "too few arguments to `{}`; expected at least {}, got {}",
                name, min, given
            ))
            .code(DiagCode::TooFewArguments)
            .span(span),
        );
        false
    } else {
        true
    }
}

/// Bind a call of a built-in method on `receiver`.
pub fn bind_system_call<'t>(
    cx: &BindContext<'_, 't>,
    method: SystemMethod,
    receiver: &'t Expr<'t>,
    invocation: Option<InvocationArgs>,
    with: Option<&ExprSyntax>,
    span: Span,
) -> &'t Expr<'t> {
    let arg_syntax = invocation.map(|i| i.args).unwrap_or(&[]);
    let args_span = invocation.map(|i| i.span).unwrap_or(span);
    trace!("Binding call of `{}` on {}", method, receiver.desc_full());

    if !check_arg_count(
        cx,
        method.name(),
        method.arg_count(receiver.ty),
        arg_syntax.len(),
        args_span,
    ) {
        return cx.bad_expr(span, Some(receiver));
    }

    let mut args = vec![receiver];
    let elem_ty = receiver.ty.get_array_element_type();
    for syntax in arg_syntax {
        let arg = match method {
            SystemMethod::Exists | SystemMethod::Delete if receiver.ty.is_associative_array() => {
                match receiver.ty.get_associative_index_type() {
                    Some(index_ty) => binder::bind_rvalue(cx, index_ty, syntax),
                    None => binder::self_determined(cx, syntax),
                }
            }
            SystemMethod::PushBack | SystemMethod::PushFront => match elem_ty {
                Some(elem) => binder::bind_rvalue(cx, elem, syntax),
                None => binder::self_determined(cx, syntax),
            },
            SystemMethod::First | SystemMethod::Last => {
                let arg = binder::bind_expr(cx, syntax);
                if !arg.is_bad()
                    && !assign::require_lvalue(cx, arg, AssignFlags::empty(), None, None, None)
                {
                    return cx.bad_expr(span, Some(arg));
                }
                arg
            }
            _ => {
                let arg = binder::self_determined(cx, syntax);
                if !arg.is_bad() && !cx.require_integral(arg) {
                    return cx.bad_expr(span, Some(arg));
                }
                arg
            }
        };
        if arg.is_bad() {
            return cx.bad_expr(span, Some(arg));
        }
        args.push(arg);
    }

    if method.is_mutating()
        && !assign::require_lvalue(cx, receiver, AssignFlags::empty(), None, None, None)
    {
        return cx.bad_expr(span, Some(receiver));
    }

    // Only `sum` takes a `with` clause, which is bound in a fresh scope that
    // declares the `item` iterator.
    let with = match with {
        Some(clause) if method != SystemMethod::Sum => {
            cx.emit(
                DiagBuilder2::error(format!("`{}` does not accept a `with` clause", method))
                    .code(DiagCode::WithClauseNotAllowed)
                    .span(clause.span),
            );
            return cx.bad_expr(span, Some(receiver));
        }
        Some(clause) => {
            let iter_ty = elem_ty.unwrap_or(&ERROR_TYPE);
            let scope = cx.comp.scope(cx.scope);
            let item = cx.comp.symbol("item", SymbolKind::Iterator { ty: iter_ty });
            scope.declare(item);
            let with_expr = binder::self_determined(&cx.within_scope(scope), clause);
            if with_expr.is_bad() {
                return cx.bad_expr(span, Some(with_expr));
            }
            Some((item, with_expr))
        }
        None => None,
    };

    let ty = match return_type(method, receiver, &args, with.map(|(_, e)| e)) {
        Some(ty) => ty,
        None => return cx.bad_expr(span, Some(receiver)),
    };
    cx.alloc(
        span,
        ty,
        ExprKind::Call(Call {
            callee: Callee::System(method),
            args,
            with,
        }),
    )
}

fn return_type<'t>(
    method: SystemMethod,
    receiver: &'t Expr<'t>,
    args: &[&'t Expr<'t>],
    with: Option<&'t Expr<'t>>,
) -> Option<Type<'t>> {
    use SystemMethod::*;
    Some(match method {
        Size | Num | Exists | First | Last | Len | EnumNum | IteratorIndex => &INT_TYPE,
        Delete | PushBack | PushFront => &VOID_TYPE,
        PopBack | PopFront => receiver.ty.get_array_element_type()?,
        Sum => match with {
            Some(w) if w.ty.is_integral() => w.ty,
            _ => receiver.ty.get_array_element_type()?,
        },
        ToUpper | ToLower | EnumName => &STRING_TYPE,
        EnumFirst | EnumLast => receiver.ty,
        Triggered => &BIT_TYPE,
        // The getters return the current mode, the setters nothing.
        RandMode | ConstraintMode if args.len() > 1 => &VOID_TYPE,
        RandMode | ConstraintMode => &INT_TYPE,
        GetCoverage | GetInstCoverage => &REAL_TYPE,
    })
}

/// Bind a call of a user-defined task or function.
///
/// Method calls pass the object they are called on as `this`.
pub fn bind_subroutine_call<'t>(
    cx: &BindContext<'_, 't>,
    sym: &'t Symbol<'t>,
    this: Option<&'t Expr<'t>>,
    invocation: Option<InvocationArgs>,
    with: Option<&ExprSyntax>,
    span: Span,
) -> &'t Expr<'t> {
    let sub = match sym.kind {
        SymbolKind::Subroutine(sub) => sub,
        _ => {
            cx.emit(
                DiagBuilder2::error(format!("{} is not callable", sym.desc_full()))
                    .code(DiagCode::ExpressionNotCallable)
                    .span(span),
            );
            return cx.bad_expr(span, this);
        }
    };
    if let Some(clause) = with {
        cx.emit(
            DiagBuilder2::error(format!("{} does not accept a `with` clause", sym.desc_full()))
                .code(DiagCode::WithClauseNotAllowed)
                .span(clause.span),
        );
        return cx.bad_expr(span, this);
    }

    let arg_syntax = invocation.map(|i| i.args).unwrap_or(&[]);
    let required = sub.args.iter().filter(|a| !a.has_default).count();
    if !check_arg_count(
        cx,
        sym.name,
        (required, sub.args.len()),
        arg_syntax.len(),
        invocation.map(|i| i.span).unwrap_or(span),
    ) {
        return cx.bad_expr(span, this);
    }

    let mut args: Vec<_> = this.into_iter().collect();
    for (formal, syntax) in sub.args.iter().zip(arg_syntax) {
        let arg = binder::bind_rvalue(cx, formal.ty, syntax);
        if arg.is_bad() {
            return cx.bad_expr(span, Some(arg));
        }
        args.push(arg);
    }

    cx.alloc(
        span,
        sub.return_ty,
        ExprKind::Call(Call {
            callee: Callee::Subroutine(sym),
            args,
            with: None,
        }),
    )
}

/// Create a scope-less iterator symbol. Used by tests and desugarings that
/// need an `item` outside of a `with` clause.
pub fn iterator_symbol<'t>(comp: &Compilation<'t>, name: &str, ty: Type<'t>) -> &'t Symbol<'t> {
    comp.symbol(name, SymbolKind::Iterator { ty })
}

/// Evaluate a call.
pub(crate) fn eval_call<'t>(
    expr: &Expr<'t>,
    call: &Call<'t>,
    ctx: &mut EvalContext,
) -> Result<ConstantValue> {
    let method = match call.callee {
        Callee::System(m) => m,
        Callee::Subroutine(..) => return expr.not_constant(ctx),
    };
    let receiver = match call.args.first() {
        Some(&r) => r,
        None => return shape_mismatch(ctx, expr, &ConstantValue::Unset),
    };
    let int = |v: usize| Ok(ConstantValue::Integer(SvInt::from_i32(v as i32)));

    use SystemMethod::*;
    match method {
        Size | Num | Len => {
            let value = receiver.eval(ctx)?;
            int(value.size())
        }
        ToUpper | ToLower => {
            let value = receiver.eval(ctx)?;
            match value.as_bytes() {
                Some(s) if method == ToUpper => Ok(ConstantValue::Str(s.to_ascii_uppercase())),
                Some(s) => Ok(ConstantValue::Str(s.to_ascii_lowercase())),
                None => shape_mismatch(ctx, receiver, &value),
            }
        }
        Exists => {
            let value = receiver.eval(ctx)?;
            let key = eval_key(ctx, call.args[1])?;
            match value.as_map() {
                Some(map) => int(map.contains(&key) as usize),
                None => shape_mismatch(ctx, receiver, &value),
            }
        }
        EnumFirst | EnumLast | EnumNum | EnumName => eval_enum_method(method, expr, receiver, ctx),
        Sum => eval_sum(expr, call, receiver, ctx),
        First | Last => {
            let value = receiver.eval(ctx)?;
            let map = match value.as_map() {
                Some(m) => m,
                None => return shape_mismatch(ctx, receiver, &value),
            };
            let entry = if method == First {
                map.iter().next()
            } else {
                map.iter().last()
            };
            match entry {
                Some((key, _)) => {
                    let key = match key {
                        MapKey::Int(v) => ConstantValue::Integer(v.clone()),
                        MapKey::Str(v) => ConstantValue::Str(v.clone()),
                    };
                    let target = call.args[1];
                    let lval = target.eval_lvalue(ctx)?;
                    lval.store(ctx, crate::eval::convert(key, target.ty));
                    int(1)
                }
                None => int(0),
            }
        }
        Delete | PushBack | PushFront | PopBack | PopFront => {
            eval_mutation(method, expr, call, receiver, ctx)
        }
        Triggered | RandMode | ConstraintMode | GetCoverage | GetInstCoverage
        | IteratorIndex => expr.not_constant(ctx),
    }
}

fn eval_key(ctx: &mut EvalContext, arg: &Expr) -> Result<MapKey> {
    match arg.eval(ctx)? {
        ConstantValue::Integer(v) => Ok(MapKey::Int(v)),
        ConstantValue::Str(v) => Ok(MapKey::Str(v)),
        other => shape_mismatch(ctx, arg, &other),
    }
}

fn eval_enum_method<'t>(
    method: SystemMethod,
    expr: &Expr<'t>,
    receiver: &Expr<'t>,
    ctx: &mut EvalContext,
) -> Result<ConstantValue> {
    let def = match receiver.ty.get_enum_def() {
        Some(d) => d,
        None => return shape_mismatch(ctx, receiver, &ConstantValue::Unset),
    };
    let value_of = |sym: &Symbol| match sym.kind {
        SymbolKind::EnumValue { ref value, .. } => Some(value.clone()),
        _ => None,
    };
    match method {
        SystemMethod::EnumNum => Ok(ConstantValue::Integer(SvInt::from_i32(
            def.values.len() as i32,
        ))),
        SystemMethod::EnumFirst | SystemMethod::EnumLast => {
            let sym = if method == SystemMethod::EnumFirst {
                def.values.first()
            } else {
                def.values.last()
            };
            match sym.and_then(|s| value_of(*s)) {
                Some(v) => Ok(ConstantValue::Integer(v)),
                None => Ok(expr.ty.default_value()),
            }
        }
        _ => {
            let value = receiver.eval(ctx)?;
            let name = def
                .values
                .iter()
                .find(|s| value_of(**s).map(ConstantValue::Integer).as_ref() == Some(&value))
                .map(|s| s.name.as_bytes().to_vec())
                .unwrap_or_default();
            Ok(ConstantValue::Str(name))
        }
    }
}

fn eval_sum<'t>(
    expr: &Expr<'t>,
    call: &Call<'t>,
    receiver: &Expr<'t>,
    ctx: &mut EvalContext,
) -> Result<ConstantValue> {
    let value = receiver.eval(ctx)?;
    let elems: Vec<ConstantValue> = match value {
        ConstantValue::Elements(ref v) | ConstantValue::Queue(ref v) => v.clone(),
        ConstantValue::Map(ref m) => m.iter().map(|(_, v)| v.clone()).collect(),
        _ => return shape_mismatch(ctx, receiver, &value),
    };

    let width = expr.ty.bit_width();
    let signed = expr.ty.is_signed();
    let mut acc = SvInt::zero(width, signed);
    for elem in elems {
        let term = match call.with {
            Some((item, clause)) => {
                ctx.create_local(item.id, elem);
                let term = clause.eval(ctx);
                ctx.remove_local(item.id);
                ctx.invalidate_cache();
                term?
            }
            None => elem,
        };
        match term.as_integer() {
            Some(v) => acc = acc.add(v).resize(width).with_sign(signed),
            None => return expr.not_constant(ctx),
        }
    }
    Ok(ConstantValue::Integer(acc))
}

fn eval_mutation<'t>(
    method: SystemMethod,
    expr: &Expr<'t>,
    call: &Call<'t>,
    receiver: &Expr<'t>,
    ctx: &mut EvalContext,
) -> Result<ConstantValue> {
    let arg = match call.args.get(1) {
        Some(arg) => Some(arg.eval(ctx)?),
        None => None,
    };
    let lval = receiver.eval_lvalue(ctx)?;
    let elem_default = receiver
        .ty
        .get_array_element_type()
        .map(|e| e.default_value())
        .unwrap_or(ConstantValue::Unset);

    let slot = match lval.resolve(ctx) {
        Some(slot) => slot,
        None => return expr.not_constant(ctx),
    };
    let mut popped_empty = false;
    let result = match (method, slot) {
        (SystemMethod::Delete, ConstantValue::Map(map)) => {
            match arg {
                Some(ConstantValue::Integer(v)) => {
                    map.remove(&MapKey::Int(v));
                }
                Some(ConstantValue::Str(v)) => {
                    map.remove(&MapKey::Str(v));
                }
                _ => {
                    let default = map.default.take();
                    **map = AssociativeMap::new();
                    map.default = default;
                }
            }
            Some(ConstantValue::Unset)
        }
        (SystemMethod::Delete, ConstantValue::Elements(v))
        | (SystemMethod::Delete, ConstantValue::Queue(v)) => {
            match arg.as_ref().and_then(|a| a.as_integer()).and_then(|i| i.as_i32()) {
                Some(i) if i >= 0 && (i as usize) < v.len() => {
                    v.remove(i as usize);
                }
                Some(_) => (),
                None => v.clear(),
            }
            Some(ConstantValue::Unset)
        }
        (SystemMethod::PushBack, ConstantValue::Queue(v)) => {
            v.extend(arg);
            Some(ConstantValue::Unset)
        }
        (SystemMethod::PushFront, ConstantValue::Queue(v)) => {
            if let Some(a) = arg {
                v.insert(0, a);
            }
            Some(ConstantValue::Unset)
        }
        (SystemMethod::PopBack, ConstantValue::Queue(v)) => match v.pop() {
            Some(x) => Some(x),
            None => {
                popped_empty = true;
                Some(elem_default)
            }
        },
        (SystemMethod::PopFront, ConstantValue::Queue(v)) => {
            if v.is_empty() {
                popped_empty = true;
                Some(elem_default)
            } else {
                Some(v.remove(0))
            }
        }
        _ => None,
    };
    let result = match result {
        Some(r) => r,
        None => return expr.not_constant(ctx),
    };
    ctx.invalidate_cache();
    if popped_empty {
        ctx.emit(
            DiagBuilder2::warning(format!("`{}` called on empty queue", method))
                .code(DiagCode::ConstEvalEmptyQueue)
                .span(expr.span),
        );
    }
    Ok(result)
}

/// Check whether a call refers to an automatic class member, for the
/// restrictions on procedural and assertion contexts.
pub(crate) fn is_automatic_member(sym: &Symbol) -> bool {
    match sym.kind {
        SymbolKind::ClassProperty { lifetime, .. } => lifetime == Lifetime::Automatic,
        SymbolKind::Subroutine(sub) => !sub.is_static,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_type() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let q = comp.queue_type(&INT_TYPE, 0);
        assert_eq!(lookup_type_method(q, "push_back"), Some(SystemMethod::PushBack));
        assert_eq!(lookup_type_method(q, "exists"), None);
        let aa = comp.associative_array_type(&INT_TYPE, Some(&STRING_TYPE));
        assert_eq!(lookup_type_method(aa, "exists"), Some(SystemMethod::Exists));
        assert_eq!(lookup_type_method(&STRING_TYPE, "len"), Some(SystemMethod::Len));
        let e = comp.enum_type(&INT_TYPE, &[("A", 0), ("B", 1)]);
        assert_eq!(lookup_type_method(e, "name"), Some(SystemMethod::EnumName));
        assert_eq!(lookup_type_method(&INT_TYPE, "size"), None);
    }

    #[test]
    fn lookup_by_symbol() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let plain = comp.symbol("x", SymbolKind::Variable {
            ty: &INT_TYPE,
            lifetime: Lifetime::Static,
        });
        assert_eq!(lookup_symbol_method(plain, "rand_mode"), None);
        let cb = comp.symbol("c", SymbolKind::ConstraintBlock { is_static: false });
        assert_eq!(
            lookup_symbol_method(cb, "constraint_mode"),
            Some(SystemMethod::ConstraintMode)
        );
        let it = iterator_symbol(&comp, "item", &INT_TYPE);
        assert_eq!(lookup_symbol_method(it, "index"), Some(SystemMethod::IteratorIndex));
    }
}
