// Copyright (c) 2016-2021 Fabian Schuiki

//! Expression binding.
//!
//! This module turns [`ExprSyntax`] into typed [`Expr`] nodes. Selections and
//! member accesses are delegated to their own modules; everything else the
//! binder handles itself, to the degree needed to bind their operands.

use crate::{
    builtins, member, select,
    crate_prelude::*,
    symbol::SymbolKind,
    syntax::{BinaryOp, ExprSyntax, ExprSyntaxKind, InvocationArgs, SelectorSyntax},
    ty::{Domain, Sign, INT_TYPE, STRING_TYPE, UNBOUNDED_TYPE, VOID_TYPE},
};

fn unbounded_flags() -> BindFlags {
    BindFlags::ALLOW_UNBOUNDED_LITERAL | BindFlags::ALLOW_UNBOUNDED_LITERAL_ARITHMETIC
}

/// Bind an expression whose type is determined by the expression alone.
pub fn self_determined<'t>(cx: &BindContext<'_, 't>, syntax: &ExprSyntax) -> &'t Expr<'t> {
    bind_expr(cx, syntax)
}

/// Bind an expression that is assigned to a value of type `target`.
///
/// The result is converted to `target` if the two types differ but are
/// assignment compatible.
pub fn bind_rvalue<'t>(
    cx: &BindContext<'_, 't>,
    target: Type<'t>,
    syntax: &ExprSyntax,
) -> &'t Expr<'t> {
    let expr = self_determined(cx, syntax);
    if expr.is_bad() || target.is_error() || expr.ty.is_equivalent(target) {
        return expr;
    }

    // Enums only accept values of their own type.
    let compatible = if target.get_enum_def().is_some() {
        false
    } else if target.is_integral() {
        expr.ty.is_integral()
    } else {
        target.is_string() && expr.ty.is_string()
    };
    if !compatible {
        cx.emit(
            DiagBuilder2::error(format!(
                "value of type `{}` cannot be converted to `{}`",
                expr.ty, target
            ))
            .code(DiagCode::BadConversion)
            .span(expr.span),
        );
        return cx.bad_expr(expr.span, Some(expr));
    }
    if target.is_string() {
        return expr;
    }
    trace!("Converting {} to `{}`", expr.desc_full(), target);
    cx.alloc(expr.span, target, ExprKind::Conversion(expr))
}

/// Bind an expression.
pub fn bind_expr<'t>(cx: &BindContext<'_, 't>, syntax: &ExprSyntax) -> &'t Expr<'t> {
    let span = syntax.span;
    // Operands only see `$` through arithmetic.
    let inner = cx.without_flags(unbounded_flags());

    match syntax.kind {
        ExprSyntaxKind::IntLiteral(ref v) => cx.alloc(
            span,
            &INT_TYPE,
            ExprKind::IntLiteral(SvInt::new(32, v.clone(), true)),
        ),
        ExprSyntaxKind::SizedLiteral(ref v) => {
            let domain = if v.has_unknown() {
                Domain::FourValued
            } else {
                Domain::TwoValued
            };
            let width = v.width() as i32;
            let ty = cx.comp.vector_type(domain, v.is_signed(), width - 1, 0);
            cx.alloc(span, ty, ExprKind::IntLiteral(v.clone()))
        }
        ExprSyntaxKind::StringLiteral(ref v) => {
            cx.alloc(span, &STRING_TYPE, ExprKind::StringLiteral(v.clone()))
        }
        ExprSyntaxKind::Unbounded => {
            if !cx.flags.contains(BindFlags::ALLOW_UNBOUNDED_LITERAL) {
                cx.emit(
                    DiagBuilder2::error("`$` is not allowed here")
                        .code(DiagCode::UnboundedNotAllowed)
                        .span(span),
                );
                return cx.bad_expr(span, None);
            }
            cx.alloc(span, &UNBOUNDED_TYPE, ExprKind::UnboundedLiteral)
        }
        ExprSyntaxKind::Ident(ref name) => bind_ident(cx, name, span),
        ExprSyntaxKind::Binary { op, ref lhs, ref rhs } => bind_binary(cx, op, lhs, rhs, span),
        ExprSyntaxKind::Concat(ref elems) => bind_concat(&inner, elems, false, span),
        ExprSyntaxKind::Streaming(ref elems) => bind_concat(&inner, elems, true, span),
        ExprSyntaxKind::Select {
            ref value,
            ref selector,
        } => {
            let value = self_determined(&inner, value);
            match selector {
                SelectorSyntax::Bit(index) => {
                    select::bind_element_select(&inner, value, index, span)
                }
                SelectorSyntax::Range { kind, left, right } => {
                    select::bind_range_select(&inner, value, *kind, left, right, span)
                }
            }
        }
        ExprSyntaxKind::MemberAccess {
            ref value,
            ref name,
        } => member::bind_member_access_syntax(&inner, value, name, None, None, span),
        ExprSyntaxKind::Invocation {
            ref callee,
            ref args,
            ref with,
        } => {
            let invocation = InvocationArgs { args, span };
            bind_invocation(&inner, callee, invocation, with.as_deref(), span)
        }
    }
}

fn bind_ident<'t>(cx: &BindContext<'_, 't>, name: &Spanned<String>, span: Span) -> &'t Expr<'t> {
    let sym = match cx.scope.lookup(&name.value) {
        Some(sym) => sym,
        None => {
            cx.emit(
                DiagBuilder2::error(format!("`{}` is not declared", name.value))
                    .code(DiagCode::UndeclaredIdentifier)
                    .span(name.span),
            );
            return cx.bad_expr(span, None);
        }
    };
    match sym.kind {
        // Functions may be called without parentheses.
        SymbolKind::Subroutine(..) => {
            builtins::bind_subroutine_call(cx, sym, None, None, None, span)
        }
        // Coverage constructs and constraints are referenced as void values
        // so their members and methods can be accessed.
        SymbolKind::ConstraintBlock { .. }
        | SymbolKind::Coverpoint { .. }
        | SymbolKind::CoverCross { .. }
        | SymbolKind::CoverageBin => cx.alloc(span, &VOID_TYPE, ExprKind::NamedValue(sym)),
        _ if sym.is_value() => cx.alloc(span, sym.value_type(), ExprKind::NamedValue(sym)),
        _ => {
            cx.emit(
                DiagBuilder2::error(format!("{} is not a value", sym.desc_full()))
                    .code(DiagCode::NotAValue)
                    .span(name.span)
                    .add_note("Declared here:")
                    .span(sym.span),
            );
            cx.bad_expr(span, None)
        }
    }
}

fn bind_binary<'t>(
    cx: &BindContext<'_, 't>,
    op: BinaryOp,
    lhs: &ExprSyntax,
    rhs: &ExprSyntax,
    span: Span,
) -> &'t Expr<'t> {
    // `$ - 1` is only allowed where the context permits arithmetic on `$`.
    let operand_cx = if cx.flags.contains(BindFlags::ALLOW_UNBOUNDED_LITERAL_ARITHMETIC) {
        cx.with_flags(BindFlags::ALLOW_UNBOUNDED_LITERAL)
    } else {
        cx.without_flags(unbounded_flags())
    };
    let lhs = bind_expr(&operand_cx, lhs);
    let rhs = bind_expr(&operand_cx, rhs);
    if lhs.is_bad() || rhs.is_bad() {
        return cx.bad_expr(span, None);
    }

    let operand_ok = |e: &Expr| e.ty.is_integral() || e.ty.is_unbounded();
    if !operand_ok(lhs) || !operand_ok(rhs) {
        cx.emit(
            DiagBuilder2::error(format!(
                "invalid operands of types `{}` and `{}` to binary operator",
                lhs.ty, rhs.ty
            ))
            .code(DiagCode::BadBinaryExpression)
            .span(span),
        );
        return cx.bad_expr(span, None);
    }

    // `$` counts as an `int` in arithmetic.
    let operand_ty = |e: &'t Expr<'t>| -> Type<'t> {
        if e.ty.is_unbounded() {
            &INT_TYPE
        } else {
            e.ty
        }
    };
    let (lt, rt) = (operand_ty(lhs), operand_ty(rhs));
    let ty = if lt.is_equivalent(rt) {
        lt
    } else {
        let width = std::cmp::max(lt.bit_width(), rt.bit_width()) as i32;
        let domain = if lt.is_four_state() || rt.is_four_state() {
            Domain::FourValued
        } else {
            Domain::TwoValued
        };
        cx.comp
            .vector_type(domain, lt.is_signed() && rt.is_signed(), width - 1, 0)
    };
    cx.alloc(span, ty, ExprKind::Binary { op, lhs, rhs })
}

fn bind_concat<'t>(
    cx: &BindContext<'_, 't>,
    elems: &[ExprSyntax],
    streaming: bool,
    span: Span,
) -> &'t Expr<'t> {
    let ops: Vec<_> = elems.iter().map(|e| self_determined(cx, e)).collect();
    if ops.iter().any(|op| op.is_bad()) {
        return cx.bad_expr(span, None);
    }
    let kind = if streaming {
        ExprKind::Streaming(ops.clone())
    } else {
        ExprKind::Concat(ops.clone())
    };

    if !streaming && !ops.is_empty() && ops.iter().all(|op| op.ty.is_string()) {
        return cx.alloc(span, &STRING_TYPE, kind);
    }
    if !ops.iter().all(|op| cx.require_integral(*op)) {
        return cx.bad_expr(span, None);
    }
    let width: u32 = ops.iter().map(|op| op.ty.bit_width()).sum();
    let domain = if ops.iter().any(|op| op.ty.is_four_state()) {
        Domain::FourValued
    } else {
        Domain::TwoValued
    };
    let ty = cx.comp.intern_type(TypeKind::BitVector {
        domain,
        sign: Sign::Unsigned,
        range: crate::range::ConstantRange::new(width as i32 - 1, 0),
        dubbed: false,
    });
    cx.alloc(span, ty, kind)
}

fn bind_invocation<'t>(
    cx: &BindContext<'_, 't>,
    callee: &ExprSyntax,
    invocation: InvocationArgs,
    with: Option<&ExprSyntax>,
    span: Span,
) -> &'t Expr<'t> {
    match callee.kind {
        ExprSyntaxKind::MemberAccess {
            ref value,
            ref name,
        } => member::bind_member_access_syntax(cx, value, name, Some(invocation), with, span),
        ExprSyntaxKind::Ident(ref name) => match cx.scope.lookup(&name.value) {
            Some(sym) if matches!(sym.kind, SymbolKind::Subroutine(..)) => {
                builtins::bind_subroutine_call(cx, sym, None, Some(invocation), with, span)
            }
            _ => not_callable(cx, callee, span),
        },
        _ => not_callable(cx, callee, span),
    }
}

fn not_callable<'t>(cx: &BindContext<'_, 't>, callee: &ExprSyntax, span: Span) -> &'t Expr<'t> {
    let callee = bind_expr(cx, callee);
    if callee.is_bad() {
        return cx.bad_expr(span, Some(callee));
    }
    cx.emit(
        DiagBuilder2::error(format!("{} is not callable", callee.desc_full()))
            .code(DiagCode::ExpressionNotCallable)
            .span(span),
    );
    cx.bad_expr(span, Some(callee))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_only_where_allowed() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let cx = comp.bind_context();
        assert!(bind_expr(&cx, &ExprSyntax::unbounded()).is_bad());
        assert_eq!(
            comp.diagnostics()[0].get_code(),
            Some(DiagCode::UnboundedNotAllowed)
        );

        let cx = cx.with_flags(unbounded_flags());
        let e = bind_expr(
            &cx,
            &ExprSyntax::binary(BinaryOp::Sub, ExprSyntax::unbounded(), ExprSyntax::int(1)),
        );
        assert!(!e.is_bad());
        assert_eq!(e.ty.bit_width(), 32);
    }

    #[test]
    fn rvalue_conversion() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let cx = comp.bind_context();
        let byte = comp.vector_type(Domain::TwoValued, false, 7, 0);
        let e = bind_rvalue(&cx, byte, &ExprSyntax::int(3));
        assert!(matches!(e.kind, ExprKind::Conversion(..)));
        assert_eq!(e.ty.bit_width(), 8);

        let e = bind_rvalue(&cx, byte, &ExprSyntax::string("x"));
        assert!(e.is_bad());
        assert_eq!(
            comp.diagnostics()[0].get_code(),
            Some(DiagCode::BadConversion)
        );
    }
}
