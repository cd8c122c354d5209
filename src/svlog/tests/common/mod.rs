// Copyright (c) 2016-2021 Fabian Schuiki
#![allow(dead_code)]

//! Utilities for selection and member access tests.

pub use sable_common::{
    errors::{DiagCode, Severity},
    source::{Spanned, INVALID_SPAN},
    NodeId,
};
pub use sable_svlog::{
    assign::{require_lvalue, AssignFlags},
    binder::bind_expr,
    eval::{EvalContext, EvalFlags},
    symbol::{Lifetime, NetExpansion, RandMode, Symbol, SymbolKind, Visibility},
    syntax::{BinaryOp, ExprSyntax, RangeSelectionKind},
    ty::{
        Domain, BIT_TYPE, BYTE_TYPE, ERROR_TYPE, INT_TYPE, LOGIC_TYPE, REAL_TYPE, STRING_TYPE,
        VOID_TYPE,
    },
    value::{AssociativeMap, MapKey, UnionValue},
    BindContext, BindFlags, Compilation, ConstantRange, ConstantValue, Expr, ExprKind,
    GlobalArenas, SvInt, Type, TypeKind,
};

pub fn init_logging() {
    let _ = pretty_env_logger::try_init();
}

/// The codes of all diagnostics emitted so far, in order.
pub fn codes(comp: &Compilation) -> Vec<DiagCode> {
    comp.diagnostics()
        .iter()
        .filter_map(|d| d.get_code())
        .collect()
}

/// The codes and severities of the diagnostics recorded during evaluation.
pub fn eval_diags(ctx: &EvalContext) -> Vec<(Severity, Option<DiagCode>)> {
    ctx.diagnostics()
        .iter()
        .map(|d| (d.get_severity(), d.get_code()))
        .collect()
}

/// Bind an expression in procedural code.
pub fn bind<'t>(comp: &Compilation<'t>, syntax: &ExprSyntax) -> &'t Expr<'t> {
    bind_expr(&comp.bind_context(), syntax)
}

/// Bind an expression outside of procedural code.
pub fn bind_continuous<'t>(comp: &Compilation<'t>, syntax: &ExprSyntax) -> &'t Expr<'t> {
    bind_expr(
        &comp.bind_context().with_flags(BindFlags::NON_PROCEDURAL),
        syntax,
    )
}

pub fn ident(name: &str) -> ExprSyntax {
    ExprSyntax::ident(name)
}

/// `name[index]`
pub fn index(name: &str, index: i64) -> ExprSyntax {
    ident(name).index(ExprSyntax::int(index))
}

/// `name[left:right]`
pub fn slice(name: &str, left: i64, right: i64) -> ExprSyntax {
    ident(name).range(
        RangeSelectionKind::Simple,
        ExprSyntax::int(left),
        ExprSyntax::int(right),
    )
}

/// `name[start+:width]`
pub fn slice_up(name: &str, start: i64, width: i64) -> ExprSyntax {
    ident(name).range(
        RangeSelectionKind::IndexedUp,
        ExprSyntax::int(start),
        ExprSyntax::int(width),
    )
}

/// `$ - n`
pub fn last_minus(n: i64) -> ExprSyntax {
    ExprSyntax::binary(BinaryOp::Sub, ExprSyntax::unbounded(), ExprSyntax::int(n))
}

pub fn int(v: i32) -> ConstantValue {
    ConstantValue::Integer(SvInt::from_i32(v))
}

pub fn ints(vs: &[i32]) -> Vec<ConstantValue> {
    vs.iter().map(|&v| int(v)).collect()
}

/// An unsigned integer constant of the given width.
pub fn bits(width: u32, v: u64) -> ConstantValue {
    ConstantValue::Integer(SvInt::from_u64(width, v, false))
}

/// The numeric value of an integer constant.
pub fn as_u64(v: &ConstantValue) -> Option<u64> {
    v.as_integer().and_then(|i| i.as_u64())
}

/// Declare a parameter with a value.
pub fn param<'t>(
    comp: &Compilation<'t>,
    name: &str,
    ty: Type<'t>,
    value: ConstantValue,
) -> &'t Symbol<'t> {
    comp.declare(name, SymbolKind::Parameter { ty, value })
}

/// Declare a variable and give it a value in `ctx`.
pub fn local<'t>(
    comp: &Compilation<'t>,
    ctx: &mut EvalContext,
    name: &str,
    ty: Type<'t>,
    value: ConstantValue,
) -> &'t Symbol<'t> {
    let sym = comp.declare_var(name, ty);
    ctx.create_local(sym.id, value);
    sym
}

/// Declare a net.
pub fn net<'t>(
    comp: &Compilation<'t>,
    name: &str,
    ty: Type<'t>,
    expansion: NetExpansion,
    user_defined: bool,
) -> &'t Symbol<'t> {
    comp.declare(
        name,
        SymbolKind::Net {
            ty,
            expansion,
            user_defined,
        },
    )
}
