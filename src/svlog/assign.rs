// Copyright (c) 2016-2021 Fabian Schuiki

//! Assignability checks and driver tracking.
//!
//! Every expression that appears on the left-hand side of an assignment is
//! checked with [`require_lvalue`]. Besides rejecting targets that cannot be
//! written, the check determines the longest static prefix of the target,
//! i.e. the outermost chain of selections whose selectors are constant, and
//! records a [`Driver`] for the symbol at the root of the target.

use crate::{
    crate_prelude::*,
    eval::{EvalContext, EvalFlags},
    range::ConstantRange,
    symbol::{Symbol, SymbolKind},
    syntax::RangeSelectionKind,
};

bitflags::bitflags! {
    /// Describes the kind of assignment a target appears in.
    pub struct AssignFlags: u32 {
        /// The target of a nonblocking assignment `<=`.
        const NON_BLOCKING = 1 << 0;
    }
}

/// A driver of a symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Driver {
    /// Where the driving assignment is.
    pub span: Span,
    /// The selections of the longest static prefix, outermost last.
    pub prefix: Vec<ConstantRange>,
    /// Whether the driver is a continuous assignment.
    pub continuous: bool,
    pub flags: AssignFlags,
}

impl Driver {
    /// Check whether two drivers may write the same bits.
    ///
    /// A shorter prefix covers everything its longer counterpart selects.
    pub fn overlaps(&self, other: &Driver) -> bool {
        self.prefix
            .iter()
            .zip(other.prefix.iter())
            .all(|(a, b)| a.overlaps(b))
    }
}

fn not_assignable(cx: &BindContext, expr: &Expr, location: Option<Span>) -> bool {
    let mut diag = DiagBuilder2::error(format!("{} cannot be assigned to", expr.desc_full()))
        .code(DiagCode::ExpressionNotAssignable)
        .span(expr.span);
    if let Some(loc) = location {
        diag = diag.add_note("Assignment here:").span(loc);
    }
    cx.emit(diag);
    false
}

fn user_defined_net<'t>(expr: &Expr<'t>) -> Option<&'t Symbol<'t>> {
    match expr.kind {
        ExprKind::NamedValue(sym) => match sym.kind {
            SymbolKind::Net {
                user_defined: true, ..
            } => Some(sym),
            _ => None,
        },
        _ => None,
    }
}

fn partial_driver(cx: &BindContext, net: &Symbol, expr: &Expr) {
    cx.emit(
        DiagBuilder2::error(format!(
            "{} has a user-defined net type and cannot be partially driven",
            net.desc_full()
        ))
        .code(DiagCode::UserDefPartialDriver)
        .span(expr.span)
        .add_note("Declared here:")
        .span(net.span),
    );
}

/// Check that an expression can be assigned to, and record the driver it
/// constitutes.
///
/// `lsp` is the longest static prefix determined so far by the enclosing
/// selections, and `custom` an evaluation context to use for constant
/// selectors in procedural code.
pub fn require_lvalue<'t>(
    cx: &BindContext<'_, 't>,
    expr: &'t Expr<'t>,
    flags: AssignFlags,
    location: Option<Span>,
    lsp: Option<&'t Expr<'t>>,
    custom: Option<&mut EvalContext>,
) -> bool {
    match expr.kind {
        ExprKind::Invalid(..) => false,
        ExprKind::NamedValue(sym) => {
            match sym.kind {
                SymbolKind::Variable { .. } | SymbolKind::ClassProperty { .. } => (),
                SymbolKind::Net { .. } if cx.is_procedural() => {
                    cx.emit(
                        DiagBuilder2::error(format!(
                            "{} cannot be assigned in procedural code",
                            sym.desc_full()
                        ))
                        .code(DiagCode::NetProceduralAssign)
                        .span(expr.span),
                    );
                    return false;
                }
                SymbolKind::Net { .. } => (),
                _ => return not_assignable(cx, expr, location),
            }
            add_driver(cx, sym, expr, flags, location, lsp, custom);
            true
        }
        ExprKind::ElementSelect(ref x) => require_select_lvalue(
            cx,
            expr,
            x.value,
            &[x.selector],
            flags,
            location,
            lsp,
            custom,
        ),
        ExprKind::RangeSelect(ref x) => require_select_lvalue(
            cx,
            expr,
            x.value,
            &[x.left, x.right],
            flags,
            location,
            lsp,
            custom,
        ),
        ExprKind::MemberAccess(ref x) => {
            if x.value.ty.is_class() {
                return match x.member.kind {
                    SymbolKind::ClassProperty { .. } => {
                        add_driver(cx, x.member, expr, flags, location, lsp, custom);
                        true
                    }
                    _ => not_assignable(cx, expr, location),
                };
            }
            if !matches!(x.member.kind, SymbolKind::Field { .. }) {
                return not_assignable(cx, expr, location);
            }
            if let Some(net) = user_defined_net(x.value) {
                partial_driver(cx, net, expr);
            }
            require_lvalue(cx, x.value, flags, location, lsp.or(Some(expr)), custom)
        }
        ExprKind::Concat(ref ops) | ExprKind::Streaming(ref ops) => {
            let mut custom = custom;
            let mut ok = true;
            for &op in ops {
                ok &= require_lvalue(cx, op, flags, location, None, custom.as_deref_mut());
            }
            ok
        }
        _ => not_assignable(cx, expr, location),
    }
}

#[allow(clippy::too_many_arguments)]
fn require_select_lvalue<'t>(
    cx: &BindContext<'_, 't>,
    expr: &'t Expr<'t>,
    value: &'t Expr<'t>,
    selectors: &[&'t Expr<'t>],
    flags: AssignFlags,
    location: Option<Span>,
    lsp: Option<&'t Expr<'t>>,
    custom: Option<&mut EvalContext>,
) -> bool {
    if matches!(value.kind, ExprKind::Concat(..) | ExprKind::Streaming(..)) {
        return not_assignable(cx, expr, location);
    }
    if let Some(net) = user_defined_net(value) {
        partial_driver(cx, net, expr);
        return false;
    }

    // Outside of procedural code selectors must be constant, so the
    // selection always extends the static prefix.
    if !cx.is_procedural() {
        for &sel in selectors {
            if cx.eval(sel).is_err() {
                return false;
            }
        }
        return require_lvalue(cx, value, flags, location, lsp.or(Some(expr)), custom);
    }

    let mut local = None;
    let ctx = match custom {
        Some(ctx) => ctx,
        None => local.get_or_insert_with(|| EvalContext::new(EvalFlags::CACHE_RESULTS)),
    };
    let is_constant = match expr.kind {
        ExprKind::ElementSelect(ref x) => x.is_constant_select(ctx),
        ExprKind::RangeSelect(ref x) => x.is_constant_select(ctx),
        _ => false,
    };
    let lsp = if is_constant { lsp.or(Some(expr)) } else { None };
    require_lvalue(cx, value, flags, location, lsp, Some(ctx))
}

fn add_driver<'t>(
    cx: &BindContext<'_, 't>,
    sym: &'t Symbol<'t>,
    expr: &'t Expr<'t>,
    flags: AssignFlags,
    location: Option<Span>,
    lsp: Option<&'t Expr<'t>>,
    custom: Option<&mut EvalContext>,
) {
    let mut local = None;
    let ctx = match custom {
        Some(ctx) => ctx,
        None => local.get_or_insert_with(|| EvalContext::new(EvalFlags::CACHE_RESULTS)),
    };
    let prefix = match lsp {
        Some(lsp) => static_prefix(lsp, ctx),
        None => vec![],
    };
    cx.comp.add_driver(
        sym,
        Driver {
            span: location.unwrap_or(expr.span),
            prefix,
            continuous: !cx.is_procedural(),
            flags,
        },
    );
}

/// Compute the ranges selected by a static prefix, from the root outwards.
fn static_prefix(lsp: &Expr, ctx: &mut EvalContext) -> Vec<ConstantRange> {
    let mut ranges = vec![];
    let mut current = lsp;
    loop {
        let int = |v: Result<ConstantValue>| v.ok().and_then(|v| v.as_integer()?.as_i32());
        match current.kind {
            ExprKind::ElementSelect(ref x) => {
                if let Some(i) = int(x.selector.eval(ctx)) {
                    ranges.push(ConstantRange::new(i, i));
                }
                current = x.value;
            }
            ExprKind::RangeSelect(ref x) => {
                let left = int(x.left.eval(ctx));
                let right = int(x.right.eval(ctx));
                if let (Some(l), Some(r)) = (left, right) {
                    ranges.push(match x.selection_kind {
                        RangeSelectionKind::Simple => ConstantRange::new(l, r),
                        kind => ConstantRange::get_indexed_range(
                            l,
                            r,
                            x.value.ty.get_fixed_range().is_little_endian(),
                            kind == RangeSelectionKind::IndexedUp,
                        ),
                    });
                }
                current = x.value;
            }
            ExprKind::MemberAccess(ref x) if !x.value.ty.is_class() => {
                ranges.push(x.get_select_range(current));
                current = x.value;
            }
            _ => break,
        }
    }
    ranges.reverse();
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(prefix: Vec<ConstantRange>) -> Driver {
        Driver {
            span: INVALID_SPAN,
            prefix,
            continuous: true,
            flags: AssignFlags::empty(),
        }
    }

    #[test]
    fn driver_overlap() {
        let whole = driver(vec![]);
        let low = driver(vec![ConstantRange::new(3, 0)]);
        let high = driver(vec![ConstantRange::new(7, 4)]);
        let bit = driver(vec![ConstantRange::new(2, 2)]);
        assert!(whole.overlaps(&low));
        assert!(!low.overlaps(&high));
        assert!(low.overlaps(&bit));
        assert!(!high.overlaps(&bit));
    }
}
