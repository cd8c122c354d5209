// Copyright (c) 2016-2021 Fabian Schuiki

//! Member accesses.
//!
//! A member access `value.name` resolves `name` in the scope implied by the
//! type of `value`: the fields of a struct or union, the members of a class
//! or covergroup, or the body of a coverpoint. Values of other types only
//! have built-in methods.

use crate::{
    binder, builtins,
    crate_prelude::*,
    eval::{shape_mismatch, EvalContext},
    expr::MemberAccess,
    lvalue::LValue,
    range::ConstantRange,
    symbol::{Symbol, SymbolKind, Visibility},
    syntax::{ExprSyntax, InvocationArgs},
    ty::VOID_TYPE,
};

/// Bind a member access `value.name` from syntax.
pub fn bind_member_access_syntax<'t>(
    cx: &BindContext<'_, 't>,
    value: &ExprSyntax,
    name: &Spanned<String>,
    invocation: Option<InvocationArgs>,
    with: Option<&ExprSyntax>,
    span: Span,
) -> &'t Expr<'t> {
    let lhs = binder::self_determined(cx, value);
    let result = bind_member_access(cx, lhs, &name.value, name.span, invocation, with, span);
    if result.is_bad() || matches!(result.kind, ExprKind::Call(..)) {
        return result;
    }

    if let Some(invocation) = invocation {
        cx.emit(
            DiagBuilder2::error(format!("{} is not callable", result.desc_full()))
                .code(DiagCode::ExpressionNotCallable)
                .span(invocation.span),
        );
        return cx.bad_expr(span, Some(result));
    }
    if let Some(with) = with {
        cx.emit(
            DiagBuilder2::warning(format!(
                "`with` clause has no effect on {}",
                result.desc_full()
            ))
            .code(DiagCode::UnexpectedWithClause)
            .span(with.span),
        );
    }
    result
}

/// Bind a member access `expr.name` of an already bound value.
pub fn bind_member_access<'t>(
    cx: &BindContext<'_, 't>,
    expr: &'t Expr<'t>,
    name: &str,
    name_span: Span,
    invocation: Option<InvocationArgs>,
    with: Option<&ExprSyntax>,
    span: Span,
) -> &'t Expr<'t> {
    if name.is_empty() || expr.is_bad() {
        return cx.bad_expr(span, Some(expr));
    }
    trace!("Binding member `{}` of {}", name, expr.desc_full());

    // Iterators of `with` clauses have their own pseudo-methods.
    if let ExprKind::NamedValue(sym) = expr.kind {
        if let SymbolKind::Iterator { .. } = sym.kind {
            if let Some(method) = builtins::lookup_symbol_method(sym, name) {
                return builtins::bind_system_call(cx, method, expr, invocation, with, span);
            }
        }
    }

    let ty = expr.ty.unname();
    let found = match *ty {
        TypeKind::Struct(def) => def.find(name),
        TypeKind::Union(def) => def.find(name),
        TypeKind::Class(def) => {
            if def.has_error_base() {
                return cx.bad_expr(span, Some(expr));
            }
            def.find(name)
        }
        TypeKind::Covergroup(def) => def.find(name),
        TypeKind::Void
            if expr
                .get_symbol_reference()
                .and_then(|s| s.cover_body())
                .is_some() =>
        {
            expr.get_symbol_reference()
                .and_then(|s| s.cover_body())
                .and_then(|body| body.iter().cloned().find(|m| m.name == name))
        }
        TypeKind::Enum(..)
        | TypeKind::String
        | TypeKind::UnpackedArray { .. }
        | TypeKind::DynamicArray(..)
        | TypeKind::AssociativeArray { .. }
        | TypeKind::Queue { .. }
        | TypeKind::Event
        | TypeKind::Sequence => {
            if let Some(call) = try_bind_special_method(cx, expr, name, invocation, with, span) {
                return call;
            }
            if let Some(method) = builtins::lookup_type_method(ty, name) {
                return builtins::bind_system_call(cx, method, expr, invocation, with, span);
            }
            return unknown_member(cx, expr, name, name_span, span);
        }
        _ => {
            if let Some(call) = try_bind_special_method(cx, expr, name, invocation, with, span) {
                return call;
            }
            cx.emit(
                DiagBuilder2::error(format!(
                    "invalid member access `{}` on value of type `{}`",
                    name, expr.ty
                ))
                .code(DiagCode::InvalidMemberAccess)
                .span(name_span)
                .add_note("Accessed value here:")
                .span(expr.span),
            );
            return cx.bad_expr(span, Some(expr));
        }
    };

    let member = match found {
        Some(member) => member,
        None => {
            if let Some(call) = try_bind_special_method(cx, expr, name, invocation, with, span) {
                return call;
            }
            return unknown_member(cx, expr, name, name_span, span);
        }
    };
    debug!("Resolved `{}` to {}", name, member.desc_full());

    let access = |ty: Type<'t>| {
        cx.alloc(
            span,
            ty,
            ExprKind::MemberAccess(MemberAccess {
                value: expr,
                member,
            }),
        )
    };

    match member.kind {
        SymbolKind::Field { ty, .. } => access(ty),
        SymbolKind::ClassProperty {
            ty,
            visibility,
            owner,
            ..
        } => {
            check_visibility(cx, member, owner, visibility, name_span);
            if builtins::is_automatic_member(member)
                && !check_automatic_context(cx, member, name_span)
            {
                return cx.bad_expr(span, Some(expr));
            }
            access(ty)
        }
        SymbolKind::Subroutine(sub) => {
            if let Some(owner) = sub.owner {
                check_visibility(cx, member, owner, sub.visibility, name_span);
            }
            if builtins::is_automatic_member(member)
                && !check_automatic_context(cx, member, name_span)
            {
                return cx.bad_expr(span, Some(expr));
            }
            builtins::bind_subroutine_call(cx, member, Some(expr), invocation, with, span)
        }
        SymbolKind::ConstraintBlock { .. }
        | SymbolKind::Coverpoint { .. }
        | SymbolKind::CoverCross { .. }
        | SymbolKind::CoverageBin => {
            if !cx.is_procedural() {
                cx.emit(
                    DiagBuilder2::error(format!(
                        "{} cannot be referenced outside of procedural code",
                        member.desc_full()
                    ))
                    .code(DiagCode::DynamicNotProcedural)
                    .span(name_span),
                );
                return cx.bad_expr(span, Some(expr));
            }
            access(&VOID_TYPE)
        }
        // Enum values are constants; the value they were accessed through
        // does not matter.
        SymbolKind::EnumValue { ty, .. } => cx.alloc(span, ty, ExprKind::NamedValue(member)),
        _ if member.is_value() => access(member.value_type()),
        _ => {
            cx.emit(
                DiagBuilder2::error(format!(
                    "{} cannot be accessed as a member",
                    member.desc_full()
                ))
                .code(DiagCode::InvalidClassAccess)
                .span(name_span)
                .add_note("Declared here:")
                .span(member.span),
            );
            cx.bad_expr(span, Some(expr))
        }
    }
}

/// Try the built-in methods attached to the symbol `expr` refers to.
fn try_bind_special_method<'t>(
    cx: &BindContext<'_, 't>,
    expr: &'t Expr<'t>,
    name: &str,
    invocation: Option<InvocationArgs>,
    with: Option<&ExprSyntax>,
    span: Span,
) -> Option<&'t Expr<'t>> {
    let sym = expr.get_symbol_reference()?;
    let method = builtins::lookup_symbol_method(sym, name)?;
    Some(builtins::bind_system_call(
        cx, method, expr, invocation, with, span,
    ))
}

fn unknown_member<'t>(
    cx: &BindContext<'_, 't>,
    expr: &'t Expr<'t>,
    name: &str,
    name_span: Span,
    span: Span,
) -> &'t Expr<'t> {
    cx.emit(
        DiagBuilder2::error(format!("no member named `{}` in type `{}`", name, expr.ty))
            .code(DiagCode::UnknownMember)
            .span(name_span)
            .add_note("Accessed value here:")
            .span(expr.span),
    );
    cx.bad_expr(span, Some(expr))
}

/// Complain if a class member is not visible from the current context.
///
/// Binding continues regardless of the outcome.
fn check_visibility(
    cx: &BindContext,
    member: &Symbol,
    owner: NodeId,
    visibility: Visibility,
    span: Span,
) -> bool {
    let (visible, code, what) = match visibility {
        Visibility::Public => return true,
        Visibility::Local => (
            cx.class.map(|c| c.id == owner).unwrap_or(false),
            DiagCode::LocalMemberAccess,
            "local",
        ),
        Visibility::Protected => (
            cx.class.map(|c| c.derives_from(owner)).unwrap_or(false),
            DiagCode::ProtectedMemberAccess,
            "protected",
        ),
    };
    if !visible {
        cx.emit(
            DiagBuilder2::error(format!(
                "{} is {} and not visible here",
                member.desc_full(),
                what
            ))
            .code(code)
            .span(span)
            .add_note("Declared here:")
            .span(member.span),
        );
    }
    visible
}

/// Automatic class members only exist in procedural code outside of
/// assertions.
fn check_automatic_context(cx: &BindContext, member: &Symbol, span: Span) -> bool {
    if !cx.is_procedural() {
        cx.emit(
            DiagBuilder2::error(format!(
                "automatic {} cannot be referenced outside of procedural code",
                member.desc_full()
            ))
            .code(DiagCode::DynamicNotProcedural)
            .span(span),
        );
        return false;
    }
    if cx.flags.contains(BindFlags::ASSERTION_EXPR) {
        cx.emit(
            DiagBuilder2::error(format!(
                "automatic {} cannot be referenced in an assertion",
                member.desc_full()
            ))
            .code(DiagCode::ClassMemberInAssertion)
            .span(span),
        );
        return false;
    }
    true
}

impl<'t> MemberAccess<'t> {
    /// The position of the member within its aggregate, if it is a field.
    fn offset(&self) -> Option<u32> {
        match self.member.kind {
            SymbolKind::Field { offset, .. } => Some(offset),
            _ => None,
        }
    }

    /// The range the member occupies within the value it is accessed
    /// through.
    ///
    /// For unpacked aggregates this is an element position, for packed ones
    /// a bit range.
    pub fn get_select_range(&self, expr: &Expr<'t>) -> ConstantRange {
        let offset = self.offset().unwrap_or(0) as i32;
        let width = expr.ty.bit_width() as i32;
        let value_ty = self.value.ty;
        if value_ty.is_unpacked_struct() {
            ConstantRange::new(offset, offset)
        } else if value_ty.is_unpacked_union() {
            ConstantRange::new(0, 0)
        } else if value_ty.is_packed_union() {
            ConstantRange::new(width - 1, 0)
        } else {
            ConstantRange::new(width + offset - 1, offset)
        }
    }

    /// Evaluate the member access.
    pub fn eval(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<ConstantValue> {
        let offset = match self.offset() {
            Some(o) => o,
            None => return expr.not_constant(ctx),
        };
        let cv = self.value.eval(ctx)?;
        let value_ty = self.value.ty;

        if value_ty.is_unpacked_struct() {
            return match cv.elements().and_then(|e| e.get(offset as usize)) {
                Some(v) => Ok(v.clone()),
                None => shape_mismatch(ctx, self.value, &cv),
            };
        }

        if value_ty.is_unpacked_union() {
            let union = match cv.as_union() {
                Some(u) => u,
                None => return shape_mismatch(ctx, self.value, &cv),
            };
            if union.active == Some(offset) {
                return Ok(union.value.clone());
            }
            if value_ty.is_tagged_union() {
                report_inactive_tag(ctx, self, union.active, expr.span);
                return Err(());
            }

            // Reading an inactive member of a plain union reinterprets the
            // leading fields the two members have in common.
            let mut result = expr.ty.default_value();
            if let Some(active) = union.active {
                let active_ty = value_ty
                    .get_union_def()
                    .and_then(|def| def.member_at(active))
                    .map(|m| m.value_type());
                if let Some(active_ty) = active_ty {
                    translate_common_initial_sequence(
                        active_ty,
                        &union.value,
                        expr.ty,
                        &mut result,
                    );
                }
            }
            return Ok(result);
        }

        let int = match cv.as_integer() {
            Some(v) => v,
            None => return shape_mismatch(ctx, self.value, &cv),
        };
        let width = expr.ty.bit_width() as i32;
        if value_ty.is_packed_union() {
            check_packed_union_tag(ctx, self, int, offset, expr.span)?;
            return Ok(ConstantValue::Integer(int.slice(width - 1, 0)));
        }
        let offset = offset as i32;
        Ok(ConstantValue::Integer(int.slice(width + offset - 1, offset)))
    }

    /// Evaluate the member access as an assignment target.
    pub fn eval_lvalue(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<LValue> {
        let offset = match self.offset() {
            Some(o) => o,
            None => return expr.not_constant(ctx),
        };
        let mut lval = self.value.eval_lvalue(ctx)?;
        let value_ty = self.value.ty;

        if value_ty.is_unpacked_struct() {
            lval.add_index(offset as i64, ConstantValue::Unset);
        } else if value_ty.is_unpacked_union() {
            // Tagged unions may only be written through the active member.
            if value_ty.is_tagged_union() {
                let current = lval.load(ctx);
                let active = current.as_union().and_then(|u| u.active);
                if active != Some(offset) {
                    report_inactive_tag(ctx, self, active, expr.span);
                    return Err(());
                }
            }
            lval.add_index(offset as i64, expr.ty.default_value());
        } else if value_ty.is_packed_union() {
            let current = lval.load(ctx);
            if let Some(int) = current.as_integer() {
                check_packed_union_tag(ctx, self, int, offset, expr.span)?;
            }
            let width = expr.ty.bit_width() as i32;
            lval.add_bit_slice(ConstantRange::new(width - 1, 0));
        } else {
            let width = expr.ty.bit_width() as i32;
            let offset = offset as i32;
            lval.add_bit_slice(ConstantRange::new(width + offset - 1, offset));
        }
        Ok(lval)
    }
}

fn report_inactive_tag(ctx: &EvalContext, access: &MemberAccess, active: Option<u32>, span: Span) {
    let active_name = active
        .and_then(|i| access.value.ty.get_union_def()?.member_at(i))
        .map(|m| format!("`{}`", m.name))
        .unwrap_or_else(|| "no member".to_string());
    ctx.emit(
        DiagBuilder2::error(format!(
            "{} is not the active member of the tagged union; {} is active",
            access.member.desc_full(),
            active_name
        ))
        .code(DiagCode::ConstEvalTaggedUnion)
        .span(span),
    );
}

/// Check that the tag bits of a packed tagged union select `offset`.
fn check_packed_union_tag(
    ctx: &EvalContext,
    access: &MemberAccess,
    value: &SvInt,
    offset: u32,
    span: Span,
) -> Result<()> {
    let tag_bits = match access.value.ty.get_union_def() {
        Some(def) => def.tag_bits,
        None => 0,
    };
    if tag_bits == 0 {
        return Ok(());
    }
    let width = access.value.ty.bit_width() as i32;
    let tag = value.slice(width - 1, width - tag_bits as i32);
    if tag.has_unknown() || tag.as_u64() != Some(offset as u64) {
        ctx.emit(
            DiagBuilder2::error(format!(
                "tag {} does not select {} of the packed union",
                tag,
                access.member.desc_full()
            ))
            .code(DiagCode::ConstEvalTaggedUnion)
            .span(span),
        );
        return Err(());
    }
    Ok(())
}

/// Copy the leaf fields that `src_ty` and `dst_ty` have in common, in
/// order, from `src` into `dst`. Nested unpacked structs are flattened.
fn translate_common_initial_sequence<'t>(
    src_ty: Type<'t>,
    src: &ConstantValue,
    dst_ty: Type<'t>,
    dst: &mut ConstantValue,
) {
    let mut leaves = vec![];
    flatten_leaves(src_ty, src, &mut leaves);
    let mut leaves = leaves.into_iter();
    fill_leaves(dst_ty, dst, &mut leaves);
}

fn flatten_leaves<'t>(ty: Type<'t>, value: &ConstantValue, out: &mut Vec<(Type<'t>, ConstantValue)>) {
    match ty.get_struct_def() {
        Some(def) if !def.packed => {
            for (field, elem) in def.fields.iter().zip(value.elements().unwrap_or(&[])) {
                flatten_leaves(field.value_type(), elem, out);
            }
        }
        _ => out.push((ty, value.clone())),
    }
}

/// Returns false once a leaf does not match, which ends the sequence.
fn fill_leaves<'t>(
    ty: Type<'t>,
    slot: &mut ConstantValue,
    leaves: &mut impl Iterator<Item = (Type<'t>, ConstantValue)>,
) -> bool {
    if let Some(def) = ty.get_struct_def().filter(|d| !d.packed) {
        let elems = match slot.elements_mut() {
            Some(e) => e,
            None => return false,
        };
        for (field, elem) in def.fields.iter().zip(elems.iter_mut()) {
            if !fill_leaves(field.value_type(), elem, leaves) {
                return false;
            }
        }
        return true;
    }
    match leaves.next() {
        Some((src_ty, value)) if src_ty.is_equivalent(ty) => {
            *slot = value;
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::INT_TYPE;

    #[test]
    fn common_initial_sequence() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let byte = comp.vector_type(crate::ty::Domain::TwoValued, false, 7, 0);
        let a = comp.struct_type(false, false, &[("x", &INT_TYPE), ("y", byte), ("z", byte)]);
        let b = comp.struct_type(false, false, &[("p", &INT_TYPE), ("q", byte), ("r", &INT_TYPE)]);
        let src = ConstantValue::Elements(vec![
            SvInt::from_i32(7).into(),
            SvInt::from_u64(8, 3, false).into(),
            SvInt::from_u64(8, 9, false).into(),
        ]);
        let mut dst = b.default_value();
        translate_common_initial_sequence(a, &src, b, &mut dst);
        assert_eq!(
            dst,
            ConstantValue::Elements(vec![
                SvInt::from_i32(7).into(),
                SvInt::from_u64(8, 3, false).into(),
                SvInt::from_i32(0).into(),
            ])
        );
    }
}
