// Copyright (c) 2016-2021 Fabian Schuiki

//! Element and range selects.
//!
//! This module binds `value[index]` and `value[left:right]` against every
//! kind of container, and evaluates the resulting nodes both as values and
//! as assignment targets. Fixed-range containers (packed types and fixed-size
//! unpacked arrays) are checked against their declared range at bind time
//! whenever the selector is constant. Dynamic containers can only be checked
//! during evaluation, where out-of-bounds accesses produce warnings rather
//! than errors.

use crate::{
    binder,
    crate_prelude::*,
    eval::{shape_mismatch, EvalContext},
    expr::{ElementSelect, RangeSelect},
    lvalue::LValue,
    range::ConstantRange,
    symbol::{NetExpansion, SymbolKind},
    syntax::{ExprSyntax, RangeSelectionKind},
    ty::{Domain, Sign, BYTE_TYPE, LOGIC_TYPE, BIT_TYPE},
    value::MapKey,
};

/// Determine the type of a single element selected from `value_ty`.
fn indexed_type<'t>(
    cx: &BindContext<'_, 't>,
    value_ty: Type<'t>,
    selector_span: Span,
    value_span: Span,
    is_range_select: bool,
) -> Type<'t> {
    if let Some(elem) = value_ty.get_array_element_type() {
        if !value_ty.is_integral() || !elem.is_scalar() {
            return elem;
        }
    }
    if value_ty.is_string() && !is_range_select {
        &BYTE_TYPE
    } else if !value_ty.is_integral() {
        if !value_ty.is_error() {
            cx.emit(
                DiagBuilder2::error(format!("value of type `{}` cannot be indexed", value_ty))
                    .code(DiagCode::BadIndexExpression)
                    .span(selector_span)
                    .add_note("Indexed value here:")
                    .span(value_span),
            );
        }
        &ERROR_TYPE
    } else if value_ty.is_scalar() {
        cx.emit(
            DiagBuilder2::error("scalar value cannot be indexed")
                .code(DiagCode::CannotIndexScalar)
                .span(selector_span)
                .add_note("Indexed value here:")
                .span(value_span),
        );
        &ERROR_TYPE
    } else if value_ty.is_four_state() {
        &LOGIC_TYPE
    } else {
        &BIT_TYPE
    }
}

/// Complain about selects of nets declared `vectored`.
fn check_vectored_select(cx: &BindContext, value: &Expr, span: Span) {
    if let ExprKind::NamedValue(sym) = value.kind {
        if let SymbolKind::Net {
            expansion: NetExpansion::Vectored,
            ..
        } = sym.kind
        {
            cx.emit(
                DiagBuilder2::error(format!("cannot select from vectored {}", sym.desc_full()))
                    .code(DiagCode::SelectOfVectoredNet)
                    .span(span)
                    .add_note("Declared here:")
                    .span(sym.span),
            );
        }
    }
}

/// Flags for binding the selector of `value_ty`. Only queue selectors may
/// refer to `$`.
fn selector_context<'a, 't>(cx: &BindContext<'a, 't>, value_ty: Type<'t>) -> BindContext<'a, 't> {
    let unbounded =
        BindFlags::ALLOW_UNBOUNDED_LITERAL | BindFlags::ALLOW_UNBOUNDED_LITERAL_ARITHMETIC;
    let cx = cx.without_flags(unbounded);
    if value_ty.is_queue() {
        cx.with_flags(unbounded)
    } else {
        cx
    }
}

/// Convert a selector value to a map key.
fn map_key(value: ConstantValue) -> Option<MapKey> {
    match value {
        ConstantValue::Integer(v) => Some(MapKey::Int(v)),
        ConstantValue::Str(v) => Some(MapKey::Str(v)),
        _ => None,
    }
}

/// Bind an element select `value[syntax]`.
pub fn bind_element_select<'t>(
    cx: &BindContext<'_, 't>,
    value: &'t Expr<'t>,
    syntax: &ExprSyntax,
    full_span: Span,
) -> &'t Expr<'t> {
    if value.is_bad() {
        return cx.bad_expr(full_span, None);
    }
    check_vectored_select(cx, value, full_span);

    let value_ty = value.ty;
    let result_ty = indexed_type(cx, value_ty, syntax.span, value.span, false);

    // Associative arrays with a specific index type convert the selector to
    // that type.
    let selector = match value_ty.get_associative_index_type() {
        Some(index_ty) => binder::bind_rvalue(cx, index_ty, syntax),
        None => {
            let selector = binder::self_determined(&selector_context(cx, value_ty), syntax);
            if !selector.ty.is_unbounded() && !cx.require_integral(selector) {
                return cx.bad_expr(full_span, None);
            }
            selector
        }
    };

    let result = cx.alloc(
        full_span,
        result_ty,
        ExprKind::ElementSelect(ElementSelect { value, selector }),
    );
    if selector.is_bad() || result.is_bad() {
        return cx.bad_expr(full_span, Some(result));
    }

    // Constant selectors into fixed ranges can be checked right away, unless
    // the code is never going to run.
    if value_ty.has_fixed_range() {
        if !cx.in_unevaluated_branch() {
            if let Some(sel) = cx.try_eval(selector) {
                let range = value_ty.get_fixed_range();
                let index = sel.as_integer().and_then(|v| v.as_i32());
                if !index.map(|i| range.contains_point(i)).unwrap_or(false) {
                    cx.emit(
                        DiagBuilder2::error(format!(
                            "index {} is out of bounds for type `{}`",
                            sel, value_ty
                        ))
                        .code(DiagCode::IndexValueInvalid)
                        .span(selector.span),
                    );
                    return cx.bad_expr(full_span, Some(result));
                }
            }
        }
    } else if !cx.is_procedural() {
        cx.emit(
            DiagBuilder2::error(format!(
                "dynamic type `{}` cannot be selected outside of procedural code",
                value_ty
            ))
            .code(DiagCode::DynamicNotProcedural)
            .span(full_span),
        );
        return cx.bad_expr(full_span, Some(result));
    }

    result
}

/// The evaluated position of an element select.
enum SelectIndex {
    /// The physical range within the container. For packed types this is a
    /// bit range, for everything else a single element position, with -1
    /// marking an out-of-bounds dynamic index.
    Range(ConstantRange),
    /// The key of an associative array entry.
    Key(MapKey),
}

impl<'t> ElementSelect<'t> {
    /// Create an element select of a constant index, without any checks.
    pub fn from_constant(cx: &BindContext<'_, 't>, value: &'t Expr<'t>, index: i32) -> &'t Expr<'t> {
        let selector = cx.alloc(
            value.span,
            &crate::ty::INT_TYPE,
            ExprKind::IntLiteral(SvInt::from_i32(index)),
        );
        let result_ty = indexed_type(cx, value.ty, selector.span, value.span, false);
        let result = cx.alloc(
            value.span,
            result_ty,
            ExprKind::ElementSelect(ElementSelect { value, selector }),
        );
        if value.is_bad() || result.is_bad() {
            return cx.bad_expr(value.span, Some(result));
        }
        result
    }

    /// Check whether the selector is constant and the container has a fixed
    /// range.
    pub fn is_constant_select(&self, ctx: &mut EvalContext) -> bool {
        self.value.ty.has_fixed_range() && self.selector.eval(ctx).is_ok()
    }

    fn eval_index(
        &self,
        expr: &Expr<'t>,
        ctx: &mut EvalContext,
        value: &ConstantValue,
    ) -> Result<SelectIndex> {
        let selector = self.selector;
        let sel = if value.is_queue() {
            ctx.with_queue_target(Some(value.size()), |ctx| selector.eval(ctx))?
        } else {
            selector.eval(ctx)?
        };

        let value_ty = self.value.ty;
        if value_ty.has_fixed_range() {
            let range = value_ty.get_fixed_range();
            let index = sel
                .as_integer()
                .and_then(|v| v.as_i32())
                .filter(|&i| range.contains_point(i));
            let index = match index {
                Some(i) => i,
                None => {
                    ctx.emit(
                        DiagBuilder2::error(format!(
                            "index {} is out of bounds for type `{}`",
                            sel, value_ty
                        ))
                        .code(DiagCode::ConstEvalArrayIndexInvalid)
                        .span(expr.span),
                    );
                    return Err(());
                }
            };

            // Unpacked arrays store their elements in declaration order, i.e.
            // reversed with respect to the bit numbering.
            if value_ty.is_unpacked_array() {
                let i = range.reverse().translate_index(index);
                return Ok(SelectIndex::Range(ConstantRange::new(i, i)));
            }

            // Packed elements may span multiple bits.
            let width = expr.ty.bit_width() as i32;
            let i = range.translate_index(index) * width;
            return Ok(SelectIndex::Range(ConstantRange::new(i + width - 1, i)));
        }

        if value_ty.is_associative_array() {
            if sel.has_unknown() {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "associative array index {} has unknown bits",
                        sel
                    ))
                    .code(DiagCode::ConstEvalAssociativeIndexInvalid)
                    .span(selector.span),
                );
                return Err(());
            }
            return match map_key(sel) {
                Some(key) => Ok(SelectIndex::Key(key)),
                None => shape_mismatch(ctx, selector, &ConstantValue::Unset),
            };
        }

        let index = match sel.as_integer().and_then(|v| v.as_i32()) {
            Some(i) => i,
            None => {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "index {} is invalid for type `{}`",
                        sel, value_ty
                    ))
                    .code(DiagCode::ConstEvalArrayIndexInvalid)
                    .span(expr.span),
                );
                return Err(());
            }
        };

        // Without a value there is no size to check against. Only negative
        // indices are known to be wrong.
        if value.is_unset() {
            if index < 0 {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "index {} is out of bounds for type `{}`",
                        index, value_ty
                    ))
                    .code(DiagCode::ConstEvalDynamicArrayIndex)
                    .span(expr.span),
                );
                return Err(());
            }
            return Ok(SelectIndex::Range(ConstantRange::new(index, index)));
        }

        if value_ty.is_string() {
            let len = value.size();
            if index < 0 || index as usize >= len {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "index {} is out of bounds for string of length {}",
                        index, len
                    ))
                    .code(DiagCode::ConstEvalStringIndexInvalid)
                    .span(expr.span),
                );
                return Err(());
            }
            return Ok(SelectIndex::Range(ConstantRange::new(index, index)));
        }

        // A queue may be indexed one past its end, which appends on write.
        let mut max_index = value.size();
        if value.is_queue() {
            max_index += 1;
        }
        if index < 0 || index as usize >= max_index {
            ctx.emit(
                DiagBuilder2::warning(format!(
                    "index {} is out of bounds for `{}` of size {}",
                    index, value_ty, max_index
                ))
                .code(DiagCode::ConstEvalDynamicArrayIndex)
                .span(expr.span),
            );
            return Ok(SelectIndex::Range(ConstantRange::new(-1, -1)));
        }
        Ok(SelectIndex::Range(ConstantRange::new(index, index)))
    }

    /// Evaluate the select.
    pub fn eval(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<ConstantValue> {
        let cv = self.value.eval(ctx)?;
        let index = self.eval_index(expr, ctx, &cv)?;
        let value_ty = self.value.ty;

        let range = match index {
            SelectIndex::Key(key) => {
                let map = match cv.as_map() {
                    Some(m) => m,
                    None => return shape_mismatch(ctx, self.value, &cv),
                };
                if let Some(v) = map.get(&key) {
                    return Ok(v.clone());
                }
                if let Some(v) = &map.default {
                    return Ok(v.clone());
                }
                ctx.emit(
                    DiagBuilder2::warning(format!(
                        "element {} does not exist in associative array",
                        key
                    ))
                    .code(DiagCode::ConstEvalAssociativeElementNotFound)
                    .span(self.selector.span)
                    .add_note("Array here:")
                    .span(self.value.span),
                );
                return Ok(expr.ty.default_value());
            }
            SelectIndex::Range(r) => r,
        };

        // Fixed ranges have been checked for bounds already.
        if value_ty.has_fixed_range() {
            let result = if value_ty.is_unpacked_array() {
                cv.elements().and_then(|e| e.get(range.left as usize)).cloned()
            } else {
                cv.as_integer()
                    .map(|v| ConstantValue::Integer(v.slice(range.left, range.right)))
            };
            return match result {
                Some(v) => Ok(v),
                None => shape_mismatch(ctx, self.value, &cv),
            };
        }

        // Strings, dynamic arrays, and queues.
        if value_ty.is_string() {
            return match cv.as_bytes() {
                Some(s) => {
                    let ch = s[range.left as usize];
                    Ok(ConstantValue::Integer(SvInt::from_u64(8, ch as u64, true)))
                }
                None => shape_mismatch(ctx, self.value, &cv),
            };
        }
        if range.left == -1 {
            return Ok(expr.ty.default_value());
        }
        Ok(cv
            .elements()
            .and_then(|e| e.get(range.left as usize))
            .cloned()
            .unwrap_or_else(|| expr.ty.default_value()))
    }

    /// Evaluate the select as an assignment target.
    pub fn eval_lvalue(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<LValue> {
        let mut lval = self.value.eval_lvalue(ctx)?;
        let value_ty = self.value.ty;
        let loaded = if value_ty.has_fixed_range() {
            ConstantValue::Unset
        } else {
            lval.load(ctx)
        };

        match self.eval_index(expr, ctx, &loaded)? {
            SelectIndex::Key(key) => lval.add_array_lookup(key, expr.ty.default_value()),
            SelectIndex::Range(range) => {
                if value_ty.has_fixed_range() {
                    if value_ty.is_unpacked_array() {
                        lval.add_index(range.left as i64, expr.ty.default_value());
                    } else {
                        lval.add_bit_slice(range);
                    }
                } else if value_ty.is_string() {
                    lval.add_index(range.left as i64, ConstantValue::Unset);
                } else {
                    lval.add_index(range.left as i64, expr.ty.default_value());
                }
            }
        }
        Ok(lval)
    }
}

/// Bind a range select `value[left:right]`, `value[left+:right]`, or
/// `value[left-:right]`.
pub fn bind_range_select<'t>(
    cx: &BindContext<'_, 't>,
    value: &'t Expr<'t>,
    selection_kind: RangeSelectionKind,
    left_syntax: &ExprSyntax,
    right_syntax: &ExprSyntax,
    full_span: Span,
) -> &'t Expr<'t> {
    if !value.is_bad() && value.ty.is_associative_array() {
        cx.emit(
            DiagBuilder2::error("associative arrays cannot be range-selected")
                .code(DiagCode::RangeSelectAssociative)
                .span(full_span),
        );
        return cx.bad_expr(full_span, None);
    }

    let value_ty = value.ty;
    let is_queue = value_ty.is_queue();
    let sel_cx = selector_context(cx, value_ty);
    let left = binder::bind_expr(&sel_cx, left_syntax);
    let right = binder::bind_expr(&sel_cx, right_syntax);

    let bad = |child| cx.bad_expr(full_span, child);
    let kind = || {
        ExprKind::RangeSelect(RangeSelect {
            selection_kind,
            value,
            left,
            right,
        })
    };

    if value.is_bad() || left.is_bad() || right.is_bad() {
        return bad(Some(cx.alloc(full_span, &ERROR_TYPE, kind())));
    }
    if (!left.ty.is_unbounded() && !cx.require_integral(left))
        || (!right.ty.is_unbounded() && !cx.require_integral(right))
    {
        return bad(Some(cx.alloc(full_span, &ERROR_TYPE, kind())));
    }

    let selector_span = Span::union(left_syntax.span, right_syntax.span);
    let elem_ty = indexed_type(cx, value_ty, selector_span, value.span, true);
    if elem_ty.is_error() {
        return bad(Some(cx.alloc(full_span, &ERROR_TYPE, kind())));
    }

    check_vectored_select(cx, value, full_span);

    if !value_ty.has_fixed_range() && !cx.is_procedural() {
        cx.emit(
            DiagBuilder2::error(format!(
                "dynamic type `{}` cannot be selected outside of procedural code",
                value_ty
            ))
            .code(DiagCode::DynamicNotProcedural)
            .span(full_span),
        );
        return bad(Some(cx.alloc(full_span, &ERROR_TYPE, kind())));
    }

    // Queue slices are queues themselves, regardless of the bounds.
    if is_queue {
        let ty = cx.comp.queue_type(elem_ty, 0);
        return cx.alloc(full_span, ty, kind());
    }

    let result_ty = match range_select_type(cx, value_ty, elem_ty, selection_kind, left, right) {
        Some(ty) => ty,
        None => return bad(Some(cx.alloc(full_span, &ERROR_TYPE, kind()))),
    };
    cx.alloc(full_span, result_ty, kind())
}

/// Validate the bounds of a range select and determine its type.
fn range_select_type<'t>(
    cx: &BindContext<'_, 't>,
    value_ty: Type<'t>,
    elem_ty: Type<'t>,
    selection_kind: RangeSelectionKind,
    left: &'t Expr<'t>,
    right: &'t Expr<'t>,
) -> Option<Type<'t>> {
    // The right-hand side must always be a constant.
    let rv = cx.eval_integer(right)?;
    let error_span = Span::union(left.span, right.span);

    if !value_ty.has_fixed_range() {
        // Dynamic arrays only permit ascending `[lo:hi]` selections.
        let selection = match selection_kind {
            RangeSelectionKind::Simple => {
                let lv = cx.eval_integer(left)?;
                let selection = ConstantRange::new(lv, rv);
                if !selection.is_little_endian() && selection.width() > 1 {
                    cx.emit(
                        DiagBuilder2::error(format!(
                            "descending range {} cannot select from dynamic type `{}`",
                            selection, value_ty
                        ))
                        .code(DiagCode::SelectEndianDynamic)
                        .span(error_span),
                    );
                    return None;
                }
                selection
            }
            _ => {
                let width = cx.require_positive(Some(rv), right.span)?;
                ConstantRange::new(0, width - 1)
            }
        };
        return Some(cx.comp.intern_type(TypeKind::UnpackedArray {
            elem: elem_ty,
            range: selection,
        }));
    }

    let value_range = value_ty.get_fixed_range();
    let validate = |range: ConstantRange| {
        if value_range.contains_point(range.left) && value_range.contains_point(range.right) {
            return true;
        }
        cx.emit(
            DiagBuilder2::error(format!(
                "range {} is out of bounds for type `{}`",
                range, value_ty
            ))
            .code(DiagCode::BadRangeExpression)
            .span(error_span),
        );
        false
    };

    let selection = match selection_kind {
        RangeSelectionKind::Simple => {
            let lv = cx.eval_integer(left)?;
            let selection = ConstantRange::new(lv, rv);
            if selection.is_little_endian() != value_range.is_little_endian()
                && selection.width() > 1
            {
                cx.emit(
                    DiagBuilder2::error(format!(
                        "range {} is oriented opposite to type `{}`",
                        selection, value_ty
                    ))
                    .code(DiagCode::SelectEndianMismatch)
                    .span(error_span),
                );
                return None;
            }
            if !cx.in_unevaluated_branch() && !validate(selection) {
                return None;
            }
            selection
        }
        _ => {
            let width = cx.require_positive(Some(rv), right.span)?;
            if width as u32 > value_range.width() {
                cx.emit(
                    DiagBuilder2::error(format!(
                        "select width {} is larger than type `{}`",
                        width, value_ty
                    ))
                    .code(DiagCode::RangeWidthTooLarge)
                    .span(right.span),
                );
                return None;
            }
            let up = selection_kind == RangeSelectionKind::IndexedUp;
            let start = if cx.in_unevaluated_branch() {
                None
            } else {
                cx.try_eval(left)
            };
            match start {
                Some(start) => {
                    let index = match start.as_integer().and_then(|v| v.as_i32()) {
                        Some(i) => i,
                        None => {
                            cx.emit(
                                DiagBuilder2::error(format!(
                                    "index {} is invalid for type `{}`",
                                    start, value_ty
                                ))
                                .code(DiagCode::IndexValueInvalid)
                                .span(left.span),
                            );
                            return None;
                        }
                    };
                    let selection = ConstantRange::get_indexed_range(
                        index,
                        width,
                        value_range.is_little_endian(),
                        up,
                    );
                    if !validate(selection) {
                        return None;
                    }
                    selection
                }
                // The start is not known until runtime, so anchor the type at
                // the edge of the container the selection grows away from.
                None => {
                    let start = if up {
                        value_range.lower()
                    } else {
                        value_range.upper()
                    };
                    ConstantRange::get_indexed_range(
                        start,
                        width,
                        value_range.is_little_endian(),
                        up,
                    )
                }
            }
        }
    };

    Some(slice_type(cx, value_ty, elem_ty, selection))
}

/// The type of a slice `selection` of the fixed-range `value_ty`.
fn slice_type<'t>(
    cx: &BindContext<'_, 't>,
    value_ty: Type<'t>,
    elem_ty: Type<'t>,
    selection: ConstantRange,
) -> Type<'t> {
    if value_ty.is_unpacked_array() {
        cx.comp.intern_type(TypeKind::UnpackedArray {
            elem: elem_ty,
            range: selection,
        })
    } else if elem_ty.is_scalar() {
        cx.comp.intern_type(TypeKind::BitVector {
            domain: if elem_ty.is_four_state() {
                Domain::FourValued
            } else {
                Domain::TwoValued
            },
            sign: Sign::Unsigned,
            range: selection,
            dubbed: false,
        })
    } else {
        cx.comp.intern_type(TypeKind::PackedArray {
            elem: elem_ty,
            range: selection,
        })
    }
}

impl<'t> RangeSelect<'t> {
    /// Create a simple range select of a constant range, without any checks.
    ///
    /// The value must have a fixed range oriented the same way as `range`.
    pub fn from_constant(
        cx: &BindContext<'_, 't>,
        value: &'t Expr<'t>,
        range: ConstantRange,
    ) -> &'t Expr<'t> {
        let literal = |v| {
            cx.alloc(
                value.span,
                &crate::ty::INT_TYPE,
                ExprKind::IntLiteral(SvInt::from_i32(v)),
            )
        };
        let left = literal(range.left);
        let right = literal(range.right);
        let kind = ExprKind::RangeSelect(RangeSelect {
            selection_kind: RangeSelectionKind::Simple,
            value,
            left,
            right,
        });
        if value.is_bad() {
            return cx.bad_expr(value.span, Some(cx.alloc(value.span, &ERROR_TYPE, kind)));
        }
        let elem_ty = indexed_type(cx, value.ty, value.span, value.span, true);
        if elem_ty.is_error() {
            return cx.bad_expr(value.span, Some(cx.alloc(value.span, &ERROR_TYPE, kind)));
        }
        assert!(
            value.ty.has_fixed_range(),
            "constant range select of `{}` without fixed range",
            value.ty
        );
        assert_eq!(
            range.is_little_endian(),
            value.ty.get_fixed_range().is_little_endian(),
            "constant range select oriented opposite to `{}`",
            value.ty
        );
        let ty = slice_type(cx, value.ty, elem_ty, range);
        cx.alloc(value.span, ty, kind)
    }

    /// Check whether both bounds are constant and the container has a fixed
    /// range.
    pub fn is_constant_select(&self, ctx: &mut EvalContext) -> bool {
        self.value.ty.has_fixed_range() && self.left.eval(ctx).is_ok() && self.right.eval(ctx).is_ok()
    }

    /// Evaluate the bounds to a physical range within `value`.
    fn eval_range(
        &self,
        expr: &Expr<'t>,
        ctx: &mut EvalContext,
        value: &ConstantValue,
    ) -> Result<ConstantRange> {
        let (left, right) = (self.left, self.right);
        let eval_bounds = |ctx: &mut EvalContext| (left.eval(ctx), right.eval(ctx));
        let (cl, cr) = if value.is_queue() {
            ctx.with_queue_target(Some(value.size()), eval_bounds)
        } else {
            eval_bounds(ctx)
        };
        let (cl, cr) = (cl?, cr?);
        let up = self.selection_kind == RangeSelectionKind::IndexedUp;

        let value_ty = self.value.ty;
        let as_index = |ctx: &EvalContext, v: &ConstantValue| match v
            .as_integer()
            .and_then(|i| i.as_i32())
        {
            Some(i) => Ok(i),
            None => {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "index {} is invalid for type `{}`",
                        v, value_ty
                    ))
                    .code(DiagCode::ConstEvalArrayIndexInvalid)
                    .span(expr.span),
                );
                Err(())
            }
        };

        if value_ty.has_fixed_range() {
            let mut value_range = value_ty.get_fixed_range();
            let mut result = match self.selection_kind {
                RangeSelectionKind::Simple => expr.ty.get_fixed_range(),
                _ => ConstantRange::get_indexed_range(
                    as_index(ctx, &cl)?,
                    as_index(ctx, &cr)?,
                    value_range.is_little_endian(),
                    up,
                ),
            };
            if !value_range.contains_point(result.left) || !value_range.contains_point(result.right)
            {
                ctx.emit(
                    DiagBuilder2::error(format!(
                        "range {} is out of bounds for type `{}`",
                        result, value_ty
                    ))
                    .code(DiagCode::ConstEvalPartSelectInvalid)
                    .span(expr.span),
                );
                return Err(());
            }

            if !value_ty.is_packed_array() {
                if value_ty.is_unpacked_array() {
                    value_range = value_range.reverse();
                }
                result.left = value_range.translate_index(result.left);
                result.right = value_range.translate_index(result.right);
                return Ok(result);
            }

            // Packed array elements may span multiple bits.
            let width = value_ty
                .get_array_element_type()
                .map(|e| e.bit_width() as i32)
                .unwrap_or(1);
            result.left = value_range.translate_index(result.left) * width + width - 1;
            result.right = value_range.translate_index(result.right) * width;
            return Ok(result);
        }

        let l = as_index(ctx, &cl)?;
        let r = as_index(ctx, &cr)?;
        let result = match self.selection_kind {
            RangeSelectionKind::Simple => ConstantRange::new(l, r),
            _ => ConstantRange::get_indexed_range(l, r, true, up),
        };

        // A reversed queue range selects nothing and is reported on its own.
        if value_ty.is_queue() && !result.is_little_endian() && result.left != result.right {
            return Ok(result);
        }

        // Out-of-bounds ranges of dynamic containers read as default values,
        // so they only warrant a warning.
        if !value.is_unset() {
            let size = value.size();
            if result.lower() < 0 || result.upper() as i64 >= size as i64 {
                ctx.emit(
                    DiagBuilder2::warning(format!(
                        "range {} is out of bounds for `{}` of size {}",
                        result, value_ty, size
                    ))
                    .code(DiagCode::ConstEvalDynamicArrayRange)
                    .span(expr.span),
                );
            }
        } else if result.lower() < 0 {
            ctx.emit(
                DiagBuilder2::error(format!(
                    "range {} is out of bounds for type `{}`",
                    result, value_ty
                ))
                .code(DiagCode::ConstEvalDynamicArrayRange)
                .span(expr.span),
            );
            return Err(());
        }
        Ok(result)
    }

    /// Evaluate the select.
    pub fn eval(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<ConstantValue> {
        let cv = self.value.eval(ctx)?;
        let range = self.eval_range(expr, ctx, &cv)?;
        let value_ty = self.value.ty;

        if value_ty.has_fixed_range() {
            return match cv {
                ConstantValue::Integer(ref v) => {
                    Ok(ConstantValue::Integer(v.slice(range.upper(), range.lower())))
                }
                ConstantValue::Elements(..) => Ok(cv.get_slice(
                    range.upper() as i64,
                    range.lower() as i64,
                    &ConstantValue::Unset,
                )),
                _ => shape_mismatch(ctx, self.value, &cv),
            };
        }

        // Queue selections were not checked for orientation at bind time.
        if value_ty.is_queue() && !range.is_little_endian() && range.left != range.right {
            ctx.emit(
                DiagBuilder2::warning(format!(
                    "queue range {} is reversed; the result is empty",
                    range
                ))
                .code(DiagCode::ConstEvalQueueRange)
                .span(expr.span),
            );
            return Ok(value_ty.default_value());
        }

        let elem_default = expr
            .ty
            .get_array_element_type()
            .map(|e| e.default_value())
            .unwrap_or(ConstantValue::Unset);
        Ok(cv.get_slice(range.upper() as i64, range.lower() as i64, &elem_default))
    }

    /// Evaluate the select as an assignment target.
    pub fn eval_lvalue(&self, expr: &Expr<'t>, ctx: &mut EvalContext) -> Result<LValue> {
        let mut lval = self.value.eval_lvalue(ctx)?;
        let value_ty = self.value.ty;
        let loaded = if value_ty.has_fixed_range() {
            ConstantValue::Unset
        } else {
            lval.load(ctx)
        };

        let range = self.eval_range(expr, ctx, &loaded)?;
        if value_ty.has_fixed_range() {
            if value_ty.is_integral() {
                lval.add_bit_slice(range);
            } else {
                lval.add_array_slice(range, ConstantValue::Unset);
            }
        } else {
            let elem_default = expr
                .ty
                .get_array_element_type()
                .map(|e| e.default_value())
                .unwrap_or(ConstantValue::Unset);
            lval.add_array_slice(range, elem_default);
        }
        Ok(lval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::INT_TYPE;

    #[test]
    fn indexed_types() {
        let arena = GlobalArenas::default();
        let comp = Compilation::new(&arena);
        let cx = comp.bind_context();
        let logic8 = comp.vector_type(Domain::FourValued, false, 7, 0);
        let t = indexed_type(&cx, logic8, INVALID_SPAN, INVALID_SPAN, false);
        assert!(t.is_scalar() && t.is_four_state());
        let t = indexed_type(&cx, &INT_TYPE, INVALID_SPAN, INVALID_SPAN, false);
        assert!(t.is_scalar() && !t.is_four_state());
        let t = indexed_type(&cx, &crate::ty::STRING_TYPE, INVALID_SPAN, INVALID_SPAN, false);
        assert_eq!(t.bit_width(), 8);
        let arr = comp.unpacked_array_type(&INT_TYPE, 0, 3);
        let t = indexed_type(&cx, arr, INVALID_SPAN, INVALID_SPAN, false);
        assert!(t.is_equivalent(&INT_TYPE));
        assert!(comp.diagnostics().is_empty());

        let t = indexed_type(&cx, &LOGIC_TYPE, INVALID_SPAN, INVALID_SPAN, false);
        assert!(t.is_error());
        assert_eq!(
            comp.diagnostics()[0].get_code(),
            Some(DiagCode::CannotIndexScalar)
        );
        let t = indexed_type(&cx, &crate::ty::STRING_TYPE, INVALID_SPAN, INVALID_SPAN, true);
        assert!(t.is_error());
        assert_eq!(
            comp.diagnostics()[1].get_code(),
            Some(DiagCode::BadIndexExpression)
        );
    }
}
