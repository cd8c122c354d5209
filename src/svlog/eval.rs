// Copyright (c) 2016-2021 Fabian Schuiki

//! Constant evaluation of bound expressions.
//!
//! Evaluation never modifies the expression tree. All state lives in the
//! [`EvalContext`]: local variables, cached results, the extent of the queue
//! whose selector is being evaluated, and the diagnostics produced along the
//! way. A failed evaluation returns `Err(())` after a diagnostic has been
//! recorded, either by the failing node itself or by one of its operands.

use crate::{
    builtins,
    crate_prelude::*,
    expr::ExprKind,
    lvalue::LValue,
    symbol::SymbolKind,
    syntax::BinaryOp,
};
use std::{
    cell::{Ref, RefCell},
    collections::HashMap,
};

bitflags::bitflags! {
    /// Options for constant evaluation.
    pub struct EvalFlags: u32 {
        /// Remember the result of every evaluated expression until the next
        /// store.
        const CACHE_RESULTS = 1 << 0;
    }
}

/// The state of a constant evaluation.
pub struct EvalContext {
    /// The options this context was created with.
    pub flags: EvalFlags,
    queue_target: Option<usize>,
    locals: HashMap<NodeId, ConstantValue>,
    cache: HashMap<NodeId, ConstantValue>,
    diags: RefCell<Vec<DiagBuilder2>>,
}

impl Default for EvalContext {
    fn default() -> Self {
        EvalContext::new(EvalFlags::empty())
    }
}

impl EvalContext {
    /// Create a new evaluation context.
    pub fn new(flags: EvalFlags) -> Self {
        EvalContext {
            flags,
            queue_target: None,
            locals: HashMap::new(),
            cache: HashMap::new(),
            diags: Default::default(),
        }
    }

    /// Create a local variable, replacing any previous value.
    pub fn create_local(&mut self, id: NodeId, value: ConstantValue) {
        self.locals.insert(id, value);
        self.invalidate_cache();
    }

    /// Remove a local variable.
    pub fn remove_local(&mut self, id: NodeId) -> Option<ConstantValue> {
        self.invalidate_cache();
        self.locals.remove(&id)
    }

    /// Find the value of a local variable.
    pub fn find_local(&self, id: NodeId) -> Option<&ConstantValue> {
        self.locals.get(&id)
    }

    /// Find the value of a local variable for modification.
    pub fn find_local_mut(&mut self, id: NodeId) -> Option<&mut ConstantValue> {
        self.locals.get_mut(&id)
    }

    /// The number of elements in the queue whose selector is currently being
    /// evaluated.
    pub fn queue_target(&self) -> Option<usize> {
        self.queue_target
    }

    /// Evaluate `f` with the queue target set to `target`, restoring the
    /// previous target afterwards.
    pub fn with_queue_target<R>(
        &mut self,
        target: Option<usize>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = std::mem::replace(&mut self.queue_target, target);
        let result = f(self);
        self.queue_target = saved;
        result
    }

    /// Forget all cached results.
    pub fn invalidate_cache(&mut self) {
        self.cache.clear();
    }

    /// Return the diagnostics emitted so far.
    pub fn diagnostics(&self) -> Ref<Vec<DiagBuilder2>> {
        self.diags.borrow()
    }

    /// Remove and return the diagnostics emitted so far.
    pub fn take_diagnostics(&mut self) -> Vec<DiagBuilder2> {
        std::mem::take(self.diags.get_mut())
    }
}

impl DiagEmitter for EvalContext {
    fn emit(&self, diag: DiagBuilder2) {
        debug!("Evaluation {}: {}", diag.get_severity(), diag.get_message());
        self.diags.borrow_mut().push(diag);
    }
}

/// Report a constant whose shape does not match the type of the expression
/// that produced it.
pub(crate) fn shape_mismatch<T>(ctx: &EvalContext, expr: &Expr, value: &ConstantValue) -> Result<T> {
    ctx.emit(
        DiagBuilder2::bug(format!(
            "value `{}` does not match type `{}` of {}",
            value,
            expr.ty,
            expr.desc_full()
        ))
        .span(expr.span),
    );
    Err(())
}

impl<'t> Expr<'t> {
    /// Evaluate the expression as a constant.
    pub fn eval(&self, ctx: &mut EvalContext) -> Result<ConstantValue> {
        if self.is_bad() {
            return Err(());
        }
        let caching = ctx.flags.contains(EvalFlags::CACHE_RESULTS);
        if caching {
            if let Some(v) = ctx.cache.get(&self.id) {
                return Ok(v.clone());
            }
        }
        let value = self.eval_impl(ctx)?;
        trace!("Evaluated {} to {}", self.desc_full(), value);
        if caching {
            ctx.cache.insert(self.id, value.clone());
        }
        Ok(value)
    }

    fn eval_impl(&self, ctx: &mut EvalContext) -> Result<ConstantValue> {
        match self.kind {
            ExprKind::Invalid(..) => Err(()),
            ExprKind::IntLiteral(ref v) => Ok(ConstantValue::Integer(v.clone())),
            ExprKind::StringLiteral(ref v) => Ok(ConstantValue::Str(v.as_bytes().to_vec())),
            ExprKind::UnboundedLiteral => match ctx.queue_target() {
                Some(len) => Ok(ConstantValue::Integer(SvInt::from_i32(len as i32 - 1))),
                None => Ok(ConstantValue::Unset),
            },
            ExprKind::NamedValue(sym) => match sym.kind {
                SymbolKind::Parameter { ref value, .. } => Ok(value.clone()),
                SymbolKind::EnumValue { ref value, .. } => Ok(ConstantValue::Integer(value.clone())),
                _ => match ctx.find_local(sym.id) {
                    Some(v) => Ok(v.clone()),
                    None => {
                        ctx.emit(
                            DiagBuilder2::error(format!(
                                "{} cannot be used in a constant expression",
                                sym.desc_full()
                            ))
                            .code(DiagCode::ConstEvalNonConstVariable)
                            .span(self.span),
                        );
                        Err(())
                    }
                },
            },
            ExprKind::Binary { op, lhs, rhs } => {
                let l = lhs.eval(ctx)?;
                let r = rhs.eval(ctx)?;
                let (a, b) = match (l.as_integer(), r.as_integer()) {
                    (Some(a), Some(b)) => (a, b),
                    _ => return self.not_constant(ctx),
                };
                let v = match op {
                    BinaryOp::Add => a.add(b),
                    BinaryOp::Sub => a.sub(b),
                };
                Ok(ConstantValue::Integer(
                    v.resize(self.ty.bit_width()).with_sign(self.ty.is_signed()),
                ))
            }
            ExprKind::Concat(ref ops) | ExprKind::Streaming(ref ops) => {
                let values = ops
                    .iter()
                    .map(|op| op.eval(ctx))
                    .collect::<Result<Vec<_>>>()?;
                concat(self, ctx, values)
            }
            ExprKind::Conversion(inner) => {
                let v = inner.eval(ctx)?;
                Ok(convert(v, self.ty))
            }
            ExprKind::ElementSelect(ref x) => x.eval(self, ctx),
            ExprKind::RangeSelect(ref x) => x.eval(self, ctx),
            ExprKind::MemberAccess(ref x) => x.eval(self, ctx),
            ExprKind::Call(ref x) => builtins::eval_call(self, x, ctx),
        }
    }

    /// Evaluate the expression as the target of an assignment.
    pub fn eval_lvalue(&self, ctx: &mut EvalContext) -> Result<LValue> {
        if self.is_bad() {
            return Err(());
        }
        match self.kind {
            ExprKind::NamedValue(sym) => {
                if ctx.find_local(sym.id).is_some() {
                    Ok(LValue::new(sym.id))
                } else {
                    ctx.emit(
                        DiagBuilder2::error(format!(
                            "{} cannot be assigned in a constant expression",
                            sym.desc_full()
                        ))
                        .code(DiagCode::ConstEvalNonConstVariable)
                        .span(self.span),
                    );
                    Err(())
                }
            }
            ExprKind::ElementSelect(ref x) => x.eval_lvalue(self, ctx),
            ExprKind::RangeSelect(ref x) => x.eval_lvalue(self, ctx),
            ExprKind::MemberAccess(ref x) => x.eval_lvalue(self, ctx),
            _ => self.not_constant(ctx),
        }
    }

    /// Report that this expression has no constant value.
    pub(crate) fn not_constant<T>(&self, ctx: &EvalContext) -> Result<T> {
        ctx.emit(
            DiagBuilder2::error(format!(
                "{} cannot be evaluated as a constant",
                self.desc_full()
            ))
            .code(DiagCode::ConstEvalNonConstant)
            .span(self.span),
        );
        Err(())
    }
}

/// Convert a value to a type, as done by an implicit conversion.
pub(crate) fn convert(value: ConstantValue, ty: Type) -> ConstantValue {
    match value {
        ConstantValue::Integer(v) if ty.is_integral() => {
            ConstantValue::Integer(v.resize(ty.bit_width()).with_sign(ty.is_signed()))
        }
        other => other,
    }
}

fn concat(expr: &Expr, ctx: &EvalContext, values: Vec<ConstantValue>) -> Result<ConstantValue> {
    if expr.ty.is_string() {
        let mut result = Vec::new();
        for v in &values {
            match v.as_bytes() {
                Some(s) => result.extend_from_slice(s),
                None => return shape_mismatch(ctx, expr, v),
            }
        }
        return Ok(ConstantValue::Str(result));
    }
    let width = expr.ty.bit_width();
    let mut result = SvInt::zero(width, false);
    let mut msb = width as i32 - 1;
    for v in &values {
        let int = match v.as_integer() {
            Some(int) => int,
            None => return shape_mismatch(ctx, expr, v),
        };
        let lsb = msb - int.width() as i32 + 1;
        result.set_slice(msb, lsb, int);
        msb = lsb - 1;
    }
    Ok(ConstantValue::Integer(result))
}
