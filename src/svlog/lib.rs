// Copyright (c) 2016-2021 Fabian Schuiki

//! Selection and member-access binding for SystemVerilog.
//!
//! This crate binds element selects `a[i]`, range selects `a[l:r]`,
//! `a[s+:w]`, and `a[s-:w]`, and member accesses `a.b` to typed expression
//! nodes, and evaluates those nodes as constants and as assignment targets.
//!
//! The entry point is a [`Compilation`], which owns the arenas everything is
//! allocated in. Expressions are bound from [`syntax::ExprSyntax`] through a
//! [`BindContext`], and evaluated with an [`eval::EvalContext`].

#[macro_use]
extern crate log;

pub mod assign;
pub mod binder;
pub mod builtins;
pub mod context;
pub mod eval;
pub mod expr;
pub mod lvalue;
pub mod member;
pub mod range;
pub mod select;
pub mod serialize;
pub mod svint;
pub mod symbol;
pub mod syntax;
pub mod ty;
pub mod value;

pub use crate::{
    context::{BindContext, BindFlags, Compilation, GlobalArenas},
    expr::{Expr, ExprKind},
    range::ConstantRange,
    svint::SvInt,
    ty::{Type, TypeKind},
    value::ConstantValue,
};

/// Items used throughout the crate.
mod crate_prelude {
    pub use crate::{
        context::{BindContext, BindFlags, Compilation, GlobalArenas},
        expr::{Expr, ExprKind},
        svint::SvInt,
        ty::{Type, TypeKind, ERROR_TYPE},
        value::ConstantValue,
    };
    pub use sable_common::{
        errors::*,
        source::*,
        util::{HasDesc, HasSpan},
        NodeId,
    };

    /// The result of an operation that reports its errors as diagnostics.
    pub type Result<T> = std::result::Result<T, ()>;
}
