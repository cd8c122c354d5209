// Copyright (c) 2016-2021 Fabian Schuiki

//! Selection and member-access binding for SystemVerilog.
//!
//! This crate bundles the sub-crates of the project. See [`svlog`] for the
//! binder and evaluator, and [`common`] for spans and diagnostics.

// Re-export everything from the common crate.
pub extern crate sable_common as common;
pub use crate::common::*;

pub extern crate sable_svlog as svlog;
