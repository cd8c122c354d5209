// Copyright (c) 2016-2021 Fabian Schuiki

//! Traits shared by syntax and bound nodes.

use crate::source::{Span, Spanned};

/// A node that covers a range of the input.
pub trait HasSpan {
    /// The full span of the node.
    fn span(&self) -> Span;
}

impl<T> HasSpan for Spanned<T> {
    fn span(&self) -> Span {
        self.span
    }
}

/// A node that can describe itself in diagnostics.
pub trait HasDesc {
    /// A short description of the kind of node, e.g. `"range select"`.
    fn desc(&self) -> &'static str;

    /// A description that may include the node's name, e.g.
    /// ``"variable `x`"``. Defaults to [`HasDesc::desc`].
    fn desc_full(&self) -> String {
        self.desc().to_string()
    }
}
