// Copyright (c) 2016-2021 Fabian Schuiki

//! Source locations.
//!
//! Files handed to the binder are identified by a [`Source`] number. A
//! [`Span`] is a half-open byte range `[begin,end)` within one source. Syntax
//! nodes carry spans, which bound expressions inherit and diagnostics point
//! at. Synthesized nodes use [`INVALID_SPAN`].

use std::fmt;
use std::hash::{Hash, Hasher};

/// The source of nodes that do not come from any file.
pub const INVALID_SOURCE: Source = Source(0);

/// The span of nodes that do not come from any file.
pub const INVALID_SPAN: Span = Span {
    source: INVALID_SOURCE,
    begin: 0,
    end: 0,
};

/// An opaque source file identifier. Zero is reserved for synthesized nodes.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub struct Source(pub u32);

impl Source {
    /// Check whether this refers to an actual source file.
    pub fn is_valid(self) -> bool {
        self != INVALID_SOURCE
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.is_valid() {
            true => write!(f, "Source({})", self.0),
            false => write!(f, "Source(-)"),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.is_valid() {
            true => write!(f, "<source {}>", self.0),
            false => write!(f, "<synthesized>"),
        }
    }
}

/// A byte range within a source file.
#[derive(Clone, Copy, PartialOrd, Ord, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Span {
    pub source: Source,
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(source: Source, begin: usize, end: usize) -> Span {
        Span { source, begin, end }
    }

    /// The smallest span covering both `a` and `b`.
    ///
    /// Spans in different sources cannot be merged; the result is `a` then.
    pub fn union(a: Span, b: Span) -> Span {
        if a.source != b.source {
            return a;
        }
        Span {
            source: a.source,
            begin: a.begin.min(b.begin),
            end: a.end.max(b.end),
        }
    }

    /// The number of bytes covered.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:?}[{}..{}]", self.source, self.begin, self.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}-{}", self.source, self.begin, self.end)
    }
}

/// A value together with the span it was parsed from.
///
/// Equality and hashing only consider the value.
#[derive(Clone, Copy)]
pub struct Spanned<T> {
    pub value: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(value: T, span: Span) -> Spanned<T> {
        Spanned { value, span }
    }

    /// Transform the value and keep the span.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Spanned<U> {
        Spanned::new(f(self.value), self.span)
    }
}

impl<T: PartialEq> PartialEq for Spanned<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: Eq> Eq for Spanned<T> {}

impl<T: Hash> Hash for Spanned<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state)
    }
}

impl<T: fmt::Debug> fmt::Debug for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.value.fmt(f)
    }
}

impl<T: fmt::Display> fmt::Display for Spanned<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.value.fmt(f)
    }
}
