// Copyright (c) 2016-2021 Fabian Schuiki

//! The expression syntax consumed by the binders.
//!
//! This is the parser's output as far as selections and member accesses are
//! concerned. Nodes own their children and are never modified by binding.

use crate::crate_prelude::*;
use num::BigInt;

/// An expression as it appears in the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprSyntax {
    pub span: Span,
    pub kind: ExprSyntaxKind,
}

/// The different forms of expression syntax.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprSyntaxKind {
    /// An unsized integer literal such as `42`, typed as `int`.
    IntLiteral(BigInt),
    /// A sized based literal such as `8'hff` or `4'bxx01`.
    SizedLiteral(SvInt),
    /// A string literal.
    StringLiteral(String),
    /// The unbounded literal `$`.
    Unbounded,
    /// An identifier.
    Ident(Spanned<String>),
    /// A binary operator.
    Binary {
        op: BinaryOp,
        lhs: Box<ExprSyntax>,
        rhs: Box<ExprSyntax>,
    },
    /// A concatenation `{a, b}`.
    Concat(Vec<ExprSyntax>),
    /// A streaming concatenation `{>> {a, b}}`.
    Streaming(Vec<ExprSyntax>),
    /// An element or range select `value[selector]`.
    Select {
        value: Box<ExprSyntax>,
        selector: SelectorSyntax,
    },
    /// A member access `value.name`.
    MemberAccess {
        value: Box<ExprSyntax>,
        name: Spanned<String>,
    },
    /// A call `callee(args) with (clause)`.
    Invocation {
        callee: Box<ExprSyntax>,
        args: Vec<ExprSyntax>,
        with: Option<Box<ExprSyntax>>,
    },
}

/// The selector between the brackets of a select expression.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorSyntax {
    /// A single index `[i]`.
    Bit(Box<ExprSyntax>),
    /// A range `[a:b]`, `[a+:b]`, or `[a-:b]`.
    Range {
        kind: RangeSelectionKind,
        left: Box<ExprSyntax>,
        right: Box<ExprSyntax>,
    },
}

/// The argument list of a call, borrowed from an invocation node.
#[derive(Debug, Clone, Copy)]
pub struct InvocationArgs<'s> {
    pub args: &'s [ExprSyntax],
    pub span: Span,
}

/// The form of a range select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeSelectionKind {
    /// `[left:right]`
    Simple,
    /// `[start+:width]`
    IndexedUp,
    /// `[start-:width]`
    IndexedDown,
}

/// A binary operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
}

impl ExprSyntax {
    /// Create a new syntax node.
    pub fn new(span: Span, kind: ExprSyntaxKind) -> Self {
        ExprSyntax { span, kind }
    }

    fn synth(kind: ExprSyntaxKind) -> Self {
        Self::new(INVALID_SPAN, kind)
    }

    /// Replace the span of this node.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// An unsized integer literal.
    pub fn int(value: i64) -> Self {
        Self::synth(ExprSyntaxKind::IntLiteral(value.into()))
    }

    /// A sized literal.
    pub fn sized(value: SvInt) -> Self {
        Self::synth(ExprSyntaxKind::SizedLiteral(value))
    }

    /// A string literal.
    pub fn string(value: impl Into<String>) -> Self {
        Self::synth(ExprSyntaxKind::StringLiteral(value.into()))
    }

    /// The `$` literal.
    pub fn unbounded() -> Self {
        Self::synth(ExprSyntaxKind::Unbounded)
    }

    /// An identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Self::synth(ExprSyntaxKind::Ident(Spanned::new(name.into(), INVALID_SPAN)))
    }

    /// A binary operation.
    pub fn binary(op: BinaryOp, lhs: ExprSyntax, rhs: ExprSyntax) -> Self {
        Self::synth(ExprSyntaxKind::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        })
    }

    /// A concatenation.
    pub fn concat(elems: Vec<ExprSyntax>) -> Self {
        Self::synth(ExprSyntaxKind::Concat(elems))
    }

    /// A streaming concatenation.
    pub fn streaming(elems: Vec<ExprSyntax>) -> Self {
        Self::synth(ExprSyntaxKind::Streaming(elems))
    }

    /// An element select `self[index]`.
    pub fn index(self, index: ExprSyntax) -> Self {
        Self::synth(ExprSyntaxKind::Select {
            value: Box::new(self),
            selector: SelectorSyntax::Bit(Box::new(index)),
        })
    }

    /// A range select `self[left:right]` of the given kind.
    pub fn range(self, kind: RangeSelectionKind, left: ExprSyntax, right: ExprSyntax) -> Self {
        Self::synth(ExprSyntaxKind::Select {
            value: Box::new(self),
            selector: SelectorSyntax::Range {
                kind,
                left: Box::new(left),
                right: Box::new(right),
            },
        })
    }

    /// A member access `self.name`.
    pub fn member(self, name: impl Into<String>) -> Self {
        Self::synth(ExprSyntaxKind::MemberAccess {
            value: Box::new(self),
            name: Spanned::new(name.into(), INVALID_SPAN),
        })
    }

    /// A call `self(args)`.
    pub fn call(self, args: Vec<ExprSyntax>) -> Self {
        Self::synth(ExprSyntaxKind::Invocation {
            callee: Box::new(self),
            args,
            with: None,
        })
    }

    /// A call `self(args) with (clause)`.
    pub fn call_with(self, args: Vec<ExprSyntax>, with: ExprSyntax) -> Self {
        Self::synth(ExprSyntaxKind::Invocation {
            callee: Box::new(self),
            args,
            with: Some(Box::new(with)),
        })
    }
}

impl HasSpan for ExprSyntax {
    fn span(&self) -> Span {
        self.span
    }
}

impl HasDesc for ExprSyntax {
    fn desc(&self) -> &'static str {
        match self.kind {
            ExprSyntaxKind::IntLiteral(..) | ExprSyntaxKind::SizedLiteral(..) => "integer literal",
            ExprSyntaxKind::StringLiteral(..) => "string literal",
            ExprSyntaxKind::Unbounded => "`$`",
            ExprSyntaxKind::Ident(..) => "identifier",
            ExprSyntaxKind::Binary { .. } => "binary expression",
            ExprSyntaxKind::Concat(..) => "concatenation",
            ExprSyntaxKind::Streaming(..) => "streaming concatenation",
            ExprSyntaxKind::Select { .. } => "select expression",
            ExprSyntaxKind::MemberAccess { .. } => "member access",
            ExprSyntaxKind::Invocation { .. } => "call",
        }
    }
}

impl std::fmt::Display for RangeSelectionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RangeSelectionKind::Simple => write!(f, "Simple"),
            RangeSelectionKind::IndexedUp => write!(f, "IndexedUp"),
            RangeSelectionKind::IndexedDown => write!(f, "IndexedDown"),
        }
    }
}
