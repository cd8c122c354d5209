// Copyright (c) 2016-2021 Fabian Schuiki

//! Bound expressions.
//!
//! The binders turn [`ExprSyntax`](crate::syntax::ExprSyntax) into these
//! nodes. Every node carries its resolved type, which is computed once during
//! binding. Nodes are allocated in the arena and are immutable afterwards, so
//! any number of evaluations may walk the same tree.

use crate::{
    crate_prelude::*,
    builtins::SystemMethod,
    symbol::{Symbol, SymbolKind},
    syntax::{BinaryOp, RangeSelectionKind},
};

/// A bound expression.
#[derive(Debug)]
pub struct Expr<'t> {
    pub id: NodeId,
    pub span: Span,
    pub ty: Type<'t>,
    pub kind: ExprKind<'t>,
}

/// The different forms a bound expression can take.
#[derive(Debug)]
pub enum ExprKind<'t> {
    /// An expression that failed to bind. Keeps the offending child around,
    /// if there is one, for diagnostics and dumps.
    Invalid(Option<&'t Expr<'t>>),
    /// An integer literal.
    IntLiteral(SvInt),
    /// A string literal.
    StringLiteral(String),
    /// The unbounded literal `$`.
    UnboundedLiteral,
    /// A reference to a named value.
    NamedValue(&'t Symbol<'t>),
    /// A binary arithmetic operation.
    Binary {
        op: BinaryOp,
        lhs: &'t Expr<'t>,
        rhs: &'t Expr<'t>,
    },
    /// A concatenation.
    Concat(Vec<&'t Expr<'t>>),
    /// A streaming concatenation.
    Streaming(Vec<&'t Expr<'t>>),
    /// An implicit conversion of the operand to the node's type.
    Conversion(&'t Expr<'t>),
    /// An element select `value[selector]`.
    ElementSelect(ElementSelect<'t>),
    /// A range select `value[left:right]`.
    RangeSelect(RangeSelect<'t>),
    /// A member access `value.member`.
    MemberAccess(MemberAccess<'t>),
    /// A subroutine or built-in method call.
    Call(Call<'t>),
}

/// An element select.
#[derive(Debug)]
pub struct ElementSelect<'t> {
    pub value: &'t Expr<'t>,
    pub selector: &'t Expr<'t>,
}

/// A range select.
#[derive(Debug)]
pub struct RangeSelect<'t> {
    pub selection_kind: RangeSelectionKind,
    pub value: &'t Expr<'t>,
    pub left: &'t Expr<'t>,
    pub right: &'t Expr<'t>,
}

/// An access of a field or property of an aggregate.
#[derive(Debug)]
pub struct MemberAccess<'t> {
    pub value: &'t Expr<'t>,
    pub member: &'t Symbol<'t>,
}

/// A call.
#[derive(Debug)]
pub struct Call<'t> {
    pub callee: Callee<'t>,
    /// The arguments. For method calls the first argument is the object the
    /// method was called on.
    pub args: Vec<&'t Expr<'t>>,
    /// The iterator and expression of a `with` clause.
    pub with: Option<(&'t Symbol<'t>, &'t Expr<'t>)>,
}

/// The target of a call.
#[derive(Debug, Clone, Copy)]
pub enum Callee<'t> {
    /// A user-defined task or function.
    Subroutine(&'t Symbol<'t>),
    /// A built-in method.
    System(SystemMethod),
}

impl<'t> Expr<'t> {
    /// Check whether this expression failed to bind.
    pub fn is_bad(&self) -> bool {
        self.ty.is_error()
    }

    /// Check whether this is the `$` literal.
    pub fn is_unbounded_literal(&self) -> bool {
        matches!(self.kind, ExprKind::UnboundedLiteral)
    }

    /// Return the symbol this expression refers to, if it is a named value
    /// or a member access.
    pub fn get_symbol_reference(&self) -> Option<&'t Symbol<'t>> {
        match self.kind {
            ExprKind::NamedValue(sym) => Some(sym),
            ExprKind::MemberAccess(ref ma) => Some(ma.member),
            _ => None,
        }
    }

    /// Return the symbol at the root of a chain of selections and member
    /// accesses, if there is one.
    pub fn root_symbol(&self) -> Option<&'t Symbol<'t>> {
        match self.kind {
            ExprKind::NamedValue(sym) => Some(sym),
            ExprKind::ElementSelect(ref x) => x.value.root_symbol(),
            ExprKind::RangeSelect(ref x) => x.value.root_symbol(),
            ExprKind::MemberAccess(ref x) => match x.member.kind {
                SymbolKind::ClassProperty { .. } => Some(x.member),
                _ => x.value.root_symbol(),
            },
            _ => None,
        }
    }

    /// Return the direct operand of a selection or member access.
    pub fn operand(&self) -> Option<&'t Expr<'t>> {
        match self.kind {
            ExprKind::ElementSelect(ref x) => Some(x.value),
            ExprKind::RangeSelect(ref x) => Some(x.value),
            ExprKind::MemberAccess(ref x) => Some(x.value),
            ExprKind::Conversion(x) => Some(x),
            _ => None,
        }
    }
}

impl HasSpan for Expr<'_> {
    fn span(&self) -> Span {
        self.span
    }
}

impl HasDesc for Expr<'_> {
    fn desc(&self) -> &'static str {
        match self.kind {
            ExprKind::Invalid(..) => "invalid expression",
            ExprKind::IntLiteral(..) => "integer literal",
            ExprKind::StringLiteral(..) => "string literal",
            ExprKind::UnboundedLiteral => "`$`",
            ExprKind::NamedValue(..) => "named value",
            ExprKind::Binary { .. } => "binary expression",
            ExprKind::Concat(..) => "concatenation",
            ExprKind::Streaming(..) => "streaming concatenation",
            ExprKind::Conversion(..) => "conversion",
            ExprKind::ElementSelect(..) => "element select",
            ExprKind::RangeSelect(..) => "range select",
            ExprKind::MemberAccess(..) => "member access",
            ExprKind::Call(..) => "call",
        }
    }

    fn desc_full(&self) -> String {
        match self.kind {
            ExprKind::NamedValue(sym) => sym.desc_full(),
            ExprKind::MemberAccess(ref ma) => format!("member `{}`", ma.member.name),
            _ => self.desc().into(),
        }
    }
}
