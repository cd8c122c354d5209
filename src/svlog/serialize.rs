// Copyright (c) 2016-2021 Fabian Schuiki

//! Debug dumps of bound expressions.
//!
//! The [`AstSerializer`] turns an expression tree into a [`DumpValue`], a
//! small self-describing tree that can be rendered with any serde format.
//! Object fields keep the order in which the serializer emits them.

use crate::{crate_prelude::*, expr::Callee};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A node of a debug dump.
#[derive(Debug, Clone, PartialEq)]
pub enum DumpValue {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<DumpValue>),
    Object(Vec<(&'static str, DumpValue)>),
}

impl DumpValue {
    /// Look up a field of an object.
    pub fn get(&self, key: &str) -> Option<&DumpValue> {
        match self {
            DumpValue::Object(fields) => fields.iter().find(|(k, _)| *k == key).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Return the string contained in this value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DumpValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for DumpValue {
    fn from(s: &str) -> Self {
        DumpValue::Str(s.to_string())
    }
}

impl From<String> for DumpValue {
    fn from(s: String) -> Self {
        DumpValue::Str(s)
    }
}

impl Serialize for DumpValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            DumpValue::Null => serializer.serialize_unit(),
            DumpValue::Bool(v) => serializer.serialize_bool(*v),
            DumpValue::Int(v) => serializer.serialize_i64(*v),
            DumpValue::Str(v) => serializer.serialize_str(v),
            DumpValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            DumpValue::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// Produces debug dumps of expressions.
#[derive(Debug, Default, Clone, Copy)]
pub struct AstSerializer {
    /// Whether to include the source span of each node.
    pub include_spans: bool,
}

impl AstSerializer {
    /// Create a serializer that omits source spans.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump an expression and all of its operands.
    pub fn serialize(&self, expr: &Expr) -> DumpValue {
        let mut fields = vec![
            ("kind", DumpValue::from(expr.desc())),
            ("type", DumpValue::from(expr.ty.to_string())),
        ];
        if self.include_spans {
            fields.push(("span", DumpValue::from(expr.span.to_string())));
        }

        match expr.kind {
            ExprKind::Invalid(child) => {
                if let Some(child) = child {
                    fields.push(("child", self.serialize(child)));
                }
            }
            ExprKind::IntLiteral(ref v) => fields.push(("value", v.to_string().into())),
            ExprKind::StringLiteral(ref v) => fields.push(("value", v.as_str().into())),
            ExprKind::UnboundedLiteral => (),
            ExprKind::NamedValue(sym) => fields.push(("symbol", sym.name.into())),
            ExprKind::Binary { op, lhs, rhs } => {
                fields.push(("op", format!("{:?}", op).into()));
                fields.push(("left", self.serialize(lhs)));
                fields.push(("right", self.serialize(rhs)));
            }
            ExprKind::Concat(ref ops) | ExprKind::Streaming(ref ops) => {
                fields.push(("operands", self.list(ops)));
            }
            ExprKind::Conversion(op) => fields.push(("operand", self.serialize(op))),
            ExprKind::ElementSelect(ref x) => {
                fields.push(("value", self.serialize(x.value)));
                fields.push(("selector", self.serialize(x.selector)));
            }
            ExprKind::RangeSelect(ref x) => {
                fields.push(("selectionKind", x.selection_kind.to_string().into()));
                fields.push(("value", self.serialize(x.value)));
                fields.push(("left", self.serialize(x.left)));
                fields.push(("right", self.serialize(x.right)));
            }
            ExprKind::MemberAccess(ref x) => {
                fields.push(("member", x.member.name.into()));
                fields.push(("value", self.serialize(x.value)));
            }
            ExprKind::Call(ref x) => {
                let callee = match x.callee {
                    Callee::Subroutine(sym) => sym.name.to_string(),
                    Callee::System(method) => method.to_string(),
                };
                fields.push(("subroutine", callee.into()));
                fields.push(("arguments", self.list(&x.args)));
                if let Some((iter, with)) = x.with {
                    fields.push(("iterator", iter.name.into()));
                    fields.push(("with", self.serialize(with)));
                }
            }
        }
        DumpValue::Object(fields)
    }

    fn list(&self, exprs: &[&Expr]) -> DumpValue {
        DumpValue::List(exprs.iter().map(|e| self.serialize(e)).collect())
    }
}
