// Copyright (c) 2016-2021 Fabian Schuiki

//! Representation of constant values.
//!
//! This module implements a representation for values that may arise while
//! evaluating a SystemVerilog expression at compile time. Aggregates hold
//! their elements in declaration order: index 0 of an `Elements` value is the
//! first element of the array or the first field of the struct.

use crate::crate_prelude::*;
use itertools::Itertools;
use std::{
    collections::BTreeMap,
    fmt::{self, Display, Formatter},
};

/// A constant value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    /// No value. Produced by failed lookups and uninitialized unions.
    Unset,
    /// A four-state integer.
    Integer(SvInt),
    /// A real number.
    Real(f64),
    /// A string, as raw bytes. Characters are not required to be UTF-8.
    Str(Vec<u8>),
    /// The elements of a fixed or dynamic array, or the fields of a struct.
    Elements(Vec<ConstantValue>),
    /// The entries of an associative array.
    Map(Box<AssociativeMap>),
    /// The elements of a queue.
    Queue(Vec<ConstantValue>),
    /// The value of an unpacked union.
    Union(Box<UnionValue>),
}

/// The value of an unpacked union.
#[derive(Debug, Clone, PartialEq)]
pub struct UnionValue {
    /// The index of the active member, if any member has been written.
    pub active: Option<u32>,
    /// The value of the active member.
    pub value: ConstantValue,
}

/// The key of an associative array entry.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum MapKey {
    Int(SvInt),
    Str(Vec<u8>),
}

/// The entries of an associative array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssociativeMap {
    entries: BTreeMap<MapKey, ConstantValue>,
    /// The user-specified default, returned when a lookup misses.
    pub default: Option<ConstantValue>,
}

impl AssociativeMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Default::default()
    }

    /// Create an empty map with a user-specified default.
    pub fn with_default(default: ConstantValue) -> Self {
        AssociativeMap {
            entries: BTreeMap::new(),
            default: Some(default),
        }
    }

    /// Look up an entry.
    pub fn get(&self, key: &MapKey) -> Option<&ConstantValue> {
        self.entries.get(key)
    }

    /// Look up an entry for modification.
    pub fn get_mut(&mut self, key: &MapKey) -> Option<&mut ConstantValue> {
        self.entries.get_mut(key)
    }

    /// Check whether an entry exists.
    pub fn contains(&self, key: &MapKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry, returning it if it existed.
    pub fn remove(&mut self, key: &MapKey) -> Option<ConstantValue> {
        self.entries.remove(key)
    }

    /// Insert or replace an entry.
    pub fn insert(&mut self, key: MapKey, value: ConstantValue) {
        self.entries.insert(key, value);
    }

    /// Return the entry for `key`, inserting `init` if it is missing.
    pub fn entry(&mut self, key: MapKey, init: ConstantValue) -> &mut ConstantValue {
        self.entries.entry(key).or_insert(init)
    }

    /// Return the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&MapKey, &ConstantValue)> {
        self.entries.iter()
    }
}

impl ConstantValue {
    /// Check whether this is the `Unset` value.
    pub fn is_unset(&self) -> bool {
        matches!(self, ConstantValue::Unset)
    }

    /// Return the integer, if this is one.
    pub fn as_integer(&self) -> Option<&SvInt> {
        match self {
            ConstantValue::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Return the bytes of a string, if this is one.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ConstantValue::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Return the elements of an array, struct, or queue.
    pub fn elements(&self) -> Option<&[ConstantValue]> {
        match self {
            ConstantValue::Elements(v) | ConstantValue::Queue(v) => Some(v),
            _ => None,
        }
    }

    /// Return the elements of an array, struct, or queue for modification.
    pub fn elements_mut(&mut self) -> Option<&mut Vec<ConstantValue>> {
        match self {
            ConstantValue::Elements(v) | ConstantValue::Queue(v) => Some(v),
            _ => None,
        }
    }

    /// Return the associative array entries, if this is a map.
    pub fn as_map(&self) -> Option<&AssociativeMap> {
        match self {
            ConstantValue::Map(v) => Some(v),
            _ => None,
        }
    }

    /// Return the union value, if this is one.
    pub fn as_union(&self) -> Option<&UnionValue> {
        match self {
            ConstantValue::Union(v) => Some(v),
            _ => None,
        }
    }

    /// Check whether this is a queue.
    pub fn is_queue(&self) -> bool {
        matches!(self, ConstantValue::Queue(..))
    }

    /// Check whether this is an integer with `x` or `z` bits.
    pub fn has_unknown(&self) -> bool {
        match self {
            ConstantValue::Integer(v) => v.has_unknown(),
            _ => false,
        }
    }

    /// Return the number of elements or entries, or the length of a string.
    ///
    /// Scalar values have size 0.
    pub fn size(&self) -> usize {
        match self {
            ConstantValue::Elements(v) | ConstantValue::Queue(v) => v.len(),
            ConstantValue::Map(m) => m.len(),
            ConstantValue::Str(s) => s.len(),
            _ => 0,
        }
    }

    /// Extract the elements `lower..=upper` of an array or queue.
    ///
    /// Positions outside the value are filled with `default`. The result has
    /// the same shape as `self`, i.e. slicing a queue produces a queue.
    pub fn get_slice(&self, upper: i64, lower: i64, default: &ConstantValue) -> ConstantValue {
        let elems = self.elements().unwrap_or(&[]);
        let result: Vec<_> = (lower..=upper)
            .map(|i| {
                if i < 0 {
                    return default.clone();
                }
                elems.get(i as usize).cloned().unwrap_or_else(|| default.clone())
            })
            .collect();
        if self.is_queue() {
            ConstantValue::Queue(result)
        } else {
            ConstantValue::Elements(result)
        }
    }
}

impl From<SvInt> for ConstantValue {
    fn from(v: SvInt) -> Self {
        ConstantValue::Integer(v)
    }
}

impl Display for ConstantValue {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            ConstantValue::Unset => write!(f, "<unset>"),
            ConstantValue::Integer(v) => write!(f, "{}", v),
            ConstantValue::Real(v) => write!(f, "{}", v),
            ConstantValue::Str(v) => write!(f, "{:?}", String::from_utf8_lossy(v)),
            ConstantValue::Elements(v) => write!(f, "[{}]", v.iter().format(",")),
            ConstantValue::Queue(v) => write!(f, "[{}]", v.iter().format(",")),
            ConstantValue::Map(m) => {
                write!(
                    f,
                    "[{}",
                    m.iter()
                        .format_with(",", |(k, v), f| f(&format_args!("{}:{}", k, v)))
                )?;
                if let Some(d) = &m.default {
                    if !m.is_empty() {
                        write!(f, ",")?;
                    }
                    write!(f, "default:{}", d)?;
                }
                write!(f, "]")
            }
            ConstantValue::Union(u) => match u.active {
                Some(i) => write!(f, "({}) {}", i, u.value),
                None => write!(f, "<unset union>"),
            },
        }
    }
}

impl Display for MapKey {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            MapKey::Int(v) => write!(f, "{}", v),
            MapKey::Str(v) => write!(f, "{:?}", String::from_utf8_lossy(v)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(v: i32) -> ConstantValue {
        ConstantValue::Integer(SvInt::from_i32(v))
    }

    #[test]
    fn slice_fills_with_default() {
        let v = ConstantValue::Elements(vec![int(1), int(2), int(3)]);
        assert_eq!(
            v.get_slice(2, 1, &int(0)),
            ConstantValue::Elements(vec![int(2), int(3)])
        );
        assert_eq!(
            v.get_slice(3, -1, &int(0)),
            ConstantValue::Elements(vec![int(0), int(1), int(2), int(3), int(0)])
        );
        let q = ConstantValue::Queue(vec![int(1), int(2)]);
        assert!(q.get_slice(1, 0, &int(0)).is_queue());
    }

    #[test]
    fn map_entries() {
        let mut m = AssociativeMap::with_default(int(5));
        m.insert(MapKey::Str("b".into()), int(2));
        m.insert(MapKey::Str("a".into()), int(1));
        assert_eq!(m.len(), 2);
        assert_eq!(m.get(&MapKey::Str("a".into())), Some(&int(1)));
        assert_eq!(m.get(&MapKey::Str("c".into())), None);
        let v = ConstantValue::Map(Box::new(m));
        assert_eq!(v.size(), 2);
        assert_eq!(
            format!("{}", v),
            "[\"a\":32'sd1,\"b\":32'sd2,default:32'sd5]"
        );
    }

    #[test]
    fn sizes() {
        assert_eq!(ConstantValue::Str("hello".into()).size(), 5);
        assert_eq!(int(3).size(), 0);
        assert_eq!(ConstantValue::Queue(vec![int(1)]).size(), 1);
    }
}
