// Copyright (c) 2016-2021 Fabian Schuiki

//! Write targets of constant evaluation.
//!
//! An [`LValue`] names a local variable of an [`EvalContext`] and a path of
//! selections into its value. The path is built bottom-up while evaluating
//! the target expression, and only walked when the value is loaded or stored.
//! Every operation carries the value to create if the slot it selects does not
//! exist yet, e.g. a missing associative array entry.

use crate::{
    crate_prelude::*,
    eval::EvalContext,
    range::ConstantRange,
    value::{MapKey, UnionValue},
};
use std::convert::TryFrom;

/// A single selection within an lvalue path.
#[derive(Debug, Clone, PartialEq)]
pub enum LValueOp {
    /// Bits `msb` down to `lsb` of an integer.
    BitSlice { msb: i32, lsb: i32 },
    /// An element of an array, queue, or string, a field of an unpacked
    /// struct, or a member of an unpacked union. Negative indices select
    /// nothing: loads produce `default` and stores are dropped.
    Index { index: i64, default: ConstantValue },
    /// The elements `lower..=upper` of an array or queue.
    ArraySlice {
        upper: i64,
        lower: i64,
        default: ConstantValue,
    },
    /// An entry of an associative array.
    Lookup { key: MapKey, default: ConstantValue },
}

/// A reference to a storage location.
#[derive(Debug, Clone, PartialEq)]
pub struct LValue {
    root: NodeId,
    path: Vec<LValueOp>,
}

impl LValue {
    /// Create an lvalue for the whole of a local variable.
    pub fn new(root: NodeId) -> Self {
        LValue { root, path: vec![] }
    }

    /// The local variable this lvalue refers to.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The selections applied to the root.
    pub fn path(&self) -> &[LValueOp] {
        &self.path
    }

    /// Select a bit range. Consecutive bit slices are folded into one.
    pub fn add_bit_slice(&mut self, range: ConstantRange) {
        if let Some(LValueOp::BitSlice { msb, lsb }) = self.path.last_mut() {
            let base = *lsb;
            *msb = base + range.upper();
            *lsb = base + range.lower();
            return;
        }
        self.path.push(LValueOp::BitSlice {
            msb: range.upper(),
            lsb: range.lower(),
        });
    }

    /// Select an element.
    pub fn add_index(&mut self, index: i64, default: ConstantValue) {
        self.path.push(LValueOp::Index { index, default });
    }

    /// Select a range of elements.
    pub fn add_array_slice(&mut self, range: ConstantRange, default: ConstantValue) {
        self.path.push(LValueOp::ArraySlice {
            upper: range.upper() as i64,
            lower: range.lower() as i64,
            default,
        });
    }

    /// Select an associative array entry.
    pub fn add_array_lookup(&mut self, key: MapKey, default: ConstantValue) {
        self.path.push(LValueOp::Lookup { key, default });
    }

    /// Read the current value of the target.
    ///
    /// Slots that do not exist read as their default value. Returns `Unset`
    /// if the root variable does not exist.
    pub fn load(&self, ctx: &EvalContext) -> ConstantValue {
        match ctx.find_local(self.root) {
            Some(root) => load_path(root, &self.path),
            None => ConstantValue::Unset,
        }
    }

    /// Overwrite the target with a new value.
    ///
    /// Missing associative array entries are created, a queue index one past
    /// the end appends, and selecting an inactive union member makes it the
    /// active one. Writes to out-of-bounds slots are ignored.
    pub fn store(&self, ctx: &mut EvalContext, value: ConstantValue) {
        trace!("Storing {} into {:?}", value, self);
        if let Some(root) = ctx.find_local_mut(self.root) {
            store_path(root, &self.path, value);
        }
        ctx.invalidate_cache();
    }

    /// Find the slot the lvalue refers to, creating it if necessary.
    ///
    /// Returns `None` if the path contains a bit or array slice, which do
    /// not correspond to a single stored value, or if a slot is out of
    /// bounds.
    pub fn resolve<'c>(&self, ctx: &'c mut EvalContext) -> Option<&'c mut ConstantValue> {
        let mut slot = ctx.find_local_mut(self.root)?;
        for op in &self.path {
            slot = step_mut(slot, op)?;
        }
        Some(slot)
    }
}

fn index_of(index: i64) -> Option<usize> {
    usize::try_from(index).ok()
}

fn load_path(value: &ConstantValue, ops: &[LValueOp]) -> ConstantValue {
    let (op, rest) = match ops.split_first() {
        Some(x) => x,
        None => return value.clone(),
    };
    match op {
        LValueOp::BitSlice { msb, lsb } => match value {
            ConstantValue::Integer(v) => {
                load_path(&ConstantValue::Integer(v.slice(*msb, *lsb)), rest)
            }
            _ => ConstantValue::Unset,
        },
        LValueOp::ArraySlice {
            upper,
            lower,
            default,
        } => load_path(&value.get_slice(*upper, *lower, default), rest),
        LValueOp::Index { index, default } => {
            if let ConstantValue::Str(s) = value {
                let byte = index_of(*index)
                    .and_then(|i| s.get(i))
                    .cloned()
                    .unwrap_or(0);
                let v = SvInt::from_u64(8, byte as u64, true);
                return load_path(&ConstantValue::Integer(v), rest);
            }
            let next = index_of(*index).and_then(|i| match value {
                ConstantValue::Elements(v) | ConstantValue::Queue(v) => v.get(i),
                ConstantValue::Union(u) if u.active == Some(i as u32) => Some(&u.value),
                _ => None,
            });
            load_path(next.unwrap_or(default), rest)
        }
        LValueOp::Lookup { key, default } => {
            let next = match value {
                ConstantValue::Map(m) => m.get(key).or_else(|| m.default.as_ref()),
                _ => None,
            };
            load_path(next.unwrap_or(default), rest)
        }
    }
}

fn store_path(slot: &mut ConstantValue, ops: &[LValueOp], value: ConstantValue) {
    let (op, rest) = match ops.split_first() {
        Some(x) => x,
        None => {
            *slot = value;
            return;
        }
    };
    match (op, slot) {
        (LValueOp::BitSlice { msb, lsb }, ConstantValue::Integer(int)) => {
            let mut bits = ConstantValue::Integer(int.slice(*msb, *lsb));
            store_path(&mut bits, rest, value);
            if let ConstantValue::Integer(bits) = bits {
                int.set_slice(*msb, *lsb, &bits);
            }
        }
        (
            LValueOp::ArraySlice {
                upper,
                lower,
                default,
            },
            slot,
        ) => {
            let mut part = slot.get_slice(*upper, *lower, default);
            store_path(&mut part, rest, value);
            if let (Some(dst), Some(src)) = (slot.elements_mut(), part.elements()) {
                for (i, v) in (*lower..=*upper).zip(src) {
                    if let Some(d) = index_of(i).and_then(|i| dst.get_mut(i)) {
                        *d = v.clone();
                    }
                }
            }
        }
        (LValueOp::Index { index, .. }, ConstantValue::Str(s)) => {
            let i = match index_of(*index).filter(|&i| i < s.len()) {
                Some(i) => i,
                None => return,
            };
            // Bit selects of a character go through its byte value.
            let mut ch = ConstantValue::Integer(SvInt::from_u64(8, s[i] as u64, true));
            store_path(&mut ch, rest, value);
            // Writing a zero character has no effect.
            match ch
                .as_integer()
                .and_then(|v| v.resize(8).with_sign(false).as_u64())
            {
                Some(0) | None => (),
                Some(byte) => s[i] = byte as u8,
            }
        }
        (op, slot) => {
            if let Some(next) = step_mut(slot, op) {
                store_path(next, rest, value);
            }
        }
    }
}

fn step_mut<'a>(slot: &'a mut ConstantValue, op: &LValueOp) -> Option<&'a mut ConstantValue> {
    match op {
        LValueOp::Index { index, default } => {
            let index = index_of(*index)?;
            match slot {
                ConstantValue::Elements(v) => v.get_mut(index),
                ConstantValue::Queue(v) => {
                    if index == v.len() {
                        v.push(default.clone());
                    }
                    v.get_mut(index)
                }
                ConstantValue::Union(u) => {
                    let member = index as u32;
                    if u.active != Some(member) {
                        *u = Box::new(UnionValue {
                            active: Some(member),
                            value: default.clone(),
                        });
                    }
                    Some(&mut u.value)
                }
                _ => None,
            }
        }
        LValueOp::Lookup { key, default } => match slot {
            ConstantValue::Map(m) => Some(m.entry(key.clone(), default.clone())),
            _ => None,
        },
        LValueOp::BitSlice { .. } | LValueOp::ArraySlice { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{eval::EvalFlags, value::AssociativeMap};

    fn int(v: i32) -> ConstantValue {
        ConstantValue::Integer(SvInt::from_i32(v))
    }

    #[test]
    fn bit_slices_compose() {
        let mut lv = LValue::new(NodeId::new(1));
        lv.add_bit_slice(ConstantRange::new(15, 8));
        lv.add_bit_slice(ConstantRange::new(3, 0));
        assert_eq!(lv.path(), &[LValueOp::BitSlice { msb: 11, lsb: 8 }]);
    }

    #[test]
    fn store_and_load_bits() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(var, ConstantValue::Integer(SvInt::zero(16, false)));
        let mut lv = LValue::new(var);
        lv.add_bit_slice(ConstantRange::new(11, 8));
        lv.store(&mut ctx, ConstantValue::Integer(SvInt::from_u64(4, 0b1010, false)));
        assert_eq!(
            ctx.find_local(var),
            Some(&ConstantValue::Integer(SvInt::from_u64(16, 0x0a00, false)))
        );
        assert_eq!(
            lv.load(&ctx),
            ConstantValue::Integer(SvInt::from_u64(4, 0b1010, false))
        );
    }

    #[test]
    fn out_of_bounds_writes_are_dropped() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(var, ConstantValue::Elements(vec![int(1), int(2)]));
        let mut lv = LValue::new(var);
        lv.add_index(-1, int(0));
        lv.store(&mut ctx, int(9));
        assert_eq!(lv.load(&ctx), int(0));
        assert_eq!(
            ctx.find_local(var),
            Some(&ConstantValue::Elements(vec![int(1), int(2)]))
        );
    }

    #[test]
    fn queue_index_past_end_appends() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(var, ConstantValue::Queue(vec![int(1)]));
        let mut lv = LValue::new(var);
        lv.add_index(1, int(0));
        lv.store(&mut ctx, int(7));
        assert_eq!(
            ctx.find_local(var),
            Some(&ConstantValue::Queue(vec![int(1), int(7)]))
        );
    }

    #[test]
    fn lookup_creates_entries() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(var, ConstantValue::Map(Box::new(AssociativeMap::new())));
        let mut lv = LValue::new(var);
        lv.add_array_lookup(MapKey::Str("k".into()), int(0));
        assert_eq!(lv.resolve(&mut ctx), Some(&mut int(0)));
        lv.store(&mut ctx, int(3));
        assert_eq!(lv.load(&ctx), int(3));
        assert_eq!(ctx.find_local(var).map(|v| v.size()), Some(1));
    }

    #[test]
    fn union_index_switches_active_member() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(
            var,
            ConstantValue::Union(Box::new(UnionValue {
                active: Some(0),
                value: int(5),
            })),
        );
        let mut lv = LValue::new(var);
        lv.add_index(1, ConstantValue::Str(Vec::new()));
        lv.store(&mut ctx, ConstantValue::Str("hi".into()));
        let u = ctx.find_local(var).and_then(|v| v.as_union()).cloned();
        assert_eq!(
            u,
            Some(UnionValue {
                active: Some(1),
                value: ConstantValue::Str("hi".into()),
            })
        );
    }

    #[test]
    fn array_slice_store() {
        let mut ctx = EvalContext::new(EvalFlags::empty());
        let var = NodeId::alloc();
        ctx.create_local(
            var,
            ConstantValue::Elements(vec![int(0), int(0), int(0), int(0)]),
        );
        let mut lv = LValue::new(var);
        lv.add_array_slice(ConstantRange::new(2, 1), ConstantValue::Unset);
        lv.store(&mut ctx, ConstantValue::Elements(vec![int(4), int(5)]));
        assert_eq!(
            ctx.find_local(var),
            Some(&ConstantValue::Elements(vec![int(0), int(4), int(5), int(0)]))
        );
    }
}
