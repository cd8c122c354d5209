// Copyright (c) 2016-2021 Fabian Schuiki

//! Arbitrary-width four-state integers.
//!
//! Each bit of an [`SvInt`] is one of `0`, `1`, `x`, or `z`. The value is
//! stored as two bit planes: `value` holds the known bits, and `unknown` marks
//! the bits that are `x` or `z`. For an unknown bit, a `1` in the value plane
//! means `z` and a `0` means `x`.

use num::{
    bigint::{BigInt, BigUint, Sign},
    One, ToPrimitive, Zero,
};
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// A single four-state bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Logic {
    Zero,
    One,
    X,
    Z,
}

/// An arbitrary-width, optionally signed, four-state integer.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SvInt {
    width: u32,
    signed: bool,
    value: BigUint,
    unknown: BigUint,
}

fn mask(width: u32) -> BigUint {
    (BigUint::one() << width as usize) - BigUint::one()
}

impl SvInt {
    /// Create a new integer, truncating `value` to `width` bits in two's
    /// complement.
    pub fn new(width: u32, value: BigInt, signed: bool) -> SvInt {
        assert!(width > 0, "integer must be at least one bit wide");
        let modulus = BigInt::one() << width as usize;
        let mut v = value % &modulus;
        if v.sign() == Sign::Minus {
            v += &modulus;
        }
        SvInt {
            width,
            signed,
            value: v.to_biguint().unwrap_or_else(BigUint::zero),
            unknown: BigUint::zero(),
        }
    }

    /// Create a 32 bit signed integer, as produced by an `int` literal.
    pub fn from_i32(value: i32) -> SvInt {
        SvInt::new(32, BigInt::from(value), true)
    }

    /// Create an integer from an unsigned 64 bit value.
    pub fn from_u64(width: u32, value: u64, signed: bool) -> SvInt {
        SvInt::new(width, BigInt::from(value), signed)
    }

    /// Create an integer with all bits set to zero.
    pub fn zero(width: u32, signed: bool) -> SvInt {
        SvInt::new(width, BigInt::zero(), signed)
    }

    /// Create an integer with all bits set to `x`.
    pub fn all_x(width: u32, signed: bool) -> SvInt {
        SvInt {
            width,
            signed,
            value: BigUint::zero(),
            unknown: mask(width),
        }
    }

    /// Create an integer with all bits set to `z`.
    pub fn all_z(width: u32, signed: bool) -> SvInt {
        SvInt {
            width,
            signed,
            value: mask(width),
            unknown: mask(width),
        }
    }

    /// The number of bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Whether the integer is interpreted as signed.
    pub fn is_signed(&self) -> bool {
        self.signed
    }

    /// Check whether any bit is `x` or `z`.
    pub fn has_unknown(&self) -> bool {
        !self.unknown.is_zero()
    }

    /// Return a copy with a different signedness, keeping the bits.
    pub fn with_sign(&self, signed: bool) -> SvInt {
        SvInt {
            signed,
            ..self.clone()
        }
    }

    /// Return the bit at position `index`, counting from the LSB.
    pub fn bit(&self, index: u32) -> Logic {
        if index >= self.width {
            return Logic::X;
        }
        let v = ((&self.value >> index as usize) & BigUint::one()).is_one();
        let u = ((&self.unknown >> index as usize) & BigUint::one()).is_one();
        match (u, v) {
            (false, false) => Logic::Zero,
            (false, true) => Logic::One,
            (true, false) => Logic::X,
            (true, true) => Logic::Z,
        }
    }

    /// Extract the bits `[msb:lsb]` as a new unsigned integer.
    ///
    /// Bits outside of `[width-1:0]` read as `x`.
    pub fn slice(&self, msb: i32, lsb: i32) -> SvInt {
        assert!(msb >= lsb, "slice [{}:{}] is reversed", msb, lsb);
        let width = (msb as i64 - lsb as i64 + 1) as u32;
        let mut result = SvInt::zero(width, false);
        let mut in_range = BigUint::zero();
        let lo = std::cmp::max(lsb as i64, 0);
        let hi = std::cmp::min(msb as i64, self.width as i64 - 1);
        if lo <= hi {
            let n = (hi - lo + 1) as u32;
            let shift = (lo - lsb as i64) as usize;
            let v = (&self.value >> lo as usize) & mask(n);
            let u = (&self.unknown >> lo as usize) & mask(n);
            result.value = v << shift;
            result.unknown = u << shift;
            in_range = mask(n) << shift;
        }
        let outside = mask(width) ^ in_range;
        result.unknown |= outside;
        result
    }

    /// Overwrite the bits `[msb:lsb]` with `bits`, truncating or zero-extending
    /// it to the width of the slice. Bits outside of `[width-1:0]` are
    /// dropped.
    pub fn set_slice(&mut self, msb: i32, lsb: i32, bits: &SvInt) {
        assert!(msb >= lsb, "slice [{}:{}] is reversed", msb, lsb);
        let lo = std::cmp::max(lsb as i64, 0);
        let hi = std::cmp::min(msb as i64, self.width as i64 - 1);
        if lo > hi {
            return;
        }
        let n = (hi - lo + 1) as u32;
        let skip = (lo - lsb as i64) as usize;
        let field = mask(n) << lo as usize;
        let keep = mask(self.width) ^ &field;
        let v = ((&bits.value >> skip) & mask(n)) << lo as usize;
        let u = ((&bits.unknown >> skip) & mask(n)) << lo as usize;
        self.value = (&self.value & &keep) | v;
        self.unknown = (&self.unknown & &keep) | u;
    }

    /// Change the width, sign-extending if the integer is signed and
    /// zero-extending otherwise.
    pub fn resize(&self, width: u32) -> SvInt {
        if width <= self.width {
            return SvInt {
                width,
                signed: self.signed,
                value: &self.value & mask(width),
                unknown: &self.unknown & mask(width),
            };
        }
        let ext = mask(width) ^ mask(self.width);
        let mut result = SvInt {
            width,
            signed: self.signed,
            value: self.value.clone(),
            unknown: self.unknown.clone(),
        };
        if self.signed {
            match self.bit(self.width - 1) {
                Logic::One => result.value |= &ext,
                Logic::X => result.unknown |= &ext,
                Logic::Z => {
                    result.value |= &ext;
                    result.unknown |= &ext;
                }
                Logic::Zero => (),
            }
        }
        result
    }

    /// Interpret the integer as a mathematical value.
    ///
    /// Returns `None` if any bit is unknown.
    pub fn to_bigint(&self) -> Option<BigInt> {
        if self.has_unknown() {
            return None;
        }
        let v = BigInt::from_biguint(Sign::Plus, self.value.clone());
        if self.signed && self.bit(self.width - 1) == Logic::One {
            Some(v - (BigInt::one() << self.width as usize))
        } else {
            Some(v)
        }
    }

    /// Convert to a 32 bit signed integer, if the value is known and fits.
    pub fn as_i32(&self) -> Option<i32> {
        self.to_bigint()?.to_i32()
    }

    /// Convert to a 64 bit unsigned integer, if the value is known and fits.
    pub fn as_u64(&self) -> Option<u64> {
        self.to_bigint()?.to_u64()
    }

    fn arith(&self, other: &SvInt, op: impl FnOnce(BigInt, BigInt) -> BigInt) -> SvInt {
        let width = std::cmp::max(self.width, other.width);
        let signed = self.signed && other.signed;
        let a = self.resize(width).with_sign(signed).to_bigint();
        let b = other.resize(width).with_sign(signed).to_bigint();
        match (a, b) {
            (Some(a), Some(b)) => SvInt::new(width, op(a, b), signed),
            _ => SvInt::all_x(width, signed),
        }
    }

    /// Add two integers. Any unknown bit makes the whole result `x`.
    pub fn add(&self, other: &SvInt) -> SvInt {
        self.arith(other, |a, b| a + b)
    }

    /// Subtract two integers. Any unknown bit makes the whole result `x`.
    pub fn sub(&self, other: &SvInt) -> SvInt {
        self.arith(other, |a, b| a - b)
    }
}

impl PartialOrd for SvInt {
    fn partial_cmp(&self, other: &SvInt) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SvInt {
    fn cmp(&self, other: &SvInt) -> Ordering {
        match (self.to_bigint(), other.to_bigint()) {
            (Some(a), Some(b)) => a.cmp(&b),
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (None, None) => self.unknown.cmp(&other.unknown),
        }
        .then(self.width.cmp(&other.width))
        .then(self.signed.cmp(&other.signed))
        .then_with(|| self.value.cmp(&other.value))
        .then_with(|| self.unknown.cmp(&other.unknown))
    }
}

impl Display for SvInt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let s = if self.signed { "s" } else { "" };
        match self.to_bigint() {
            Some(v) => write!(f, "{}'{}d{}", self.width, s, v),
            None => {
                write!(f, "{}'{}b", self.width, s)?;
                for i in (0..self.width).rev() {
                    let c = match self.bit(i) {
                        Logic::Zero => '0',
                        Logic::One => '1',
                        Logic::X => 'x',
                        Logic::Z => 'z',
                    };
                    write!(f, "{}", c)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Debug for SvInt {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(width: u32, v: i64) -> SvInt {
        SvInt::new(width, BigInt::from(v), false)
    }

    #[test]
    fn truncation() {
        assert_eq!(int(4, 0x1f).as_u64(), Some(0xf));
        assert_eq!(SvInt::new(8, BigInt::from(-1), true).as_i32(), Some(-1));
        assert_eq!(SvInt::new(8, BigInt::from(-1), false).as_i32(), Some(255));
    }

    #[test]
    fn slicing() {
        let v = int(8, 0b1011_0110);
        assert_eq!(v.slice(3, 3).as_u64(), Some(0));
        assert_eq!(v.slice(2, 2).as_u64(), Some(1));
        assert_eq!(v.slice(5, 2).as_u64(), Some(0b1101));
        assert_eq!(v.slice(5, 2).width(), 4);
        assert_eq!(v.slice(7, 0), v);
    }

    #[test]
    fn slicing_out_of_range_yields_x() {
        let v = int(4, 0b1111);
        let s = v.slice(5, 2);
        assert_eq!(s.bit(0), Logic::One);
        assert_eq!(s.bit(1), Logic::One);
        assert_eq!(s.bit(2), Logic::X);
        assert_eq!(s.bit(3), Logic::X);
        assert!(v.slice(1, -1).has_unknown());
    }

    #[test]
    fn set_slice_writes_only_the_field() {
        let mut v = int(8, 0);
        v.set_slice(5, 2, &int(4, 0b1011));
        assert_eq!(v.as_u64(), Some(0b0010_1100));
        v.set_slice(0, 0, &SvInt::all_x(1, false));
        assert_eq!(v.bit(0), Logic::X);
        assert_eq!(v.slice(5, 2).as_u64(), Some(0b1011));
    }

    #[test]
    fn resize_sign_extends() {
        let v = SvInt::new(4, BigInt::from(-2), true);
        assert_eq!(v.resize(8).as_i32(), Some(-2));
        assert_eq!(int(4, 0b1110).resize(8).as_u64(), Some(0b1110));
        assert_eq!(int(8, 0x1ff).resize(4).as_u64(), Some(0xf));
    }

    #[test]
    fn unknowns() {
        let x = SvInt::all_x(4, false);
        assert!(x.has_unknown());
        assert_eq!(x.as_i32(), None);
        assert_eq!(format!("{}", x), "4'bxxxx");
        assert_eq!(format!("{}", SvInt::all_z(2, false)), "2'bzz");
        assert!(x.add(&int(4, 1)).has_unknown());
    }

    #[test]
    fn arithmetic() {
        let a = SvInt::from_i32(5);
        let b = SvInt::from_i32(7);
        assert_eq!(a.sub(&b).as_i32(), Some(-2));
        assert_eq!(a.add(&b).as_i32(), Some(12));
        assert_eq!(format!("{}", a), "32'sd5");
        assert_eq!(format!("{}", int(8, 3)), "8'd3");
    }

    #[test]
    fn ordering_by_value() {
        assert!(int(8, 3) < int(8, 5));
        assert!(SvInt::from_i32(-1) < SvInt::from_i32(0));
        assert_eq!(int(8, 3).cmp(&int(8, 3)), Ordering::Equal);
    }
}
