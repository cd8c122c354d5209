// Copyright (c) 2016-2021 Fabian Schuiki

//! An implementation of the verilog type system.
//!
//! Types are interned in the [`GlobalArenas`](crate::GlobalArenas) and passed
//! around as `&'t TypeKind<'t>`. Every type falls into exactly one category;
//! the predicates below see through typedef names, so callers never need to
//! unwrap a [`TypeKind::Named`] themselves.

use crate::{
    crate_prelude::*,
    range::ConstantRange,
    symbol::Symbol,
    value::{AssociativeMap, ConstantValue, UnionValue},
};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// A verilog type.
pub type Type<'t> = &'t TypeKind<'t>;

/// Type data.
#[derive(Debug)]
pub enum TypeKind<'t> {
    /// An error occurred during type computation.
    Error,
    /// The `void` type.
    Void,
    /// The type of the unbounded literal `$`.
    Unbounded,
    /// The `real` type.
    Real,
    /// The `string` type.
    String,
    /// The `event` type.
    Event,
    /// The type of a named sequence.
    Sequence,
    /// A single bit type.
    BitScalar { domain: Domain, sign: Sign },
    /// A simple bit vector type (SBVT).
    ///
    /// The innermost dimension of a multi-dimensional bit vector type is always
    /// represented as a SBVT.
    BitVector {
        domain: Domain,
        sign: Sign,
        range: ConstantRange,
        dubbed: bool,
    },
    /// A packed array of packed elements.
    PackedArray { elem: Type<'t>, range: ConstantRange },
    /// A fixed-size unpacked array.
    UnpackedArray { elem: Type<'t>, range: ConstantRange },
    /// A dynamic array `[]`.
    DynamicArray(Type<'t>),
    /// An associative array. The index type is `None` for wildcard `[*]`
    /// arrays.
    AssociativeArray {
        elem: Type<'t>,
        index: Option<Type<'t>>,
    },
    /// A queue `[$]` or `[$:max_bound]`.
    Queue { elem: Type<'t>, max_bound: u32 },
    /// A packed or unpacked struct.
    Struct(&'t StructType<'t>),
    /// A packed, unpacked, or tagged union.
    Union(&'t UnionType<'t>),
    /// An enum.
    Enum(&'t EnumType<'t>),
    /// A class.
    Class(&'t ClassType<'t>),
    /// A covergroup.
    Covergroup(&'t CovergroupType<'t>),
    /// A named type.
    ///
    /// The first field represents how the type was originally named by the
    /// user. The second field represents the actual type.
    Named(&'t str, Type<'t>),
}

/// The number of values each bit of a type can assume.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Domain {
    /// Two-valued types such as `bit` or `int`.
    TwoValued,
    /// Four-valued types such as `logic` or `integer`.
    FourValued,
}

/// Whether a type is signed or unsigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Sign {
    Signed,
    Unsigned,
}

/// A struct definition.
#[derive(Debug)]
pub struct StructType<'t> {
    pub id: NodeId,
    pub packed: bool,
    pub sign: Sign,
    /// The fields, in declaration order. Each is a `SymbolKind::Field`.
    pub fields: Vec<&'t Symbol<'t>>,
}

/// A union definition.
#[derive(Debug)]
pub struct UnionType<'t> {
    pub id: NodeId,
    pub packed: bool,
    pub tagged: bool,
    /// The number of tag bits reserved at the top of a packed tagged union.
    pub tag_bits: u32,
    /// The members, in declaration order. Each is a `SymbolKind::Field`.
    pub fields: Vec<&'t Symbol<'t>>,
}

/// An enum definition.
#[derive(Debug)]
pub struct EnumType<'t> {
    pub id: NodeId,
    pub base: Type<'t>,
    /// The enum values. Each is a `SymbolKind::EnumValue`.
    pub values: Vec<&'t Symbol<'t>>,
}

/// A class definition.
#[derive(Debug)]
pub struct ClassType<'t> {
    pub id: NodeId,
    pub name: &'t str,
    pub base: Option<Type<'t>>,
    pub members: Vec<&'t Symbol<'t>>,
}

/// A covergroup definition.
#[derive(Debug)]
pub struct CovergroupType<'t> {
    pub id: NodeId,
    pub name: &'t str,
    pub body: Vec<&'t Symbol<'t>>,
}

fn find_in<'t>(members: &[&'t Symbol<'t>], name: &str) -> Option<&'t Symbol<'t>> {
    members.iter().cloned().find(|m| m.name == name)
}

impl<'t> StructType<'t> {
    /// Find a field by name.
    pub fn find(&self, name: &str) -> Option<&'t Symbol<'t>> {
        find_in(&self.fields, name)
    }
}

impl<'t> UnionType<'t> {
    /// Find a member by name.
    pub fn find(&self, name: &str) -> Option<&'t Symbol<'t>> {
        find_in(&self.fields, name)
    }

    /// Return the member at a given position.
    pub fn member_at(&self, index: u32) -> Option<&'t Symbol<'t>> {
        self.fields.get(index as usize).cloned()
    }
}

impl<'t> ClassType<'t> {
    /// Find a member by name, searching base classes if necessary.
    pub fn find(&self, name: &str) -> Option<&'t Symbol<'t>> {
        find_in(&self.members, name).or_else(|| {
            self.base_class()
                .and_then(|base| base.find(name))
        })
    }

    /// Return the base class definition, if there is one and it is valid.
    pub fn base_class(&self) -> Option<&'t ClassType<'t>> {
        self.base.and_then(|b| b.get_class_def())
    }

    /// Check whether the base class failed to resolve.
    pub fn has_error_base(&self) -> bool {
        self.base.map(|b| b.is_error()).unwrap_or(false)
    }

    /// Check whether `self` is `other` or derives from it.
    pub fn derives_from(&self, other: NodeId) -> bool {
        if self.id == other {
            return true;
        }
        match self.base_class() {
            Some(base) => base.derives_from(other),
            None => false,
        }
    }
}

impl<'t> CovergroupType<'t> {
    /// Find a member of the covergroup body by name.
    pub fn find(&self, name: &str) -> Option<&'t Symbol<'t>> {
        find_in(&self.body, name)
    }
}

impl<'t> TypeKind<'t> {
    /// Dereference name aliases.
    pub fn unname(&self) -> &Self {
        match self {
            TypeKind::Named(_, ty) => ty.unname(),
            _ => self,
        }
    }

    /// Check if this is the error type.
    pub fn is_error(&self) -> bool {
        matches!(self.unname(), TypeKind::Error)
    }

    /// Check if this is the void type.
    pub fn is_void(&self) -> bool {
        matches!(self.unname(), TypeKind::Void)
    }

    /// Check if this is the type of the unbounded literal `$`.
    pub fn is_unbounded(&self) -> bool {
        matches!(self.unname(), TypeKind::Unbounded)
    }

    /// Check if this is the string type.
    pub fn is_string(&self) -> bool {
        matches!(self.unname(), TypeKind::String)
    }

    /// Check if this is a class type.
    pub fn is_class(&self) -> bool {
        matches!(self.unname(), TypeKind::Class(..))
    }

    /// Check if this is a single bit type.
    pub fn is_scalar(&self) -> bool {
        matches!(self.unname(), TypeKind::BitScalar { .. })
    }

    /// Check if this is an integral type, i.e. one that has an equivalent
    /// simple bit vector.
    pub fn is_integral(&self) -> bool {
        match self.unname() {
            TypeKind::BitScalar { .. }
            | TypeKind::BitVector { .. }
            | TypeKind::PackedArray { .. }
            | TypeKind::Enum(..) => true,
            TypeKind::Struct(s) => s.packed,
            TypeKind::Union(u) => u.packed,
            _ => false,
        }
    }

    /// Check if any bit of this type can hold `x` or `z`.
    pub fn is_four_state(&self) -> bool {
        match self.unname() {
            TypeKind::BitScalar { domain, .. } | TypeKind::BitVector { domain, .. } => {
                *domain == Domain::FourValued
            }
            TypeKind::PackedArray { elem, .. }
            | TypeKind::UnpackedArray { elem, .. }
            | TypeKind::DynamicArray(elem)
            | TypeKind::AssociativeArray { elem, .. }
            | TypeKind::Queue { elem, .. } => elem.is_four_state(),
            TypeKind::Enum(e) => e.base.is_four_state(),
            TypeKind::Struct(s) => s.fields.iter().any(|f| f.value_type().is_four_state()),
            TypeKind::Union(u) => u.fields.iter().any(|f| f.value_type().is_four_state()),
            _ => false,
        }
    }

    /// Check if this is any kind of array, packed or unpacked.
    pub fn is_array(&self) -> bool {
        matches!(
            self.unname(),
            TypeKind::PackedArray { .. }
                | TypeKind::UnpackedArray { .. }
                | TypeKind::DynamicArray(..)
                | TypeKind::AssociativeArray { .. }
                | TypeKind::Queue { .. }
        )
    }

    /// Check if this is a packed array.
    pub fn is_packed_array(&self) -> bool {
        matches!(self.unname(), TypeKind::PackedArray { .. })
    }

    /// Check if this is a fixed-size unpacked array.
    pub fn is_unpacked_array(&self) -> bool {
        matches!(self.unname(), TypeKind::UnpackedArray { .. })
    }

    /// Check if this is a dynamic array.
    pub fn is_dynamic_array(&self) -> bool {
        matches!(self.unname(), TypeKind::DynamicArray(..))
    }

    /// Check if this is an associative array.
    pub fn is_associative_array(&self) -> bool {
        matches!(self.unname(), TypeKind::AssociativeArray { .. })
    }

    /// Check if this is a queue.
    pub fn is_queue(&self) -> bool {
        matches!(self.unname(), TypeKind::Queue { .. })
    }

    /// Check if this is an unpacked struct.
    pub fn is_unpacked_struct(&self) -> bool {
        matches!(self.unname(), TypeKind::Struct(s) if !s.packed)
    }

    /// Check if this is an unpacked union, tagged or not.
    pub fn is_unpacked_union(&self) -> bool {
        matches!(self.unname(), TypeKind::Union(u) if !u.packed)
    }

    /// Check if this is a packed union, tagged or not.
    pub fn is_packed_union(&self) -> bool {
        matches!(self.unname(), TypeKind::Union(u) if u.packed)
    }

    /// Check if this is a tagged union, packed or not.
    pub fn is_tagged_union(&self) -> bool {
        matches!(self.unname(), TypeKind::Union(u) if u.tagged)
    }

    /// Check whether the type has a fixed `[left:right]` range that indices
    /// can be checked against at compile time.
    pub fn has_fixed_range(&self) -> bool {
        self.is_integral() || self.is_unpacked_array()
    }

    /// Get the fixed range of the type.
    ///
    /// Integral types without a declared range, such as packed structs, have
    /// the range `[width-1:0]`.
    pub fn get_fixed_range(&self) -> ConstantRange {
        match self.unname() {
            TypeKind::BitVector { range, .. }
            | TypeKind::PackedArray { range, .. }
            | TypeKind::UnpackedArray { range, .. } => *range,
            ty if ty.is_integral() => ConstantRange::new(ty.bit_width() as i32 - 1, 0),
            _ => ConstantRange::default(),
        }
    }

    /// Get the element type of an array.
    ///
    /// Simple bit vectors are treated as arrays of single bits.
    pub fn get_array_element_type(&self) -> Option<Type<'t>> {
        match *self.unname() {
            TypeKind::PackedArray { elem, .. }
            | TypeKind::UnpackedArray { elem, .. }
            | TypeKind::DynamicArray(elem)
            | TypeKind::AssociativeArray { elem, .. }
            | TypeKind::Queue { elem, .. } => Some(elem),
            TypeKind::BitVector { domain, .. } => Some(domain.bit_type()),
            _ => None,
        }
    }

    /// Get the index type of an associative array, or `None` for wildcard
    /// and non-associative types.
    pub fn get_associative_index_type(&self) -> Option<Type<'t>> {
        match *self.unname() {
            TypeKind::AssociativeArray { index, .. } => index,
            _ => None,
        }
    }

    /// Get the definition of a struct.
    pub fn get_struct_def(&self) -> Option<&'t StructType<'t>> {
        match *self.unname() {
            TypeKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Get the definition of a union.
    pub fn get_union_def(&self) -> Option<&'t UnionType<'t>> {
        match *self.unname() {
            TypeKind::Union(u) => Some(u),
            _ => None,
        }
    }

    /// Get the definition of a class.
    pub fn get_class_def(&self) -> Option<&'t ClassType<'t>> {
        match *self.unname() {
            TypeKind::Class(c) => Some(c),
            _ => None,
        }
    }

    /// Get the definition of an enum.
    pub fn get_enum_def(&self) -> Option<&'t EnumType<'t>> {
        match *self.unname() {
            TypeKind::Enum(e) => Some(e),
            _ => None,
        }
    }

    /// Return the sign of the type, if it has one.
    pub fn get_sign(&self) -> Option<Sign> {
        match self.unname() {
            TypeKind::BitScalar { sign, .. } | TypeKind::BitVector { sign, .. } => Some(*sign),
            TypeKind::Struct(s) if s.packed => Some(s.sign),
            TypeKind::Enum(e) => e.base.get_sign(),
            ty if ty.is_integral() => Some(Sign::Unsigned),
            _ => None,
        }
    }

    /// Check whether the type is signed.
    ///
    /// Returns false for types which have no sign.
    pub fn is_signed(&self) -> bool {
        self.get_sign() == Some(Sign::Signed)
    }

    /// Get the width of the type in bits.
    ///
    /// Returns 0 for types that are not integral.
    pub fn bit_width(&self) -> u32 {
        match self.unname() {
            TypeKind::BitScalar { .. } => 1,
            TypeKind::BitVector { range, .. } => range.width(),
            TypeKind::PackedArray { elem, range } => elem.bit_width() * range.width(),
            TypeKind::Enum(e) => e.base.bit_width(),
            TypeKind::Struct(s) if s.packed => {
                s.fields.iter().map(|f| f.value_type().bit_width()).sum()
            }
            TypeKind::Union(u) if u.packed => {
                u.fields
                    .iter()
                    .map(|f| f.value_type().bit_width())
                    .max()
                    .unwrap_or(0)
                    + u.tag_bits
            }
            _ => 0,
        }
    }

    /// Determine the default value of the type.
    ///
    /// Four-state integral types default to all `x`, two-state ones to zero.
    pub fn default_value(&self) -> ConstantValue {
        match self.unname() {
            ty if ty.is_integral() => {
                let width = std::cmp::max(ty.bit_width(), 1);
                if ty.is_four_state() {
                    ConstantValue::Integer(SvInt::all_x(width, ty.is_signed()))
                } else {
                    ConstantValue::Integer(SvInt::zero(width, ty.is_signed()))
                }
            }
            TypeKind::Real => ConstantValue::Real(0.0),
            TypeKind::String => ConstantValue::Str(Vec::new()),
            TypeKind::UnpackedArray { elem, range } => {
                ConstantValue::Elements(vec![elem.default_value(); range.width() as usize])
            }
            TypeKind::DynamicArray(..) => ConstantValue::Elements(vec![]),
            TypeKind::Queue { .. } => ConstantValue::Queue(vec![]),
            TypeKind::AssociativeArray { .. } => {
                ConstantValue::Map(Box::new(AssociativeMap::default()))
            }
            TypeKind::Struct(s) => ConstantValue::Elements(
                s.fields
                    .iter()
                    .map(|f| f.value_type().default_value())
                    .collect(),
            ),
            TypeKind::Union(u) => match u.fields.first() {
                Some(first) if !u.tagged => ConstantValue::Union(Box::new(UnionValue {
                    active: Some(0),
                    value: first.value_type().default_value(),
                })),
                _ => ConstantValue::Union(Box::new(UnionValue {
                    active: None,
                    value: ConstantValue::Unset,
                })),
            },
            _ => ConstantValue::Unset,
        }
    }

    /// Check whether two types are equivalent.
    ///
    /// Integral types are equivalent if they have the same width, signedness,
    /// and state domain. Arrays are equivalent if their shapes match and their
    /// elements are equivalent. Aggregates are only equivalent to themselves.
    pub fn is_equivalent(&self, other: &TypeKind<'t>) -> bool {
        let a = self.unname();
        let b = other.unname();
        if a.is_error() || b.is_error() {
            return false;
        }
        match (a, b) {
            (TypeKind::Struct(x), TypeKind::Struct(y)) => return x.id == y.id,
            (TypeKind::Union(x), TypeKind::Union(y)) => return x.id == y.id,
            (TypeKind::Enum(x), TypeKind::Enum(y)) => return x.id == y.id,
            (TypeKind::Class(x), TypeKind::Class(y)) => return x.id == y.id,
            (TypeKind::Covergroup(x), TypeKind::Covergroup(y)) => return x.id == y.id,
            _ => (),
        }
        if a.is_integral() && b.is_integral() {
            if a.get_enum_def().is_some() || b.get_enum_def().is_some() {
                return false;
            }
            return a.bit_width() == b.bit_width()
                && a.is_signed() == b.is_signed()
                && a.is_four_state() == b.is_four_state();
        }
        match (a, b) {
            (
                TypeKind::UnpackedArray { elem: ea, range: ra },
                TypeKind::UnpackedArray { elem: eb, range: rb },
            ) => ra.width() == rb.width() && ea.is_equivalent(eb),
            (TypeKind::DynamicArray(ea), TypeKind::DynamicArray(eb)) => ea.is_equivalent(eb),
            (TypeKind::Queue { elem: ea, .. }, TypeKind::Queue { elem: eb, .. }) => {
                ea.is_equivalent(eb)
            }
            (
                TypeKind::AssociativeArray { elem: ea, index: ia },
                TypeKind::AssociativeArray { elem: eb, index: ib },
            ) => {
                ea.is_equivalent(eb)
                    && match (ia, ib) {
                        (Some(ia), Some(ib)) => ia.is_equivalent(ib),
                        (None, None) => true,
                        _ => false,
                    }
            }
            (TypeKind::Void, TypeKind::Void)
            | (TypeKind::Real, TypeKind::Real)
            | (TypeKind::String, TypeKind::String)
            | (TypeKind::Event, TypeKind::Event)
            | (TypeKind::Sequence, TypeKind::Sequence)
            | (TypeKind::Unbounded, TypeKind::Unbounded) => true,
            _ => false,
        }
    }
}

impl<'t> Display for TypeKind<'t> {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            TypeKind::Error => write!(f, "<error>"),
            TypeKind::Void => write!(f, "void"),
            TypeKind::Unbounded => write!(f, "$"),
            TypeKind::Real => write!(f, "real"),
            TypeKind::String => write!(f, "string"),
            TypeKind::Event => write!(f, "event"),
            TypeKind::Sequence => write!(f, "sequence"),
            TypeKind::Named(name, ..) => write!(f, "{}", name),
            TypeKind::BitScalar { domain, sign } => {
                write!(f, "{}", domain.bit_name())?;
                if sign == Sign::Signed {
                    write!(f, " signed")?;
                }
                Ok(())
            }
            TypeKind::BitVector {
                domain,
                sign,
                range,
                dubbed,
            } => {
                // Use the builtin name if called such by the user.
                if dubbed {
                    let dub = match range.width() {
                        8 if domain == Domain::TwoValued => Some("byte"),
                        16 if domain == Domain::TwoValued => Some("shortint"),
                        32 if domain == Domain::TwoValued => Some("int"),
                        32 if domain == Domain::FourValued => Some("integer"),
                        64 if domain == Domain::TwoValued => Some("longint"),
                        _ => None,
                    };
                    if let Some(dub) = dub {
                        write!(f, "{}", dub)?;
                        if sign != Sign::Signed {
                            write!(f, " {}", sign)?;
                        }
                        return Ok(());
                    }
                }

                // Otherwise use the regular bit name with vector range.
                write!(f, "{}", domain.bit_name())?;
                if sign != Sign::Unsigned {
                    write!(f, " {}", sign)?;
                }
                write!(f, " {}", range)
            }
            TypeKind::PackedArray { .. } => {
                // Packed dimensions are printed outermost first.
                let mut dims = vec![];
                let mut ty: &TypeKind = self;
                while let TypeKind::PackedArray { elem, range } = ty.unname() {
                    dims.push(*range);
                    ty = *elem;
                }
                write!(f, "{} {}", ty, dims.iter().format(""))
            }
            TypeKind::UnpackedArray { elem, range } => {
                write!(f, "{}$[{}:{}]", elem, range.left, range.right)
            }
            TypeKind::DynamicArray(elem) => write!(f, "{}$[]", elem),
            TypeKind::AssociativeArray { elem, index } => match index {
                Some(index) => write!(f, "{}$[{}]", elem, index),
                None => write!(f, "{}$[*]", elem),
            },
            TypeKind::Queue { elem, max_bound } => {
                if max_bound == 0 {
                    write!(f, "{}$[$]", elem)
                } else {
                    write!(f, "{}$[$:{}]", elem, max_bound)
                }
            }
            TypeKind::Struct(s) => {
                write!(f, "struct")?;
                if s.packed {
                    write!(f, " packed")?;
                }
                write!(
                    f,
                    "{{{}}}",
                    s.fields
                        .iter()
                        .format_with("", |x, f| f(&format_args!("{} {};", x.value_type(), x.name)))
                )
            }
            TypeKind::Union(u) => {
                write!(f, "union")?;
                if u.tagged {
                    write!(f, " tagged")?;
                }
                if u.packed {
                    write!(f, " packed")?;
                }
                write!(
                    f,
                    "{{{}}}",
                    u.fields
                        .iter()
                        .format_with("", |x, f| f(&format_args!("{} {};", x.value_type(), x.name)))
                )
            }
            TypeKind::Enum(e) => write!(
                f,
                "enum{{{}}}",
                e.values.iter().map(|v| v.name).format(",")
            ),
            TypeKind::Class(c) => write!(f, "{}", c.name),
            TypeKind::Covergroup(c) => write!(f, "{}", c.name),
        }
    }
}

impl Domain {
    /// Return the single-bit name for this domain (`bit` or `logic`).
    pub fn bit_name(&self) -> &'static str {
        match self {
            Domain::TwoValued => "bit",
            Domain::FourValued => "logic",
        }
    }

    /// Return the single-bit type for this domain (`bit` or `logic`).
    pub fn bit_type(&self) -> &'static TypeKind<'static> {
        match self {
            Domain::TwoValued => &BIT_TYPE,
            Domain::FourValued => &LOGIC_TYPE,
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Sign::Signed => write!(f, "signed"),
            Sign::Unsigned => write!(f, "unsigned"),
        }
    }
}

/// The `<error>` type.
pub static ERROR_TYPE: TypeKind<'static> = TypeKind::Error;

/// The `void` type.
pub static VOID_TYPE: TypeKind<'static> = TypeKind::Void;

/// The type of the `$` literal.
pub static UNBOUNDED_TYPE: TypeKind<'static> = TypeKind::Unbounded;

/// The `real` type.
pub static REAL_TYPE: TypeKind<'static> = TypeKind::Real;

/// The `string` type.
pub static STRING_TYPE: TypeKind<'static> = TypeKind::String;

/// The `event` type.
pub static EVENT_TYPE: TypeKind<'static> = TypeKind::Event;

/// The `bit` type.
pub static BIT_TYPE: TypeKind<'static> = TypeKind::BitScalar {
    domain: Domain::TwoValued,
    sign: Sign::Unsigned,
};

/// The `logic` type.
pub static LOGIC_TYPE: TypeKind<'static> = TypeKind::BitScalar {
    domain: Domain::FourValued,
    sign: Sign::Unsigned,
};

/// The `byte` type.
pub static BYTE_TYPE: TypeKind<'static> = TypeKind::BitVector {
    domain: Domain::TwoValued,
    sign: Sign::Signed,
    range: ConstantRange { left: 7, right: 0 },
    dubbed: true,
};

/// The `shortint` type.
pub static SHORTINT_TYPE: TypeKind<'static> = TypeKind::BitVector {
    domain: Domain::TwoValued,
    sign: Sign::Signed,
    range: ConstantRange { left: 15, right: 0 },
    dubbed: true,
};

/// The `int` type.
pub static INT_TYPE: TypeKind<'static> = TypeKind::BitVector {
    domain: Domain::TwoValued,
    sign: Sign::Signed,
    range: ConstantRange { left: 31, right: 0 },
    dubbed: true,
};

/// The `integer` type.
pub static INTEGER_TYPE: TypeKind<'static> = TypeKind::BitVector {
    domain: Domain::FourValued,
    sign: Sign::Signed,
    range: ConstantRange { left: 31, right: 0 },
    dubbed: true,
};

/// The `longint` type.
pub static LONGINT_TYPE: TypeKind<'static> = TypeKind::BitVector {
    domain: Domain::TwoValued,
    sign: Sign::Signed,
    range: ConstantRange { left: 63, right: 0 },
    dubbed: true,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn vector(domain: Domain, sign: Sign, left: i32, right: i32) -> TypeKind<'static> {
        TypeKind::BitVector {
            domain,
            sign,
            range: ConstantRange::new(left, right),
            dubbed: false,
        }
    }

    #[test]
    fn builtin_type_names() {
        // Check the builtint dubbed types.
        assert_eq!(format!("{}", BYTE_TYPE), "byte");
        assert_eq!(format!("{}", SHORTINT_TYPE), "shortint");
        assert_eq!(format!("{}", INT_TYPE), "int");
        assert_eq!(format!("{}", INTEGER_TYPE), "integer");
        assert_eq!(format!("{}", LONGINT_TYPE), "longint");

        // Check the direction and offset.
        assert_eq!(
            format!("{}", vector(Domain::TwoValued, Sign::Unsigned, 0, 41)),
            "bit [0:41]"
        );
        assert_eq!(
            format!("{}", vector(Domain::TwoValued, Sign::Unsigned, 41, 0)),
            "bit [41:0]"
        );
        assert_eq!(
            format!("{}", vector(Domain::TwoValued, Sign::Unsigned, 39, -2)),
            "bit [39:-2]"
        );

        // Check the domain and sign.
        assert_eq!(
            format!("{}", vector(Domain::FourValued, Sign::Unsigned, 41, 0)),
            "logic [41:0]"
        );
        assert_eq!(
            format!("{}", vector(Domain::FourValued, Sign::Signed, 41, 0)),
            "logic signed [41:0]"
        );
    }

    #[test]
    fn categories() {
        let v = vector(Domain::FourValued, Sign::Unsigned, 7, 0);
        assert!(v.is_integral());
        assert!(v.is_four_state());
        assert!(!v.is_scalar());
        assert!(v.has_fixed_range());
        assert_eq!(v.get_fixed_range(), ConstantRange::new(7, 0));
        assert_eq!(v.bit_width(), 8);
        assert!(LOGIC_TYPE.is_scalar());
        assert!(!INT_TYPE.is_four_state());
        assert!(!STRING_TYPE.is_integral());
        assert!(!STRING_TYPE.has_fixed_range());
        assert_eq!(INT_TYPE.get_fixed_range(), ConstantRange::new(31, 0));
    }

    #[test]
    fn array_queries() {
        let arr = TypeKind::UnpackedArray {
            elem: &INT_TYPE,
            range: ConstantRange::new(0, 3),
        };
        assert!(arr.is_array());
        assert!(arr.is_unpacked_array());
        assert!(arr.has_fixed_range());
        assert!(!arr.is_integral());
        assert_eq!(format!("{}", arr), "int$[0:3]");

        let packed = TypeKind::PackedArray {
            elem: &BYTE_TYPE,
            range: ConstantRange::new(3, 0),
        };
        assert_eq!(packed.bit_width(), 32);
        assert!(packed.is_integral());
        assert_eq!(format!("{}", packed), "byte [3:0]");

        let queue = TypeKind::Queue {
            elem: &STRING_TYPE,
            max_bound: 0,
        };
        assert!(queue.is_queue());
        assert!(!queue.has_fixed_range());
        assert_eq!(format!("{}", queue), "string$[$]");
    }

    #[test]
    fn default_values() {
        assert_eq!(
            INT_TYPE.default_value(),
            ConstantValue::Integer(SvInt::zero(32, true))
        );
        assert_eq!(
            LOGIC_TYPE.default_value(),
            ConstantValue::Integer(SvInt::all_x(1, false))
        );
        let arr = TypeKind::UnpackedArray {
            elem: &BIT_TYPE,
            range: ConstantRange::new(2, 0),
        };
        assert_eq!(arr.default_value().size(), 3);
        assert_eq!(STRING_TYPE.default_value(), ConstantValue::Str(Vec::new()));
    }

    #[test]
    fn equivalence() {
        let bits32 = vector(Domain::TwoValued, Sign::Signed, 31, 0);
        assert!(INT_TYPE.is_equivalent(&bits32));
        assert!(!INTEGER_TYPE.is_equivalent(&bits32));
        assert!(!INT_TYPE.is_equivalent(&BYTE_TYPE));
        assert!(STRING_TYPE.is_equivalent(&STRING_TYPE));
        assert!(!ERROR_TYPE.is_equivalent(&ERROR_TYPE));
        let named = TypeKind::Named("word_t", &INT_TYPE);
        assert!(named.is_equivalent(&INT_TYPE));
        assert_eq!(format!("{}", named), "word_t");
    }
}
