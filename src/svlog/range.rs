// Copyright (c) 2016-2021 Fabian Schuiki

//! Constant ranges and the index algebra on top of them.
//!
//! A [`ConstantRange`] is the `[left:right]` part of a declaration such as
//! `logic [7:0] x` or `int y [0:3]`. The direction of the range is not stored
//! but derived from its bounds: `left >= right` is a big-endian (descending)
//! range, `left < right` a little-endian (ascending) one. All functions in this
//! module are pure.

use std::fmt::{self, Display, Formatter};

/// The `[left:right]` bounds of a vector or array dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, serde::Serialize)]
pub struct ConstantRange {
    /// The left bound.
    pub left: i32,
    /// The right bound.
    pub right: i32,
}

/// Which side is greater in a range `[a:b]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RangeDir {
    /// `a < b`
    Up,
    /// `a >= b`
    Down,
}

impl ConstantRange {
    /// Create a new range from its left and right bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use sable_svlog::range::ConstantRange;
    ///
    /// let r = ConstantRange::new(7, 0);
    /// assert_eq!(r.width(), 8);
    /// assert_eq!(format!("{}", r), "[7:0]");
    /// ```
    pub fn new(left: i32, right: i32) -> ConstantRange {
        ConstantRange { left, right }
    }

    /// Return the direction of the range.
    pub fn dir(&self) -> RangeDir {
        if self.left < self.right {
            RangeDir::Up
        } else {
            RangeDir::Down
        }
    }

    /// Check whether the range is ascending, e.g. `[0:7]`.
    pub fn is_little_endian(&self) -> bool {
        self.dir() == RangeDir::Up
    }

    /// The number of elements covered by the range, `|left - right| + 1`.
    pub fn width(&self) -> u32 {
        ((self.left as i64 - self.right as i64).abs() + 1) as u32
    }

    /// The smaller of the two bounds.
    pub fn lower(&self) -> i32 {
        std::cmp::min(self.left, self.right)
    }

    /// The larger of the two bounds.
    pub fn upper(&self) -> i32 {
        std::cmp::max(self.left, self.right)
    }

    /// Check whether an index lies within the range.
    pub fn contains_point(&self, index: i32) -> bool {
        index >= self.lower() && index <= self.upper()
    }

    /// Check whether two ranges share at least one index.
    pub fn overlaps(&self, other: &ConstantRange) -> bool {
        self.lower() <= other.upper() && other.lower() <= self.upper()
    }

    /// Swap the left and right bounds.
    pub fn reverse(&self) -> ConstantRange {
        ConstantRange {
            left: self.right,
            right: self.left,
        }
    }

    /// Translate a logical index into a zero-based physical offset.
    ///
    /// For a descending range the offset counts up from the lower bound, for
    /// an ascending range it counts down from the upper bound. In both cases
    /// offset 0 is the right-most position of the declaration.
    ///
    /// ```
    /// use sable_svlog::range::ConstantRange;
    ///
    /// assert_eq!(ConstantRange::new(7, 0).translate_index(3), 3);
    /// assert_eq!(ConstantRange::new(0, 7).translate_index(3), 4);
    /// assert_eq!(ConstantRange::new(10, 3).translate_index(3), 0);
    /// ```
    pub fn translate_index(&self, index: i32) -> i32 {
        if self.is_little_endian() {
            self.upper() - index
        } else {
            index - self.lower()
        }
    }

    /// Construct the range selected by an indexed part-select.
    ///
    /// `start` is the base index, `width` the number of elements. With
    /// `indexed_up` the range grows upward from `start` (`+:`), otherwise it
    /// grows downward (`-:`). The result is oriented in the same direction as
    /// the container, which is ascending if `little_endian` is set.
    ///
    /// ```
    /// use sable_svlog::range::ConstantRange;
    ///
    /// let up = ConstantRange::get_indexed_range(2, 3, false, true);
    /// assert_eq!(up, ConstantRange::new(4, 2));
    /// let down = ConstantRange::get_indexed_range(5, 3, true, false);
    /// assert_eq!(down, ConstantRange::new(3, 5));
    /// ```
    pub fn get_indexed_range(
        start: i32,
        width: i32,
        little_endian: bool,
        indexed_up: bool,
    ) -> ConstantRange {
        let count = width - 1;
        let result = if indexed_up {
            ConstantRange::new(start.saturating_add(count), start)
        } else {
            ConstantRange::new(start, start.saturating_sub(count))
        };
        if little_endian {
            result.reverse()
        } else {
            result
        }
    }
}

impl Display for ConstantRange {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "[{}:{}]", self.left, self.right)
    }
}
