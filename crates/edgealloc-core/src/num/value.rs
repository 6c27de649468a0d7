// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Task Value Numerics
//!
//! `TaskValue` collects the numeric capabilities the allocation engine needs
//! from a task's value: zero, addition and subtraction for bounds, a partial
//! order for incumbents, and a conversion to `f64` for admissibility checks
//! and reporting. Sums of values are checked against the type's maximum, so
//! an instance whose total value is not representable is rejected up front
//! instead of overflowing inside the search.
//!
//! Integer types give exact bound arithmetic. Floating point values are
//! supported as well; the engine only ever adds values (upper bounds are built
//! from suffix sums, never by subtraction), so rounding can only affect which
//! of two near-equal incumbents wins.

use num_traits::{Bounded, Num, ToPrimitive};
use std::cmp::Ordering;

/// A trait alias for numeric types usable as a task value.
/// Blanket-implemented for every type with the required bounds, which
/// includes all primitive integers and `f32`/`f64`.
pub trait TaskValue:
    Num + Bounded + Copy + PartialOrd + ToPrimitive + std::fmt::Debug + std::fmt::Display + Send + Sync
{
    /// Returns `true` if the value is finite and non-negative.
    ///
    /// ```rust
    /// # use edgealloc_core::num::value::TaskValue;
    /// assert!(5i64.is_admissible());
    /// assert!(0.0f64.is_admissible());
    /// assert!(!(-1i64).is_admissible());
    /// assert!(!f64::NAN.is_admissible());
    /// assert!(!f64::INFINITY.is_admissible());
    /// ```
    #[inline]
    fn is_admissible(&self) -> bool {
        match self.to_f64() {
            Some(v) => v.is_finite() && v >= 0.0,
            None => false,
        }
    }

    /// Total comparison for admissible values.
    ///
    /// Incomparable values (only possible for NaN, which admissibility rules
    /// out) compare as `Equal`.
    #[inline]
    fn total_cmp_value(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }

    /// Sums an iterator of values starting from zero.
    #[inline]
    fn sum_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        values.into_iter().fold(Self::zero(), |acc, v| acc + v)
    }

    /// Adds two admissible values, returning `None` if the sum exceeds the
    /// largest representable value.
    ///
    /// ```rust
    /// # use edgealloc_core::num::value::TaskValue;
    /// assert_eq!(200u8.checked_add_value(55), Some(255));
    /// assert_eq!(200u8.checked_add_value(100), None);
    /// assert_eq!(f64::MAX.checked_add_value(f64::MAX), None);
    /// ```
    #[inline]
    fn checked_add_value(self, other: Self) -> Option<Self> {
        if self > Self::max_value() - other {
            return None;
        }
        let sum = self + other;
        sum.is_admissible().then_some(sum)
    }

    /// Sums admissible values, returning `None` on overflow.
    #[inline]
    fn checked_sum_values<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = Self>,
    {
        values
            .into_iter()
            .try_fold(Self::zero(), |acc, v| acc.checked_add_value(v))
    }
}

impl<T> TaskValue for T where
    T: Num + Bounded + Copy + PartialOrd + ToPrimitive + std::fmt::Debug + std::fmt::Display + Send + Sync
{
}

#[cfg(test)]
mod tests {
    use super::TaskValue;
    use std::cmp::Ordering;

    #[test]
    fn test_integer_admissibility() {
        assert!(0u32.is_admissible());
        assert!(17i64.is_admissible());
        assert!(!(-3i32).is_admissible());
    }

    #[test]
    fn test_float_admissibility() {
        assert!(2.5f64.is_admissible());
        assert!(!(-0.5f64).is_admissible());
        assert!(!f64::NAN.is_admissible());
        assert!(!f64::NEG_INFINITY.is_admissible());
        assert!(!f32::INFINITY.is_admissible());
    }

    #[test]
    fn test_total_cmp_value() {
        assert_eq!(3i64.total_cmp_value(&5), Ordering::Less);
        assert_eq!(5.0f64.total_cmp_value(&5.0), Ordering::Equal);
        assert_eq!(f64::NAN.total_cmp_value(&1.0), Ordering::Equal);
    }

    #[test]
    fn test_sum_values() {
        assert_eq!(i64::sum_values([1, 2, 3]), 6);
        assert_eq!(u32::sum_values(std::iter::empty()), 0);
        assert_eq!(f64::sum_values([0.5, 0.25]), 0.75);
    }

    #[test]
    fn test_checked_sum_values_detects_overflow() {
        assert_eq!(u8::checked_sum_values([100, 100, 55]), Some(255));
        assert_eq!(u8::checked_sum_values([200, 100]), None);
        assert_eq!(i32::checked_sum_values([i32::MAX, 0]), Some(i32::MAX));
        assert_eq!(i32::checked_sum_values([i32::MAX, 1]), None);
        assert_eq!(f64::checked_sum_values([f64::MAX, f64::MAX]), None);
        assert_eq!(u64::checked_sum_values(std::iter::empty()), Some(0));
    }
}
