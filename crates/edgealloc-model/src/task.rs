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

//! # Tasks
//!
//! A task is a unit of offloaded work. It needs `storage` units of data
//! loaded onto a server, `computation` units of work performed and
//! `results_data` units of results sent back, all within `deadline` time
//! units. Running at speeds `(l, c, s)` it takes
//!
//! ```text
//! storage / l + computation / c + results_data / s  <=  deadline
//! ```
//!
//! which, with denominators cleared, is the exact integer inequality
//!
//! ```text
//! storage·c·s + l·computation·s + l·c·results_data  <=  deadline·l·c·s
//! ```
//!
//! Every term is a product of at most four `u32` factors, so both sides fit a
//! `u128` without overflow.

use crate::{error::ModelError, speed::SpeedTriple};
use edgealloc_core::num::value::TaskValue;
use serde::{Deserialize, Serialize};

/// An immutable, validated task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord<V>")]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "V: TaskValue + Deserialize<'de>"
))]
pub struct Task<V> {
    name: String,
    storage: u32,
    computation: u32,
    results_data: u32,
    deadline: u32,
    value: V,
}

#[derive(Deserialize)]
struct TaskRecord<V> {
    name: String,
    storage: u32,
    computation: u32,
    results_data: u32,
    deadline: u32,
    value: V,
}

impl<V> TryFrom<TaskRecord<V>> for Task<V>
where
    V: TaskValue,
{
    type Error = ModelError;

    fn try_from(r: TaskRecord<V>) -> Result<Self, Self::Error> {
        Task::new(
            r.name,
            r.storage,
            r.computation,
            r.results_data,
            r.deadline,
            r.value,
        )
    }
}

impl<V> Task<V>
where
    V: TaskValue,
{
    /// Creates a new task.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidTask` if any demand or the deadline is
    /// zero, or if the value is negative or not finite.
    pub fn new(
        name: impl Into<String>,
        storage: u32,
        computation: u32,
        results_data: u32,
        deadline: u32,
        value: V,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let reject = |reason: &'static str| ModelError::InvalidTask {
            name: name.clone(),
            reason,
        };

        if storage == 0 {
            return Err(reject("required storage must be positive"));
        }
        if computation == 0 {
            return Err(reject("required computation must be positive"));
        }
        if results_data == 0 {
            return Err(reject("required results data must be positive"));
        }
        if deadline == 0 {
            return Err(reject("deadline must be positive"));
        }
        if !value.is_admissible() {
            return Err(reject("value must be finite and non-negative"));
        }

        Ok(Self {
            name,
            storage,
            computation,
            results_data,
            deadline,
            value,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn storage(&self) -> u32 {
        self.storage
    }

    #[inline]
    pub fn computation(&self) -> u32 {
        self.computation
    }

    #[inline]
    pub fn results_data(&self) -> u32 {
        self.results_data
    }

    #[inline]
    pub fn deadline(&self) -> u32 {
        self.deadline
    }

    #[inline]
    pub fn value(&self) -> V {
        self.value
    }

    /// Returns `true` if running at `speeds` finishes within the deadline.
    ///
    /// Evaluated exactly in the cleared-denominator form. A triple with a
    /// zero component never meets the deadline.
    ///
    /// ```rust
    /// # use edgealloc_model::{task::Task, speed::SpeedTriple};
    /// let t = Task::new("t", 10, 1, 1, 100, 5i64).unwrap();
    /// assert!(t.meets_deadline(SpeedTriple::new(1, 1, 1)));
    ///
    /// let tight = Task::new("tight", 10, 10, 10, 2, 1i64).unwrap();
    /// assert!(!tight.meets_deadline(SpeedTriple::new(10, 10, 10)));
    /// assert!(tight.meets_deadline(SpeedTriple::new(20, 20, 20)));
    /// ```
    #[inline]
    pub fn meets_deadline(&self, speeds: SpeedTriple) -> bool {
        if !speeds.is_positive() {
            return false;
        }
        let l = speeds.loading() as u128;
        let c = speeds.compute() as u128;
        let s = speeds.sending() as u128;

        let lhs = self.storage as u128 * c * s
            + l * self.computation as u128 * s
            + l * c * self.results_data as u128;
        let rhs = self.deadline as u128 * l * c * s;
        lhs <= rhs
    }

    /// Returns the cheapest `(loading, sending)` split that meets the
    /// deadline at compute speed `compute` with `loading + sending <= limit`,
    /// or `None` if there is none.
    ///
    /// For a fixed total bandwidth `b` the transfer time
    /// `storage / l + results_data / (b - l)` is convex in `l`, so only the
    /// integers around its real minimiser need an exact check, and whether
    /// some split of `b` works is monotone in `b`. A binary search over `b`
    /// thus finds the cheapest split in `O(log limit)` exact checks.
    ///
    /// ```rust
    /// # use edgealloc_model::task::Task;
    /// // 4/l + 4/s <= 4 - 4/2 needs l = s = 4.
    /// let t = Task::new("t", 4, 4, 4, 4, 1i64).unwrap();
    /// assert_eq!(t.min_bandwidth_split(2, 100), Some((4, 4)));
    /// assert_eq!(t.min_bandwidth_split(2, 7), None);
    /// assert_eq!(t.min_bandwidth_split(1, 100), None);
    /// ```
    pub fn min_bandwidth_split(&self, compute: u32, limit: u32) -> Option<(u32, u32)> {
        if compute == 0 || limit < 2 {
            return None;
        }
        let c = compute as u128;
        let deadline_c = self.deadline as u128 * c;
        let computation = self.computation as u128;
        if deadline_c <= computation {
            return None;
        }
        let slack = deadline_c - computation;

        let mut best = self.split_of_bandwidth(limit, c, slack)?;
        let (mut lo, mut hi) = (2u32, limit);
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            match self.split_of_bandwidth(mid, c, slack) {
                Some(split) => {
                    best = split;
                    hi = mid;
                }
                None => lo = mid + 1,
            }
        }
        Some(best)
    }

    /// Finds `l` with `storage·c / l + results_data·c / (b - l) <= slack`,
    /// checking the integers next to the real minimiser
    /// `b·√storage / (√storage + √results_data)` of the convex left side.
    fn split_of_bandwidth(&self, bandwidth: u32, c: u128, slack: u128) -> Option<(u32, u32)> {
        let a = self.storage as u128 * c;
        let r = self.results_data as u128 * c;
        let (root_a, root_r) = ((self.storage as f64).sqrt(), (self.results_data as f64).sqrt());
        let centre = (bandwidth as f64 * root_a / (root_a + root_r)) as u32;
        let first = centre.saturating_sub(2).max(1);
        let last = centre.saturating_add(2).min(bandwidth - 1);
        (first..=last).find_map(|l| {
            let s = bandwidth - l;
            let (lw, sw) = (l as u128, s as u128);
            // a/l + r/s <= slack, cleared. slack·l·s < 2^64 · 2^62.
            (a * sw + r * lw <= slack * lw * sw).then_some((l, s))
        })
    }
}

impl<V> std::fmt::Display for Task<V>
where
    V: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Task({}, storage: {}, computation: {}, results: {}, deadline: {}, value: {})",
            self.name, self.storage, self.computation, self.results_data, self.deadline, self.value
        )
    }
}
