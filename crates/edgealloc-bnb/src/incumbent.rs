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

//! # Incumbent Management
//!
//! The incumbent is the best feasible allocation found so far; its value is
//! the lower bound every search node has to beat. `IncumbentStore<V>`
//! abstracts over where it lives:
//!
//! - `LocalIncumbent<V>`: plain owned state for the sequential engine.
//! - `&SharedIncumbent<V>`: a compare-and-improve cell behind a `Mutex`,
//!   shared by the workers of the parallel engine. An allocation is installed
//!   only if its value is strictly greater than the current one, so races
//!   between equal values are benign.
//!
//! Both start from the empty allocation with value zero, which is always
//! feasible.

use edgealloc_core::num::value::TaskValue;
use edgealloc_model::allocation::Allocation;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Read and improve the best known allocation.
pub trait IncumbentStore<V>
where
    V: TaskValue,
{
    /// Returns the value of the best known allocation.
    fn best_value(&self) -> V;

    /// Installs `allocation` if `value` is strictly greater than the best
    /// known value. Returns `true` if it was installed.
    fn try_install(&mut self, value: V, allocation: Allocation) -> bool;

    /// Returns `true` if `value` would be installed right now.
    #[inline]
    fn improves(&self, value: V) -> bool {
        value > self.best_value()
    }
}

/// The incumbent of a single-threaded search.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalIncumbent<V> {
    value: V,
    allocation: Allocation,
}

impl<V> LocalIncumbent<V>
where
    V: TaskValue,
{
    /// The empty allocation over `num_tasks` tasks, with value zero.
    #[inline]
    pub fn empty(num_tasks: usize) -> Self {
        Self {
            value: V::zero(),
            allocation: Allocation::unassigned(num_tasks),
        }
    }

    #[inline]
    pub fn value(&self) -> V {
        self.value
    }

    #[inline]
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    #[inline]
    pub fn into_parts(self) -> (V, Allocation) {
        (self.value, self.allocation)
    }
}

impl<V> IncumbentStore<V> for LocalIncumbent<V>
where
    V: TaskValue,
{
    #[inline]
    fn best_value(&self) -> V {
        self.value
    }

    #[inline]
    fn try_install(&mut self, value: V, allocation: Allocation) -> bool {
        if value > self.value {
            self.value = value;
            self.allocation = allocation;
            return true;
        }
        false
    }
}

/// A thread-safe compare-and-improve incumbent.
#[derive(Debug)]
pub struct SharedIncumbent<V> {
    inner: Mutex<LocalIncumbent<V>>,
}

impl<V> SharedIncumbent<V>
where
    V: TaskValue,
{
    #[inline]
    pub fn empty(num_tasks: usize) -> Self {
        Self {
            inner: Mutex::new(LocalIncumbent::empty(num_tasks)),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, LocalIncumbent<V>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    pub fn value(&self) -> V {
        self.lock().value
    }

    /// Returns a copy of the current incumbent.
    #[inline]
    pub fn snapshot(&self) -> LocalIncumbent<V> {
        self.lock().clone()
    }

    #[inline]
    pub fn into_inner(self) -> LocalIncumbent<V> {
        self.inner.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<V> IncumbentStore<V> for &SharedIncumbent<V>
where
    V: TaskValue,
{
    #[inline]
    fn best_value(&self) -> V {
        self.value()
    }

    #[inline]
    fn try_install(&mut self, value: V, allocation: Allocation) -> bool {
        self.lock().try_install(value, allocation)
    }
}

impl<V> std::fmt::Display for SharedIncumbent<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SharedIncumbent(value: {})", self.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgealloc_model::{
        allocation::Assignment,
        index::{ServerIndex, TaskIndex},
        speed::SpeedTriple,
    };

    fn allocation_with(task: usize) -> Allocation {
        Allocation::from_assignments(
            3,
            [(
                TaskIndex::new(task),
                Assignment::new(ServerIndex::new(0), SpeedTriple::new(1, 1, 1)),
            )],
        )
    }

    #[test]
    fn test_local_installs_only_strict_improvements() {
        let mut inc = LocalIncumbent::<i64>::empty(3);
        assert_eq!(inc.best_value(), 0);
        assert!(!inc.try_install(0, allocation_with(0)));
        assert!(inc.allocation().is_empty());
        assert!(inc.try_install(5, allocation_with(1)));
        assert!(!inc.try_install(5, allocation_with(2)));
        assert!(inc.allocation().is_assigned(TaskIndex::new(1)));
        assert!(inc.improves(6));
        assert!(!inc.improves(5));
    }

    #[test]
    fn test_shared_keeps_maximum_under_contention() {
        let shared = SharedIncumbent::<u64>::empty(3);
        std::thread::scope(|scope| {
            for t in 0..4u64 {
                let shared = &shared;
                scope.spawn(move || {
                    let mut handle = shared;
                    for v in 0..100u64 {
                        handle.try_install(v * 4 + t, allocation_with((t % 3) as usize));
                    }
                });
            }
        });
        assert_eq!(shared.value(), 399);
        let (value, allocation) = shared.into_inner().into_parts();
        assert_eq!(value, 399);
        assert!(allocation.is_assigned(TaskIndex::new(0)));
    }
}
