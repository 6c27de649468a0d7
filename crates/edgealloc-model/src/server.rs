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

//! # Servers
//!
//! A server offers a fixed storage, computation and bandwidth capacity that
//! is shared by every task allocated to it. Storage is consumed by each
//! task's `storage` demand, computation by its compute speed and bandwidth by
//! the sum of its loading and sending speeds.

use crate::{error::ModelError, error::SpeedViolation, speed::SpeedTriple, task::Task};
use edgealloc_core::num::value::TaskValue;
use serde::{Deserialize, Serialize};

/// An immutable, validated server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "ServerRecord")]
pub struct Server {
    name: String,
    storage_capacity: u32,
    computation_capacity: u32,
    bandwidth_capacity: u32,
}

#[derive(Deserialize)]
struct ServerRecord {
    name: String,
    storage_capacity: u32,
    computation_capacity: u32,
    bandwidth_capacity: u32,
}

impl TryFrom<ServerRecord> for Server {
    type Error = ModelError;

    fn try_from(r: ServerRecord) -> Result<Self, Self::Error> {
        Server::new(
            r.name,
            r.storage_capacity,
            r.computation_capacity,
            r.bandwidth_capacity,
        )
    }
}

impl Server {
    /// Creates a new server.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::InvalidServer` if any capacity is zero.
    pub fn new(
        name: impl Into<String>,
        storage_capacity: u32,
        computation_capacity: u32,
        bandwidth_capacity: u32,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        let reason = if storage_capacity == 0 {
            Some("storage capacity must be positive")
        } else if computation_capacity == 0 {
            Some("computation capacity must be positive")
        } else if bandwidth_capacity == 0 {
            Some("bandwidth capacity must be positive")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(ModelError::InvalidServer { name, reason });
        }

        Ok(Self {
            name,
            storage_capacity,
            computation_capacity,
            bandwidth_capacity,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn storage_capacity(&self) -> u32 {
        self.storage_capacity
    }

    #[inline]
    pub fn computation_capacity(&self) -> u32 {
        self.computation_capacity
    }

    #[inline]
    pub fn bandwidth_capacity(&self) -> u32 {
        self.bandwidth_capacity
    }

    /// Returns `true` if `task` could run on this server if it had the whole
    /// (empty) server to itself.
    ///
    /// The task's storage must fit, and some split of the full bandwidth into
    /// loading and sending speed, together with the full computation
    /// capacity, must meet the deadline. Since the deadline only gets easier
    /// with higher speeds this is a necessary condition for the task to be
    /// allocated here in any allocation. Runs in `O(log bandwidth_capacity)`.
    #[inline]
    pub fn could_host<V>(&self, task: &Task<V>) -> bool
    where
        V: TaskValue,
    {
        task.storage() <= self.storage_capacity
            && task
                .min_bandwidth_split(self.computation_capacity, self.bandwidth_capacity)
                .is_some()
    }

    /// Checks that `tasks` running at `speeds` (position-wise) fit this
    /// server: every triple is positive and meets its task's deadline, and
    /// the summed storage, compute speed and bandwidth stay within capacity.
    ///
    /// # Errors
    ///
    /// Returns the first `SpeedViolation` found.
    pub fn check_load<V>(&self, tasks: &[&Task<V>], speeds: &[SpeedTriple]) -> Result<(), SpeedViolation>
    where
        V: TaskValue,
    {
        if tasks.len() != speeds.len() {
            return Err(SpeedViolation::CountMismatch {
                tasks: tasks.len(),
                speeds: speeds.len(),
            });
        }

        let mut storage = 0u64;
        let mut computation = 0u64;
        let mut bandwidth = 0u64;
        for (position, (task, speed)) in tasks.iter().zip(speeds).enumerate() {
            if !speed.is_positive() {
                return Err(SpeedViolation::ZeroSpeed { task: position });
            }
            if !task.meets_deadline(*speed) {
                return Err(SpeedViolation::Deadline { task: position });
            }
            storage += task.storage() as u64;
            computation += speed.compute() as u64;
            bandwidth += speed.bandwidth();
        }

        if storage > self.storage_capacity as u64 {
            return Err(SpeedViolation::Storage {
                used: storage,
                capacity: self.storage_capacity,
            });
        }
        if computation > self.computation_capacity as u64 {
            return Err(SpeedViolation::Computation {
                used: computation,
                capacity: self.computation_capacity,
            });
        }
        if bandwidth > self.bandwidth_capacity as u64 {
            return Err(SpeedViolation::Bandwidth {
                used: bandwidth,
                capacity: self.bandwidth_capacity,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Server({}, storage: {}, computation: {}, bandwidth: {})",
            self.name, self.storage_capacity, self.computation_capacity, self.bandwidth_capacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(storage: u32, computation: u32, results: u32, deadline: u32) -> Task<i64> {
        Task::new("t", storage, computation, results, deadline, 1).unwrap()
    }

    #[test]
    fn test_rejects_zero_capacities() {
        assert!(Server::new("s", 0, 1, 1).is_err());
        assert!(Server::new("s", 1, 0, 1).is_err());
        assert!(Server::new("s", 1, 1, 0).is_err());
        assert!(Server::new("s", 1, 1, 1).is_ok());
    }

    #[test]
    fn test_could_host() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        assert!(server.could_host(&task(10, 1, 1, 100)));
        // Storage does not fit.
        assert!(!server.could_host(&task(11, 1, 1, 100)));
        // Fastest possible: 10/5 + 10/10 + 10/5 = 5 > 4.
        assert!(!server.could_host(&task(10, 10, 10, 4)));
        assert!(server.could_host(&task(10, 10, 10, 5)));
    }

    #[test]
    fn test_could_host_needs_two_bandwidth_units() {
        let narrow = Server::new("narrow", 10, 10, 1).unwrap();
        assert!(!narrow.could_host(&task(1, 1, 1, 1000)));
    }

    #[test]
    fn test_could_host_is_fast_on_huge_capacities() {
        let wide = Server::new("wide", u32::MAX, u32::MAX, 4_000_000_000).unwrap();
        let start = std::time::Instant::now();
        assert!(!wide.could_host(&task(4_000_000_000, 4_000_000_000, 4_000_000_000, 3)));
        assert!(!wide.could_host(&task(1, u32::MAX, 1, 1)));
        assert!(wide.could_host(&task(1_000_000, 1_000_000_000, 1_000_000, 2)));
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }

    #[test]
    fn test_check_load_accepts_fitting_set() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let a = task(5, 1, 1, 100);
        let b = task(5, 1, 1, 100);
        let speeds = [SpeedTriple::new(1, 5, 1), SpeedTriple::new(4, 5, 4)];
        assert_eq!(server.check_load(&[&a, &b], &speeds), Ok(()));
    }

    #[test]
    fn test_check_load_reports_violations() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let a = task(6, 1, 1, 100);
        let b = task(6, 1, 1, 100);
        let ok = SpeedTriple::new(1, 1, 1);

        assert_eq!(
            server.check_load(&[&a], &[]),
            Err(SpeedViolation::CountMismatch { tasks: 1, speeds: 0 })
        );
        assert_eq!(
            server.check_load(&[&a, &b], &[ok, ok]),
            Err(SpeedViolation::Storage {
                used: 12,
                capacity: 10
            })
        );

        let small = task(1, 1, 1, 100);
        assert_eq!(
            server.check_load(&[&small, &small], &[SpeedTriple::new(1, 6, 1); 2]),
            Err(SpeedViolation::Computation {
                used: 12,
                capacity: 10
            })
        );
        assert_eq!(
            server.check_load(&[&small, &small], &[SpeedTriple::new(3, 1, 3); 2]),
            Err(SpeedViolation::Bandwidth {
                used: 12,
                capacity: 10
            })
        );

        let tight = task(10, 10, 10, 3);
        assert_eq!(
            server.check_load(&[&tight], &[ok]),
            Err(SpeedViolation::Deadline { task: 0 })
        );
    }
}
