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

//! # Fixed Speed Oracle
//!
//! In the fixed-speed variant of the allocation problem every task comes with
//! preset speeds chosen ahead of time, so a server cannot trade speed between
//! tasks. Feasibility then reduces to a pure capacity and deadline check of
//! the preset triples.
//!
//! Speeds are registered by task name. A task without registered speeds can
//! never be hosted.

use crate::{
    oracle::{FeasibilityOracle, FeasibilityVerdict, OracleBudget},
    validate::validate_speeds,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{server::Server, speed::SpeedTriple, task::Task};
use rustc_hash::FxHashMap;

/// A feasibility oracle for tasks with preset speed triples.
#[derive(Clone, Debug, Default)]
pub struct FixedSpeedOracle {
    speeds: FxHashMap<String, SpeedTriple>,
}

impl FixedSpeedOracle {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the preset speeds of the task called `task_name`, returning
    /// the previously registered speeds, if any.
    #[inline]
    pub fn insert(&mut self, task_name: impl Into<String>, speeds: SpeedTriple) -> Option<SpeedTriple> {
        self.speeds.insert(task_name.into(), speeds)
    }

    /// Builder-style variant of `insert`.
    #[inline]
    pub fn with_speeds(mut self, task_name: impl Into<String>, speeds: SpeedTriple) -> Self {
        self.insert(task_name, speeds);
        self
    }

    /// Returns the preset speeds of `task_name`.
    #[inline]
    pub fn speeds_of(&self, task_name: &str) -> Option<SpeedTriple> {
        self.speeds.get(task_name).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.speeds.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.speeds.is_empty()
    }
}

impl<V> FeasibilityOracle<V> for FixedSpeedOracle
where
    V: TaskValue,
{
    #[inline]
    fn name(&self) -> &str {
        "FixedSpeedOracle"
    }

    fn solve_feasibility(&mut self, server: &Server, tasks: &[&Task<V>], _budget: OracleBudget) -> FeasibilityVerdict {
        let mut speeds = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.speeds_of(task.name()) {
                Some(triple) => speeds.push(triple),
                None => return FeasibilityVerdict::Infeasible,
            }
        }
        match validate_speeds(server, tasks, &speeds) {
            Ok(()) => FeasibilityVerdict::Feasible(speeds),
            Err(_) => FeasibilityVerdict::Infeasible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solve(oracle: &mut FixedSpeedOracle, server: &Server, tasks: &[&Task<u32>]) -> FeasibilityVerdict {
        oracle.solve_feasibility(server, tasks, OracleBudget::unlimited())
    }

    #[test]
    fn test_preset_speeds_are_returned() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let a = Task::new("a", 4, 2, 2, 10, 3u32).unwrap();
        let b = Task::new("b", 4, 2, 2, 10, 3u32).unwrap();
        let mut oracle = FixedSpeedOracle::new()
            .with_speeds("a", SpeedTriple::new(2, 2, 2))
            .with_speeds("b", SpeedTriple::new(3, 3, 3));
        assert_eq!(oracle.len(), 2);
        assert_eq!(
            solve(&mut oracle, &server, &[&a, &b]),
            FeasibilityVerdict::Feasible(vec![SpeedTriple::new(2, 2, 2), SpeedTriple::new(3, 3, 3)])
        );
    }

    #[test]
    fn test_capacity_and_missing_speeds() {
        let server = Server::new("s", 10, 4, 10).unwrap();
        let a = Task::new("a", 1, 1, 1, 10, 1u32).unwrap();
        let b = Task::new("b", 1, 1, 1, 10, 1u32).unwrap();
        let unknown = Task::new("unknown", 1, 1, 1, 10, 1u32).unwrap();
        let mut oracle = FixedSpeedOracle::new()
            .with_speeds("a", SpeedTriple::new(1, 3, 1))
            .with_speeds("b", SpeedTriple::new(1, 3, 1));

        assert!(solve(&mut oracle, &server, &[&a]).is_feasible());
        // 3 + 3 compute exceeds 4.
        assert!(solve(&mut oracle, &server, &[&a, &b]).is_infeasible());
        assert!(solve(&mut oracle, &server, &[&unknown]).is_infeasible());
        assert!(solve(&mut oracle, &server, &[]).is_feasible());
    }

    #[test]
    fn test_preset_speeds_must_meet_deadline() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let slow = Task::new("slow", 9, 1, 1, 3, 1u32).unwrap();
        let mut oracle = FixedSpeedOracle::new().with_speeds("slow", SpeedTriple::new(1, 1, 1));
        assert!(solve(&mut oracle, &server, &[&slow]).is_infeasible());
        assert_eq!(oracle.insert("slow", SpeedTriple::new(9, 1, 1)), Some(SpeedTriple::new(1, 1, 1)));
        assert!(solve(&mut oracle, &server, &[&slow]).is_feasible());
    }
}
