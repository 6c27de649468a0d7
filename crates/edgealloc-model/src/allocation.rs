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

//! # Allocations
//!
//! An `Allocation` maps every task of an instance to either nothing
//! (unassigned) or to a server plus the speed triple it runs at. The value of
//! an allocation, its *social welfare*, is the summed value of all assigned
//! tasks.
//!
//! `Allocation::verify` is the exact, independent check of every allocation
//! invariant: each assigned task meets its deadline, and for each server the
//! summed storage, compute speed and bandwidth of its tasks stay within
//! capacity. Since every task has exactly one entry, no task can be assigned
//! to two servers.

use crate::{
    error::AllocationViolation,
    index::{ServerIndex, TaskIndex},
    server::Server,
    speed::SpeedTriple,
    task::Task,
};
use edgealloc_core::num::value::TaskValue;

/// A task's placement: the server it runs on and the speeds it runs at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Assignment {
    server: ServerIndex,
    speeds: SpeedTriple,
}

impl Assignment {
    #[inline]
    pub const fn new(server: ServerIndex, speeds: SpeedTriple) -> Self {
        Self { server, speeds }
    }

    #[inline]
    pub const fn server(&self) -> ServerIndex {
        self.server
    }

    #[inline]
    pub const fn speeds(&self) -> SpeedTriple {
        self.speeds
    }
}

impl std::fmt::Display for Assignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {}", self.server, self.speeds)
    }
}

/// Utilisation of one server under an allocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ServerUsage<V> {
    pub num_tasks: usize,
    pub storage_ratio: f64,
    pub computation_ratio: f64,
    pub bandwidth_ratio: f64,
    pub value: V,
}

impl<V> std::fmt::Display for ServerUsage<V>
where
    V: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "ServerUsage(tasks: {}, storage: {:.1}%, computation: {:.1}%, bandwidth: {:.1}%, value: {})",
            self.num_tasks,
            self.storage_ratio * 100.0,
            self.computation_ratio * 100.0,
            self.bandwidth_ratio * 100.0,
            self.value
        )
    }
}

/// A mapping from every task to `Unassigned` (`None`) or an `Assignment`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Allocation {
    entries: Vec<Option<Assignment>>,
}

impl Allocation {
    /// Creates an allocation for `num_tasks` tasks with every task unassigned.
    #[inline]
    pub fn unassigned(num_tasks: usize) -> Self {
        Self {
            entries: vec![None; num_tasks],
        }
    }

    /// Creates an allocation for `num_tasks` tasks from explicit assignments.
    /// Later assignments of the same task overwrite earlier ones.
    ///
    /// # Panics
    ///
    /// Panics if a task index is out of bounds.
    pub fn from_assignments<I>(num_tasks: usize, assignments: I) -> Self
    where
        I: IntoIterator<Item = (TaskIndex, Assignment)>,
    {
        let mut allocation = Self::unassigned(num_tasks);
        for (task, assignment) in assignments {
            allocation.assign(task, assignment);
        }
        allocation
    }

    /// Assigns `task`, replacing any previous assignment.
    ///
    /// # Panics
    ///
    /// Panics if `task` is out of bounds.
    #[inline]
    pub fn assign(&mut self, task: TaskIndex, assignment: Assignment) {
        let index = task.get();
        assert!(
            index < self.entries.len(),
            "called `Allocation::assign` with task index out of bounds: the len is {} but the index is {}",
            self.entries.len(),
            index
        );
        self.entries[index] = Some(assignment);
    }

    /// Returns the number of tasks this allocation covers.
    #[inline]
    pub fn num_tasks(&self) -> usize {
        self.entries.len()
    }

    /// Returns the number of assigned tasks.
    #[inline]
    pub fn num_assigned(&self) -> usize {
        self.entries.iter().filter(|e| e.is_some()).count()
    }

    /// Returns `true` if no task is assigned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.iter().all(Option::is_none)
    }

    /// Returns the assignment of `task`, or `None` if it is unassigned or out
    /// of bounds.
    #[inline]
    pub fn assignment(&self, task: TaskIndex) -> Option<&Assignment> {
        self.entries.get(task.get()).and_then(Option::as_ref)
    }

    /// Returns `true` if `task` is assigned.
    #[inline]
    pub fn is_assigned(&self, task: TaskIndex) -> bool {
        self.assignment(task).is_some()
    }

    /// Iterates over all assigned tasks with their assignments.
    pub fn iter_assigned(&self) -> impl Iterator<Item = (TaskIndex, &Assignment)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.as_ref().map(|a| (TaskIndex::new(i), a)))
    }

    /// Iterates over the tasks assigned to `server`, in task order.
    pub fn assigned_tasks(&self, server: ServerIndex) -> impl Iterator<Item = TaskIndex> + '_ {
        self.iter_assigned()
            .filter(move |(_, a)| a.server == server)
            .map(|(t, _)| t)
    }

    /// Returns the summed value of all assigned tasks.
    ///
    /// # Panics
    ///
    /// Panics if the allocation covers more tasks than `tasks` holds.
    pub fn social_welfare<V>(&self, tasks: &[Task<V>]) -> V
    where
        V: TaskValue,
    {
        V::sum_values(self.iter_assigned().map(|(t, _)| tasks[t.get()].value()))
    }

    /// Exactly checks every allocation invariant against `tasks` and `servers`.
    ///
    /// # Errors
    ///
    /// Returns the first `AllocationViolation` found.
    pub fn verify<V>(&self, tasks: &[Task<V>], servers: &[Server]) -> Result<(), AllocationViolation>
    where
        V: TaskValue,
    {
        if self.entries.len() != tasks.len() {
            return Err(AllocationViolation::LengthMismatch {
                expected: tasks.len(),
                actual: self.entries.len(),
            });
        }

        let mut per_server: Vec<(Vec<&Task<V>>, Vec<SpeedTriple>)> =
            vec![(Vec::new(), Vec::new()); servers.len()];
        for (task, assignment) in self.iter_assigned() {
            let server = assignment.server;
            let Some(slot) = per_server.get_mut(server.get()) else {
                return Err(AllocationViolation::UnknownServer { task, server });
            };
            slot.0.push(&tasks[task.get()]);
            slot.1.push(assignment.speeds);
        }

        for (i, (server, (load, speeds))) in servers.iter().zip(&per_server).enumerate() {
            server
                .check_load(load, speeds)
                .map_err(|violation| AllocationViolation::Load {
                    server: ServerIndex::new(i),
                    violation,
                })?;
        }
        Ok(())
    }

    /// Returns the utilisation of `server` under this allocation.
    ///
    /// # Panics
    ///
    /// Panics if `server` is out of bounds of `servers`.
    pub fn server_usage<V>(&self, server: ServerIndex, tasks: &[Task<V>], servers: &[Server]) -> ServerUsage<V>
    where
        V: TaskValue,
    {
        let capacity = &servers[server.get()];
        let mut usage = ServerUsage {
            num_tasks: 0,
            storage_ratio: 0.0,
            computation_ratio: 0.0,
            bandwidth_ratio: 0.0,
            value: V::zero(),
        };
        let (mut storage, mut computation, mut bandwidth) = (0u64, 0u64, 0u64);
        for (task, assignment) in self.iter_assigned().filter(|(_, a)| a.server == server) {
            let task = &tasks[task.get()];
            usage.num_tasks += 1;
            usage.value = usage.value + task.value();
            storage += task.storage() as u64;
            computation += assignment.speeds.compute() as u64;
            bandwidth += assignment.speeds.bandwidth();
        }
        usage.storage_ratio = storage as f64 / capacity.storage_capacity() as f64;
        usage.computation_ratio = computation as f64 / capacity.computation_capacity() as f64;
        usage.bandwidth_ratio = bandwidth as f64 / capacity.bandwidth_capacity() as f64;
        usage
    }
}

impl std::fmt::Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Allocation ({} of {} tasks assigned)",
            self.num_assigned(),
            self.num_tasks()
        )?;
        for (i, entry) in self.entries.iter().enumerate() {
            match entry {
                Some(a) => writeln!(f, "  {} -> {}", TaskIndex::new(i), a)?,
                None => writeln!(f, "  {} -> unassigned", TaskIndex::new(i))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpeedViolation;

    fn ti(i: usize) -> TaskIndex {
        TaskIndex::new(i)
    }

    fn si(i: usize) -> ServerIndex {
        ServerIndex::new(i)
    }

    fn fixture() -> (Vec<Task<i64>>, Vec<Server>) {
        let tasks = vec![
            Task::new("t0", 10, 1, 1, 100, 5).unwrap(),
            Task::new("t1", 10, 1, 1, 100, 8).unwrap(),
            Task::new("t2", 2, 2, 2, 100, 3).unwrap(),
        ];
        let servers = vec![
            Server::new("s0", 10, 10, 10).unwrap(),
            Server::new("s1", 4, 4, 4).unwrap(),
        ];
        (tasks, servers)
    }

    #[test]
    fn test_unassigned_is_empty() {
        let a = Allocation::unassigned(3);
        assert_eq!(a.num_tasks(), 3);
        assert_eq!(a.num_assigned(), 0);
        assert!(a.is_empty());
        assert!(a.assignment(ti(7)).is_none());
    }

    #[test]
    fn test_welfare_and_assigned_tasks() {
        let (tasks, servers) = fixture();
        let one = SpeedTriple::new(1, 1, 1);
        let a = Allocation::from_assignments(
            3,
            [
                (ti(1), Assignment::new(si(0), one)),
                (ti(2), Assignment::new(si(1), one)),
            ],
        );
        assert_eq!(a.social_welfare(&tasks), 11);
        assert_eq!(a.assigned_tasks(si(0)).collect::<Vec<_>>(), vec![ti(1)]);
        assert_eq!(a.assigned_tasks(si(1)).collect::<Vec<_>>(), vec![ti(2)]);
        assert!(!a.is_assigned(ti(0)));
        assert_eq!(a.verify(&tasks, &servers), Ok(()));
    }

    #[test]
    fn test_verify_rejects_overloaded_server() {
        let (tasks, servers) = fixture();
        let one = SpeedTriple::new(1, 1, 1);
        let a = Allocation::from_assignments(
            3,
            [
                (ti(0), Assignment::new(si(0), one)),
                (ti(1), Assignment::new(si(0), one)),
            ],
        );
        assert_eq!(
            a.verify(&tasks, &servers),
            Err(AllocationViolation::Load {
                server: si(0),
                violation: SpeedViolation::Storage {
                    used: 20,
                    capacity: 10
                },
            })
        );
    }

    #[test]
    fn test_verify_rejects_unknown_server_and_length() {
        let (tasks, servers) = fixture();
        let one = SpeedTriple::new(1, 1, 1);
        let a = Allocation::from_assignments(3, [(ti(2), Assignment::new(si(5), one))]);
        assert_eq!(
            a.verify(&tasks, &servers),
            Err(AllocationViolation::UnknownServer {
                task: ti(2),
                server: si(5)
            })
        );
        assert_eq!(
            Allocation::unassigned(2).verify(&tasks, &servers),
            Err(AllocationViolation::LengthMismatch {
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_server_usage() {
        let (tasks, servers) = fixture();
        let a = Allocation::from_assignments(
            3,
            [(ti(1), Assignment::new(si(0), SpeedTriple::new(2, 5, 3)))],
        );
        let usage = a.server_usage(si(0), &tasks, &servers);
        assert_eq!(usage.num_tasks, 1);
        assert_eq!(usage.value, 8);
        assert!((usage.storage_ratio - 1.0).abs() < 1e-12);
        assert!((usage.computation_ratio - 0.5).abs() < 1e-12);
        assert!((usage.bandwidth_ratio - 0.5).abs() < 1e-12);

        let idle = a.server_usage(si(1), &tasks, &servers);
        assert_eq!(idle.num_tasks, 0);
        assert_eq!(idle.value, 0);
    }
}
