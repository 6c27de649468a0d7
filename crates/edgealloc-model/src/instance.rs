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

use crate::{
    error::ModelError,
    index::{ServerIndex, TaskIndex},
    server::Server,
    task::Task,
};
use edgealloc_core::num::value::TaskValue;
use serde::{Deserialize, Serialize};

/// An immutable snapshot of the tasks and servers of one allocation problem.
///
/// The task order is the order in which a search decides tasks; it affects
/// performance and tie-breaking but never the optimal value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound(
    serialize = "V: Serialize",
    deserialize = "V: TaskValue + Deserialize<'de>"
))]
pub struct Instance<V> {
    tasks: Vec<Task<V>>,
    servers: Vec<Server>,
}

impl<V> Instance<V>
where
    V: TaskValue,
{
    #[inline]
    pub fn new(tasks: Vec<Task<V>>, servers: Vec<Server>) -> Self {
        Self { tasks, servers }
    }

    #[inline]
    pub fn tasks(&self) -> &[Task<V>] {
        &self.tasks
    }

    #[inline]
    pub fn servers(&self) -> &[Server] {
        &self.servers
    }

    #[inline]
    pub fn num_tasks(&self) -> usize {
        self.tasks.len()
    }

    #[inline]
    pub fn num_servers(&self) -> usize {
        self.servers.len()
    }

    /// Returns the task at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn task(&self, index: TaskIndex) -> &Task<V> {
        &self.tasks[index.get()]
    }

    /// Returns the server at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[inline]
    pub fn server(&self, index: ServerIndex) -> &Server {
        &self.servers[index.get()]
    }

    /// Returns the summed value of all tasks, a trivial upper bound on the
    /// social welfare of any allocation.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ValueOverflow` if the sum does not fit `V`.
    #[inline]
    pub fn total_value(&self) -> Result<V, ModelError> {
        V::checked_sum_values(self.tasks.iter().map(Task::value)).ok_or(ModelError::ValueOverflow {
            num_tasks: self.tasks.len(),
        })
    }

    /// Iterates over the indices of servers that could host `task` when empty.
    pub fn eligible_servers(&self, task: TaskIndex) -> impl Iterator<Item = ServerIndex> + '_ {
        let task = self.task(task);
        self.servers
            .iter()
            .enumerate()
            .filter(move |(_, s)| s.could_host(task))
            .map(|(i, _)| ServerIndex::new(i))
    }
}

impl<V> std::fmt::Display for Instance<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Instance(tasks: {}, servers: {}, ",
            self.tasks.len(),
            self.servers.len()
        )?;
        match self.total_value() {
            Ok(total) => write!(f, "total value: {})", total),
            Err(_) => write!(f, "total value: overflow)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance() -> Instance<i64> {
        Instance::new(
            vec![
                Task::new("small", 1, 1, 1, 100, 2).unwrap(),
                Task::new("large", 50, 1, 1, 100, 7).unwrap(),
            ],
            vec![
                Server::new("a", 10, 10, 10).unwrap(),
                Server::new("b", 60, 10, 10).unwrap(),
            ],
        )
    }

    #[test]
    fn test_accessors() {
        let inst = instance();
        assert_eq!(inst.num_tasks(), 2);
        assert_eq!(inst.num_servers(), 2);
        assert_eq!(inst.total_value(), Ok(9));
        assert_eq!(inst.task(TaskIndex::new(1)).name(), "large");
        assert_eq!(inst.server(ServerIndex::new(0)).name(), "a");
        assert_eq!(format!("{}", inst), "Instance(tasks: 2, servers: 2, total value: 9)");
    }

    #[test]
    fn test_total_value_overflow_is_reported() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let inst = Instance::new(
            vec![
                Task::new("a", 1, 1, 1, 100, 200u8).unwrap(),
                Task::new("b", 1, 1, 1, 100, 100u8).unwrap(),
            ],
            vec![server],
        );
        assert_eq!(inst.total_value(), Err(ModelError::ValueOverflow { num_tasks: 2 }));
        assert_eq!(format!("{}", inst), "Instance(tasks: 2, servers: 1, total value: overflow)");
    }

    #[test]
    fn test_eligible_servers() {
        let inst = instance();
        let small: Vec<_> = inst.eligible_servers(TaskIndex::new(0)).collect();
        assert_eq!(small, vec![ServerIndex::new(0), ServerIndex::new(1)]);
        let large: Vec<_> = inst.eligible_servers(TaskIndex::new(1)).collect();
        assert_eq!(large, vec![ServerIndex::new(1)]);
    }

    #[test]
    fn test_serde_roundtrip() {
        let inst = instance();
        let json = serde_json::to_string(&inst).unwrap();
        let back: Instance<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inst);
    }
}
