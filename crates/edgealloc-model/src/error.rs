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

//! Error types of the resource model.
//!
//! - `ModelError`: rejection of invalid tasks, servers and instances.
//! - `SpeedViolation`: why a set of speed triples does not fit a server.
//! - `AllocationViolation`: why a whole allocation is invalid.

use crate::index::{ServerIndex, TaskIndex};
use thiserror::Error;

/// Errors raised when constructing model objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("invalid task `{name}`: {reason}")]
    InvalidTask { name: String, reason: &'static str },

    #[error("invalid server `{name}`: {reason}")]
    InvalidServer { name: String, reason: &'static str },

    #[error("summed value of {num_tasks} tasks exceeds the largest representable value")]
    ValueOverflow { num_tasks: usize },
}

/// A violation of a server's load constraints by a set of speed triples.
///
/// `task` fields are positions within the task slice that was checked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeedViolation {
    #[error("{tasks} tasks but {speeds} speed triples")]
    CountMismatch { tasks: usize, speeds: usize },

    #[error("task at position {task} has a zero speed")]
    ZeroSpeed { task: usize },

    #[error("task at position {task} misses its deadline")]
    Deadline { task: usize },

    #[error("storage {used} exceeds capacity {capacity}")]
    Storage { used: u64, capacity: u32 },

    #[error("computation {used} exceeds capacity {capacity}")]
    Computation { used: u64, capacity: u32 },

    #[error("bandwidth {used} exceeds capacity {capacity}")]
    Bandwidth { used: u64, capacity: u32 },
}

impl SpeedViolation {
    /// Returns the position of the offending task, if the violation is
    /// attributable to a single task.
    #[inline]
    pub fn task_position(&self) -> Option<usize> {
        match self {
            Self::ZeroSpeed { task } | Self::Deadline { task } => Some(*task),
            _ => None,
        }
    }
}

/// A violation of the allocation invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocationViolation {
    #[error("allocation covers {actual} tasks but the instance has {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("{task} is assigned to unknown {server}")]
    UnknownServer { task: TaskIndex, server: ServerIndex },

    #[error("{server} is overloaded: {violation}")]
    Load {
        server: ServerIndex,
        violation: SpeedViolation,
    },
}
