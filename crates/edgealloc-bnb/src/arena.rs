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

//! # Decision Arena
//!
//! Partial assignments of the search are stored as a forest of immutable
//! decision records. Each record assigns one task to one server and points
//! to the record of its parent decision, so a search node only needs the id
//! of its newest record to describe its whole partial assignment. Skipping a
//! task produces no record: a skip child simply reuses its parent's id.
//!
//! The task list of a server is reconstructed by walking the parent chain
//! when the feasibility oracle needs it. Records are never removed during a
//! solve; the arena is cleared in bulk afterwards.

use edgealloc_core::utils::index::{TypedIndex, TypedIndexTag};
use edgealloc_model::index::{ServerIndex, TaskIndex};
use smallvec::SmallVec;

/// A tag type for decision record ids.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeIdTag;

impl TypedIndexTag for NodeIdTag {
    const NAME: &'static str = "NodeId";
}

/// A typed id of a decision record.
pub type NodeId = TypedIndex<NodeIdTag>;

/// The tasks committed to one server, in increasing task order.
pub type TaskList = SmallVec<[TaskIndex; 8]>;

/// One immutable decision: `task` runs on `server`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecisionRecord {
    parent: Option<NodeId>,
    task: TaskIndex,
    server: ServerIndex,
}

impl DecisionRecord {
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn task(&self) -> TaskIndex {
        self.task
    }

    #[inline]
    pub fn server(&self) -> ServerIndex {
        self.server
    }
}

impl std::fmt::Display for DecisionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DecisionRecord({} -> {})", self.task, self.server)
    }
}

/// Append-only storage of decision records.
#[derive(Clone, Debug, Default)]
pub struct DecisionArena {
    records: Vec<DecisionRecord>,
}

impl DecisionArena {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Removes all records, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Appends the decision `task -> server` below `parent`.
    #[inline]
    pub fn push(&mut self, parent: Option<NodeId>, task: TaskIndex, server: ServerIndex) -> NodeId {
        debug_assert!(
            parent.is_none_or(|p| p.get() < self.records.len()),
            "called `DecisionArena::push` with unknown parent {:?}",
            parent
        );
        let id = NodeId::new(self.records.len());
        self.records.push(DecisionRecord { parent, task, server });
        id
    }

    /// Returns the record with id `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this arena.
    #[inline]
    pub fn get(&self, id: NodeId) -> &DecisionRecord {
        &self.records[id.get()]
    }

    /// Iterates over the decisions of the chain ending at `last`, newest first.
    #[inline]
    pub fn chain(&self, last: Option<NodeId>) -> Chain<'_> {
        Chain { arena: self, next: last }
    }

    /// Returns the tasks the chain ending at `last` commits to `server`.
    pub fn server_tasks(&self, last: Option<NodeId>, server: ServerIndex) -> TaskList {
        let mut tasks: TaskList = self
            .chain(last)
            .filter(|r| r.server == server)
            .map(|r| r.task)
            .collect();
        tasks.reverse();
        tasks
    }

    /// Returns the committed tasks of every server for the chain ending at
    /// `last`, indexed by server.
    pub fn server_sets(&self, last: Option<NodeId>, num_servers: usize) -> Vec<TaskList> {
        let mut sets = vec![TaskList::new(); num_servers];
        for record in self.chain(last) {
            if let Some(set) = sets.get_mut(record.server.get()) {
                set.push(record.task);
            }
        }
        for set in &mut sets {
            set.reverse();
        }
        sets
    }
}

/// Iterator over a decision chain, newest decision first.
#[derive(Clone, Debug)]
pub struct Chain<'a> {
    arena: &'a DecisionArena,
    next: Option<NodeId>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a DecisionRecord;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let record = self.arena.get(self.next?);
        self.next = record.parent;
        Some(record)
    }
}
