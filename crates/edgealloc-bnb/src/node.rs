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

//! # Search Nodes
//!
//! A search node is a decided prefix of the task order together with the
//! partial assignment of that prefix (the id of its newest decision record)
//! and two bounds:
//!
//! - `lower_bound`: the value of the tasks committed so far, which any
//!   feasible completion achieves at least;
//! - `upper_bound`: `lower_bound` plus the value of every undecided task,
//!   which no completion can exceed.
//!
//! Nodes are small `Copy` values; everything else lives in the
//! `DecisionArena`.

use crate::arena::{DecisionArena, NodeId, TaskList};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::index::{ServerIndex, TaskIndex};
use std::cmp::Ordering;

/// A node of the branch-and-bound tree.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SearchNode<V> {
    last: Option<NodeId>,
    prefix: usize,
    lower_bound: V,
    upper_bound: V,
}

impl<V> SearchNode<V>
where
    V: TaskValue,
{
    /// The root: nothing decided, nothing committed.
    #[inline]
    pub fn root(total_value: V) -> Self {
        Self {
            last: None,
            prefix: 0,
            lower_bound: V::zero(),
            upper_bound: total_value,
        }
    }

    #[inline]
    pub(crate) fn new(last: Option<NodeId>, prefix: usize, lower_bound: V, upper_bound: V) -> Self {
        debug_assert!(
            lower_bound <= upper_bound,
            "called `SearchNode::new` with lower bound {} above upper bound {}",
            lower_bound,
            upper_bound
        );
        Self {
            last,
            prefix,
            lower_bound,
            upper_bound,
        }
    }

    /// The id of the newest decision record, `None` if nothing is committed.
    #[inline]
    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    /// The number of decided tasks.
    #[inline]
    pub fn prefix(&self) -> usize {
        self.prefix
    }

    #[inline]
    pub fn lower_bound(&self) -> V {
        self.lower_bound
    }

    #[inline]
    pub fn upper_bound(&self) -> V {
        self.upper_bound
    }

    /// Returns `true` if no completion of this node can strictly beat
    /// `incumbent`.
    #[inline]
    pub fn is_dominated_by(&self, incumbent: V) -> bool {
        self.upper_bound <= incumbent
    }

    /// Best-first frontier order: greater lower bound first, deeper prefix
    /// on ties.
    #[inline]
    pub fn frontier_order(a: &Self, b: &Self) -> Ordering {
        a.lower_bound
            .total_cmp_value(&b.lower_bound)
            .then(a.prefix.cmp(&b.prefix))
    }
}

impl<V> std::fmt::Display for SearchNode<V>
where
    V: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchNode(prefix: {}, lower: {}, upper: {})",
            self.prefix, self.lower_bound, self.upper_bound
        )
    }
}

/// A read-only view of a node together with the arena that holds its
/// partial assignment. Handed to monitors.
#[derive(Clone, Copy, Debug)]
pub struct NodeView<'a, V> {
    node: &'a SearchNode<V>,
    arena: &'a DecisionArena,
}

impl<'a, V> NodeView<'a, V>
where
    V: TaskValue,
{
    #[inline]
    pub fn new(node: &'a SearchNode<V>, arena: &'a DecisionArena) -> Self {
        Self { node, arena }
    }

    #[inline]
    pub fn node(&self) -> &'a SearchNode<V> {
        self.node
    }

    #[inline]
    pub fn prefix(&self) -> usize {
        self.node.prefix()
    }

    #[inline]
    pub fn lower_bound(&self) -> V {
        self.node.lower_bound()
    }

    #[inline]
    pub fn upper_bound(&self) -> V {
        self.node.upper_bound()
    }

    /// The tasks this node commits to `server`, in task order.
    #[inline]
    pub fn server_tasks(&self, server: ServerIndex) -> TaskList {
        self.arena.server_tasks(self.node.last(), server)
    }

    /// Iterates over the committed `(task, server)` pairs, newest first.
    #[inline]
    pub fn decisions(&self) -> impl Iterator<Item = (TaskIndex, ServerIndex)> + 'a {
        self.arena.chain(self.node.last()).map(|r| (r.task(), r.server()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root() {
        let root = SearchNode::root(10i64);
        assert_eq!(root.prefix(), 0);
        assert_eq!(root.lower_bound(), 0);
        assert_eq!(root.upper_bound(), 10);
        assert!(root.last().is_none());
        assert!(!root.is_dominated_by(9));
        assert!(root.is_dominated_by(10));
    }

    #[test]
    fn test_frontier_order() {
        let shallow = SearchNode::new(None, 1, 5i64, 9);
        let deep = SearchNode::new(None, 3, 5i64, 7);
        let better = SearchNode::new(None, 0, 6i64, 6);
        assert_eq!(SearchNode::frontier_order(&better, &deep), Ordering::Greater);
        assert_eq!(SearchNode::frontier_order(&deep, &shallow), Ordering::Greater);
        assert_eq!(SearchNode::frontier_order(&shallow, &shallow), Ordering::Equal);
    }

    #[test]
    fn test_view_reads_arena() {
        let mut arena = DecisionArena::new();
        let a = arena.push(None, TaskIndex::new(0), ServerIndex::new(1));
        let node = SearchNode::new(Some(a), 2, 3.0f64, 4.5);
        let view = NodeView::new(&node, &arena);
        assert_eq!(view.prefix(), 2);
        assert_eq!(view.server_tasks(ServerIndex::new(1)).as_slice(), &[TaskIndex::new(0)]);
        assert!(view.server_tasks(ServerIndex::new(0)).is_empty());
        assert_eq!(
            view.decisions().collect::<Vec<_>>(),
            vec![(TaskIndex::new(0), ServerIndex::new(1))]
        );
    }
}
