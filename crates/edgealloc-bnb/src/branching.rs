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

//! # Branching
//!
//! Tasks are decided in their fixed instance order. Branching on a node with
//! decided prefix `p` decides task `p`:
//!
//! - one *server child* per server that could host the task on its own
//!   (`Server::could_host`), committing the task there and adding its value
//!   to the lower bound;
//! - one *skip child* that leaves the task unassigned, generated only if its
//!   upper bound `lower_bound + Σ value(tasks after p)` still exceeds the
//!   incumbent.
//!
//! Upper bounds are computed as `lower_bound + suffix[p]` from precomputed
//! suffix sums, never by subtracting values. Every child whose upper bound
//! does not exceed the incumbent is cut immediately. A task no server can
//! host only gets the skip child.
//!
//! The suffix sums are built with checked addition, so an instance whose
//! total value overflows `V` is rejected before any bound is computed. Every
//! bound is at most the total value afterwards.

use crate::{arena::DecisionArena, node::SearchNode};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{
    error::ModelError,
    index::{ServerIndex, TaskIndex},
    instance::Instance,
};
use smallvec::SmallVec;

/// Children produced by one branching step.
pub type Children<V> = SmallVec<[SearchNode<V>; 8]>;

/// Precomputed branching data of one instance.
#[derive(Clone, Debug)]
pub struct TaskBrancher<V> {
    /// `eligible[t]`: servers that could host task `t` on their own.
    eligible: Vec<SmallVec<[ServerIndex; 4]>>,
    /// `values[t]`: value of task `t`.
    values: Vec<V>,
    /// `suffix[p]`: summed value of tasks `p..`; `suffix[n] == 0`.
    suffix: Vec<V>,
}

/// Counters of one branching step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BranchOutcome {
    pub generated: u64,
    pub cut: u64,
}

impl<V> TaskBrancher<V>
where
    V: TaskValue,
{
    /// Precomputes eligibility and suffix sums of `instance`.
    ///
    /// # Errors
    ///
    /// Returns `ModelError::ValueOverflow` if the summed task value does not
    /// fit `V`.
    pub fn new(instance: &Instance<V>) -> Result<Self, ModelError> {
        let n = instance.num_tasks();
        let values: Vec<V> = instance.tasks().iter().map(|t| t.value()).collect();
        let mut suffix = vec![V::zero(); n + 1];
        for p in (0..n).rev() {
            suffix[p] = suffix[p + 1]
                .checked_add_value(values[p])
                .ok_or(ModelError::ValueOverflow { num_tasks: n })?;
        }
        let eligible = TaskIndex::range(n)
            .map(|t| instance.eligible_servers(t).collect())
            .collect();
        Ok(Self {
            eligible,
            values,
            suffix,
        })
    }

    #[inline]
    pub fn num_tasks(&self) -> usize {
        self.values.len()
    }

    /// The root node of the search tree.
    #[inline]
    pub fn root(&self) -> SearchNode<V> {
        SearchNode::root(self.suffix[0])
    }

    /// Servers that could host `task` on their own.
    #[inline]
    pub fn eligible_servers(&self, task: TaskIndex) -> &[ServerIndex] {
        &self.eligible[task.get()]
    }

    /// Returns `true` if every task of the node is decided.
    #[inline]
    pub fn is_leaf(&self, node: &SearchNode<V>) -> bool {
        node.prefix() >= self.values.len()
    }

    /// Branches on the next undecided task of `node`, appending the children
    /// that can still beat `incumbent` to `children`.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if `node` is a leaf.
    pub fn branch(
        &self,
        node: &SearchNode<V>,
        arena: &mut DecisionArena,
        incumbent: V,
        children: &mut Children<V>,
    ) -> BranchOutcome {
        debug_assert!(
            !self.is_leaf(node),
            "called `TaskBrancher::branch` on a leaf at prefix {}",
            node.prefix()
        );

        let mut outcome = BranchOutcome::default();
        let p = node.prefix();
        let task = TaskIndex::new(p);
        let rest = self.suffix[p + 1];

        let assigned_lower = node.lower_bound() + self.values[p];
        let assigned_upper = assigned_lower + rest;
        let servers = &self.eligible[p];
        if !servers.is_empty() {
            if assigned_upper > incumbent {
                for &server in servers {
                    let id = arena.push(node.last(), task, server);
                    children.push(SearchNode::new(Some(id), p + 1, assigned_lower, assigned_upper));
                    outcome.generated += 1;
                }
            } else {
                outcome.cut += servers.len() as u64;
            }
        }

        let skip_upper = node.lower_bound() + rest;
        if skip_upper > incumbent {
            children.push(SearchNode::new(node.last(), p + 1, node.lower_bound(), skip_upper));
            outcome.generated += 1;
        } else {
            outcome.cut += 1;
        }
        outcome
    }
}
