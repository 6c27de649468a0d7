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

//! Tree search monitoring interface
//!
//! Declares the `TreeSearchMonitor` trait and `PruneReason` for observing and
//! controlling branch-and-bound. Callbacks track the solver lifecycle, and a
//! monitor can stop the search via `SearchCommand` (default: Continue).
//!
//! Lifecycle
//! - enter → {command → popped → prune | incumbent? → children} → exit
//! - `BnbSolverStatistics` is provided to every callback for telemetry.
//!
//! Monitors are driven by the sequential engine and are single-threaded.

use crate::{node::NodeView, stats::BnbSolverStatistics};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, index::ServerIndex, instance::Instance};

/// What the search should do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchCommand {
    Continue,
    /// Stop and return the incumbent, with the given reason.
    Terminate(String),
}

impl std::fmt::Display for SearchCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchCommand::Continue => write!(f, "Continue"),
            SearchCommand::Terminate(reason) => write!(f, "Terminate({})", reason),
        }
    }
}

/// Reasons for discarding a search node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum PruneReason {
    /// The node's upper bound does not exceed the incumbent.
    BoundDominated,
    /// `server` cannot run the tasks committed to it.
    Infeasible { server: ServerIndex },
    /// The oracle ran out of budget deciding `server`.
    Inconclusive { server: ServerIndex },
}

impl std::fmt::Display for PruneReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PruneReason::BoundDominated => write!(f, "BoundDominated"),
            PruneReason::Infeasible { server } => write!(f, "Infeasible({})", server),
            PruneReason::Inconclusive { server } => write!(f, "Inconclusive({})", server),
        }
    }
}

/// Trait for monitoring and controlling the search process of the solver.
pub trait TreeSearchMonitor<V>
where
    V: TaskValue,
{
    /// Returns the name of the monitor.
    fn name(&self) -> &str;
    /// Called when the search starts.
    fn on_enter_search(&mut self, instance: &Instance<V>, statistics: &BnbSolverStatistics);
    /// Called when the search ends.
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics);
    /// Called before every node is popped to determine the next action.
    fn search_command(&mut self, _statistics: &BnbSolverStatistics) -> SearchCommand {
        SearchCommand::Continue
    }
    /// Called when a node is taken off the frontier.
    fn on_node_popped(&mut self, node: &NodeView<'_, V>, statistics: &BnbSolverStatistics);
    /// Called when a popped node is discarded.
    fn on_prune(&mut self, node: &NodeView<'_, V>, reason: PruneReason, statistics: &BnbSolverStatistics);
    /// Called when a strictly better allocation becomes the incumbent.
    fn on_incumbent_improved(&mut self, value: V, allocation: &Allocation, statistics: &BnbSolverStatistics);
    /// Called after the children of `node` were pushed onto the frontier.
    fn on_children_enqueued(&mut self, node: &NodeView<'_, V>, count: usize, statistics: &BnbSolverStatistics);
}

impl<V, M> TreeSearchMonitor<V> for &mut M
where
    V: TaskValue,
    M: TreeSearchMonitor<V> + ?Sized,
{
    #[inline(always)]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline(always)]
    fn on_enter_search(&mut self, instance: &Instance<V>, statistics: &BnbSolverStatistics) {
        (**self).on_enter_search(instance, statistics)
    }

    #[inline(always)]
    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        (**self).on_exit_search(statistics)
    }

    #[inline(always)]
    fn search_command(&mut self, statistics: &BnbSolverStatistics) -> SearchCommand {
        (**self).search_command(statistics)
    }

    #[inline(always)]
    fn on_node_popped(&mut self, node: &NodeView<'_, V>, statistics: &BnbSolverStatistics) {
        (**self).on_node_popped(node, statistics)
    }

    #[inline(always)]
    fn on_prune(&mut self, node: &NodeView<'_, V>, reason: PruneReason, statistics: &BnbSolverStatistics) {
        (**self).on_prune(node, reason, statistics)
    }

    #[inline(always)]
    fn on_incumbent_improved(&mut self, value: V, allocation: &Allocation, statistics: &BnbSolverStatistics) {
        (**self).on_incumbent_improved(value, allocation, statistics)
    }

    #[inline(always)]
    fn on_children_enqueued(&mut self, node: &NodeView<'_, V>, count: usize, statistics: &BnbSolverStatistics) {
        (**self).on_children_enqueued(node, count, statistics)
    }
}

impl<V> std::fmt::Debug for dyn TreeSearchMonitor<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

impl<V> std::fmt::Display for dyn TreeSearchMonitor<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TreeSearchMonitor({})", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(PruneReason::BoundDominated.to_string(), "BoundDominated");
        assert_eq!(
            PruneReason::Infeasible {
                server: ServerIndex::new(2)
            }
            .to_string(),
            "Infeasible(ServerIndex(2))"
        );
        assert_eq!(
            SearchCommand::Terminate("stop".into()).to_string(),
            "Terminate(stop)"
        );
    }
}
