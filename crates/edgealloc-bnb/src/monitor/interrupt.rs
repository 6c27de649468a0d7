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
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    node::NodeView,
    stats::BnbSolverStatistics,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, instance::Instance};
use std::sync::atomic::{AtomicBool, Ordering};

/// A monitor that checks an atomic boolean flag to determine whether the
/// search should be interrupted.
#[derive(Debug, Clone)]
pub struct InterruptMonitor<'a, V> {
    stop_flag: &'a AtomicBool,
    _phantom: std::marker::PhantomData<V>,
}

impl<'a, V> InterruptMonitor<'a, V> {
    /// Creates a new `InterruptMonitor` watching `stop_flag`.
    /// The search terminates once the flag is set to `true`.
    #[inline(always)]
    pub fn new(stop_flag: &'a AtomicBool) -> Self {
        Self {
            stop_flag,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<'a, V> TreeSearchMonitor<V> for InterruptMonitor<'a, V>
where
    V: TaskValue,
{
    fn name(&self) -> &str {
        "InterruptMonitor"
    }

    fn on_enter_search(&mut self, _instance: &Instance<V>, _statistics: &BnbSolverStatistics) {}
    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {}

    fn search_command(&mut self, _statistics: &BnbSolverStatistics) -> SearchCommand {
        if self.stop_flag.load(Ordering::Relaxed) {
            SearchCommand::Terminate("Interrupt signal received".to_string())
        } else {
            SearchCommand::Continue
        }
    }

    fn on_node_popped(&mut self, _node: &NodeView<'_, V>, _statistics: &BnbSolverStatistics) {}
    fn on_prune(&mut self, _node: &NodeView<'_, V>, _reason: PruneReason, _statistics: &BnbSolverStatistics) {}
    fn on_incumbent_improved(&mut self, _value: V, _allocation: &Allocation, _statistics: &BnbSolverStatistics) {}
    fn on_children_enqueued(&mut self, _node: &NodeView<'_, V>, _count: usize, _statistics: &BnbSolverStatistics) {}
}
