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

//! Monitoring combinators for tree search
//!
//! Provides `CompositeTreeSearchMonitor`, a fan-out monitor that forwards every
//! event to its children, so logging and early stopping can be combined
//! without coupling them to the solver.
//!
//! Behavior
//! - Events are dispatched to child monitors in insertion order.
//! - `search_command` short-circuits on the first non-`Continue` response;
//!   put stricter stop conditions first.
//! - Other callbacks always fan out to all children.

use crate::{
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    node::NodeView,
    stats::BnbSolverStatistics,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, instance::Instance};

/// A tree search monitor that aggregates multiple monitors and forwards events to all of them.
pub struct CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    monitors: Vec<Box<dyn TreeSearchMonitor<V> + 'a>>,
}

impl<'a, V> Default for CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, V> CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    /// Creates a new empty `CompositeTreeSearchMonitor`.
    #[inline(always)]
    pub fn new() -> Self {
        Self { monitors: Vec::new() }
    }

    /// Creates a new `CompositeTreeSearchMonitor` with room for `capacity` monitors.
    #[inline(always)]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            monitors: Vec::with_capacity(capacity),
        }
    }

    #[inline(always)]
    pub fn from_vec(monitors: Vec<Box<dyn TreeSearchMonitor<V> + 'a>>) -> Self {
        Self { monitors }
    }

    /// Adds a new monitor to the composite monitor.
    #[inline(always)]
    pub fn add_monitor<M>(&mut self, monitor: M)
    where
        M: TreeSearchMonitor<V> + 'a,
    {
        self.monitors.push(Box::new(monitor));
    }

    #[inline(always)]
    pub fn add_monitor_boxed(&mut self, monitor: Box<dyn TreeSearchMonitor<V> + 'a>) {
        self.monitors.push(monitor);
    }

    #[inline(always)]
    pub fn monitors(&self) -> &[Box<dyn TreeSearchMonitor<V> + 'a>] {
        &self.monitors
    }

    #[inline(always)]
    pub fn monitors_mut(&mut self) -> &mut [Box<dyn TreeSearchMonitor<V> + 'a>] {
        &mut self.monitors
    }

    #[inline(always)]
    pub fn clear(&mut self) {
        self.monitors.clear();
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.monitors.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.monitors.is_empty()
    }
}

impl<'a, V> FromIterator<Box<dyn TreeSearchMonitor<V> + 'a>> for CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    #[inline(always)]
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Box<dyn TreeSearchMonitor<V> + 'a>>,
    {
        Self {
            monitors: iter.into_iter().collect(),
        }
    }
}

impl<'a, V> TreeSearchMonitor<V> for CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    #[inline(always)]
    fn name(&self) -> &str {
        "CompositeTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, instance: &Instance<V>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_enter_search(instance, statistics);
        }
    }

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_exit_search(statistics);
        }
    }

    fn search_command(&mut self, statistics: &BnbSolverStatistics) -> SearchCommand {
        for monitor in &mut self.monitors {
            match monitor.search_command(statistics) {
                SearchCommand::Continue => {}
                command => return command,
            }
        }
        SearchCommand::Continue
    }

    fn on_node_popped(&mut self, node: &NodeView<'_, V>, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_node_popped(node, statistics);
        }
    }

    fn on_prune(&mut self, node: &NodeView<'_, V>, reason: PruneReason, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_prune(node, reason, statistics);
        }
    }

    fn on_incumbent_improved(&mut self, value: V, allocation: &Allocation, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_incumbent_improved(value, allocation, statistics);
        }
    }

    fn on_children_enqueued(&mut self, node: &NodeView<'_, V>, count: usize, statistics: &BnbSolverStatistics) {
        for monitor in &mut self.monitors {
            monitor.on_children_enqueued(node, count, statistics);
        }
    }
}

impl<'a, V> std::fmt::Debug for CompositeTreeSearchMonitor<'a, V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.monitors.iter().map(|m| m.name()))
            .finish()
    }
}
