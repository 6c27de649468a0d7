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
    monitor::tree_search_monitor::{PruneReason, TreeSearchMonitor},
    node::NodeView,
    stats::BnbSolverStatistics,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, instance::Instance};
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Reports search progress as structured `tracing` events.
///
/// A progress event is emitted at most once per `log_interval`; the clock is
/// only read when `nodes_popped & clock_check_mask == 0`.
#[derive(Debug, Clone)]
pub struct LogTreeSearchMonitor<V> {
    start_time: Instant,
    last_log_time: Instant,
    log_interval: Duration,
    clock_check_mask: u64,
    best_value: Option<V>,
    lines_logged: u64,
}

impl<V> LogTreeSearchMonitor<V>
where
    V: TaskValue,
{
    pub fn new(log_interval: Duration, clock_check_mask: u64) -> Self {
        Self {
            start_time: Instant::now(),
            last_log_time: Instant::now(),
            log_interval,
            clock_check_mask,
            best_value: None,
            lines_logged: 0,
        }
    }

    /// Number of progress events emitted during the current search.
    #[inline]
    pub fn lines_logged(&self) -> u64 {
        self.lines_logged
    }

    #[inline]
    pub fn best_value(&self) -> Option<V> {
        self.best_value
    }

    fn log_progress(&mut self, node: &NodeView<'_, V>, stats: &BnbSolverStatistics) {
        let now = Instant::now();
        let best = self.best_value.map_or_else(|| "none".to_string(), |v| v.to_string());
        info!(
            elapsed_s = now.duration_since(self.start_time).as_secs_f64(),
            popped = stats.nodes_popped,
            expanded = stats.nodes_expanded,
            pruned = stats.nodes_pruned(),
            depth = node.prefix(),
            lower_bound = %node.lower_bound(),
            upper_bound = %node.upper_bound(),
            best = %best,
            oracle_calls = stats.oracle_calls,
            "search progress"
        );
        self.last_log_time = now;
        self.lines_logged += 1;
    }
}

impl<V> Default for LogTreeSearchMonitor<V>
where
    V: TaskValue,
{
    fn default() -> Self {
        Self::new(Duration::from_secs(1), 4095)
    }
}

impl<V> std::fmt::Display for LogTreeSearchMonitor<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LogTreeSearchMonitor(log_interval: {}s, clock_check_mask: {})",
            self.log_interval.as_secs_f64(),
            self.clock_check_mask
        )
    }
}

impl<V> TreeSearchMonitor<V> for LogTreeSearchMonitor<V>
where
    V: TaskValue,
{
    fn name(&self) -> &str {
        "LogTreeSearchMonitor"
    }

    fn on_enter_search(&mut self, instance: &Instance<V>, _statistics: &BnbSolverStatistics) {
        self.start_time = Instant::now();
        self.last_log_time = self.start_time;
        self.best_value = None;
        self.lines_logged = 0;
        info!(
            tasks = instance.num_tasks(),
            servers = instance.num_servers(),
            total_value = ?instance.total_value().ok(),
            "search started"
        );
    }

    fn on_node_popped(&mut self, node: &NodeView<'_, V>, statistics: &BnbSolverStatistics) {
        if (statistics.nodes_popped & self.clock_check_mask) == 0
            && self.last_log_time.elapsed() >= self.log_interval
        {
            self.log_progress(node, statistics);
        }
    }

    fn on_prune(&mut self, node: &NodeView<'_, V>, reason: PruneReason, _statistics: &BnbSolverStatistics) {
        debug!(depth = node.prefix(), reason = %reason, "node pruned");
    }

    fn on_incumbent_improved(&mut self, value: V, allocation: &Allocation, statistics: &BnbSolverStatistics) {
        self.best_value = Some(value);
        info!(
            value = %value,
            assigned = allocation.num_assigned(),
            popped = statistics.nodes_popped,
            "incumbent improved"
        );
    }

    fn on_children_enqueued(&mut self, _node: &NodeView<'_, V>, _count: usize, _statistics: &BnbSolverStatistics) {}

    fn on_exit_search(&mut self, statistics: &BnbSolverStatistics) {
        info!(
            elapsed_s = self.start_time.elapsed().as_secs_f64(),
            popped = statistics.nodes_popped,
            expanded = statistics.nodes_expanded,
            pruned = statistics.nodes_pruned(),
            inconclusive = statistics.oracle_inconclusive,
            "search finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{arena::DecisionArena, node::SearchNode};

    #[test]
    fn test_tracks_best_value_and_logs_when_due() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("debug"))
            .with_test_writer()
            .try_init();
        let mut monitor = LogTreeSearchMonitor::<i64>::new(Duration::ZERO, 0);
        let instance = Instance::<i64>::new(Vec::new(), Vec::new());
        let stats = BnbSolverStatistics::default();
        monitor.on_enter_search(&instance, &stats);
        assert_eq!(monitor.best_value(), None);

        monitor.on_incumbent_improved(7, &Allocation::unassigned(0), &stats);
        assert_eq!(monitor.best_value(), Some(7));

        let arena = DecisionArena::new();
        let node = SearchNode::root(10);
        monitor.on_node_popped(&NodeView::new(&node, &arena), &stats);
        assert_eq!(monitor.lines_logged(), 1);

        monitor.on_enter_search(&instance, &stats);
        assert_eq!(monitor.best_value(), None);
        assert_eq!(monitor.lines_logged(), 0);
    }

    #[test]
    fn test_respects_clock_check_mask() {
        let mut monitor = LogTreeSearchMonitor::<i64>::new(Duration::ZERO, 3);
        let instance = Instance::<i64>::new(Vec::new(), Vec::new());
        let mut stats = BnbSolverStatistics::default();
        monitor.on_enter_search(&instance, &stats);
        let arena = DecisionArena::new();
        let node = SearchNode::root(1);
        for _ in 0..8 {
            stats.on_node_popped();
            monitor.on_node_popped(&NodeView::new(&node, &arena), &stats);
        }
        // popped counts 4 and 8 pass the mask.
        assert_eq!(monitor.lines_logged(), 2);
    }
}
