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
use std::marker::PhantomData;
use std::time::{Duration, Instant};

/// A monitor that terminates the search after a specified duration.
///
/// Checks the clock only every `check_interval` commands to minimize
/// overhead; the first command always checks.
#[derive(Debug, Clone)]
pub struct TimeLimitMonitor<V> {
    time_limit: Duration,
    start_time: Option<Instant>,
    check_interval: u64,
    ops_since_last_check: u64,
    _marker: PhantomData<V>,
}

impl<V> TimeLimitMonitor<V> {
    /// Creates a new `TimeLimitMonitor` with the specified duration and check interval.
    /// `check_interval` specifies how many steps to take between time checks.
    /// A higher value reduces overhead but may lead to slightly exceeding the time limit.
    pub fn new(duration: Duration, check_interval: u64) -> Self {
        Self {
            time_limit: duration,
            start_time: None,
            check_interval: check_interval.max(1),
            ops_since_last_check: 0,
            _marker: PhantomData,
        }
    }

    /// Creates a new `TimeLimitMonitor` with the specified duration and a default check interval of 64.
    pub fn with_default_check_interval(duration: Duration) -> Self {
        Self::new(duration, 64)
    }

    #[inline]
    pub fn time_limit(&self) -> Duration {
        self.time_limit
    }
}

impl<V> TreeSearchMonitor<V> for TimeLimitMonitor<V>
where
    V: TaskValue,
{
    fn name(&self) -> &str {
        "TimeLimitMonitor"
    }

    fn on_enter_search(&mut self, _instance: &Instance<V>, _statistics: &BnbSolverStatistics) {
        self.start_time = Some(Instant::now());
        self.ops_since_last_check = 0;
    }

    fn search_command(&mut self, _statistics: &BnbSolverStatistics) -> SearchCommand {
        let due = self.ops_since_last_check == 0;
        self.ops_since_last_check += 1;
        if self.ops_since_last_check >= self.check_interval {
            self.ops_since_last_check = 0;
        }

        if due
            && let Some(start) = self.start_time
            && start.elapsed() >= self.time_limit
        {
            return SearchCommand::Terminate(format!(
                "Time limit of {:.3} seconds exceeded",
                self.time_limit.as_secs_f64()
            ));
        }
        SearchCommand::Continue
    }

    fn on_exit_search(&mut self, _statistics: &BnbSolverStatistics) {
        self.start_time = None;
    }

    fn on_node_popped(&mut self, _node: &NodeView<'_, V>, _statistics: &BnbSolverStatistics) {}
    fn on_prune(&mut self, _node: &NodeView<'_, V>, _reason: PruneReason, _statistics: &BnbSolverStatistics) {}
    fn on_incumbent_improved(&mut self, _value: V, _allocation: &Allocation, _statistics: &BnbSolverStatistics) {}
    fn on_children_enqueued(&mut self, _node: &NodeView<'_, V>, _count: usize, _statistics: &BnbSolverStatistics) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_instance() -> Instance<i64> {
        Instance::new(Vec::new(), Vec::new())
    }

    #[test]
    fn test_zero_limit_terminates_on_first_command() {
        let mut monitor = TimeLimitMonitor::<i64>::new(Duration::ZERO, 1000);
        let stats = BnbSolverStatistics::default();
        monitor.on_enter_search(&empty_instance(), &stats);
        assert!(matches!(monitor.search_command(&stats), SearchCommand::Terminate(_)));
    }

    #[test]
    fn test_generous_limit_continues() {
        let mut monitor = TimeLimitMonitor::<i64>::new(Duration::from_secs(3600), 1);
        let stats = BnbSolverStatistics::default();
        monitor.on_enter_search(&empty_instance(), &stats);
        for _ in 0..10 {
            assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
        }
    }

    #[test]
    fn test_inactive_outside_search() {
        let mut monitor = TimeLimitMonitor::<i64>::with_default_check_interval(Duration::ZERO);
        let stats = BnbSolverStatistics::default();
        assert_eq!(monitor.search_command(&stats), SearchCommand::Continue);
    }
}
