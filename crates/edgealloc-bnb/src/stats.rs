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

use std::time::Duration;

/// Statistics collected during a branch-and-bound solve.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BnbSolverStatistics {
    /// Nodes pushed onto the frontier (including seeded children).
    pub nodes_generated: u64,
    /// Nodes popped from the frontier.
    pub nodes_popped: u64,
    /// Popped nodes that survived the bound check and the oracle.
    pub nodes_expanded: u64,
    /// Nodes (or skip children) cut because they cannot beat the incumbent.
    pub prunings_bound: u64,
    /// Nodes discarded because some server could not host its tasks.
    pub prunings_infeasible: u64,
    /// Nodes discarded because the oracle ran out of budget.
    pub prunings_inconclusive: u64,
    /// Calls that reached the oracle.
    pub oracle_calls: u64,
    /// Feasibility questions answered from the cache.
    pub oracle_cache_hits: u64,
    /// Oracle calls that returned `Inconclusive`.
    pub oracle_inconclusive: u64,
    /// Number of times the incumbent was replaced by a better allocation.
    pub incumbent_updates: u64,
    /// The deepest decided prefix reached.
    pub max_depth: u64,
    /// The largest frontier size observed.
    pub max_frontier_size: u64,
    /// Total time spent in the solver.
    pub time_total: Duration,
}

impl BnbSolverStatistics {
    #[inline]
    pub fn on_nodes_generated(&mut self, count: u64) {
        self.nodes_generated = self.nodes_generated.saturating_add(count);
    }

    #[inline]
    pub fn on_node_popped(&mut self) {
        self.nodes_popped = self.nodes_popped.saturating_add(1);
    }

    #[inline]
    pub fn on_node_expanded(&mut self) {
        self.nodes_expanded = self.nodes_expanded.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_bound(&mut self) {
        self.prunings_bound = self.prunings_bound.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_infeasible(&mut self) {
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(1);
    }

    #[inline]
    pub fn on_pruning_inconclusive(&mut self) {
        self.prunings_inconclusive = self.prunings_inconclusive.saturating_add(1);
    }

    #[inline]
    pub fn on_oracle_call(&mut self) {
        self.oracle_calls = self.oracle_calls.saturating_add(1);
    }

    #[inline]
    pub fn on_oracle_cache_hit(&mut self) {
        self.oracle_cache_hits = self.oracle_cache_hits.saturating_add(1);
    }

    #[inline]
    pub fn on_oracle_inconclusive(&mut self) {
        self.oracle_inconclusive = self.oracle_inconclusive.saturating_add(1);
    }

    #[inline]
    pub fn on_incumbent_update(&mut self) {
        self.incumbent_updates = self.incumbent_updates.saturating_add(1);
    }

    #[inline]
    pub fn on_depth_update(&mut self, depth: u64) {
        self.max_depth = self.max_depth.max(depth);
    }

    #[inline]
    pub fn on_frontier_size(&mut self, size: u64) {
        self.max_frontier_size = self.max_frontier_size.max(size);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }

    /// Total number of discarded nodes, for any reason.
    #[inline]
    pub fn nodes_pruned(&self) -> u64 {
        self.prunings_bound
            .saturating_add(self.prunings_infeasible)
            .saturating_add(self.prunings_inconclusive)
    }

    /// Folds the counters of `other` into `self`. Counters are summed,
    /// maxima are combined and the total time is kept.
    pub fn merge(&mut self, other: &Self) {
        self.nodes_generated = self.nodes_generated.saturating_add(other.nodes_generated);
        self.nodes_popped = self.nodes_popped.saturating_add(other.nodes_popped);
        self.nodes_expanded = self.nodes_expanded.saturating_add(other.nodes_expanded);
        self.prunings_bound = self.prunings_bound.saturating_add(other.prunings_bound);
        self.prunings_infeasible = self.prunings_infeasible.saturating_add(other.prunings_infeasible);
        self.prunings_inconclusive = self
            .prunings_inconclusive
            .saturating_add(other.prunings_inconclusive);
        self.oracle_calls = self.oracle_calls.saturating_add(other.oracle_calls);
        self.oracle_cache_hits = self.oracle_cache_hits.saturating_add(other.oracle_cache_hits);
        self.oracle_inconclusive = self.oracle_inconclusive.saturating_add(other.oracle_inconclusive);
        self.incumbent_updates = self.incumbent_updates.saturating_add(other.incumbent_updates);
        self.max_depth = self.max_depth.max(other.max_depth);
        self.max_frontier_size = self.max_frontier_size.max(other.max_frontier_size);
    }
}

impl std::fmt::Display for BnbSolverStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Edgealloc-BnB Solver Statistics:")?;
        writeln!(f, "  Nodes generated:        {}", self.nodes_generated)?;
        writeln!(f, "  Nodes popped:           {}", self.nodes_popped)?;
        writeln!(f, "  Nodes expanded:         {}", self.nodes_expanded)?;
        writeln!(f, "  Prunings (bound):       {}", self.prunings_bound)?;
        writeln!(f, "  Prunings (infeasible):  {}", self.prunings_infeasible)?;
        writeln!(f, "  Prunings (inconclusive):{}", self.prunings_inconclusive)?;
        writeln!(f, "  Oracle calls:           {}", self.oracle_calls)?;
        writeln!(f, "  Oracle cache hits:      {}", self.oracle_cache_hits)?;
        writeln!(f, "  Oracle inconclusive:    {}", self.oracle_inconclusive)?;
        writeln!(f, "  Incumbent updates:      {}", self.incumbent_updates)?;
        writeln!(f, "  Max depth reached:      {}", self.max_depth)?;
        writeln!(f, "  Max frontier size:      {}", self.max_frontier_size)?;
        writeln!(f, "  Total time:             {:.2?}", self.time_total)?;
        Ok(())
    }
}
