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

//! # Parallel Branch-and-Bound
//!
//! `ParallelBnbSolver` runs the same best-first search as `BnbSolver` with
//! several worker threads. The workers share:
//!
//! - a `ConcurrentPriorityQueue` as the frontier, which also detects when the
//!   search space is exhausted;
//! - the `DecisionArena` behind an `RwLock`, written only while branching;
//! - a `SharedIncumbent`, updated only on strict improvement.
//!
//! Each worker owns a clone of the oracle and its own feasibility cache, so
//! the oracle call is the only long-running step and it holds no lock.
//! Because the incumbent may improve while a worker waits on the oracle, the
//! node's upper bound is re-checked after the call.
//!
//! A time limit or an unsound oracle result closes the frontier, which
//! releases every worker. Statistics are collected per worker and merged.

use crate::{
    arena::DecisionArena,
    branching::{Children, TaskBrancher},
    concurrent::ConcurrentPriorityQueue,
    config::BnbConfig,
    error::BnbError,
    evaluate::{NodeEvaluation, NodeEvaluator},
    incumbent::{IncumbentStore, SharedIncumbent},
    node::SearchNode,
    result::BnbSolverOutcome,
    stats::BnbSolverStatistics,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, instance::Instance};
use edgealloc_oracle::oracle::FeasibilityOracle;
use std::{
    cmp::Ordering,
    sync::{Mutex, PoisonError, RwLock},
    time::Instant,
};
use tracing::{debug, info, warn};

type FrontierOrder<V> = fn(&SearchNode<V>, &SearchNode<V>) -> Ordering;

/// The multi-threaded branch-and-bound engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParallelBnbSolver;

/// State shared by every worker of one solve.
struct SharedSearch<'a, V>
where
    V: TaskValue,
{
    instance: &'a Instance<V>,
    config: &'a BnbConfig,
    brancher: TaskBrancher<V>,
    arena: RwLock<DecisionArena>,
    frontier: ConcurrentPriorityQueue<SearchNode<V>, FrontierOrder<V>>,
    incumbent: SharedIncumbent<V>,
    first_error: Mutex<Option<BnbError>>,
    abort_reason: Mutex<Option<String>>,
    start_time: Instant,
    deadline: Option<Instant>,
}

impl ParallelBnbSolver {
    /// Solves `instance` with `config.num_threads` workers, each owning a
    /// clone of `oracle`.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::InvalidConfig` if `config` fails validation, and
    /// the first `BnbError::OracleUnsoundResult` any worker encounters.
    pub fn solve<V, O>(instance: &Instance<V>, oracle: O, config: &BnbConfig) -> Result<BnbSolverOutcome<V>, BnbError>
    where
        V: TaskValue,
        O: FeasibilityOracle<V> + Clone + Send,
    {
        config.validate()?;
        let start_time = Instant::now();
        let num_tasks = instance.num_tasks();
        let brancher = TaskBrancher::new(instance)?;

        if num_tasks == 0 || instance.num_servers() == 0 {
            let mut stats = BnbSolverStatistics::default();
            stats.set_total_time(start_time.elapsed());
            return Ok(BnbSolverOutcome::optimal(
                Allocation::unassigned(num_tasks),
                V::zero(),
                stats,
            ));
        }

        let shared = SharedSearch {
            instance,
            config,
            brancher,
            arena: RwLock::new(DecisionArena::new()),
            frontier: ConcurrentPriorityQueue::new(SearchNode::<V>::frontier_order as FrontierOrder<V>),
            incumbent: SharedIncumbent::empty(num_tasks),
            first_error: Mutex::new(None),
            abort_reason: Mutex::new(None),
            start_time,
            deadline: config.time_limit.and_then(|limit| start_time.checked_add(limit)),
        };

        info!(
            tasks = num_tasks,
            servers = instance.num_servers(),
            threads = config.num_threads,
            oracle = oracle.name(),
            "starting parallel branch-and-bound"
        );

        let mut stats = shared.seed();
        let worker_stats: Vec<BnbSolverStatistics> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..config.num_threads)
                .map(|worker| {
                    let oracle = oracle.clone();
                    let shared = &shared;
                    scope.spawn(move || shared.work(worker, oracle))
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap_or_else(|payload| std::panic::resume_unwind(payload)))
                .collect()
        });
        for other in &worker_stats {
            stats.merge(other);
        }
        stats.on_frontier_size(shared.frontier.max_len() as u64);
        stats.set_total_time(start_time.elapsed());

        shared.finish(stats)
    }
}

impl<'a, V> SharedSearch<'a, V>
where
    V: TaskValue,
{
    /// Branches the root and fills the frontier with its children.
    fn seed(&self) -> BnbSolverStatistics {
        let mut stats = BnbSolverStatistics::default();
        let mut children = Children::new();
        let root = self.brancher.root();
        let outcome = {
            let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
            self.brancher.branch(&root, &mut arena, self.incumbent.value(), &mut children)
        };
        stats.on_nodes_generated(outcome.generated);
        stats.prunings_bound = stats.prunings_bound.saturating_add(outcome.cut);
        self.frontier.push_all(children);
        stats
    }

    fn record_error(&self, error: BnbError) {
        let mut slot = self.first_error.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(error);
        }
        drop(slot);
        self.frontier.close();
    }

    fn record_abort(&self, reason: String) {
        let mut slot = self.abort_reason.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_none() {
            *slot = Some(reason);
        }
        drop(slot);
        self.frontier.close();
    }

    fn time_limit_exceeded(&self, stats: &BnbSolverStatistics) -> Option<String> {
        let deadline = self.deadline?;
        if stats.nodes_popped % self.config.clock_check_interval != 0 || Instant::now() < deadline {
            return None;
        }
        let limit = deadline.saturating_duration_since(self.start_time);
        Some(format!("Time limit of {:.3} seconds exceeded", limit.as_secs_f64()))
    }

    /// The loop of one worker thread.
    fn work<O>(&self, worker: usize, oracle: O) -> BnbSolverStatistics
    where
        O: FeasibilityOracle<V>,
    {
        let mut evaluator = NodeEvaluator::new(self.instance, oracle, self.config, self.deadline);
        let mut stats = BnbSolverStatistics::default();
        let mut children = Children::new();

        loop {
            if let Some(reason) = self.time_limit_exceeded(&stats) {
                debug!(worker, reason = %reason, "worker stopping");
                self.record_abort(reason);
                break;
            }
            let Some(node) = self.frontier.pop_blocking() else {
                break;
            };
            let processed = self.process_node(node, &mut evaluator, &mut stats, &mut children);
            self.frontier.task_done();
            if let Err(error) = processed {
                self.record_error(error);
                break;
            }
        }

        debug!(
            worker,
            popped = stats.nodes_popped,
            expanded = stats.nodes_expanded,
            "worker finished"
        );
        stats
    }

    fn process_node<O>(
        &self,
        node: SearchNode<V>,
        evaluator: &mut NodeEvaluator<'_, V, O>,
        stats: &mut BnbSolverStatistics,
        children: &mut Children<V>,
    ) -> Result<(), BnbError>
    where
        O: FeasibilityOracle<V>,
    {
        let incumbent = &self.incumbent;
        stats.on_node_popped();
        stats.on_depth_update(node.prefix() as u64);

        if node.is_dominated_by(incumbent.best_value()) {
            stats.on_pruning_bound();
            return Ok(());
        }

        let sets = self
            .arena
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .server_sets(node.last(), self.instance.num_servers());
        let assignments = match evaluator.evaluate(&sets, stats)? {
            NodeEvaluation::Feasible(assignments) => assignments,
            NodeEvaluation::Infeasible(_) => {
                stats.on_pruning_infeasible();
                return Ok(());
            }
            NodeEvaluation::Inconclusive(_) => {
                stats.on_pruning_inconclusive();
                return Ok(());
            }
        };

        // The incumbent may have improved during the oracle call.
        if node.is_dominated_by(incumbent.best_value()) {
            stats.on_pruning_bound();
            return Ok(());
        }
        stats.on_node_expanded();

        if incumbent.improves(node.lower_bound()) {
            let allocation = Allocation::from_assignments(self.instance.num_tasks(), assignments);
            if (&self.incumbent).try_install(node.lower_bound(), allocation) {
                stats.on_incumbent_update();
                debug!(value = %node.lower_bound(), "new incumbent");
            }
        }

        if !self.brancher.is_leaf(&node) {
            children.clear();
            let best = incumbent.best_value();
            let outcome = {
                let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
                self.brancher.branch(&node, &mut arena, best, children)
            };
            stats.on_nodes_generated(outcome.generated);
            stats.prunings_bound = stats.prunings_bound.saturating_add(outcome.cut);
            self.frontier.push_all(children.drain(..));
        }
        Ok(())
    }

    /// Builds the outcome once every worker has stopped.
    fn finish(self, stats: BnbSolverStatistics) -> Result<BnbSolverOutcome<V>, BnbError> {
        let error = self.first_error.into_inner().unwrap_or_else(PoisonError::into_inner);
        if let Some(error) = error {
            warn!(error = %error, "parallel branch-and-bound failed");
            return Err(error);
        }
        let (value, allocation) = self.incumbent.into_inner().into_parts();
        let abort = self.abort_reason.into_inner().unwrap_or_else(PoisonError::into_inner);
        info!(
            value = %value,
            popped = stats.nodes_popped,
            expanded = stats.nodes_expanded,
            aborted = abort.is_some(),
            "parallel branch-and-bound finished"
        );
        Ok(match abort {
            Some(reason) => BnbSolverOutcome::aborted(allocation, value, reason, stats),
            None => BnbSolverOutcome::optimal(allocation, value, stats),
        })
    }
}
