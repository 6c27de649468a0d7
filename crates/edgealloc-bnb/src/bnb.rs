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

//! Best-first branch-and-bound for optimal task to server allocation.
//!
//! This module implements the sequential reference engine. The `BnbSolver`
//! owns a reusable decision arena and frontier, so repeated solves do not
//! reallocate; both are cleared after every run while their capacity is kept.
//!
//! A search session decides tasks in their fixed instance order. The root is
//! branched directly; after that the session repeatedly pops the frontier
//! node with the greatest lower bound, re-checks its upper bound against the
//! incumbent, asks the feasibility oracle about every server with committed
//! tasks, installs the node as the new incumbent when it is better, and
//! branches on the next task. The search ends when the frontier runs dry
//! (optimality proven) or when the time limit or a monitor stops it early
//! (the incumbent is returned flagged partial).

use crate::{
    arena::DecisionArena,
    branching::{Children, TaskBrancher},
    config::BnbConfig,
    error::BnbError,
    evaluate::{NodeEvaluation, NodeEvaluator},
    incumbent::{IncumbentStore, LocalIncumbent},
    monitor::tree_search_monitor::{PruneReason, SearchCommand, TreeSearchMonitor},
    node::{NodeView, SearchNode},
    queue::PriorityQueue,
    result::{BnbSolverOutcome, BnbTerminationReason},
    stats::BnbSolverStatistics,
};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{allocation::Allocation, instance::Instance};
use edgealloc_oracle::oracle::FeasibilityOracle;
use std::{cmp::Ordering, time::Instant};
use tracing::debug;

type FrontierOrder<V> = fn(&SearchNode<V>, &SearchNode<V>) -> Ordering;

/// The sequential branch-and-bound engine.
///
/// This is just the execution engine; eligibility and bounds come from a
/// `TaskBrancher` and feasibility from a `FeasibilityOracle`.
pub struct BnbSolver<V>
where
    V: TaskValue,
{
    arena: DecisionArena,
    frontier: PriorityQueue<SearchNode<V>, FrontierOrder<V>>,
}

impl<V> Default for BnbSolver<V>
where
    V: TaskValue,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V> BnbSolver<V>
where
    V: TaskValue,
{
    #[inline]
    pub fn new() -> Self {
        Self {
            arena: DecisionArena::new(),
            frontier: PriorityQueue::new(SearchNode::<V>::frontier_order as FrontierOrder<V>),
        }
    }

    /// Creates a solver with storage preallocated for `num_nodes` decision
    /// records and frontier entries. This only moves allocation cost to
    /// construction time; both grow on demand.
    #[inline]
    pub fn preallocated(num_nodes: usize) -> Self {
        Self {
            arena: DecisionArena::with_capacity(num_nodes),
            frontier: PriorityQueue::with_capacity(num_nodes, SearchNode::<V>::frontier_order as FrontierOrder<V>),
        }
    }

    /// Solves `instance` with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::OracleUnsoundResult` if the oracle claims a server
    /// set is feasible with speeds that violate a constraint.
    #[inline]
    pub fn solve<O, S>(&mut self, instance: &Instance<V>, oracle: &mut O, monitor: S) -> Result<BnbSolverOutcome<V>, BnbError>
    where
        O: FeasibilityOracle<V>,
        S: TreeSearchMonitor<V>,
    {
        self.solve_with_config(instance, oracle, monitor, &BnbConfig::default())
    }

    /// Solves `instance` under `config`.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::InvalidConfig` if `config` fails validation,
    /// `BnbError::Model` if the summed task value does not fit `V`, and
    /// `BnbError::OracleUnsoundResult` if the oracle returns speeds that
    /// violate a constraint.
    pub fn solve_with_config<O, S>(
        &mut self,
        instance: &Instance<V>,
        oracle: &mut O,
        mut monitor: S,
        config: &BnbConfig,
    ) -> Result<BnbSolverOutcome<V>, BnbError>
    where
        O: FeasibilityOracle<V>,
        S: TreeSearchMonitor<V>,
    {
        config.validate()?;
        let session = BnbSolverSearchSession::new(self, instance, oracle, &mut monitor, config)?;
        let res = session.run();
        self.reset();
        res
    }

    /// Clears the arena and the frontier, keeping their capacity.
    #[inline]
    pub fn reset(&mut self) {
        self.arena.clear();
        self.frontier.clear();
    }
}

impl<V> std::fmt::Debug for BnbSolver<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BnbSolver")
            .field("arena", &self.arena.len())
            .field("frontier", &self.frontier.len())
            .finish()
    }
}

/// The state and logic of a single search run.
struct BnbSolverSearchSession<'a, V, O, S>
where
    V: TaskValue,
{
    solver: &'a mut BnbSolver<V>,
    instance: &'a Instance<V>,
    brancher: TaskBrancher<V>,
    evaluator: NodeEvaluator<'a, V, &'a mut O>,
    monitor: &'a mut S,
    incumbent: LocalIncumbent<V>,
    children: Children<V>,
    stats: BnbSolverStatistics,
    clock_check_interval: u64,
    start_time: Instant,
    deadline: Option<Instant>,
}

impl<'a, V, O, S> BnbSolverSearchSession<'a, V, O, S>
where
    V: TaskValue,
    O: FeasibilityOracle<V>,
    S: TreeSearchMonitor<V>,
{
    fn new(
        solver: &'a mut BnbSolver<V>,
        instance: &'a Instance<V>,
        oracle: &'a mut O,
        monitor: &'a mut S,
        config: &'a BnbConfig,
    ) -> Result<Self, BnbError> {
        let start_time = Instant::now();
        let deadline = config.time_limit.and_then(|limit| start_time.checked_add(limit));
        let brancher = TaskBrancher::new(instance)?;
        Ok(Self {
            solver,
            instance,
            brancher,
            evaluator: NodeEvaluator::new(instance, oracle, config, deadline),
            monitor,
            incumbent: LocalIncumbent::empty(instance.num_tasks()),
            children: Children::new(),
            stats: BnbSolverStatistics::default(),
            clock_check_interval: config.clock_check_interval,
            start_time,
            deadline,
        })
    }

    fn run(mut self) -> Result<BnbSolverOutcome<V>, BnbError> {
        self.monitor.on_enter_search(self.instance, &self.stats);
        debug!(
            tasks = self.instance.num_tasks(),
            servers = self.instance.num_servers(),
            oracle = self.evaluator.oracle_name(),
            "starting sequential branch-and-bound"
        );

        let searched = self.search();
        self.stats.set_total_time(self.start_time.elapsed());
        self.monitor.on_exit_search(&self.stats);
        let reason = searched?;
        Ok(self.finalize_result(reason))
    }

    fn search(&mut self) -> Result<BnbTerminationReason, BnbError> {
        if self.instance.num_tasks() == 0 || self.instance.num_servers() == 0 {
            return Ok(BnbTerminationReason::OptimalityProven);
        }

        let root = self.brancher.root();
        self.enqueue_children(&root);

        loop {
            if let Some(reason) = self.time_limit_exceeded() {
                break Ok(BnbTerminationReason::Aborted(reason));
            }
            if let SearchCommand::Terminate(reason) = self.monitor.search_command(&self.stats) {
                break Ok(BnbTerminationReason::Aborted(reason));
            }
            let Ok(node) = self.solver.frontier.pop() else {
                break Ok(BnbTerminationReason::OptimalityProven);
            };
            self.process_node(node)?;
        }
    }

    /// Checks the solve deadline every `clock_check_interval` pops.
    fn time_limit_exceeded(&self) -> Option<String> {
        let deadline = self.deadline?;
        if self.stats.nodes_popped % self.clock_check_interval != 0 || Instant::now() < deadline {
            return None;
        }
        let limit = deadline.saturating_duration_since(self.start_time);
        Some(format!("Time limit of {:.3} seconds exceeded", limit.as_secs_f64()))
    }

    fn process_node(&mut self, node: SearchNode<V>) -> Result<(), BnbError> {
        self.stats.on_node_popped();
        self.stats.on_depth_update(node.prefix() as u64);
        self.monitor
            .on_node_popped(&NodeView::new(&node, &self.solver.arena), &self.stats);

        if node.is_dominated_by(self.incumbent.best_value()) {
            self.stats.on_pruning_bound();
            self.prune(&node, PruneReason::BoundDominated);
            return Ok(());
        }

        let sets = self.solver.arena.server_sets(node.last(), self.instance.num_servers());
        let assignments = match self.evaluator.evaluate(&sets, &mut self.stats)? {
            NodeEvaluation::Feasible(assignments) => assignments,
            NodeEvaluation::Infeasible(server) => {
                self.stats.on_pruning_infeasible();
                self.prune(&node, PruneReason::Infeasible { server });
                return Ok(());
            }
            NodeEvaluation::Inconclusive(server) => {
                self.stats.on_pruning_inconclusive();
                self.prune(&node, PruneReason::Inconclusive { server });
                return Ok(());
            }
        };
        self.stats.on_node_expanded();

        if self.incumbent.improves(node.lower_bound()) {
            let allocation = Allocation::from_assignments(self.instance.num_tasks(), assignments);
            self.install_incumbent(node.lower_bound(), allocation);
        }

        if !self.brancher.is_leaf(&node) {
            self.enqueue_children(&node);
        }
        Ok(())
    }

    fn prune(&mut self, node: &SearchNode<V>, reason: PruneReason) {
        self.monitor
            .on_prune(&NodeView::new(node, &self.solver.arena), reason, &self.stats);
    }

    fn install_incumbent(&mut self, value: V, allocation: Allocation) {
        debug_assert!(
            allocation.verify(self.instance.tasks(), self.instance.servers()).is_ok(),
            "called `BnbSolverSearchSession::install_incumbent` with an allocation that violates a constraint"
        );
        if self.incumbent.try_install(value, allocation) {
            self.stats.on_incumbent_update();
            debug!(value = %value, popped = self.stats.nodes_popped, "new incumbent");
            self.monitor
                .on_incumbent_improved(value, self.incumbent.allocation(), &self.stats);
        }
    }

    fn enqueue_children(&mut self, node: &SearchNode<V>) {
        self.children.clear();
        let outcome = self.brancher.branch(
            node,
            &mut self.solver.arena,
            self.incumbent.best_value(),
            &mut self.children,
        );
        self.stats.on_nodes_generated(outcome.generated);
        self.stats.prunings_bound = self.stats.prunings_bound.saturating_add(outcome.cut);

        let count = self.children.len();
        self.solver.frontier.push_all(self.children.drain(..));
        self.stats.on_frontier_size(self.solver.frontier.len() as u64);
        self.monitor
            .on_children_enqueued(&NodeView::new(node, &self.solver.arena), count, &self.stats);
    }

    /// Consumes the session and builds the outcome from the incumbent.
    fn finalize_result(self, reason: BnbTerminationReason) -> BnbSolverOutcome<V> {
        let (value, allocation) = self.incumbent.into_parts();
        match reason {
            BnbTerminationReason::OptimalityProven => BnbSolverOutcome::optimal(allocation, value, self.stats),
            BnbTerminationReason::Aborted(msg) => BnbSolverOutcome::aborted(allocation, value, msg, self.stats),
        }
    }
}

impl<'a, V, O, S> std::fmt::Display for BnbSolverSearchSession<'a, V, O, S>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SearchSession(incumbent: {}, frontier: {}, stats: {})",
            self.incumbent.value(),
            self.solver.frontier.len(),
            self.stats
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixtures::{brute_force_optimum, random_instance, scenario},
        monitor::{interrupt::InterruptMonitor, no_op::NoOperationMonitor},
    };
    use edgealloc_model::{index::TaskIndex, server::Server, speed::SpeedTriple, task::Task};
    use edgealloc_oracle::{
        enumeration::ExactEnumerationOracle,
        fixed::FixedSpeedOracle,
        oracle::{FeasibilityVerdict, OracleBudget},
    };
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::{sync::atomic::AtomicBool, time::Duration};

    fn solve(instance: &Instance<i64>) -> BnbSolverOutcome<i64> {
        let mut oracle = ExactEnumerationOracle::new();
        BnbSolver::new()
            .solve(instance, &mut oracle, NoOperationMonitor::new())
            .unwrap()
    }

    fn assert_valid(instance: &Instance<i64>, outcome: &BnbSolverOutcome<i64>) {
        let allocation = outcome.allocation();
        assert_eq!(allocation.num_tasks(), instance.num_tasks());
        assert!(allocation.verify(instance.tasks(), instance.servers()).is_ok());
        assert_eq!(allocation.social_welfare(instance.tasks()), outcome.achieved_value());
    }

    #[test]
    fn test_scenario_picks_more_valuable_task_in_both_orders() {
        for reversed in [false, true] {
            let instance = scenario(reversed);
            let outcome = solve(&instance);
            assert_valid(&instance, &outcome);
            assert_eq!(outcome.achieved_value(), 8);
            assert!(outcome.is_certified_optimal());

            let (task1, task2) = if reversed { (1, 0) } else { (0, 1) };
            assert!(!outcome.allocation().is_assigned(TaskIndex::new(task1)));
            assert!(outcome.allocation().is_assigned(TaskIndex::new(task2)));
        }
    }

    #[test]
    fn test_zero_tasks() {
        let instance = Instance::<i64>::new(Vec::new(), vec![Server::new("s", 1, 1, 1).unwrap()]);
        let outcome = solve(&instance);
        assert_eq!(outcome.achieved_value(), 0);
        assert!(outcome.allocation().is_empty());
        assert!(outcome.is_certified_optimal());
        assert_eq!(outcome.statistics().nodes_popped, 0);
    }

    #[test]
    fn test_zero_servers_leaves_everything_unassigned() {
        let instance = Instance::new(
            vec![
                Task::new("a", 1, 1, 1, 10, 3i64).unwrap(),
                Task::new("b", 1, 1, 1, 10, 4i64).unwrap(),
            ],
            Vec::new(),
        );
        let outcome = solve(&instance);
        assert_eq!(outcome.achieved_value(), 0);
        assert_eq!(outcome.allocation().num_tasks(), 2);
        assert_eq!(outcome.allocation().num_assigned(), 0);
        assert!(outcome.is_certified_optimal());
    }

    #[test]
    fn test_unhostable_task_is_left_unassigned() {
        let instance = Instance::new(
            vec![
                Task::new("too big", 50, 1, 1, 10, 100i64).unwrap(),
                Task::new("fits", 5, 1, 1, 10, 1i64).unwrap(),
            ],
            vec![Server::new("s", 10, 10, 10).unwrap()],
        );
        let outcome = solve(&instance);
        assert_valid(&instance, &outcome);
        assert_eq!(outcome.achieved_value(), 1);
        assert!(!outcome.allocation().is_assigned(TaskIndex::new(0)));
    }

    #[test]
    fn test_matches_brute_force_on_small_instances() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
        for round in 0..60 {
            let n = 1 + round % 4;
            let m = 1 + round % 2;
            let instance = random_instance(&mut rng, n, m);
            let outcome = solve(&instance);
            assert_valid(&instance, &outcome);
            assert_eq!(
                outcome.achieved_value(),
                brute_force_optimum(&instance),
                "round {} on {}",
                round,
                instance
            );
            assert!(outcome.is_certified_optimal());
        }
    }

    #[test]
    fn test_value_is_monotone_in_server_capacity() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        for _ in 0..25 {
            let instance = random_instance(&mut rng, 4, 2);
            let grown = Instance::new(
                instance.tasks().to_vec(),
                instance
                    .servers()
                    .iter()
                    .map(|s| {
                        Server::new(
                            s.name(),
                            s.storage_capacity() + 5,
                            s.computation_capacity() + 2,
                            s.bandwidth_capacity() + 3,
                        )
                        .unwrap()
                    })
                    .collect(),
            );
            assert!(solve(&grown).achieved_value() >= solve(&instance).achieved_value());
        }
    }

    /// Records the committed server sets of every infeasible prune.
    #[derive(Default)]
    struct PruneRecorder {
        infeasible: Vec<(usize, Vec<TaskIndex>)>,
        popped: u64,
        pruned: u64,
        improved: u64,
        enqueued: usize,
        entered: bool,
        exited: bool,
    }

    impl TreeSearchMonitor<i64> for PruneRecorder {
        fn name(&self) -> &str {
            "PruneRecorder"
        }
        fn on_enter_search(&mut self, _: &Instance<i64>, _: &BnbSolverStatistics) {
            self.entered = true;
        }
        fn on_exit_search(&mut self, _: &BnbSolverStatistics) {
            self.exited = true;
        }
        fn on_node_popped(&mut self, _: &NodeView<'_, i64>, _: &BnbSolverStatistics) {
            self.popped += 1;
        }
        fn on_prune(&mut self, node: &NodeView<'_, i64>, reason: PruneReason, _: &BnbSolverStatistics) {
            self.pruned += 1;
            if let PruneReason::Infeasible { server } = reason {
                self.infeasible.push((server.get(), node.server_tasks(server).to_vec()));
            }
        }
        fn on_incumbent_improved(&mut self, _: i64, _: &Allocation, _: &BnbSolverStatistics) {
            self.improved += 1;
        }
        fn on_children_enqueued(&mut self, _: &NodeView<'_, i64>, count: usize, _: &BnbSolverStatistics) {
            self.enqueued += count;
        }
    }

    #[test]
    fn test_infeasible_prunes_are_confirmed_by_the_oracle() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut confirmed = 0;
        for _ in 0..30 {
            let instance = random_instance(&mut rng, 5, 2);
            let mut recorder = PruneRecorder::default();
            let mut oracle = ExactEnumerationOracle::new();
            BnbSolver::new().solve(&instance, &mut oracle, &mut recorder).unwrap();

            let mut fresh = ExactEnumerationOracle::new();
            for (server, tasks) in &recorder.infeasible {
                let refs: Vec<&Task<i64>> = tasks.iter().map(|&t| instance.task(t)).collect();
                let verdict = fresh.solve_feasibility(&instance.servers()[*server], &refs, OracleBudget::unlimited());
                assert_eq!(verdict, FeasibilityVerdict::Infeasible);
                confirmed += 1;
            }
        }
        assert!(confirmed > 0);
    }

    #[test]
    fn test_monitor_sees_every_event() {
        let instance = scenario(false);
        let mut recorder = PruneRecorder::default();
        let mut oracle = ExactEnumerationOracle::new();
        let outcome = BnbSolver::new().solve(&instance, &mut oracle, &mut recorder).unwrap();
        let stats = outcome.statistics();

        assert!(recorder.entered && recorder.exited);
        assert_eq!(recorder.popped, stats.nodes_popped);
        assert_eq!(
            recorder.pruned,
            stats.nodes_popped - stats.nodes_expanded
        );
        assert_eq!(recorder.improved, stats.incumbent_updates);
        assert_eq!(recorder.enqueued as u64, stats.nodes_generated);
        assert!(stats.incumbent_updates >= 1);
    }

    /// Answers `Inconclusive` whenever more than one task shares a server.
    struct ImpatientOracle(ExactEnumerationOracle);

    impl FeasibilityOracle<i64> for ImpatientOracle {
        fn name(&self) -> &str {
            "ImpatientOracle"
        }
        fn solve_feasibility(&mut self, server: &Server, tasks: &[&Task<i64>], budget: OracleBudget) -> FeasibilityVerdict {
            if tasks.len() > 1 {
                return FeasibilityVerdict::Inconclusive;
            }
            self.0.solve_feasibility(server, tasks, budget)
        }
    }

    #[test]
    fn test_inconclusive_calls_are_pruned_and_counted() {
        let instance = Instance::new(
            vec![
                Task::new("a", 1, 1, 1, 100, 3i64).unwrap(),
                Task::new("b", 1, 1, 1, 100, 4i64).unwrap(),
            ],
            vec![Server::new("s", 10, 10, 10).unwrap()],
        );
        let mut oracle = ImpatientOracle(ExactEnumerationOracle::new());
        let outcome = BnbSolver::new()
            .solve(&instance, &mut oracle, NoOperationMonitor::new())
            .unwrap();
        assert_valid(&instance, &outcome);
        assert_eq!(outcome.achieved_value(), 4);
        assert!(outcome.statistics().oracle_inconclusive >= 1);
        assert!(outcome.statistics().prunings_inconclusive >= 1);
        assert!(!outcome.is_partial());
        assert!(!outcome.is_certified_optimal());
    }

    #[test]
    fn test_fixed_speed_oracle_drives_the_search() {
        let instance = scenario(false);
        let mut oracle = FixedSpeedOracle::new()
            .with_speeds("task1", SpeedTriple::new(1, 1, 1))
            .with_speeds("task2", SpeedTriple::new(1, 1, 1));
        let outcome = BnbSolver::new()
            .solve(&instance, &mut oracle, NoOperationMonitor::new())
            .unwrap();
        assert_valid(&instance, &outcome);
        assert_eq!(outcome.achieved_value(), 8);
        assert_eq!(
            outcome.allocation().assignment(TaskIndex::new(1)).map(|a| a.speeds()),
            Some(SpeedTriple::new(1, 1, 1))
        );
    }

    /// Claims every set is feasible at speed (1, 1, 1).
    struct Liar;

    impl FeasibilityOracle<i64> for Liar {
        fn name(&self) -> &str {
            "Liar"
        }
        fn solve_feasibility(&mut self, _: &Server, tasks: &[&Task<i64>], _: OracleBudget) -> FeasibilityVerdict {
            FeasibilityVerdict::Feasible(vec![SpeedTriple::new(1, 1, 1); tasks.len()])
        }
    }

    #[test]
    fn test_unsound_oracle_aborts_with_error() {
        // Both tasks together overflow the storage of the only server.
        let instance = scenario(false);
        let err = BnbSolver::new()
            .solve(&instance, &mut Liar, NoOperationMonitor::new())
            .unwrap_err();
        match err {
            BnbError::OracleUnsoundResult { oracle, .. } => assert_eq!(oracle, "Liar"),
            other => panic!("expected an unsound result, got {}", other),
        }
    }

    #[test]
    fn test_zero_time_limit_returns_partial_outcome() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let instance = random_instance(&mut rng, 6, 2);
        let config = BnbConfig::default().with_time_limit(Some(Duration::ZERO));
        let mut oracle = ExactEnumerationOracle::new();
        let outcome = BnbSolver::new()
            .solve_with_config(&instance, &mut oracle, NoOperationMonitor::new(), &config)
            .unwrap();
        assert!(outcome.is_partial());
        assert!(!outcome.is_certified_optimal());
        assert_eq!(outcome.statistics().nodes_popped, 0);
        assert_valid(&instance, &outcome);
    }

    #[test]
    fn test_interrupt_stops_the_search() {
        let instance = scenario(false);
        let flag = AtomicBool::new(true);
        let mut oracle = ExactEnumerationOracle::new();
        let outcome = BnbSolver::new()
            .solve(&instance, &mut oracle, InterruptMonitor::new(&flag))
            .unwrap();
        assert_eq!(
            outcome.termination_reason(),
            &BnbTerminationReason::Aborted("Interrupt signal received".to_string())
        );
        assert_eq!(outcome.achieved_value(), 0);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let instance = scenario(false);
        let config = BnbConfig::default().with_clock_check_interval(0);
        let mut oracle = ExactEnumerationOracle::new();
        let err = BnbSolver::new()
            .solve_with_config(&instance, &mut oracle, NoOperationMonitor::new(), &config)
            .unwrap_err();
        assert!(matches!(err, BnbError::InvalidConfig(_)));
    }

    #[test]
    fn test_overflowing_total_value_is_rejected() {
        let instance = Instance::new(
            vec![
                Task::new("a", 1, 1, 1, 100, 200u8).unwrap(),
                Task::new("b", 1, 1, 1, 100, 100u8).unwrap(),
            ],
            vec![Server::new("s", 10, 10, 10).unwrap()],
        );
        let mut oracle = ExactEnumerationOracle::new();
        let err = BnbSolver::new()
            .solve(&instance, &mut oracle, NoOperationMonitor::new())
            .unwrap_err();
        assert!(matches!(
            err,
            BnbError::Model(edgealloc_model::error::ModelError::ValueOverflow { num_tasks: 2 })
        ));

        // Degenerate instances are rejected as well.
        let no_servers = Instance::new(instance.tasks().to_vec(), Vec::new());
        assert!(BnbSolver::new()
            .solve(&no_servers, &mut oracle, NoOperationMonitor::new())
            .is_err());
    }

    #[test]
    fn test_huge_capacities_respect_the_time_limit() {
        // Billions of compute and bandwidth units. "heavy" cannot meet its
        // deadline even on the empty server.
        let instance = Instance::new(
            vec![
                Task::new("heavy", 4_000_000_000, 4_000_000_000, 4_000_000_000, 3, 7i64).unwrap(),
                Task::new("light", 1_000_000, 1_000_000_000, 1_000_000, 2, 5i64).unwrap(),
            ],
            vec![Server::new("wide", u32::MAX, u32::MAX, 4_000_000_000).unwrap()],
        );
        let config = BnbConfig::default().with_time_limit(Some(Duration::from_millis(500)));
        let mut oracle = ExactEnumerationOracle::new();
        let start = std::time::Instant::now();
        let outcome = BnbSolver::new()
            .solve_with_config(&instance, &mut oracle, NoOperationMonitor::new(), &config)
            .unwrap();
        assert!(start.elapsed() < Duration::from_secs(10));
        assert_valid(&instance, &outcome);
        assert_eq!(outcome.achieved_value(), 5);
        assert!(outcome.is_certified_optimal());
    }

    #[test]
    fn test_fractional_values() {
        let instance = Instance::new(
            vec![
                Task::new("a", 6, 1, 1, 100, 0.5f64).unwrap(),
                Task::new("b", 6, 1, 1, 100, 0.75f64).unwrap(),
                Task::new("c", 4, 1, 1, 100, 0.5f64).unwrap(),
            ],
            vec![Server::new("s", 10, 10, 10).unwrap()],
        );
        let mut oracle = ExactEnumerationOracle::new();
        let outcome = BnbSolver::new()
            .solve(&instance, &mut oracle, NoOperationMonitor::new())
            .unwrap();
        assert!((outcome.achieved_value() - 1.25).abs() < 1e-9);
        assert!(outcome.allocation().is_assigned(TaskIndex::new(1)));
        assert!(outcome.allocation().is_assigned(TaskIndex::new(2)));
    }

    #[test]
    fn test_solver_is_reusable() {
        let mut solver = BnbSolver::preallocated(64);
        let mut oracle = ExactEnumerationOracle::new();
        for reversed in [false, true, false] {
            let outcome = solver
                .solve(&scenario(reversed), &mut oracle, NoOperationMonitor::new())
                .unwrap();
            assert_eq!(outcome.achieved_value(), 8);
        }
    }
}
