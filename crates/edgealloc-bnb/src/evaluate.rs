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

//! # Node Evaluation
//!
//! Evaluating a node asks the feasibility oracle, once per server with
//! committed tasks, whether that server can run its tasks simultaneously.
//! The node survives only if every server answers `Feasible`; the returned
//! speed triples then form a complete allocation of the committed tasks.
//!
//! ## Feasibility cache
//!
//! A skip child commits exactly the same server task sets as its parent, and
//! a server child differs from its parent on a single server, so most
//! questions repeat. `FeasibilityCache` memoises conclusive verdicts keyed by
//! `(server, set of tasks)`. `Inconclusive` verdicts are never cached.
//!
//! ## Defensive re-validation
//!
//! Every feasible verdict coming from the oracle is re-validated exactly
//! (when `verify_oracle` is set) before it is cached or used. A violation is
//! fatal and aborts the solve with `BnbError::OracleUnsoundResult`.

use crate::{arena::TaskList, config::BnbConfig, error::BnbError, stats::BnbSolverStatistics};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{
    allocation::Assignment,
    error::SpeedViolation,
    index::{ServerIndex, TaskIndex},
    instance::Instance,
    task::Task,
};
use edgealloc_oracle::{
    oracle::{FeasibilityOracle, FeasibilityVerdict, OracleBudget},
    validate::validate_speeds,
};
use fixedbitset::FixedBitSet;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::time::Instant;
use tracing::{debug, warn};

/// Memoised conclusive feasibility verdicts keyed by server and task set.
#[derive(Clone, Debug)]
pub struct FeasibilityCache {
    entries: FxHashMap<ServerIndex, FxHashMap<FixedBitSet, FeasibilityVerdict>>,
    len: usize,
    capacity: usize,
}

impl FeasibilityCache {
    /// Creates a cache holding at most `capacity` verdicts. When full, the
    /// cache is cleared before the next insertion.
    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: FxHashMap::default(),
            len: 0,
            capacity,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
        self.len = 0;
    }

    /// Returns the cached verdict of `tasks` on `server`.
    #[inline]
    pub fn get(&self, server: ServerIndex, tasks: &FixedBitSet) -> Option<&FeasibilityVerdict> {
        self.entries.get(&server)?.get(tasks)
    }

    /// Caches a conclusive verdict. `Inconclusive` verdicts are ignored.
    #[inline]
    pub fn insert(&mut self, server: ServerIndex, tasks: FixedBitSet, verdict: FeasibilityVerdict) {
        if verdict.is_inconclusive() || self.capacity == 0 {
            return;
        }
        if self.len >= self.capacity {
            self.clear();
        }
        if self.entries.entry(server).or_default().insert(tasks, verdict).is_none() {
            self.len += 1;
        }
    }
}

/// The result of evaluating one node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeEvaluation {
    /// Every server can run its tasks; one assignment per committed task.
    Feasible(Vec<(TaskIndex, Assignment)>),
    /// `server` cannot run its committed tasks.
    Infeasible(ServerIndex),
    /// The oracle ran out of budget on `server`.
    Inconclusive(ServerIndex),
}

/// Evaluates nodes of one instance against an oracle. Each worker owns one.
pub struct NodeEvaluator<'a, V, O> {
    instance: &'a Instance<V>,
    oracle: O,
    cache: FeasibilityCache,
    config: &'a BnbConfig,
    solve_deadline: Option<Instant>,
}

impl<'a, V, O> NodeEvaluator<'a, V, O>
where
    V: TaskValue,
    O: FeasibilityOracle<V>,
{
    #[inline]
    pub fn new(instance: &'a Instance<V>, oracle: O, config: &'a BnbConfig, solve_deadline: Option<Instant>) -> Self {
        Self {
            instance,
            oracle,
            cache: FeasibilityCache::with_capacity(config.feasibility_cache_capacity),
            config,
            solve_deadline,
        }
    }

    #[inline]
    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }

    /// The budget of one oracle call: the oracle time limit from now, cut off
    /// by the deadline of the whole solve.
    fn budget(&self) -> OracleBudget {
        let per_call = self
            .config
            .oracle_time_limit
            .and_then(|limit| Instant::now().checked_add(limit));
        let deadline = match (per_call, self.solve_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };
        OracleBudget::unlimited()
            .with_deadline(deadline)
            .with_max_work(self.config.oracle_max_work)
    }

    fn unsound(&self, server: ServerIndex, tasks: &[TaskIndex], violation: SpeedViolation) -> BnbError {
        let task = violation.task_position().and_then(|p| tasks.get(p).copied());
        warn!(
            oracle = self.oracle.name(),
            server = server.get(),
            violation = %violation,
            "oracle returned an unsound feasible verdict"
        );
        BnbError::OracleUnsoundResult {
            oracle: self.oracle.name().to_string(),
            server,
            task,
            violation,
        }
    }

    /// Decides whether `server` can run `tasks`, consulting the cache first.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::OracleUnsoundResult` if a feasible verdict fails
    /// re-validation.
    pub fn server_verdict(
        &mut self,
        server: ServerIndex,
        tasks: &[TaskIndex],
        stats: &mut BnbSolverStatistics,
    ) -> Result<FeasibilityVerdict, BnbError> {
        let mut key = FixedBitSet::with_capacity(self.instance.num_tasks());
        for task in tasks {
            key.insert(task.get());
        }
        if let Some(verdict) = self.cache.get(server, &key) {
            stats.on_oracle_cache_hit();
            return Ok(verdict.clone());
        }

        stats.on_oracle_call();
        let refs: SmallVec<[&Task<V>; 8]> = tasks.iter().map(|&t| self.instance.task(t)).collect();
        let capacity = self.instance.server(server);
        let budget = self.budget();
        let verdict = self.oracle.solve_feasibility(capacity, &refs, budget);

        match &verdict {
            FeasibilityVerdict::Feasible(speeds) => {
                if speeds.len() != tasks.len() {
                    let violation = SpeedViolation::CountMismatch {
                        tasks: tasks.len(),
                        speeds: speeds.len(),
                    };
                    return Err(self.unsound(server, tasks, violation));
                }
                if self.config.verify_oracle
                    && let Err(violation) = validate_speeds(capacity, &refs, speeds)
                {
                    return Err(self.unsound(server, tasks, violation));
                }
            }
            FeasibilityVerdict::Infeasible => {}
            FeasibilityVerdict::Inconclusive => {
                stats.on_oracle_inconclusive();
                debug!(
                    oracle = self.oracle.name(),
                    server = server.get(),
                    tasks = tasks.len(),
                    "oracle call inconclusive"
                );
            }
        }

        self.cache.insert(server, key, verdict.clone());
        Ok(verdict)
    }

    /// Evaluates a node given the committed tasks of every server.
    ///
    /// # Errors
    ///
    /// Propagates `BnbError::OracleUnsoundResult`.
    pub fn evaluate(&mut self, sets: &[TaskList], stats: &mut BnbSolverStatistics) -> Result<NodeEvaluation, BnbError> {
        let mut assignments = Vec::with_capacity(sets.iter().map(|s| s.len()).sum());
        for (s, tasks) in sets.iter().enumerate() {
            if tasks.is_empty() {
                continue;
            }
            let server = ServerIndex::new(s);
            match self.server_verdict(server, tasks, stats)? {
                FeasibilityVerdict::Feasible(speeds) => {
                    assignments.extend(
                        tasks
                            .iter()
                            .zip(speeds)
                            .map(|(&task, speeds)| (task, Assignment::new(server, speeds))),
                    );
                }
                FeasibilityVerdict::Infeasible => return Ok(NodeEvaluation::Infeasible(server)),
                FeasibilityVerdict::Inconclusive => return Ok(NodeEvaluation::Inconclusive(server)),
            }
        }
        Ok(NodeEvaluation::Feasible(assignments))
    }
}

impl<'a, V, O> std::fmt::Debug for NodeEvaluator<'a, V, O>
where
    V: TaskValue,
    O: FeasibilityOracle<V>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeEvaluator")
            .field("oracle", &self.oracle.name())
            .field("cached_verdicts", &self.cache.len())
            .finish()
    }
}
