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

//! # Exact Enumeration Oracle
//!
//! An exact feasibility oracle built from two observations:
//!
//! 1. For a fixed compute speed `c`, the deadline of a task only constrains
//!    its loading speed `l` and sending speed `s`, and both only compete for
//!    bandwidth through their sum. So for each `c` there is a minimal
//!    bandwidth `l + s` that meets the deadline
//!    (`Task::min_bandwidth_split`), and it never grows with `c`.
//!
//! 2. With the options `(c, min bandwidth)` per task, a server can host a
//!    task set iff one option per task can be picked with `Σ c ≤ C` and
//!    `Σ bandwidth ≤ B`. This is a multiple-choice knapsack, solved by a
//!    dynamic program over Pareto-optimal partial selections
//!    `(Σ c, Σ bandwidth)`.
//!
//! Only the Pareto front of each task's options is kept: larger compute
//! speeds only if they strictly lower the bandwidth. The front is walked by
//! binary search over compute speeds, so its cost depends on the number of
//! front points and not on the server's capacities. Most sets are decided
//! from the two ends of each front alone (the slowest option that fits the
//! bandwidth capacity and the cheapest option overall), and the full fronts
//! are only built when those do not settle the question. Fronts are memoised
//! per `(task demands, server capacities)` across calls.
//!
//! All deadline arithmetic is exact integer arithmetic in `u128`.
//!
//! ## Budget
//!
//! Each binary search step and each knapsack state costs one unit of work,
//! charged before the work is done. When the `OracleBudget` is exhausted the
//! oracle answers `Inconclusive` and does not cache partial fronts.

use crate::oracle::{BudgetMeter, FeasibilityOracle, FeasibilityVerdict, OracleBudget};
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{server::Server, speed::SpeedTriple, task::Task};
use rustc_hash::FxHashMap;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct TableKey {
    storage: u32,
    computation: u32,
    results_data: u32,
    deadline: u32,
    computation_capacity: u32,
    bandwidth_capacity: u32,
}

impl TableKey {
    #[inline]
    fn new<V>(task: &Task<V>, server: &Server) -> Self
    where
        V: TaskValue,
    {
        Self {
            storage: task.storage(),
            computation: task.computation(),
            results_data: task.results_data(),
            deadline: task.deadline(),
            computation_capacity: server.computation_capacity(),
            bandwidth_capacity: server.bandwidth_capacity(),
        }
    }
}

/// One Pareto-optimal way to run a task: a compute speed and the cheapest
/// loading/sending split that meets the deadline with it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct SpeedOption {
    loading: u32,
    compute: u32,
    sending: u32,
}

impl SpeedOption {
    #[inline]
    fn bandwidth(&self) -> u64 {
        self.loading as u64 + self.sending as u64
    }

    #[inline]
    fn speeds(&self) -> SpeedTriple {
        SpeedTriple::new(self.loading, self.compute, self.sending)
    }
}

/// The slowest option fitting the bandwidth capacity and the cheapest
/// option of a task's front.
type FrontEnds = (SpeedOption, SpeedOption);

/// Memoised options of one task on one server.
#[derive(Clone, Debug, Default)]
struct SpeedTable {
    /// `None` if the task cannot run on the server at all.
    ends: Option<FrontEnds>,
    /// The full front, built on demand.
    front: Option<Vec<SpeedOption>>,
}

/// Marker for an exhausted budget.
#[derive(Clone, Copy, Debug)]
struct Exhausted;

#[inline]
fn charge(meter: &mut BudgetMeter, units: u64) -> Result<(), Exhausted> {
    if meter.charge(units) {
        Ok(())
    } else {
        Err(Exhausted)
    }
}

/// The smallest compute speed `c` with `deadline·c > computation`.
#[inline]
fn lowest_compute<V>(task: &Task<V>) -> u32
where
    V: TaskValue,
{
    (task.computation() / task.deadline()).saturating_add(1)
}

/// Returns the option with the smallest compute speed in `low..=capacity`
/// whose cheapest split needs at most `limit` bandwidth.
fn first_option_within<V>(
    task: &Task<V>,
    low: u32,
    capacity: u32,
    limit: u32,
    meter: &mut BudgetMeter,
) -> Result<Option<SpeedOption>, Exhausted>
where
    V: TaskValue,
{
    charge(meter, 1)?;
    if low > capacity || task.min_bandwidth_split(capacity, limit).is_none() {
        return Ok(None);
    }
    // The needed bandwidth never grows with the compute speed.
    let (mut lo, mut hi) = (low, capacity);
    while lo < hi {
        charge(meter, 1)?;
        let mid = lo + (hi - lo) / 2;
        if task.min_bandwidth_split(mid, limit).is_some() {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    Ok(task.min_bandwidth_split(lo, limit).map(|(loading, sending)| SpeedOption {
        loading,
        compute: lo,
        sending,
    }))
}

/// Finds both ends of the front of `task` on `server`.
fn front_ends<V>(task: &Task<V>, server: &Server, meter: &mut BudgetMeter) -> Result<Option<FrontEnds>, Exhausted>
where
    V: TaskValue,
{
    let capacity = server.computation_capacity();
    let Some((loading, sending)) = task.min_bandwidth_split(capacity, server.bandwidth_capacity()) else {
        return Ok(None);
    };
    // `loading + sending` is at most the bandwidth capacity.
    let floor = loading + sending;
    let low = lowest_compute(task);
    let slowest = first_option_within(task, low, capacity, server.bandwidth_capacity(), meter)?;
    let cheapest = first_option_within(task, low, capacity, floor, meter)?;
    Ok(slowest.zip(cheapest))
}

/// Builds the Pareto front of speed options for `task` on `server`, sorted
/// by increasing compute speed and strictly decreasing bandwidth.
fn build_front<V>(task: &Task<V>, server: &Server, meter: &mut BudgetMeter) -> Result<Vec<SpeedOption>, Exhausted>
where
    V: TaskValue,
{
    let capacity = server.computation_capacity();
    let mut options = Vec::new();
    let mut low = lowest_compute(task);
    let mut limit = server.bandwidth_capacity();
    while limit >= 2 {
        let Some(option) = first_option_within(task, low, capacity, limit, meter)? else {
            break;
        };
        // At least 2, and at most the previous limit.
        limit = (option.bandwidth() - 1) as u32;
        low = option.compute.saturating_add(1);
        options.push(option);
    }
    Ok(options)
}

/// A Pareto-optimal partial selection over a prefix of the tasks.
#[derive(Clone, Copy, Debug)]
struct PartialSelection {
    compute: u64,
    bandwidth: u64,
    /// Index of the extended selection in the previous layer.
    parent: usize,
    /// Option chosen for the task of this layer.
    option: usize,
}

/// Picks one option per task with `Σ compute <= computation_capacity` and
/// `Σ bandwidth <= bandwidth_capacity`, minimising total bandwidth. Returns
/// the chosen option index per task, or `None` if no choice fits.
fn min_bandwidth_selection(
    options: &[Vec<SpeedOption>],
    computation_capacity: u64,
    bandwidth_capacity: u64,
    meter: &mut BudgetMeter,
) -> Result<Option<Vec<usize>>, Exhausted> {
    let root = PartialSelection {
        compute: 0,
        bandwidth: 0,
        parent: 0,
        option: 0,
    };
    let mut layers: Vec<Vec<PartialSelection>> = Vec::with_capacity(options.len());
    let mut candidates: Vec<PartialSelection> = Vec::new();

    for task_options in options {
        let front: &[PartialSelection] = match layers.last() {
            Some(layer) => layer,
            None => std::slice::from_ref(&root),
        };
        charge(meter, (front.len() as u64).saturating_mul(task_options.len() as u64))?;

        candidates.clear();
        for (parent, state) in front.iter().enumerate() {
            for (option, o) in task_options.iter().enumerate() {
                let compute = state.compute + o.compute as u64;
                let bandwidth = state.bandwidth + o.bandwidth();
                if compute <= computation_capacity && bandwidth <= bandwidth_capacity {
                    candidates.push(PartialSelection {
                        compute,
                        bandwidth,
                        parent,
                        option,
                    });
                }
            }
        }

        // Keep the selections no other selection beats in both sums.
        candidates.sort_unstable_by(|a, b| a.compute.cmp(&b.compute).then(a.bandwidth.cmp(&b.bandwidth)));
        let mut layer: Vec<PartialSelection> = Vec::new();
        for candidate in candidates.drain(..) {
            if layer.last().is_none_or(|kept| candidate.bandwidth < kept.bandwidth) {
                layer.push(candidate);
            }
        }
        if layer.is_empty() {
            return Ok(None);
        }
        layers.push(layer);
    }

    let mut selection = vec![0usize; options.len()];
    let Some(last) = layers.last() else {
        return Ok(Some(selection));
    };
    // The last selection of a front has the least bandwidth.
    let mut index = last.len() - 1;
    for (i, layer) in layers.iter().enumerate().rev() {
        let state = layer[index];
        selection[i] = state.option;
        index = state.parent;
    }
    Ok(Some(selection))
}

/// An exact feasibility oracle based on per-task speed fronts and a
/// multiple-choice knapsack.
#[derive(Clone, Debug)]
pub struct ExactEnumerationOracle {
    tables: FxHashMap<TableKey, SpeedTable>,
    max_cached_tables: usize,
}

impl Default for ExactEnumerationOracle {
    fn default() -> Self {
        Self::new()
    }
}

impl ExactEnumerationOracle {
    /// The default number of memoised speed tables.
    pub const DEFAULT_MAX_CACHED_TABLES: usize = 1 << 16;

    #[inline]
    pub fn new() -> Self {
        Self::with_max_cached_tables(Self::DEFAULT_MAX_CACHED_TABLES)
    }

    /// Creates an oracle that memoises at most `max_cached_tables` speed
    /// tables. The memo is cleared when it would grow beyond that.
    #[inline]
    pub fn with_max_cached_tables(max_cached_tables: usize) -> Self {
        Self {
            tables: FxHashMap::default(),
            max_cached_tables,
        }
    }

    /// Returns the number of memoised speed tables.
    #[inline]
    pub fn num_cached_tables(&self) -> usize {
        self.tables.len()
    }

    #[inline]
    pub fn clear_cache(&mut self) {
        self.tables.clear();
    }

    fn ends_for<V>(&mut self, task: &Task<V>, server: &Server, meter: &mut BudgetMeter) -> Result<Option<FrontEnds>, Exhausted>
    where
        V: TaskValue,
    {
        let key = TableKey::new(task, server);
        if let Some(table) = self.tables.get(&key) {
            return Ok(table.ends);
        }
        let ends = front_ends(task, server, meter)?;
        if self.max_cached_tables > 0 {
            self.tables.insert(key, SpeedTable { ends, front: None });
        }
        Ok(ends)
    }

    fn front_for<V>(&mut self, task: &Task<V>, server: &Server, meter: &mut BudgetMeter) -> Result<Vec<SpeedOption>, Exhausted>
    where
        V: TaskValue,
    {
        let key = TableKey::new(task, server);
        if let Some(front) = self.tables.get(&key).and_then(|table| table.front.as_ref()) {
            return Ok(front.clone());
        }
        let front = build_front(task, server, meter)?;
        if self.max_cached_tables > 0 {
            self.tables.entry(key).or_default().front = Some(front.clone());
        }
        Ok(front)
    }

    fn decide<V>(&mut self, server: &Server, tasks: &[&Task<V>], meter: &mut BudgetMeter) -> Result<FeasibilityVerdict, Exhausted>
    where
        V: TaskValue,
    {
        if tasks.is_empty() {
            return Ok(FeasibilityVerdict::Feasible(Vec::new()));
        }

        let n = tasks.len() as u64;
        let storage: u64 = tasks.iter().map(|t| t.storage() as u64).sum();
        if storage > server.storage_capacity() as u64
            || n > server.computation_capacity() as u64
            || 2 * n > server.bandwidth_capacity() as u64
        {
            return Ok(FeasibilityVerdict::Infeasible);
        }

        if self.tables.len() + tasks.len() > self.max_cached_tables {
            self.tables.clear();
        }

        let mut ends = Vec::with_capacity(tasks.len());
        for task in tasks {
            match self.ends_for(task, server, meter)? {
                Some(task_ends) => ends.push(task_ends),
                None => return Ok(FeasibilityVerdict::Infeasible),
            }
        }

        let bandwidth_capacity = server.bandwidth_capacity() as u64;
        let computation_capacity = server.computation_capacity() as u64;

        let min_compute: u64 = ends.iter().map(|(slowest, _)| slowest.compute as u64).sum();
        if min_compute > computation_capacity {
            return Ok(FeasibilityVerdict::Infeasible);
        }
        let min_bandwidth: u64 = ends.iter().map(|(_, cheapest)| cheapest.bandwidth()).sum();
        if min_bandwidth > bandwidth_capacity {
            return Ok(FeasibilityVerdict::Infeasible);
        }
        let greedy_compute: u64 = ends.iter().map(|(_, cheapest)| cheapest.compute as u64).sum();
        if greedy_compute <= computation_capacity {
            return Ok(FeasibilityVerdict::Feasible(
                ends.iter().map(|(_, cheapest)| cheapest.speeds()).collect(),
            ));
        }

        let mut options = Vec::with_capacity(tasks.len());
        for task in tasks {
            options.push(self.front_for(task, server, meter)?);
        }
        match min_bandwidth_selection(&options, computation_capacity, bandwidth_capacity, meter)? {
            Some(selection) => Ok(FeasibilityVerdict::Feasible(
                selection
                    .iter()
                    .zip(&options)
                    .map(|(&o, task_options)| task_options[o].speeds())
                    .collect(),
            )),
            None => Ok(FeasibilityVerdict::Infeasible),
        }
    }
}

impl<V> FeasibilityOracle<V> for ExactEnumerationOracle
where
    V: TaskValue,
{
    #[inline]
    fn name(&self) -> &str {
        "ExactEnumerationOracle"
    }

    fn solve_feasibility(&mut self, server: &Server, tasks: &[&Task<V>], budget: OracleBudget) -> FeasibilityVerdict {
        let mut meter = BudgetMeter::new(budget);
        match self.decide(server, tasks, &mut meter) {
            Ok(verdict) => verdict,
            Err(Exhausted) => {
                debug!(
                    server = server.name(),
                    tasks = tasks.len(),
                    work = meter.work(),
                    "feasibility budget exhausted"
                );
                FeasibilityVerdict::Inconclusive
            }
        }
    }
}
