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

//! # Feasibility Oracle Interface
//!
//! An oracle answers one question: can this server run exactly this set of
//! tasks at once? A `Feasible` verdict carries one speed triple per task, in
//! the order the tasks were given. Oracles must be exact: `Infeasible` means
//! that no positive integer speed assignment exists.
//!
//! Every call carries an `OracleBudget`. When an oracle cannot reach a
//! conclusive answer within its budget it returns `Inconclusive`, which
//! callers treat as infeasible but count separately, because the search
//! result is then only guaranteed to be a lower bound.

use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{server::Server, speed::SpeedTriple, task::Task};
use std::time::{Duration, Instant};

/// The answer of a feasibility oracle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FeasibilityVerdict {
    /// Speeds exist. One triple per task, in input order.
    Feasible(Vec<SpeedTriple>),
    /// No speed assignment exists.
    Infeasible,
    /// The budget ran out before an answer was found.
    Inconclusive,
}

impl FeasibilityVerdict {
    #[inline]
    pub fn is_feasible(&self) -> bool {
        matches!(self, Self::Feasible(_))
    }

    #[inline]
    pub fn is_infeasible(&self) -> bool {
        matches!(self, Self::Infeasible)
    }

    #[inline]
    pub fn is_inconclusive(&self) -> bool {
        matches!(self, Self::Inconclusive)
    }

    /// Returns `true` unless the verdict is `Inconclusive`.
    #[inline]
    pub fn is_conclusive(&self) -> bool {
        !self.is_inconclusive()
    }

    /// Converts into the plain `Option` view, collapsing `Inconclusive`
    /// into `None`.
    #[inline]
    pub fn into_option(self) -> Option<Vec<SpeedTriple>> {
        match self {
            Self::Feasible(speeds) => Some(speeds),
            Self::Infeasible | Self::Inconclusive => None,
        }
    }
}

impl std::fmt::Display for FeasibilityVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Feasible(speeds) => write!(f, "Feasible({} tasks)", speeds.len()),
            Self::Infeasible => write!(f, "Infeasible"),
            Self::Inconclusive => write!(f, "Inconclusive"),
        }
    }
}

/// The resources an oracle may spend on a single call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OracleBudget {
    deadline: Option<Instant>,
    max_work: Option<u64>,
}

impl OracleBudget {
    /// A budget without any limit.
    #[inline]
    pub const fn unlimited() -> Self {
        Self {
            deadline: None,
            max_work: None,
        }
    }

    /// A budget that expires `limit` from now.
    #[inline]
    pub fn from_time_limit(limit: Duration) -> Self {
        Self::unlimited().with_deadline(Instant::now().checked_add(limit))
    }

    #[inline]
    pub const fn with_deadline(mut self, deadline: Option<Instant>) -> Self {
        self.deadline = deadline;
        self
    }

    #[inline]
    pub const fn with_max_work(mut self, max_work: Option<u64>) -> Self {
        self.max_work = max_work;
        self
    }

    #[inline]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    #[inline]
    pub const fn max_work(&self) -> Option<u64> {
        self.max_work
    }

    /// Returns `true` if the deadline has passed at `now`.
    #[inline]
    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|d| now >= d)
    }
}

impl std::fmt::Display for OracleBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let remaining = self
            .deadline
            .map(|d| d.saturating_duration_since(Instant::now()));
        write!(
            f,
            "OracleBudget(remaining: {:?}, max_work: {:?})",
            remaining, self.max_work
        )
    }
}

/// Tracks the work spent against an `OracleBudget`.
///
/// The clock is only read once every `CLOCK_CHECK_INTERVAL` units of work.
#[derive(Clone, Debug)]
pub struct BudgetMeter {
    budget: OracleBudget,
    work: u64,
    next_clock_check: u64,
    exhausted: bool,
}

impl BudgetMeter {
    pub const CLOCK_CHECK_INTERVAL: u64 = 4096;

    #[inline]
    pub fn new(budget: OracleBudget) -> Self {
        Self {
            budget,
            work: 0,
            next_clock_check: Self::CLOCK_CHECK_INTERVAL,
            exhausted: budget.is_expired_at(Instant::now()),
        }
    }

    /// Charges `units` of work. Returns `false` once the budget is exhausted;
    /// after that it keeps returning `false`.
    #[inline]
    pub fn charge(&mut self, units: u64) -> bool {
        if self.exhausted {
            return false;
        }
        self.work = self.work.saturating_add(units);
        if self.budget.max_work.is_some_and(|m| self.work > m) {
            self.exhausted = true;
            return false;
        }
        if self.work >= self.next_clock_check {
            self.next_clock_check = self.work.saturating_add(Self::CLOCK_CHECK_INTERVAL);
            if self.budget.is_expired_at(Instant::now()) {
                self.exhausted = true;
                return false;
            }
        }
        true
    }

    #[inline]
    pub fn work(&self) -> u64 {
        self.work
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

/// Decides whether a server can run a set of tasks simultaneously.
pub trait FeasibilityOracle<V>
where
    V: TaskValue,
{
    /// A short, human readable name used in logs.
    fn name(&self) -> &str;

    /// Decides whether `server` can run all of `tasks` at once.
    ///
    /// A `Feasible` verdict must hold exactly one speed triple per task, in
    /// the order of `tasks`. An empty task set is always feasible.
    fn solve_feasibility(&mut self, server: &Server, tasks: &[&Task<V>], budget: OracleBudget) -> FeasibilityVerdict;
}

impl<V, O> FeasibilityOracle<V> for &mut O
where
    V: TaskValue,
    O: FeasibilityOracle<V> + ?Sized,
{
    #[inline]
    fn name(&self) -> &str {
        (**self).name()
    }

    #[inline]
    fn solve_feasibility(&mut self, server: &Server, tasks: &[&Task<V>], budget: OracleBudget) -> FeasibilityVerdict {
        (**self).solve_feasibility(server, tasks, budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_views() {
        let speeds = vec![SpeedTriple::new(1, 1, 1)];
        let feasible = FeasibilityVerdict::Feasible(speeds.clone());
        assert!(feasible.is_feasible() && feasible.is_conclusive());
        assert_eq!(feasible.into_option(), Some(speeds));

        assert!(FeasibilityVerdict::Infeasible.is_conclusive());
        assert_eq!(FeasibilityVerdict::Infeasible.into_option(), None);
        assert!(!FeasibilityVerdict::Inconclusive.is_conclusive());
        assert_eq!(FeasibilityVerdict::Inconclusive.into_option(), None);
    }

    #[test]
    fn test_meter_respects_work_limit() {
        let mut meter = BudgetMeter::new(OracleBudget::unlimited().with_max_work(Some(10)));
        assert!(meter.charge(10));
        assert!(!meter.charge(1));
        assert!(meter.is_exhausted());
        assert!(!meter.charge(0));
    }

    #[test]
    fn test_meter_respects_past_deadline() {
        let past = Instant::now();
        let mut meter = BudgetMeter::new(OracleBudget::unlimited().with_deadline(Some(past)));
        assert!(meter.is_exhausted());
        assert!(!meter.charge(1));
    }

    #[test]
    fn test_unlimited_meter_never_exhausts() {
        let mut meter = BudgetMeter::new(OracleBudget::unlimited());
        for _ in 0..3 {
            assert!(meter.charge(BudgetMeter::CLOCK_CHECK_INTERVAL));
        }
        assert_eq!(meter.work(), 3 * BudgetMeter::CLOCK_CHECK_INTERVAL);
    }
}
