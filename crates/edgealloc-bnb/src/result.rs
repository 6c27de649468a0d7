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

use crate::stats::BnbSolverStatistics;
use edgealloc_core::num::value::TaskValue;
use edgealloc_model::allocation::Allocation;

/// Why the search stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BnbTerminationReason {
    /// The frontier was exhausted; no unexplored node can beat the incumbent.
    OptimalityProven,
    /// The search was stopped early (time limit, monitor, interrupt).
    Aborted(String),
}

impl std::fmt::Display for BnbTerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BnbTerminationReason::OptimalityProven => write!(f, "OptimalityProven"),
            BnbTerminationReason::Aborted(reason) => write!(f, "Aborted({})", reason),
        }
    }
}

/// Result of the solver after termination.
///
/// The allocation is always structurally valid: it satisfies every deadline
/// and capacity constraint. It is only guaranteed optimal when
/// `is_certified_optimal` holds; with a non-zero `oracle_inconclusive` count
/// the achieved value is possibly only a lower bound.
#[derive(Debug, Clone)]
pub struct BnbSolverOutcome<V> {
    allocation: Allocation,
    value: V,
    termination_reason: BnbTerminationReason,
    statistics: BnbSolverStatistics,
}

impl<V> BnbSolverOutcome<V>
where
    V: TaskValue,
{
    #[inline]
    pub fn optimal(allocation: Allocation, value: V, statistics: BnbSolverStatistics) -> Self {
        Self {
            allocation,
            value,
            termination_reason: BnbTerminationReason::OptimalityProven,
            statistics,
        }
    }

    #[inline]
    pub fn aborted<R>(allocation: Allocation, value: V, reason: R, statistics: BnbSolverStatistics) -> Self
    where
        R: Into<String>,
    {
        Self {
            allocation,
            value,
            termination_reason: BnbTerminationReason::Aborted(reason.into()),
            statistics,
        }
    }

    /// Returns the best allocation found.
    #[inline]
    pub fn allocation(&self) -> &Allocation {
        &self.allocation
    }

    /// Returns the social welfare of the returned allocation.
    #[inline]
    pub fn achieved_value(&self) -> V {
        self.value
    }

    #[inline]
    pub fn termination_reason(&self) -> &BnbTerminationReason {
        &self.termination_reason
    }

    #[inline]
    pub fn statistics(&self) -> &BnbSolverStatistics {
        &self.statistics
    }

    /// Returns `true` if the search was stopped before the frontier ran dry.
    #[inline]
    pub fn is_partial(&self) -> bool {
        matches!(self.termination_reason, BnbTerminationReason::Aborted(_))
    }

    /// Returns `true` if the search completed and the oracle never gave up.
    #[inline]
    pub fn is_certified_optimal(&self) -> bool {
        self.termination_reason == BnbTerminationReason::OptimalityProven
            && self.statistics.oracle_inconclusive == 0
    }

    #[inline]
    pub fn into_allocation(self) -> Allocation {
        self.allocation
    }
}

impl<V> std::fmt::Display for BnbSolverOutcome<V>
where
    V: TaskValue,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbSolverOutcome(value: {}, assigned: {}/{}, termination: {})",
            self.value,
            self.allocation.num_assigned(),
            self.allocation.num_tasks(),
            self.termination_reason
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_is_certified_without_inconclusive_calls() {
        let outcome = BnbSolverOutcome::optimal(Allocation::unassigned(2), 0i64, BnbSolverStatistics::default());
        assert!(!outcome.is_partial());
        assert!(outcome.is_certified_optimal());
        assert_eq!(outcome.achieved_value(), 0);
        assert_eq!(outcome.allocation().num_tasks(), 2);
    }

    #[test]
    fn test_inconclusive_calls_void_certification() {
        let stats = BnbSolverStatistics {
            oracle_inconclusive: 1,
            ..BnbSolverStatistics::default()
        };
        let outcome = BnbSolverOutcome::optimal(Allocation::unassigned(1), 0i64, stats);
        assert!(!outcome.is_partial());
        assert!(!outcome.is_certified_optimal());
    }

    #[test]
    fn test_aborted_is_partial() {
        let outcome = BnbSolverOutcome::aborted(Allocation::unassigned(1), 3i64, "time limit", BnbSolverStatistics::default());
        assert!(outcome.is_partial());
        assert!(!outcome.is_certified_optimal());
        assert_eq!(
            outcome.termination_reason(),
            &BnbTerminationReason::Aborted("time limit".to_string())
        );
        assert_eq!(
            outcome.to_string(),
            "BnbSolverOutcome(value: 3, assigned: 0/1, termination: Aborted(time limit))"
        );
    }
}
