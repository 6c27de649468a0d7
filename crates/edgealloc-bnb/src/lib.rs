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

//! Edgealloc-BnB: branch-and-bound for optimal task to server allocation
//!
//! Chooses which tasks run on which edge servers, and at which loading,
//! compute and sending speeds, to maximise social welfare (the summed value
//! of the admitted tasks) subject to every task's deadline and every server's
//! storage, computation and bandwidth capacity.
//!
//! Core flow
//! - Build an `edgealloc_model::instance::Instance<V>`.
//! - Pick a `FeasibilityOracle` (usually `ExactEnumerationOracle`).
//! - Run `bnb::BnbSolver` with a `TreeSearchMonitor`, or
//!   `parallel::ParallelBnbSolver` with a thread count.
//!
//! Design highlights
//! - Best-first: the frontier pops the node of greatest lower bound.
//! - Partial assignments live in an arena of immutable decision records;
//!   nodes are small `Copy` values.
//! - The incumbent is explicit state (local or a compare-and-improve cell),
//!   never a global.
//! - Every feasible oracle verdict is re-validated with exact integer
//!   arithmetic before it is trusted.
//!
//! Assumptions and guarantees
//! - The returned allocation always satisfies every constraint.
//! - It is optimal when the outcome reports `is_certified_optimal`; an
//!   inconclusive oracle call makes the value possibly only a lower bound.
//!
//! Module map
//! - `bnb`: the sequential engine and session orchestration.
//! - `parallel`: the multi-threaded engine.
//! - `arena`, `node`, `branching`: search tree representation and branching.
//! - `evaluate`: oracle calls, verdict cache and re-validation.
//! - `queue`, `concurrent`: the frontier.
//! - `incumbent`: best-known allocation stores.
//! - `monitor`: tree-search monitors (log, time limit, interrupt, composite).
//! - `config`, `error`, `result`, `stats`: configuration, errors, outcomes
//!   and counters.

pub mod arena;
pub mod bnb;
pub mod branching;
pub mod concurrent;
pub mod config;
pub mod error;
pub mod evaluate;
pub mod incumbent;
pub mod monitor;
pub mod node;
pub mod parallel;
pub mod queue;
pub mod result;
pub mod stats;

#[cfg(test)]
mod fixtures;
