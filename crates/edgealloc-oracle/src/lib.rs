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

//! # Edgealloc Oracle
//!
//! Feasibility oracles decide, for one server and a candidate set of tasks,
//! whether positive integer speeds exist such that every task meets its
//! deadline while the server's storage, computation and bandwidth capacities
//! hold. The branch-and-bound engine calls an oracle at every search node.
//!
//! ## Modules
//!
//! - `oracle`: the `FeasibilityOracle` trait, `FeasibilityVerdict` and the
//!   per-call `OracleBudget`.
//! - `enumeration`: `ExactEnumerationOracle`, an exact oracle that reduces the
//!   problem to a multiple-choice knapsack over compute capacity.
//! - `fixed`: `FixedSpeedOracle`, where every task runs at preset speeds.
//! - `validate`: exact re-validation of returned speed triples.

pub mod enumeration;
pub mod fixed;
pub mod oracle;
pub mod validate;
