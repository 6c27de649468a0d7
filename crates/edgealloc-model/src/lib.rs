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

//! # Edgealloc Model
//!
//! The resource model of the edge allocation problem: computational tasks
//! with storage, computation and result-data demands, a value and a deadline;
//! servers with finite storage, computation and bandwidth capacity; and
//! allocations mapping each task to at most one server together with the
//! speed triple it runs at.
//!
//! All resource quantities are `u32` and every deadline or capacity check is
//! evaluated exactly in wide integer arithmetic (`u128`/`u64`), so the model
//! never rounds. Task values are generic over
//! [`TaskValue`](edgealloc_core::num::value::TaskValue).
//!
//! ## Modules
//!
//! - `index`: `TaskIndex` and `ServerIndex`.
//! - `task`: `Task<V>` and its exact deadline check.
//! - `server`: `Server`, eligibility (`could_host`) and load validation.
//! - `speed`: `SpeedTriple`.
//! - `allocation`: `Allocation`, `Assignment`, `ServerUsage` and verification.
//! - `instance`: `Instance<V>`, an immutable snapshot of tasks and servers.
//! - `error`: `ModelError`, `SpeedViolation`, `AllocationViolation`.

pub mod allocation;
pub mod error;
pub mod index;
pub mod instance;
pub mod server;
pub mod speed;
pub mod task;
