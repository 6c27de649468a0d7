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

//! # Concurrent Frontier
//!
//! A `PriorityQueue` behind a `Mutex`, shared by the workers of the parallel
//! engine. Besides the heap it tracks how many popped items are still being
//! processed (`in_flight`). A worker blocks in `pop_blocking` while the heap is
//! empty but other workers may still produce children; once the heap is empty
//! and nothing is in flight the search space is exhausted and every waiting
//! worker is released.
//!
//! ## Protocol
//!
//! - `pop_blocking` hands out an item and marks it in flight.
//! - The worker pushes the item's children with `push_all` *before* calling
//!   `task_done`, so the queue never looks exhausted while children are
//!   pending.
//! - `close` releases every worker immediately (abort or fatal error).

use crate::queue::PriorityQueue;
use std::{
    cmp::Ordering,
    sync::{Condvar, Mutex, MutexGuard, PoisonError},
};

struct State<T, F> {
    heap: PriorityQueue<T, F>,
    in_flight: usize,
    closed: bool,
    max_len: usize,
}

/// A blocking, comparator-ordered priority queue with termination detection.
pub struct ConcurrentPriorityQueue<T, F> {
    state: Mutex<State<T, F>>,
    available: Condvar,
}

impl<T, F> ConcurrentPriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    pub fn new(compare: F) -> Self {
        Self {
            state: Mutex::new(State {
                heap: PriorityQueue::new(compare),
                in_flight: 0,
                closed: false,
                max_len: 0,
            }),
            available: Condvar::new(),
        }
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, State<T, F>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes every item of `items` and wakes waiting workers.
    pub fn push_all<I>(&self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut state = self.lock();
        if state.closed {
            return;
        }
        let before = state.heap.len();
        state.heap.push_all(items);
        let len = state.heap.len();
        state.max_len = state.max_len.max(len);
        drop(state);
        match len - before {
            0 => {}
            1 => self.available.notify_one(),
            _ => self.available.notify_all(),
        }
    }

    /// Blocks until an item is available and returns it, marking it in flight.
    ///
    /// Returns `None` once the queue is closed, or when it is empty and no
    /// item is in flight anymore.
    pub fn pop_blocking(&self) -> Option<T> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return None;
            }
            if let Ok(item) = state.heap.pop() {
                state.in_flight += 1;
                return Some(item);
            }
            if state.in_flight == 0 {
                state.closed = true;
                drop(state);
                self.available.notify_all();
                return None;
            }
            state = self
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Marks one popped item as fully processed.
    pub fn task_done(&self) {
        let mut state = self.lock();
        debug_assert!(
            state.in_flight > 0,
            "called `ConcurrentPriorityQueue::task_done` without an item in flight"
        );
        state.in_flight = state.in_flight.saturating_sub(1);
        let exhausted = state.in_flight == 0 && state.heap.is_empty();
        drop(state);
        if exhausted {
            self.available.notify_all();
        }
    }

    /// Closes the queue, dropping pending items and releasing every waiter.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.heap.clear();
        drop(state);
        self.available.notify_all();
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }

    /// Returns the largest number of items the queue ever held.
    #[inline]
    pub fn max_len(&self) -> usize {
        self.lock().max_len
    }
}

impl<T, F> std::fmt::Debug for ConcurrentPriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("ConcurrentPriorityQueue")
            .field("len", &state.heap.len())
            .field("in_flight", &state.in_flight)
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};

    fn max_queue() -> ConcurrentPriorityQueue<u64, fn(&u64, &u64) -> Ordering> {
        let compare: fn(&u64, &u64) -> Ordering = |a, b| a.cmp(b);
        ConcurrentPriorityQueue::new(compare)
    }

    #[test]
    fn test_empty_queue_terminates_immediately() {
        let q = max_queue();
        assert_eq!(q.pop_blocking(), None);
        assert!(q.is_closed());
    }

    #[test]
    fn test_pops_greatest_first() {
        let q = max_queue();
        q.push_all([3, 9, 1]);
        assert_eq!(q.pop_blocking(), Some(9));
        q.task_done();
        assert_eq!(q.pop_blocking(), Some(3));
        q.task_done();
        assert_eq!(q.pop_blocking(), Some(1));
        q.task_done();
        assert_eq!(q.pop_blocking(), None);
        assert_eq!(q.max_len(), 3);
    }

    #[test]
    fn test_debug_reports_state() {
        let q = max_queue();
        q.push_all([4, 2]);
        assert_eq!(q.pop_blocking(), Some(4));
        assert_eq!(
            format!("{:?}", q),
            "ConcurrentPriorityQueue { len: 1, in_flight: 1, closed: false }"
        );
    }

    #[test]
    fn test_close_releases_items() {
        let q = max_queue();
        q.push_all([1, 2]);
        q.close();
        assert_eq!(q.pop_blocking(), None);
        q.push_all([5]);
        assert!(q.is_empty());
    }

    #[test]
    fn test_workers_drain_a_growing_tree() {
        // Every item n > 0 spawns two children n - 1; the total number of
        // processed items of a tree rooted at depth d is 2^(d+1) - 1.
        let q = max_queue();
        let processed = AtomicUsize::new(0);
        q.push_all([10]);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    while let Some(n) = q.pop_blocking() {
                        processed.fetch_add(1, AtomicOrdering::Relaxed);
                        if n > 0 {
                            q.push_all([n - 1, n - 1]);
                        }
                        q.task_done();
                    }
                });
            }
        });
        assert_eq!(processed.load(AtomicOrdering::Relaxed), (1 << 11) - 1);
    }
}
