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

//! # Comparator-Ordered Priority Queue
//!
//! A binary max-heap whose order is given by a caller-supplied comparator
//! instead of an `Ord` implementation. The search engine uses it as its
//! best-first frontier, ordering nodes by their lower bound, but the queue is
//! fully generic.
//!
//! ## Heap law
//!
//! After every operation no element compares `Less` than either of its
//! children, so the root is always a comparator-greatest element.
//!
//! ## Tie-breaking
//!
//! Sifting down picks the comparator-greatest child, preferring the left
//! child when both children compare equal. Elements that compare equal are
//! popped in an unspecified but deterministic order.

use std::cmp::Ordering;
use thiserror::Error;

/// Returned when popping from an empty queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("attempted to pop from an empty priority queue")]
pub struct EmptyQueueError;

/// A binary max-heap ordered by a comparator `F`.
#[derive(Clone)]
pub struct PriorityQueue<T, F> {
    heap: Vec<T>,
    compare: F,
}

impl<T, F> PriorityQueue<T, F>
where
    F: Fn(&T, &T) -> Ordering,
{
    /// Creates a new, empty queue ordered by `compare`.
    #[inline]
    pub fn new(compare: F) -> Self {
        Self {
            heap: Vec::new(),
            compare,
        }
    }

    /// Creates a new, empty queue with room for `capacity` elements.
    #[inline]
    pub fn with_capacity(capacity: usize, compare: F) -> Self {
        Self {
            heap: Vec::with_capacity(capacity),
            compare,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Returns the greatest element without removing it.
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.heap.first()
    }

    /// Removes all elements, keeping the allocation.
    #[inline]
    pub fn clear(&mut self) {
        self.heap.clear();
    }

    /// Inserts `item`. Amortized `O(log n)`.
    #[inline]
    pub fn push(&mut self, item: T) {
        self.heap.push(item);
        self.sift_up(self.heap.len() - 1);
    }

    /// Inserts every item of `items`, equivalent to repeated `push`.
    #[inline]
    pub fn push_all<I>(&mut self, items: I)
    where
        I: IntoIterator<Item = T>,
    {
        let items = items.into_iter();
        self.heap.reserve(items.size_hint().0);
        for item in items {
            self.push(item);
        }
    }

    /// Removes and returns the greatest element. `O(log n)`.
    ///
    /// # Errors
    ///
    /// Returns `EmptyQueueError` if the queue is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<T, EmptyQueueError> {
        let last = self.heap.len().checked_sub(1).ok_or(EmptyQueueError)?;
        self.heap.swap(0, last);
        let top = self.heap.pop().ok_or(EmptyQueueError)?;
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(top)
    }

    /// Returns `true` if no element compares `Less` than one of its children.
    pub fn satisfies_heap_law(&self) -> bool {
        (1..self.heap.len())
            .all(|child| (self.compare)(&self.heap[(child - 1) / 2], &self.heap[child]) != Ordering::Less)
    }

    /// Consumes the queue, returning its elements in heap order.
    #[inline]
    pub fn into_vec(self) -> Vec<T> {
        self.heap
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if (self.compare)(&self.heap[parent], &self.heap[index]) != Ordering::Less {
                break;
            }
            self.heap.swap(parent, index);
            index = parent;
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * index + 1;
            if left >= len {
                break;
            }
            let right = left + 1;
            let mut child = left;
            if right < len && (self.compare)(&self.heap[left], &self.heap[right]) == Ordering::Less {
                child = right;
            }
            if (self.compare)(&self.heap[index], &self.heap[child]) != Ordering::Less {
                break;
            }
            self.heap.swap(index, child);
            index = child;
        }
    }
}

impl<T, F> std::fmt::Debug for PriorityQueue<T, F>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue").field("heap", &self.heap).finish()
    }
}

impl<T, F> std::fmt::Display for PriorityQueue<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PriorityQueue(len: {})", self.heap.len())
    }
}
