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

use serde::{Deserialize, Serialize};

/// The speeds a server dedicates to one task: how fast the task's data is
/// loaded, how fast it is computed and how fast its results are sent back.
///
/// Loading and sending share the server's bandwidth, computing uses its
/// computation capacity. A triple with a zero component is never produced by
/// an oracle and is rejected by load validation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SpeedTriple {
    loading: u32,
    compute: u32,
    sending: u32,
}

impl SpeedTriple {
    /// Creates a new speed triple.
    ///
    /// # Panics
    ///
    /// In debug builds, panics if any component is zero.
    #[inline]
    pub const fn new(loading: u32, compute: u32, sending: u32) -> Self {
        debug_assert!(
            loading > 0 && compute > 0 && sending > 0,
            "called `SpeedTriple::new` with a zero speed"
        );
        Self {
            loading,
            compute,
            sending,
        }
    }

    /// Creates a new speed triple, returning `None` if any component is zero.
    #[inline]
    pub const fn try_new(loading: u32, compute: u32, sending: u32) -> Option<Self> {
        if loading == 0 || compute == 0 || sending == 0 {
            return None;
        }
        Some(Self {
            loading,
            compute,
            sending,
        })
    }

    #[inline]
    pub const fn loading(&self) -> u32 {
        self.loading
    }

    #[inline]
    pub const fn compute(&self) -> u32 {
        self.compute
    }

    #[inline]
    pub const fn sending(&self) -> u32 {
        self.sending
    }

    /// Returns the bandwidth used by this triple, `loading + sending`.
    #[inline]
    pub const fn bandwidth(&self) -> u64 {
        self.loading as u64 + self.sending as u64
    }

    /// Returns `true` if every component is strictly positive.
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.loading > 0 && self.compute > 0 && self.sending > 0
    }
}

impl std::fmt::Display for SpeedTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpeedTriple(loading: {}, compute: {}, sending: {})",
            self.loading, self.compute, self.sending
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_try_new_rejects_zero() {
        assert!(SpeedTriple::try_new(0, 1, 1).is_none());
        assert!(SpeedTriple::try_new(1, 0, 1).is_none());
        assert!(SpeedTriple::try_new(1, 1, 0).is_none());
        assert_eq!(SpeedTriple::try_new(1, 2, 3), Some(SpeedTriple::new(1, 2, 3)));
    }

    #[test]
    fn test_bandwidth_does_not_overflow() {
        let s = SpeedTriple::new(u32::MAX, 1, u32::MAX);
        assert_eq!(s.bandwidth(), 2 * u32::MAX as u64);
    }

    #[test]
    fn test_display() {
        let s = SpeedTriple::new(1, 2, 3);
        assert_eq!(
            format!("{}", s),
            "SpeedTriple(loading: 1, compute: 2, sending: 3)"
        );
    }
}
