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

//! # Solver Configuration
//!
//! `BnbConfig` collects the knobs of a solve. It is serde-serialisable so
//! harnesses can keep it next to their instance catalogs, and every field has
//! a default, so partial documents deserialise.
//!
//! ```rust
//! use edgealloc_bnb::config::BnbConfig;
//! use std::time::Duration;
//!
//! let config = BnbConfig::default()
//!     .with_time_limit(Some(Duration::from_secs(5)))
//!     .with_num_threads(2);
//! assert!(config.verify_oracle);
//! assert_eq!(config.oracle_time_limit, Some(Duration::from_secs(60)));
//! ```

use crate::error::BnbError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BnbConfig {
    /// Wall-clock budget of the whole solve. When it runs out the best
    /// incumbent is returned and the outcome is flagged partial.
    pub time_limit: Option<Duration>,
    /// Wall-clock budget of a single oracle call.
    pub oracle_time_limit: Option<Duration>,
    /// Work budget of a single oracle call, in oracle-specific units.
    pub oracle_max_work: Option<u64>,
    /// Re-validate every feasible oracle verdict exactly.
    pub verify_oracle: bool,
    /// Worker threads of the parallel engine.
    pub num_threads: usize,
    /// Number of popped nodes between two reads of the clock.
    pub clock_check_interval: u64,
    /// Maximum number of memoised feasibility verdicts per worker.
    pub feasibility_cache_capacity: usize,
}

impl BnbConfig {
    pub const DEFAULT_ORACLE_TIME_LIMIT: Duration = Duration::from_secs(60);
    pub const DEFAULT_CLOCK_CHECK_INTERVAL: u64 = 64;
    pub const DEFAULT_FEASIBILITY_CACHE_CAPACITY: usize = 1 << 20;

    #[inline]
    pub fn with_time_limit(mut self, time_limit: Option<Duration>) -> Self {
        self.time_limit = time_limit;
        self
    }

    #[inline]
    pub fn with_oracle_time_limit(mut self, limit: Option<Duration>) -> Self {
        self.oracle_time_limit = limit;
        self
    }

    #[inline]
    pub fn with_oracle_max_work(mut self, max_work: Option<u64>) -> Self {
        self.oracle_max_work = max_work;
        self
    }

    #[inline]
    pub fn with_verify_oracle(mut self, verify: bool) -> Self {
        self.verify_oracle = verify;
        self
    }

    #[inline]
    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    #[inline]
    pub fn with_clock_check_interval(mut self, interval: u64) -> Self {
        self.clock_check_interval = interval;
        self
    }

    #[inline]
    pub fn with_feasibility_cache_capacity(mut self, capacity: usize) -> Self {
        self.feasibility_cache_capacity = capacity;
        self
    }

    /// Checks that the configuration can drive a solve.
    ///
    /// # Errors
    ///
    /// Returns `BnbError::InvalidConfig` if `num_threads` or
    /// `clock_check_interval` is zero.
    pub fn validate(&self) -> Result<(), BnbError> {
        if self.num_threads == 0 {
            return Err(BnbError::InvalidConfig("num_threads must be positive"));
        }
        if self.clock_check_interval == 0 {
            return Err(BnbError::InvalidConfig("clock_check_interval must be positive"));
        }
        Ok(())
    }
}

impl Default for BnbConfig {
    fn default() -> Self {
        Self {
            time_limit: None,
            oracle_time_limit: Some(Self::DEFAULT_ORACLE_TIME_LIMIT),
            oracle_max_work: None,
            verify_oracle: true,
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            clock_check_interval: Self::DEFAULT_CLOCK_CHECK_INTERVAL,
            feasibility_cache_capacity: Self::DEFAULT_FEASIBILITY_CACHE_CAPACITY,
        }
    }
}

impl std::fmt::Display for BnbConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BnbConfig(time_limit: {:?}, oracle_time_limit: {:?}, oracle_max_work: {:?}, verify_oracle: {}, threads: {})",
            self.time_limit, self.oracle_time_limit, self.oracle_max_work, self.verify_oracle, self.num_threads
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(BnbConfig::default().validate().is_ok());
        assert!(BnbConfig::default().with_num_threads(0).validate().is_err());
        assert!(
            BnbConfig::default()
                .with_clock_check_interval(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let config: BnbConfig = serde_json::from_str(r#"{"verify_oracle": false, "num_threads": 3}"#).unwrap();
        assert!(!config.verify_oracle);
        assert_eq!(config.num_threads, 3);
        assert_eq!(config.oracle_time_limit, Some(BnbConfig::DEFAULT_ORACLE_TIME_LIMIT));
        assert_eq!(config.time_limit, None);
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = BnbConfig::default()
            .with_time_limit(Some(Duration::from_millis(1500)))
            .with_oracle_max_work(Some(10_000));
        let json = serde_json::to_string(&config).unwrap();
        let back: BnbConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
