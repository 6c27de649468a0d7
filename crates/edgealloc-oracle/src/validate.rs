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

use edgealloc_core::num::value::TaskValue;
use edgealloc_model::{error::SpeedViolation, server::Server, speed::SpeedTriple, task::Task};

/// Exactly re-validates that `tasks` running at `speeds` (position-wise) fit
/// `server`.
///
/// This is independent of how the speeds were found and is what the search
/// engine uses to double check every feasible verdict it receives.
///
/// # Errors
///
/// Returns the first `SpeedViolation` found.
#[inline]
pub fn validate_speeds<V>(server: &Server, tasks: &[&Task<V>], speeds: &[SpeedTriple]) -> Result<(), SpeedViolation>
where
    V: TaskValue,
{
    server.check_load(tasks, speeds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_speeds() {
        let server = Server::new("s", 10, 10, 10).unwrap();
        let t = Task::new("t", 10, 1, 1, 100, 1u32).unwrap();
        assert!(validate_speeds(&server, &[&t], &[SpeedTriple::new(1, 1, 1)]).is_ok());
        assert_eq!(
            validate_speeds(&server, &[&t, &t], &[SpeedTriple::new(1, 1, 1); 2]),
            Err(SpeedViolation::Storage {
                used: 20,
                capacity: 10
            })
        );
    }
}
