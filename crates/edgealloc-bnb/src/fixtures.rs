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

//! Instance generators and a brute-force reference shared by the engine tests.

use edgealloc_model::{index::ServerIndex, instance::Instance, server::Server, speed::SpeedTriple, task::Task};
use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// One server (10, 10, 10) and two tasks that each fill its storage.
pub(crate) fn scenario(reversed: bool) -> Instance<i64> {
    let mut tasks = vec![
        Task::new("task1", 10, 1, 1, 100, 5).unwrap(),
        Task::new("task2", 10, 1, 1, 100, 8).unwrap(),
    ];
    if reversed {
        tasks.reverse();
    }
    Instance::new(tasks, vec![Server::new("server", 10, 10, 10).unwrap()])
}

/// A small random instance where roughly half of the tasks fit a server on
/// their own and most pairs conflict somewhere.
pub(crate) fn random_instance(rng: &mut ChaCha8Rng, num_tasks: usize, num_servers: usize) -> Instance<i64> {
    let tasks = (0..num_tasks)
        .map(|i| {
            Task::new(
                format!("t{}", i),
                rng.random_range(1..=15),
                rng.random_range(1..=10),
                rng.random_range(1..=10),
                rng.random_range(3..=20),
                rng.random_range(1..=20i64),
            )
            .unwrap()
        })
        .collect();
    let servers = (0..num_servers)
        .map(|j| {
            Server::new(
                format!("s{}", j),
                rng.random_range(10..=30),
                rng.random_range(2..=8),
                rng.random_range(3..=10),
            )
            .unwrap()
        })
        .collect();
    Instance::new(tasks, servers)
}

/// Returns `true` if some positive speed triple per task fits `server`,
/// scanning speeds and checking them with `Task::meets_deadline` alone.
pub(crate) fn server_can_run(server: &Server, tasks: &[&Task<i64>]) -> bool {
    let storage: u32 = tasks.iter().map(|t| t.storage()).sum();
    storage <= server.storage_capacity()
        && speeds_fit(tasks, server.computation_capacity(), server.bandwidth_capacity())
}

fn speeds_fit(tasks: &[&Task<i64>], compute_left: u32, bandwidth_left: u32) -> bool {
    let Some((first, rest)) = tasks.split_first() else {
        return true;
    };
    (1..=compute_left).any(|c| {
        // At a fixed compute speed the narrowest working split dominates.
        let narrowest = (2..=bandwidth_left)
            .find(|&b| (1..b).any(|l| first.meets_deadline(SpeedTriple::new(l, c, b - l))));
        narrowest.is_some_and(|b| speeds_fit(rest, compute_left - c, bandwidth_left - b))
    })
}

/// The optimal social welfare, by enumerating every task to server mapping.
pub(crate) fn brute_force_optimum(instance: &Instance<i64>) -> i64 {
    let n = instance.num_tasks();
    let m = instance.num_servers();
    let mut choice = vec![m; n];
    let mut best = 0;
    loop {
        let feasible = (0..m).all(|s| {
            let tasks: Vec<&Task<i64>> = (0..n)
                .filter(|&t| choice[t] == s)
                .map(|t| &instance.tasks()[t])
                .collect();
            server_can_run(instance.server(ServerIndex::new(s)), &tasks)
        });
        if feasible {
            let value: i64 = (0..n).filter(|&t| choice[t] < m).map(|t| instance.tasks()[t].value()).sum();
            best = best.max(value);
        }

        // Odometer over {0, .., m} per task.
        let mut i = 0;
        loop {
            if i == n {
                return best;
            }
            if choice[i] == 0 {
                choice[i] = m;
                i += 1;
            } else {
                choice[i] -= 1;
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_can_run_scans_speeds() {
        let server = Server::new("s", 10, 3, 10).unwrap();
        let a = Task::new("a", 2, 2, 2, 3, 1i64).unwrap();
        let big = Task::new("big", 11, 1, 1, 100, 1i64).unwrap();
        assert!(server_can_run(&server, &[]));
        assert!(server_can_run(&server, &[&a]));
        assert!(!server_can_run(&server, &[&big]));
        // Each copy needs bandwidth 4 at compute 2 and bandwidth 8 at
        // compute 1, so two copies exceed one of the capacities.
        assert!(!server_can_run(&server, &[&a, &a]));
    }

    #[test]
    fn test_brute_force_scenario() {
        assert_eq!(brute_force_optimum(&scenario(false)), 8);
        assert_eq!(brute_force_optimum(&scenario(true)), 8);
    }
}
