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

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use edgealloc_bnb::{
    bnb::BnbSolver, config::BnbConfig, monitor::no_op::NoOperationMonitor, parallel::ParallelBnbSolver,
};
use edgealloc_model::{instance::Instance, server::Server, task::Task};
use edgealloc_oracle::enumeration::ExactEnumerationOracle;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::hint::black_box;

const SIZES: [(usize, usize); 3] = [(8, 2), (12, 3), (16, 3)];

fn random_instance(seed: u64, num_tasks: usize, num_servers: usize) -> Instance<i64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let tasks = (0..num_tasks)
        .map(|i| {
            Task::new(
                format!("t{}", i),
                rng.random_range(5..=40),
                rng.random_range(1..=20),
                rng.random_range(1..=20),
                rng.random_range(4..=25),
                rng.random_range(1..=100i64),
            )
            .unwrap_or_else(|e| panic!("Benchmark configuration error: {}", e))
        })
        .collect();
    let servers = (0..num_servers)
        .map(|j| {
            Server::new(
                format!("s{}", j),
                rng.random_range(60..=120),
                rng.random_range(8..=20),
                rng.random_range(10..=30),
            )
            .unwrap_or_else(|e| panic!("Benchmark configuration error: {}", e))
        })
        .collect();
    Instance::new(tasks, servers)
}

fn bench_sequential(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_sequential");
    group.sample_size(10);
    let mut solver = BnbSolver::preallocated(1 << 12);

    for (n, m) in SIZES {
        let instance = random_instance(0xed6e, n, m);
        let label = format!("{}x{}", n, m);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("exact", &label), &instance, |b, instance| {
            b.iter(|| {
                let mut oracle = ExactEnumerationOracle::new();
                let outcome = solver
                    .solve(black_box(instance), &mut oracle, NoOperationMonitor::new())
                    .unwrap_or_else(|e| panic!("Benchmark configuration error: {}", e));
                black_box(outcome.achieved_value())
            })
        });
    }
    group.finish();
}

fn bench_parallel(c: &mut Criterion) {
    let mut group = c.benchmark_group("bnb_parallel");
    group.sample_size(10);
    let config = BnbConfig::default().with_num_threads(4);

    for (n, m) in SIZES {
        let instance = random_instance(0xed6e, n, m);
        let label = format!("{}x{}", n, m);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("exact_4_threads", &label), &instance, |b, instance| {
            b.iter(|| {
                let outcome = ParallelBnbSolver::solve(black_box(instance), ExactEnumerationOracle::new(), &config)
                    .unwrap_or_else(|e| panic!("Benchmark configuration error: {}", e));
                black_box(outcome.achieved_value())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_sequential, bench_parallel);
criterion_main!(benches);
