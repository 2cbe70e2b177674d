// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Lock under test
// ---------------------------------------------------------------------------

trait SharedCounter: Send + Sync + 'static {
    const NAME: &'static str;
    fn create() -> Self;
    fn load(&self) -> u64;
    fn bump(&self);
}

impl SharedCounter for pflock::RwLock<u64> {
    const NAME: &'static str = "phase-fair";

    fn create() -> Self {
        pflock::RwLock::new(0)
    }

    fn load(&self) -> u64 {
        *self.read()
    }

    fn bump(&self) {
        *self.write() += 1;
    }
}

impl SharedCounter for std::sync::RwLock<u64> {
    const NAME: &'static str = "std";

    fn create() -> Self {
        std::sync::RwLock::new(0)
    }

    fn load(&self) -> u64 {
        *self.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn bump(&self) {
        *self.write().unwrap_or_else(PoisonError::into_inner) += 1;
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct Stats {
    total_ms: f64,
    count: usize,
}

impl Stats {
    fn ns_per_op(&self) -> f64 {
        (self.total_ms * 1_000_000.0) / self.count as f64
    }
}

fn print_header(title: &str) {
    println!("\n=== {} ===", title);
}

// ---------------------------------------------------------------------------
// Mixed workload — N threads, every `write_every`-th op is a write
// ---------------------------------------------------------------------------

fn bench_mixed<L: SharedCounter>(n_threads: usize, ops: usize, write_every: usize) -> Stats {
    let lock = Arc::new(L::create());
    let ready = Arc::new(AtomicBool::new(false));

    let threads: Vec<_> = (0..n_threads)
        .map(|id| {
            let lock = Arc::clone(&lock);
            let ready = Arc::clone(&ready);
            thread::spawn(move || {
                while !ready.load(Ordering::Acquire) {
                    thread::yield_now();
                }
                let mut sink = 0u64;
                for i in 0..ops {
                    if (i + id) % write_every == 0 {
                        lock.bump();
                    } else {
                        sink = sink.wrapping_add(lock.load());
                    }
                }
                sink
            })
        })
        .collect();

    let t0 = Instant::now();
    ready.store(true, Ordering::Release);
    for t in threads {
        let _ = t.join();
    }
    let total_ms = t0.elapsed().as_secs_f64() * 1000.0;

    log::debug!("{}: final value {}", L::NAME, lock.load());
    Stats {
        total_ms,
        count: n_threads * ops,
    }
}

// ---------------------------------------------------------------------------
// Sleeping critical sections — serial vs parallel
// ---------------------------------------------------------------------------

fn bench_sleepers(parallel: bool, write: bool, n: usize, hold: Duration) -> Duration {
    let lock = Arc::new(pflock::RwLock::new(()));
    let t0 = Instant::now();
    let mut threads = Vec::new();
    for _ in 0..n {
        let lock = Arc::clone(&lock);
        let t = thread::spawn(move || {
            if write {
                let _g = lock.write();
                thread::sleep(hold);
            } else {
                let _g = lock.read();
                thread::sleep(hold);
            }
        });
        if parallel {
            threads.push(t);
        } else {
            let _ = t.join();
        }
    }
    for t in threads {
        let _ = t.join();
    }
    t0.elapsed()
}

pub fn run(max_threads: usize, ops: usize) {
    println!("pflock benchmark");
    println!(
        "{} hardware threads",
        thread::available_parallelism().map(|n| n.get()).unwrap_or(1)
    );

    for (label, write_every) in [("1 write in 100", 100), ("1 write in 4", 4)] {
        print_header(&format!("{label} ({ops} ops/thread)"));
        println!("{:>10}  {:>14}  {:>14}", "Threads", "phase-fair ns", "std ns");
        println!("{:>10}  {:>14}  {:>14}", "----------", "------------", "------------");

        let mut n = 1;
        while n <= max_threads {
            let pf = bench_mixed::<pflock::RwLock<u64>>(n, ops, write_every);
            let st = bench_mixed::<std::sync::RwLock<u64>>(n, ops, write_every);
            println!("{:>10}  {:>14.1}  {:>14.1}", n, pf.ns_per_op(), st.ns_per_op());
            n *= 2;
        }
    }

    let hold = Duration::from_millis(5);
    let n = 16;
    print_header(&format!("{n} threads holding the lock for {hold:?}"));
    let rs = bench_sleepers(false, false, n, hold);
    let rp = bench_sleepers(true, false, n, hold);
    let ws = bench_sleepers(false, true, n, hold);
    let wp = bench_sleepers(true, true, n, hold);
    println!(
        "read  serial {:>10.2?}  parallel {:>10.2?}  ({:.1}x)",
        rs,
        rp,
        rs.as_secs_f64() / rp.as_secs_f64()
    );
    println!(
        "write serial {:>10.2?}  parallel {:>10.2?}  ({:.1}x)",
        ws,
        wp,
        ws.as_secs_f64() / wp.as_secs_f64()
    );

    println!("\nDone.");
}
