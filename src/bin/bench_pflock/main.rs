// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Throughput comparison: phase-fair RwLock vs std::sync::RwLock.
//
// Usage: bench_pflock [max_threads] [ops_per_thread]
// Set LOG=ERROR|WARN|INFO|DEBUG|TRACE to see the lock's slow-path records.

use log::{Level, LevelFilter, Log, Metadata, Record};

#[cfg(not(loom))]
mod workloads;

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        let color = match record.level() {
            Level::Error => 31,
            Level::Warn => 93,
            Level::Info => 34,
            Level::Debug => 32,
            Level::Trace => 90,
        };
        eprintln!(
            "\u{1B}[{}m[{:>5}][{}] {}\u{1B}[0m",
            color,
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

fn init_logging() {
    static LOGGER: StderrLogger = StderrLogger;
    let level = match std::env::var("LOG").as_deref() {
        Ok("ERROR") => LevelFilter::Error,
        Ok("WARN") => LevelFilter::Warn,
        Ok("INFO") => LevelFilter::Info,
        Ok("DEBUG") => LevelFilter::Debug,
        Ok("TRACE") => LevelFilter::Trace,
        _ => LevelFilter::Off,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let max_threads: usize = if args.len() > 1 {
        args[1].parse().unwrap_or(8)
    } else {
        8
    };
    let ops: usize = if args.len() > 2 {
        args[2].parse().unwrap_or(100_000)
    } else {
        100_000
    };
    log::info!("max_threads={max_threads} ops_per_thread={ops}");

    #[cfg(not(loom))]
    workloads::run(max_threads, ops);

    #[cfg(loom)]
    log::warn!("built with --cfg loom, nothing to measure");
}
