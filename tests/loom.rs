// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Model-checked interleavings of the phase-fair protocol.
// Run with: RUSTFLAGS="--cfg loom" cargo test --release --test loom
//
// loom's UnsafeCell flags any unsynchronized access, so each model passing
// means no interleaving lets a writer overlap another holder.

#![cfg(loom)]

use loom::cell::UnsafeCell;
use loom::sync::Arc;
use loom::thread;

use pflock::PhaseFairLock;

struct Shared {
    lock: PhaseFairLock,
    data: UnsafeCell<u32>,
}

// Access to `data` is guarded by `lock`.
unsafe impl Sync for Shared {}

impl Shared {
    fn new() -> Self {
        Self {
            lock: PhaseFairLock::new(),
            data: UnsafeCell::new(0),
        }
    }

    fn write(&self) {
        self.lock.acquire_write();
        self.data.with_mut(|p| unsafe { *p += 1 });
        self.lock.release_write();
    }

    fn read(&self) -> u32 {
        self.lock.acquire_read();
        let v = self.data.with(|p| unsafe { *p });
        self.lock.release_read();
        v
    }
}

#[test]
fn writers_exclude_each_other() {
    loom::model(|| {
        let s = Arc::new(Shared::new());
        let s2 = Arc::clone(&s);
        let t = thread::spawn(move || s2.write());
        s.write();
        t.join().unwrap();

        assert_eq!(s.read(), 2);
        assert!(s.lock.state().is_balanced());
    });
}

#[test]
fn reader_and_writer_exclude_each_other() {
    loom::model(|| {
        let s = Arc::new(Shared::new());
        let s2 = Arc::clone(&s);
        let t = thread::spawn(move || s2.read());
        s.write();
        let seen = t.join().unwrap();

        assert!(seen <= 1);
        assert!(s.lock.state().is_balanced());
    });
}

#[test]
fn concurrent_readers_during_writer() {
    // Two spinning readers plus a writer exhaust the default branch budget
    // unless preemptions are bounded.
    let mut builder = loom::model::Builder::new();
    builder.preemption_bound = Some(2);
    builder.check(|| {
        let s = Arc::new(Shared::new());
        let r1 = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.read())
        };
        let r2 = {
            let s = Arc::clone(&s);
            thread::spawn(move || s.read())
        };
        s.write();
        r1.join().unwrap();
        r2.join().unwrap();

        assert!(s.lock.state().is_balanced());
    });
}

#[test]
fn try_write_rolls_back_cleanly() {
    loom::model(|| {
        let s = Arc::new(Shared::new());
        let s2 = Arc::clone(&s);
        let t = thread::spawn(move || s2.read());

        if s.lock.try_acquire_write() {
            s.data.with_mut(|p| unsafe { *p += 1 });
            s.lock.release_write();
        }
        t.join().unwrap();

        // A failed attempt must leave no ticket or writer bits behind.
        let state = s.lock.state();
        assert!(state.is_balanced(), "{state:?}");
        s.write();
        assert!(s.lock.state().is_balanced());
    });
}

#[test]
fn try_read_never_overlaps_writer() {
    loom::model(|| {
        let s = Arc::new(Shared::new());
        let s2 = Arc::clone(&s);
        let t = thread::spawn(move || {
            if s2.lock.try_acquire_read() {
                let _ = s2.data.with(|p| unsafe { *p });
                s2.lock.release_read();
            }
        });
        s.write();
        t.join().unwrap();

        assert!(s.lock.state().is_balanced());
    });
}
