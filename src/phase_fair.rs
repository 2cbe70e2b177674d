// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Phase-fair reader-writer spin lock (Brandenburg & Anderson, ticket variant).
// Four 32-bit counters:
// - rin:  reader arrivals (in units of RINC) | writer bits in the low byte(s)
// - rout: reader departures (in units of RINC)
// - win:  writer tickets issued
// - wout: writer ticket currently served
//
// Readers block only on the writer phase they observed on arrival, writers
// wait only for readers that arrived before they announced themselves.

use core::fmt;

use crate::cache_padded::CachePadded;
use crate::sync::{spin_loop, AtomicU32, Ordering};

/// Default width of the reserved low-bit field in `rin`.
pub const DEFAULT_PHASE_BITS: u32 = 8;

/// Writer-present bit in `rin`.
pub const PRES: u32 = 0b10;
/// Phase id bit in `rin`: parity of the present writer's ticket.
pub const PHID: u32 = 0b01;
/// Both writer bits.
pub const WBITS: u32 = PRES | PHID;

struct ReadSide {
    rin: AtomicU32,
    rout: AtomicU32,
}

struct WriteSide {
    win: AtomicU32,
    wout: AtomicU32,
}

macro_rules! counters {
    ($rin:expr, $rout:expr, $win:expr, $wout:expr) => {
        PhaseFairLock {
            readers: CachePadded::new(ReadSide {
                rin: AtomicU32::new($rin),
                rout: AtomicU32::new($rout),
            }),
            writers: CachePadded::new(WriteSide {
                win: AtomicU32::new($win),
                wout: AtomicU32::new($wout),
            }),
        }
    };
}

/// A phase-fair reader-writer spin lock.
///
/// Readers never block each other. A writer waits for the writers queued
/// ahead of it (FIFO by ticket) and then only for the readers that had
/// already arrived when it announced itself; readers arriving later spin
/// until that writer's phase ends. Each side therefore waits at most one
/// phase of the other.
///
/// `PHASE_BITS` is the number of low bits of `rin` reserved for the writer
/// bits; readers count in units of `1 << PHASE_BITS`. It must lie in `2..=16`
/// (checked at compile time). Larger values leave fewer bits for the reader
/// count but change nothing else.
///
/// This is the raw lock: acquire and release calls must be paired by the
/// caller and nothing is checked at runtime. Unbalanced releases or a
/// reentrant `acquire_write` deadlock or corrupt the counters. Use
/// [`RwLock`](crate::RwLock) for guard-based access.
///
/// All counter accesses are `SeqCst`; waiting is a pure busy-wait with a
/// CPU relax hint between polls.
pub struct PhaseFairLock<const PHASE_BITS: u32 = DEFAULT_PHASE_BITS> {
    readers: CachePadded<ReadSide>,
    writers: CachePadded<WriteSide>,
}

impl<const PHASE_BITS: u32> PhaseFairLock<PHASE_BITS> {
    /// Reader increment applied to `rin` and `rout`.
    pub const RINC: u32 = 1 << PHASE_BITS;
    /// The whole reserved low-bit field of `rin`.
    pub const PHASE_MASK: u32 = Self::RINC - 1;

    const LAYOUT_OK: () = assert!(
        PHASE_BITS >= 2 && PHASE_BITS <= 16,
        "PHASE_BITS must be in 2..=16"
    );

    /// Create an unlocked lock with all counters at zero.
    #[cfg(not(loom))]
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_OK;
        counters!(0, 0, 0, 0)
    }

    /// Create an unlocked lock with all counters at zero.
    #[cfg(loom)]
    pub fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::LAYOUT_OK;
        counters!(0, 0, 0, 0)
    }

    /// Reset all four counters to zero.
    ///
    /// Requires exclusive access, so it can never race with a holder.
    pub fn initialize(&mut self) {
        *self = Self::new();
    }

    /// Acquire a shared (read) lock, spinning while a writer phase that was
    /// current on arrival is still in progress.
    #[inline]
    pub fn acquire_read(&self) {
        let w = self.readers.rin.fetch_add(Self::RINC, Ordering::SeqCst) & WBITS;
        if w == 0 {
            return;
        }
        log::trace!("reader blocked on writer phase {w:#04b}");
        while self.readers.rin.load(Ordering::SeqCst) & WBITS == w {
            spin_loop();
        }
    }

    /// Try to acquire a shared lock without waiting.
    ///
    /// Succeeds iff no writer is announced. Leaves the counters untouched on
    /// failure.
    #[inline]
    pub fn try_acquire_read(&self) -> bool {
        let mut cur = self.readers.rin.load(Ordering::SeqCst);
        loop {
            if cur & WBITS != 0 {
                return false;
            }
            match self.readers.rin.compare_exchange_weak(
                cur,
                cur.wrapping_add(Self::RINC),
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => return true,
                Err(actual) => cur = actual,
            }
        }
    }

    /// Release a shared lock.
    #[inline]
    pub fn release_read(&self) {
        self.readers.rout.fetch_add(Self::RINC, Ordering::SeqCst);
    }

    /// Acquire the exclusive (write) lock.
    ///
    /// Takes a ticket and waits for its turn, then announces itself in `rin`
    /// and waits for the readers counted before the announcement to leave.
    #[inline]
    pub fn acquire_write(&self) {
        let ticket = self.writers.win.fetch_add(1, Ordering::SeqCst);
        let mut serving = self.writers.wout.load(Ordering::SeqCst);
        if serving != ticket {
            log::trace!("writer ticket {ticket} queued behind {serving}");
            while serving != ticket {
                spin_loop();
                serving = self.writers.wout.load(Ordering::SeqCst);
            }
        }

        let arrived = self.announce(ticket);
        let mut departed = self.readers.rout.load(Ordering::SeqCst);
        if departed != arrived {
            log::trace!(
                "writer ticket {ticket} draining {} readers",
                arrived.wrapping_sub(departed) >> PHASE_BITS
            );
            while departed != arrived {
                spin_loop();
                departed = self.readers.rout.load(Ordering::SeqCst);
            }
        }
    }

    /// Try to acquire the write lock without waiting.
    ///
    /// Succeeds iff no writer is queued or active and no reader is in flight.
    /// Never takes a queue position it would have to wait on: the ticket is
    /// claimed only if it is the one being served. If a reader slips in after
    /// the announcement the attempt is rolled back through the normal release
    /// path, which keeps the ticket queue consistent.
    pub fn try_acquire_write(&self) -> bool {
        let rin = self.readers.rin.load(Ordering::SeqCst);
        if rin & WBITS != 0 || rin & !Self::PHASE_MASK != self.readers.rout.load(Ordering::SeqCst) {
            return false;
        }

        let ticket = self.writers.wout.load(Ordering::SeqCst);
        if self
            .writers
            .win
            .compare_exchange(ticket, ticket.wrapping_add(1), Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        if self.announce(ticket) == self.readers.rout.load(Ordering::SeqCst) {
            return true;
        }
        log::trace!("writer ticket {ticket} backing out, readers still present");
        self.release_write();
        false
    }

    /// Release the exclusive lock: end the writer phase, then serve the next
    /// ticket.
    #[inline]
    pub fn release_write(&self) {
        let prev = self.readers.rin.fetch_and(!WBITS, Ordering::SeqCst);
        debug_assert!(prev & PRES != 0, "release_write without a present writer");

        // Only the current ticket holder writes wout.
        let next = self.writers.wout.load(Ordering::SeqCst).wrapping_add(1);
        self.writers.wout.store(next, Ordering::SeqCst);
    }

    /// Snapshot of the four counters. The loads are individually atomic but
    /// not taken together, so the result is only exact while the lock is
    /// quiescent.
    pub fn state(&self) -> LockState {
        LockState {
            rin: self.readers.rin.load(Ordering::SeqCst),
            rout: self.readers.rout.load(Ordering::SeqCst),
            win: self.writers.win.load(Ordering::SeqCst),
            wout: self.writers.wout.load(Ordering::SeqCst),
            phase_bits: PHASE_BITS,
        }
    }

    // Sets the writer bits for `ticket`; returns the reader part of `rin`
    // from just before the announcement.
    #[inline]
    fn announce(&self, ticket: u32) -> u32 {
        let bits = PRES | (ticket & PHID);
        self.readers.rin.fetch_add(bits, Ordering::SeqCst) & !Self::PHASE_MASK
    }

    #[cfg(all(test, not(loom)))]
    const fn with_counters(rin: u32, rout: u32, win: u32, wout: u32) -> Self {
        counters!(rin, rout, win, wout)
    }
}

impl<const PHASE_BITS: u32> Default for PhaseFairLock<PHASE_BITS> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const PHASE_BITS: u32> fmt::Debug for PhaseFairLock<PHASE_BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhaseFairLock")
            .field("state", &self.state())
            .finish()
    }
}

#[cfg(not(loom))]
unsafe impl<const PHASE_BITS: u32> lock_api::RawRwLock for PhaseFairLock<PHASE_BITS> {
    #[allow(clippy::declare_interior_mutable_const)]
    const INIT: Self = Self::new();

    type GuardMarker = lock_api::GuardSend;

    #[inline]
    fn lock_shared(&self) {
        self.acquire_read();
    }

    #[inline]
    fn try_lock_shared(&self) -> bool {
        self.try_acquire_read()
    }

    #[inline]
    unsafe fn unlock_shared(&self) {
        self.release_read();
    }

    #[inline]
    fn lock_exclusive(&self) {
        self.acquire_write();
    }

    #[inline]
    fn try_lock_exclusive(&self) -> bool {
        self.try_acquire_write()
    }

    #[inline]
    unsafe fn unlock_exclusive(&self) {
        self.release_write();
    }

    fn is_locked(&self) -> bool {
        self.state().is_locked()
    }

    /// True from the writer's announcement onward, including the drain
    /// phase while readers admitted before it are still inside.
    fn is_locked_exclusive(&self) -> bool {
        self.state().writer_present()
    }
}

/// Point-in-time copy of a [`PhaseFairLock`]'s counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockState {
    pub rin: u32,
    pub rout: u32,
    pub win: u32,
    pub wout: u32,
    /// Width of the reserved low-bit field of `rin`.
    pub phase_bits: u32,
}

impl LockState {
    /// Readers that have arrived and not yet departed, blocked ones included.
    pub fn readers_in_flight(&self) -> u32 {
        let mask = (1u32 << self.phase_bits) - 1;
        (self.rin & !mask).wrapping_sub(self.rout) >> self.phase_bits
    }

    /// Writers holding a ticket that has not been released yet (queued or
    /// active).
    pub fn queued_writers(&self) -> u32 {
        self.win.wrapping_sub(self.wout)
    }

    /// Whether a writer has announced itself (draining or active).
    pub fn writer_present(&self) -> bool {
        self.rin & PRES != 0
    }

    /// Phase id of the present writer, if any.
    pub fn writer_phase(&self) -> Option<u32> {
        self.writer_present().then_some(self.rin & PHID)
    }

    /// Whether anyone holds or waits for the lock.
    pub fn is_locked(&self) -> bool {
        self.rin & WBITS != 0 || self.readers_in_flight() != 0 || self.queued_writers() != 0
    }

    /// Every acquire has been matched by a release.
    pub fn is_balanced(&self) -> bool {
        !self.is_locked()
    }
}
