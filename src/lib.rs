// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Phase-fair reader-writer spin lock built from four atomic counters.
// Readers run concurrently, writers are served in FIFO ticket order, and a
// writer waits only for the readers that were present when it announced
// itself, so neither side starves.

mod sync;

pub mod cache_padded;
pub use cache_padded::CachePadded;

mod phase_fair;
pub use phase_fair::{LockState, PhaseFairLock, DEFAULT_PHASE_BITS, PHID, PRES, WBITS};

#[cfg(not(loom))]
mod rw_lock;
#[cfg(not(loom))]
pub use rw_lock::{
    const_rw_lock, CompactRwLock, MappedRwLockReadGuard, MappedRwLockWriteGuard, RwLock,
    RwLockReadGuard, RwLockWriteGuard,
};

#[cfg(not(loom))]
pub use lock_api;
