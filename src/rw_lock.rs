// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Data-owning read-write lock on top of the phase-fair raw lock.
// Guards come from lock_api: they release on drop (also while unwinding, so
// there is no poisoning) and deref to the protected value.

use crate::phase_fair::PhaseFairLock;

/// A phase-fair reader-writer lock protecting a value of type `T`.
///
/// Readers share access, writers get exclusive access, and neither side can
/// starve the other: a writer waits only for readers that arrived before it,
/// and a reader waits for at most one writer phase.
///
/// ```
/// let lock = pflock::RwLock::new(5);
/// {
///     let r1 = lock.read();
///     let r2 = lock.read();
///     assert_eq!(*r1 + *r2, 10);
/// }
/// *lock.write() += 1;
/// assert_eq!(*lock.read(), 6);
/// ```
pub type RwLock<T> = lock_api::RwLock<PhaseFairLock, T>;

/// Shared access guard for [`RwLock`].
pub type RwLockReadGuard<'a, T> = lock_api::RwLockReadGuard<'a, PhaseFairLock, T>;

/// Exclusive access guard for [`RwLock`].
pub type RwLockWriteGuard<'a, T> = lock_api::RwLockWriteGuard<'a, PhaseFairLock, T>;

/// Read guard narrowed to a component of the protected value.
pub type MappedRwLockReadGuard<'a, T> = lock_api::MappedRwLockReadGuard<'a, PhaseFairLock, T>;

/// Write guard narrowed to a component of the protected value.
pub type MappedRwLockWriteGuard<'a, T> = lock_api::MappedRwLockWriteGuard<'a, PhaseFairLock, T>;

/// [`RwLock`] with only the two writer bits reserved in the reader counter,
/// leaving 30 bits for in-flight readers.
pub type CompactRwLock<T> = lock_api::RwLock<PhaseFairLock<2>, T>;

/// Create a [`RwLock`] in a `const` or `static` context.
pub const fn const_rw_lock<T>(value: T) -> RwLock<T> {
    RwLock::const_new(PhaseFairLock::new(), value)
}
