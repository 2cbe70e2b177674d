// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025-2026 natyamatsya contributors
//
// Cache-line alignment for the two counter pairs of the phase-fair lock.
// Readers hammer `rin`/`rout`, writers hammer `win`/`wout`; keeping the pairs
// on separate lines stops one side from invalidating the other's line.
//
// Line sizes follow the usual per-architecture values (x86_64 and aarch64
// prefetch adjacent line pairs, hence 128). With the `cache-padded` feature
// disabled the wrapper is a plain transparent newtype.

use core::fmt;
use core::ops::Deref;

/// Pads and aligns `T` to the length of a cache line.
#[cfg_attr(
    all(
        feature = "cache-padded",
        any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "powerpc64")
    ),
    repr(align(128))
)]
#[cfg_attr(
    all(
        feature = "cache-padded",
        any(
            target_arch = "arm",
            target_arch = "mips",
            target_arch = "mips64",
            target_arch = "riscv32",
            target_arch = "riscv64",
            target_arch = "sparc",
            target_arch = "hexagon",
        )
    ),
    repr(align(32))
)]
#[cfg_attr(all(feature = "cache-padded", target_arch = "s390x"), repr(align(256)))]
#[cfg_attr(
    all(
        feature = "cache-padded",
        not(any(
            target_arch = "x86_64",
            target_arch = "aarch64",
            target_arch = "powerpc64",
            target_arch = "arm",
            target_arch = "mips",
            target_arch = "mips64",
            target_arch = "riscv32",
            target_arch = "riscv64",
            target_arch = "sparc",
            target_arch = "hexagon",
            target_arch = "s390x",
        ))
    ),
    repr(align(64))
)]
#[cfg_attr(not(feature = "cache-padded"), repr(transparent))]
pub struct CachePadded<T> {
    value: T,
}

impl<T> CachePadded<T> {
    /// Wrap `value`.
    pub const fn new(value: T) -> Self {
        Self { value }
    }

    /// Unwrap the padded value.
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T> Deref for CachePadded<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: fmt::Debug> fmt::Debug for CachePadded<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachePadded").field("value", &self.value).finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn deref_reaches_value() {
        let p = CachePadded::new(7u32);
        assert_eq!(*p, 7);
        assert_eq!(p.into_inner(), 7);
    }

    #[cfg(feature = "cache-padded")]
    #[test]
    fn padded_to_at_least_32_bytes() {
        assert!(core::mem::align_of::<CachePadded<u32>>() >= 32);
        assert_eq!(
            core::mem::size_of::<CachePadded<u32>>(),
            core::mem::align_of::<CachePadded<u32>>()
        );
    }

    #[cfg(not(feature = "cache-padded"))]
    #[test]
    fn transparent_without_padding() {
        assert_eq!(core::mem::size_of::<CachePadded<u32>>(), 4);
    }
}
