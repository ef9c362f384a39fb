// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Wrapper around MMIO accesses.
//!
//! Every register handle carries a [`Bus`], which performs the actual load or
//! store of one register word. [`Mmio`] is the passthrough implementation
//! that performs volatile reads and writes; host tests substitute
//! [`EmulatedBus`](crate::mmio_emu::EmulatedBus).

use crate::UIntLike;

/// A path to memory mapped registers.
///
/// Each call is exactly one access of the full word `T`: it is never split,
/// merged with a neighbouring access, elided or reordered with respect to
/// other accesses through the same bus.
pub trait Bus<T: UIntLike>: Copy {
    /// Loads the word at `address`.
    ///
    /// # Safety
    /// `address` must be a valid, `T`-aligned register address for this bus.
    /// Any side effects of reading the register are the caller's concern.
    unsafe fn load(self, address: usize) -> T;

    /// Stores `value` to the word at `address`.
    ///
    /// # Safety
    /// `address` must be a valid, `T`-aligned register address for this bus.
    unsafe fn store(self, address: usize, value: T);
}

/// The memory bus of the processor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mmio;

impl<T: UIntLike> Bus<T> for Mmio {
    #[inline]
    unsafe fn load(self, address: usize) -> T {
        ::core::ptr::read_volatile(address as *const T)
    }

    #[inline]
    unsafe fn store(self, address: usize, value: T) {
        ::core::ptr::write_volatile(address as *mut T, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mmio_accesses_memory() {
        let mut word: u32 = 0x1234_5678;
        let address = &mut word as *mut u32 as usize;
        unsafe {
            assert_eq!(<Mmio as Bus<u32>>::load(Mmio, address), 0x1234_5678);
            Mmio.store(address, 0xCAFE_F00Du32);
        }
        assert_eq!(word, 0xCAFE_F00D);
    }
}
