// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register blocks.
//!
//! A block is anything that occupies a fixed-size span of a bus: a single
//! register handle, a peripheral declared with
//! [`peripheral!`](crate::peripheral), or a
//! [`RegisterArray`](crate::RegisterArray) element type. Blocks can be
//! relocated with [`Block::byte_add`], which is how peripherals position their
//! registers and how arrays position their elements.

/// A relocatable group of registers on one bus.
pub trait Block: Copy {
    /// The bus the registers are reached through.
    type Bus: Copy;

    /// Bytes spanned by the block, from its base to its end marker.
    const SIZE: usize;

    /// Required alignment of the block's base address.
    const ALIGN: usize;

    /// Address of the first byte of the block.
    fn base(&self) -> usize;

    /// Creates the block with its base at `address`.
    ///
    /// # Safety
    /// `address` must be the base of a block with this layout on `bus`.
    unsafe fn at(address: usize, bus: Self::Bus) -> Self;

    /// The same block shifted `offset` bytes up the address space.
    ///
    /// # Safety
    /// The shifted block must be valid, as for [`Block::at`].
    unsafe fn byte_add(self, offset: usize) -> Self;
}

/// Rebinds a block type to the bus `B`.
///
/// Register handles and peripherals implement this so that
/// [`peripheral!`](crate::peripheral) members can be written with the default
/// memory bus and still follow the peripheral's bus parameter.
pub trait WithBus<B> {
    type Output;
}

/// Verifies the register table of a peripheral.
///
/// Each entry is `(offset, size, align)` for one member, in declaration
/// order. Panics (a compile error when evaluated in a `const`) if an offset
/// is not aligned for its member, if members are out of order or overlap, or
/// if the last member runs past `end`.
pub const fn check_block(members: &[(usize, usize, usize)], end: usize) {
    let mut next_free = 0;
    let mut i = 0;
    while i < members.len() {
        let (offset, size, align) = members[i];
        assert!(
            offset % align == 0,
            "register offset is not aligned to its width"
        );
        assert!(
            offset >= next_free,
            "registers overlap or are not in ascending order"
        );
        next_free = offset + size;
        i += 1;
    }
    assert!(next_free <= end, "registers extend past the end of the block");
}

/// The largest of `aligns`, or 1 for an empty block.
pub const fn max_align(aligns: &[usize]) -> usize {
    let mut align = 1;
    let mut i = 0;
    while i < aligns.len() {
        if aligns[i] > align {
            align = aligns[i];
        }
        i += 1;
    }
    align
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_aligned_members_pass() {
        check_block(&[(0x00, 4, 4), (0x04, 4, 4), (0x10, 8, 8)], 0x18);
        check_block(&[(0x00, 1, 1), (0x01, 1, 1), (0x02, 2, 2)], 0x08);
        check_block(&[], 0);
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_offset() {
        check_block(&[(0x00, 4, 4), (0x06, 4, 4)], 0x10);
    }

    #[test]
    #[should_panic(expected = "overlap")]
    fn overlapping_members() {
        check_block(&[(0x00, 8, 4), (0x04, 4, 4)], 0x10);
    }

    #[test]
    #[should_panic(expected = "past the end")]
    fn member_past_end() {
        check_block(&[(0x00, 4, 4), (0x04, 4, 4)], 0x06);
    }

    #[test]
    fn max_align_picks_largest() {
        assert_eq!(max_align(&[4, 8, 2]), 8);
        assert_eq!(max_align(&[]), 1);
    }
}
