// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Bit-exact register layouts.
//!
//! A layout describes how one register word splits into named fields. Each
//! layout is a zero-sized marker type implementing [`BitLayout`]; the value
//! of a register under that layout is a
//! [`LocalRegisterCopy`](crate::LocalRegisterCopy), which has exactly the
//! size of the word.
//!
//! Layouts are normally produced by
//! [`register_bitfields!`](crate::register_bitfields), which also runs
//! [`check_layout`] on the field table at compile time:
//!
//! ```compile_fail
//! use mmio_register::register_bitfields;
//!
//! // OFFSET(1) NUMBITS(2) overlaps with OFFSET(2): rejected at compile time.
//! register_bitfields![u32,
//!     Broken [
//!         A OFFSET(0) NUMBITS(1) [],
//!         B OFFSET(1) NUMBITS(2) [],
//!         C OFFSET(2) NUMBITS(30) []
//!     ]
//! ];
//! # fn main() {}
//! ```
//!
//! ```compile_fail
//! use mmio_register::register_bitfields;
//!
//! // Bits 8 to 31 are not covered by any field.
//! register_bitfields![u32,
//!     Partial [
//!         LOW OFFSET(0) NUMBITS(8) []
//!     ]
//! ];
//! # fn main() {}
//! ```

use core::marker::PhantomData;

use crate::UIntLike;

/// One entry of a register's field table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    /// Position of the least significant bit of the field.
    pub shift: usize,
    /// Number of bits in the field.
    pub width: usize,
    /// Value of the field after a hardware reset.
    pub reset: u64,
}

impl FieldInfo {
    pub const fn new(name: &'static str, shift: usize, width: usize, reset: u64) -> FieldInfo {
        FieldInfo {
            name,
            shift,
            width,
            reset,
        }
    }
}

/// Description of how a register word decomposes into fields.
///
/// Implementors are marker types; all information is carried by the
/// associated items.
pub trait BitLayout {
    /// The storage word. The layout is exactly `Word::BITS` wide.
    type Word: UIntLike;

    /// Register name, used for debug output.
    const NAME: &'static str;

    /// Every field of the register, reserved filler included.
    const FIELDS: &'static [FieldInfo];

    /// The word with every field at its reset value.
    const RESET: Self::Word;
}

/// Layout for registers without modeled fields: a single `VALUE` field
/// spanning the whole word, reset to zero.
pub struct Raw<T>(PhantomData<T>);

impl<T: UIntLike> BitLayout for Raw<T> {
    type Word = T;
    const NAME: &'static str = "Raw";
    const FIELDS: &'static [FieldInfo] = &[FieldInfo::new("VALUE", 0, T::BITS, 0)];
    const RESET: T = T::ZERO;
}

/// Mask with the low `width` bits set.
const fn low_bits(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Verifies a field table against a word of `word_bits` bits.
///
/// Panics (a compile error when evaluated in a `const`) if a field is empty,
/// extends past the word, overlaps another field, or has a reset value wider
/// than the field, or if any bit of the word is not covered by a field.
pub const fn check_layout(word_bits: usize, fields: &[FieldInfo]) {
    assert!(word_bits <= 64, "register words wider than 64 bits are not supported");

    let mut covered: u64 = 0;
    let mut i = 0;
    while i < fields.len() {
        let field = &fields[i];
        assert!(field.width > 0, "bitfield has zero width");
        assert!(
            field.shift + field.width <= word_bits,
            "bitfield extends past the register width"
        );
        assert!(
            field.reset & !low_bits(field.width) == 0,
            "bitfield reset value does not fit in the bitfield"
        );

        let mask = low_bits(field.width) << field.shift;
        assert!(covered & mask == 0, "bitfields overlap");
        covered |= mask;
        i += 1;
    }

    assert!(
        covered == low_bits(word_bits),
        "register bits are not all covered by bitfields"
    );
}

/// Combines the reset values of a field table into one word.
pub const fn reset_value(fields: &[FieldInfo]) -> u64 {
    let mut value: u64 = 0;
    let mut i = 0;
    while i < fields.len() {
        value |= fields[i].reset << fields[i].shift;
        i += 1;
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[FieldInfo] = &[
        FieldInfo::new("ENABLE", 0, 1, 1),
        FieldInfo::new("MODE", 1, 2, 2),
        FieldInfo::new("RESERVED", 3, 29, 0),
    ];

    #[test]
    fn complete_table_passes() {
        check_layout(32, TABLE);
        assert_eq!(reset_value(TABLE), 0b101);
    }

    #[test]
    #[should_panic(expected = "bitfields overlap")]
    fn overlap_is_rejected() {
        check_layout(
            32,
            &[
                FieldInfo::new("A", 0, 4, 0),
                FieldInfo::new("B", 3, 29, 0),
            ],
        );
    }

    #[test]
    #[should_panic(expected = "not all covered")]
    fn gap_is_rejected() {
        check_layout(32, &[FieldInfo::new("A", 0, 31, 0)]);
    }

    #[test]
    #[should_panic(expected = "past the register width")]
    fn field_past_word_is_rejected() {
        check_layout(16, &[FieldInfo::new("A", 0, 17, 0)]);
    }

    #[test]
    #[should_panic(expected = "reset value does not fit")]
    fn oversized_reset_is_rejected() {
        check_layout(
            8,
            &[
                FieldInfo::new("A", 0, 2, 4),
                FieldInfo::new("B", 2, 6, 0),
            ],
        );
    }

    #[test]
    fn raw_layout_spans_word() {
        assert_eq!(<Raw<u32> as BitLayout>::FIELDS[0].width, 32);
        assert_eq!(<Raw<u64> as BitLayout>::RESET, 0);
        check_layout(64, <Raw<u64> as BitLayout>::FIELDS);
    }
}
