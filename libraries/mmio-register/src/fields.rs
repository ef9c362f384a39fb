// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register bitfields.
//!
//! A [`Field`] names a contiguous range of bits in a register. A
//! [`FieldValue`] is a set of fields together with new values for them; it is
//! what [`write_fields`](crate::interfaces::Writeable::write_fields) and
//! [`modify`](crate::interfaces::ReadWriteable::modify) take. Field values for
//! the same register combine with `+`:
//!
//! ```rust
//! # use mmio_register::register_bitfields;
//! # register_bitfields![u32,
//! #     Control [
//! #         ENABLE OFFSET(0) NUMBITS(1) [],
//! #         MODE OFFSET(1) NUMBITS(2) [],
//! #         RESERVED OFFSET(3) NUMBITS(29) []
//! #     ]
//! # ];
//! # fn main() {
//! let fields = Control::ENABLE::SET + Control::MODE.val(2);
//! assert_eq!(fields.mask(), 0b111);
//! assert_eq!(fields.value, 0b101);
//! # }
//! ```
//!
//! Fields are typed by their register layout, so a field of one register
//! cannot be applied to another register.

use core::marker::PhantomData;
use core::ops::{Add, AddAssign};

use crate::{BitLayout, UIntLike};

/// Conversion of raw register value into enumerated values member.
/// Implemented inside register_bitfields! macro for each bit field.
pub trait TryFromValue<V> {
    type EnumType;

    fn try_from_value(v: V) -> Option<Self::EnumType>;
}

/// Specific section of a register.
///
/// For the Field, the mask is unshifted, ie. the LSB should always be set.
pub struct Field<T: UIntLike, R: BitLayout<Word = T>> {
    pub mask: T,
    pub shift: usize,
    associated_register: PhantomData<R>,
}

impl<T: UIntLike, R: BitLayout<Word = T>> Field<T, R> {
    /// Extracts this field from a register value.
    #[inline]
    pub fn read(self, val: T) -> T {
        (val & (self.mask << self.shift)) >> self.shift
    }

    /// Check if one or more bits in a field are set.
    #[inline]
    pub fn is_set(self, val: T) -> bool {
        val & (self.mask << self.shift) != T::zero()
    }

    /// Read value of the field as an enum member.
    #[inline]
    pub fn read_as_enum<E: TryFromValue<T, EnumType = E>>(self, val: T) -> Option<E> {
        E::try_from_value(self.read(val))
    }

    /// A `FieldValue` setting this field to `value`. Bits of `value` that do
    /// not fit in the field are dropped.
    #[inline]
    pub fn val(self, value: T) -> FieldValue<T, R> {
        FieldValue {
            mask: self.mask << self.shift,
            value: (value & self.mask) << self.shift,
            associated_register: PhantomData,
        }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>> Clone for Field<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: UIntLike, R: BitLayout<Word = T>> Copy for Field<T, R> {}

/// Values for the specific register fields.
///
/// For the FieldValue, the masks and values are shifted into their actual
/// location in the register.
pub struct FieldValue<T: UIntLike, R: BitLayout<Word = T>> {
    pub mask: T,
    pub value: T,
    associated_register: PhantomData<R>,
}

impl<T: UIntLike, R: BitLayout<Word = T>> FieldValue<T, R> {
    /// A FieldValue naming no fields. Combining it with `+` has no effect,
    /// and modifying a register with it writes back what was read.
    pub fn none() -> Self {
        FieldValue {
            mask: T::zero(),
            value: T::zero(),
            associated_register: PhantomData,
        }
    }

    /// Get the raw bitmask represented by this FieldValue.
    #[inline]
    pub fn mask(&self) -> T {
        self.mask
    }

    /// Replaces the named fields in a register value, keeping every other
    /// bit of `val`.
    #[inline]
    pub fn modify(self, val: T) -> T {
        (val & !self.mask) | self.value
    }

    /// Check if any of the bits covered by the mask for this
    /// `FieldValue` and set in the `FieldValue` are also set
    /// in the provided register value.
    #[inline]
    pub fn matches_any(&self, val: T) -> bool {
        val & self.mask & self.value != T::zero()
    }

    /// Check if all specified parts of a field match the provided value.
    #[inline]
    pub fn matches_all(&self, val: T) -> bool {
        val & self.mask == self.value
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>> Clone for FieldValue<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: UIntLike, R: BitLayout<Word = T>> Copy for FieldValue<T, R> {}

// Combine two fields with the addition operator
impl<T: UIntLike, R: BitLayout<Word = T>> Add for FieldValue<T, R> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        FieldValue {
            mask: self.mask | rhs.mask,
            value: self.value | rhs.value,
            associated_register: PhantomData,
        }
    }
}

// Combine two fields with the += operator
impl<T: UIntLike, R: BitLayout<Word = T>> AddAssign for FieldValue<T, R> {
    #[inline]
    fn add_assign(&mut self, rhs: FieldValue<T, R>) {
        self.mask |= rhs.mask;
        self.value |= rhs.value;
    }
}

// The constructors have to be split out per word type, because the bitwise
// math isn't treated as const when the type is generic.
macro_rules! Field_impl_for {
    ($type:ty) => {
        impl<R: BitLayout<Word = $type>> Field<$type, R> {
            pub const fn new(mask: $type, shift: usize) -> Field<$type, R> {
                Field {
                    mask,
                    shift,
                    associated_register: PhantomData,
                }
            }

            /// A field of `width` bits starting at bit `shift`.
            pub const fn with_width(shift: usize, width: usize) -> Field<$type, R> {
                Field::<$type, R>::new(<$type>::MAX >> (<$type>::BITS as usize - width), shift)
            }
        }

        impl<R: BitLayout<Word = $type>> FieldValue<$type, R> {
            pub const fn new(mask: $type, shift: usize, value: $type) -> Self {
                FieldValue {
                    mask: mask << shift,
                    value: (value & mask) << shift,
                    associated_register: PhantomData,
                }
            }
        }

        impl<R: BitLayout<Word = $type>> From<FieldValue<$type, R>> for $type {
            fn from(val: FieldValue<$type, R>) -> $type {
                val.value
            }
        }
    };
}

Field_impl_for!(u8);
Field_impl_for!(u16);
Field_impl_for!(u32);
Field_impl_for!(u64);
