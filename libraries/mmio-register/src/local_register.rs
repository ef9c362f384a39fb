// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

use core::fmt;
use core::marker::PhantomData;

use crate::fields::{Field, FieldValue, TryFromValue};
use crate::{BitLayout, UIntLike};

/// A register value held in ordinary memory, interpreted through layout `R`.
///
/// This is what [`read`](crate::interfaces::Readable::read) returns and what
/// [`write`](crate::interfaces::Writeable::write) takes. Instead of doing a
/// volatile access for each function call, a copy of the register contents is
/// stored locally in memory. This allows a peripheral to do a single read on a
/// register, and then check which bits are set without having to do a full
/// MMIO read each time. It also allows the value of the register to be
/// "cached" in case the peripheral driver needs to clear the register in
/// hardware yet still be able to check the bits.
///
/// The type has exactly the size of `T`.
#[repr(transparent)]
pub struct LocalRegisterCopy<T: UIntLike, R: BitLayout<Word = T> = crate::Raw<T>> {
    value: T,
    associated_register: PhantomData<R>,
}

impl<T: UIntLike, R: BitLayout<Word = T>> LocalRegisterCopy<T, R> {
    pub const fn new(value: T) -> Self {
        LocalRegisterCopy {
            value,
            associated_register: PhantomData,
        }
    }

    /// The layout's reset value, with every field at its default.
    pub const fn reset() -> Self {
        LocalRegisterCopy::new(R::RESET)
    }

    /// Get the raw register value.
    #[inline]
    pub fn get(&self) -> T {
        self.value
    }

    /// Set the raw register value.
    #[inline]
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Read the value of the given field.
    #[inline]
    pub fn read(&self, field: Field<T, R>) -> T {
        field.read(self.get())
    }

    /// Read value of the given field as an enum member.
    #[inline]
    pub fn read_as_enum<E: TryFromValue<T, EnumType = E>>(&self, field: Field<T, R>) -> Option<E> {
        field.read_as_enum(self.get())
    }

    /// Check if one or more bits in a field are set.
    #[inline]
    pub fn is_set(&self, field: Field<T, R>) -> bool {
        field.is_set(self.get())
    }

    /// Check if any bits corresponding to the mask in the passed
    /// `FieldValue` are set.
    #[inline]
    pub fn matches_any(&self, field: FieldValue<T, R>) -> bool {
        field.matches_any(self.get())
    }

    /// Check if all specified parts of a field match.
    #[inline]
    pub fn matches_all(&self, field: FieldValue<T, R>) -> bool {
        field.matches_all(self.get())
    }

    /// A copy of this value with the named fields replaced.
    #[inline]
    pub fn modify(self, field: FieldValue<T, R>) -> Self {
        LocalRegisterCopy::new(field.modify(self.value))
    }

    /// Do a bitwise AND operation of the stored value and the passed in value
    /// and return a new LocalRegisterCopy.
    #[inline]
    pub fn bitand(&self, rhs: T) -> LocalRegisterCopy<T, R> {
        LocalRegisterCopy::new(self.value & rhs)
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>> Clone for LocalRegisterCopy<T, R> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T: UIntLike, R: BitLayout<Word = T>> Copy for LocalRegisterCopy<T, R> {}

impl<T: UIntLike, R: BitLayout<Word = T>> PartialEq for LocalRegisterCopy<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}
impl<T: UIntLike, R: BitLayout<Word = T>> Eq for LocalRegisterCopy<T, R> {}

impl<T: UIntLike, R: BitLayout<Word = T>> Default for LocalRegisterCopy<T, R> {
    fn default() -> Self {
        LocalRegisterCopy::reset()
    }
}

/// Prints the register name and every field of the layout, e.g.
/// `CTRL { ENABLE: 1, MODE: 2, RESERVED: 0 }`. The value is decoded once from
/// the local copy, so formatting never touches hardware.
impl<T: UIntLike, R: BitLayout<Word = T>> fmt::Debug for LocalRegisterCopy<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug_struct = f.debug_struct(R::NAME);
        for info in R::FIELDS {
            let mask = !T::zero() >> (T::BITS - info.width);
            debug_struct.field(info.name, &((self.value >> info.shift) & mask));
        }
        debug_struct.finish()
    }
}

macro_rules! From_impl_for {
    ($type:ty) => {
        impl<R: BitLayout<Word = $type>> From<LocalRegisterCopy<$type, R>> for $type {
            fn from(r: LocalRegisterCopy<$type, R>) -> $type {
                r.value
            }
        }
    };
}

From_impl_for!(u8);
From_impl_for!(u16);
From_impl_for!(u32);
From_impl_for!(u64);
