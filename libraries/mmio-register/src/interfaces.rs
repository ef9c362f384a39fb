// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Interfaces (traits) to register types
//!
//! This module contains traits which reflect standardized interfaces
//! to different types of registers. Examples of registers
//! implementing these interfaces are [`ReadWrite`](crate::ReadWrite)
//! or [`ReadOnly`](crate::ReadOnly).
//!
//! Each trait has two associated type parameters, namely:
//!
//! - `T`: [`UIntLike`], indicating the underlying integer type used
//!   to represent the register's raw contents.
//!
//! - `R`: [`BitLayout`], the layout of the register as seen through this
//!   direction of access.
//!
//! # Available interfaces
//!
//! - [`Readable`]: register whose value can be read.
//!
//! - [`Writeable`]: register whose value can be written.
//!
//! - [`ReadWriteable`]: register combining [`Readable`] and
//!   [`Writeable`] with the same layout in both directions, so that fields
//!   can be updated with a read-modify-write cycle.
//!
//! A handle only implements the directions it permits. Writing a read-only
//! register is a compile error:
//!
//! ```compile_fail
//! use mmio_register::interfaces::Writeable;
//! use mmio_register::ReadOnly;
//!
//! let status: ReadOnly<u32> = unsafe { ReadOnly::new(0x4000_0004) };
//! status.write_raw(1);
//! ```
//!
//! and so is `modify` on an aliased register whose read and write layouts
//! differ:
//!
//! ```compile_fail
//! use mmio_register::interfaces::ReadWriteable;
//! use mmio_register::{register_bitfields, Aliased};
//!
//! register_bitfields![u32,
//!     Status [ READY OFFSET(0) NUMBITS(1) [], RES OFFSET(1) NUMBITS(31) [] ],
//!     Command [ START OFFSET(0) NUMBITS(1) [], RES OFFSET(1) NUMBITS(31) [] ]
//! ];
//!
//! let reg: Aliased<u32, Status::Register, Command::Register> =
//!     unsafe { Aliased::new(0x4000_0008) };
//! reg.modify(Command::START::SET);
//! ```

use crate::fields::{Field, FieldValue, TryFromValue};
use crate::{BitLayout, LocalRegisterCopy, UIntLike};

/// Readable register
///
/// Register which at least supports reading the current value. Only
/// [`Readable::read_raw`] must be implemented, as for other methods a
/// default implementation is provided.
///
/// Every provided method performs exactly one load.
pub trait Readable {
    type T: UIntLike;
    type R: BitLayout<Word = Self::T>;

    /// Get the raw register value
    fn read_raw(&self) -> Self::T;

    /// Read the register once and return the value as a local copy.
    #[inline]
    fn read(&self) -> LocalRegisterCopy<Self::T, Self::R> {
        LocalRegisterCopy::new(self.read_raw())
    }

    /// Read the value of the given field
    #[inline]
    fn read_field(&self, field: Field<Self::T, Self::R>) -> Self::T {
        field.read(self.read_raw())
    }

    /// Read value of the given field as an enum member
    #[inline]
    fn read_as_enum<E: TryFromValue<Self::T, EnumType = E>>(
        &self,
        field: Field<Self::T, Self::R>,
    ) -> Option<E> {
        field.read_as_enum(self.read_raw())
    }

    /// Check if one or more bits in a field are set
    #[inline]
    fn is_set(&self, field: Field<Self::T, Self::R>) -> bool {
        field.is_set(self.read_raw())
    }

    /// Check if any bits corresponding to the mask in the passed
    /// `FieldValue` are set.
    #[inline]
    fn matches_any(&self, field: FieldValue<Self::T, Self::R>) -> bool {
        field.matches_any(self.read_raw())
    }

    /// Check if all specified parts of a field match
    #[inline]
    fn matches_all(&self, field: FieldValue<Self::T, Self::R>) -> bool {
        field.matches_all(self.read_raw())
    }

    /// The reset value of the read layout. Does not access the register.
    #[inline]
    fn default_read_value(&self) -> LocalRegisterCopy<Self::T, Self::R> {
        LocalRegisterCopy::reset()
    }
}

/// Writeable register
///
/// Register which at least supports setting a value. Only
/// [`Writeable::write_raw`] must be implemented, as for other methods
/// a default implementation is provided.
///
/// Every provided method performs exactly one store.
pub trait Writeable {
    type T: UIntLike;
    type R: BitLayout<Word = Self::T>;

    /// Set the raw register value
    fn write_raw(&self, value: Self::T);

    /// Write a complete register value.
    #[inline]
    fn write(&self, value: LocalRegisterCopy<Self::T, Self::R>) {
        self.write_raw(value.get())
    }

    /// Write the named fields, with every other field at its reset value.
    ///
    /// This does not read the register first; fields missing from `field`
    /// are written with the layout's defaults, not preserved.
    #[inline]
    fn write_fields(&self, field: FieldValue<Self::T, Self::R>) {
        self.write_raw(field.modify(Self::R::RESET))
    }

    /// The reset value of the write layout. Does not access the register.
    #[inline]
    fn default_write_value(&self) -> LocalRegisterCopy<Self::T, Self::R> {
        LocalRegisterCopy::reset()
    }
}

/// [`Readable`] and [`Writeable`] register, over the same layout
///
/// Register which supports both reading and setting a value, where both
/// directions interpret the word the same way.
///
/// **This trait does not have to be implemented manually!** It is
/// automatically implemented for every type that is both [`Readable`]
/// and [`Writeable`], as long as [`Readable::R`] == [`Writeable::R`]
/// (i.e. not for [`Aliased`](crate::Aliased) registers with differing
/// layouts).
pub trait ReadWriteable {
    type T: UIntLike;
    type R: BitLayout<Word = Self::T>;

    /// Update the named fields and keep every other bit as read.
    ///
    /// This is one load followed by one store, and the pair is not atomic.
    /// If another agent (an interrupt handler, another core, or the hardware
    /// itself) changes the register between the load and the store, its
    /// change is overwritten with the value that was read. Callers that share
    /// a register must serialize access themselves.
    fn modify(&self, field: FieldValue<Self::T, Self::R>);

    /// Write `original` with the named fields replaced, without reading the
    /// register.
    fn modify_no_read(
        &self,
        original: LocalRegisterCopy<Self::T, Self::R>,
        field: FieldValue<Self::T, Self::R>,
    );
}

impl<T: UIntLike, R: BitLayout<Word = T>, S> ReadWriteable for S
where
    S: Readable<T = T, R = R> + Writeable<T = T, R = R>,
{
    type T = T;
    type R = R;

    #[inline]
    fn modify(&self, field: FieldValue<Self::T, Self::R>) {
        self.write_raw(field.modify(self.read_raw()));
    }

    #[inline]
    fn modify_no_read(
        &self,
        original: LocalRegisterCopy<Self::T, Self::R>,
        field: FieldValue<Self::T, Self::R>,
    ) {
        self.write_raw(field.modify(original.get()));
    }
}
