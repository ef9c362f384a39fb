// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! MMIO Register Interface
//!
//! Provides type-checked handles onto memory mapped registers. A handle binds
//! a bit-exact layout (declared with [`register_bitfields!`]) to a fixed
//! address on a [`Bus`], and offers single full-width loads and stores plus
//! read-modify-write for registers whose read and write layouts agree.
//!
//! ```rust
//! use mmio_register::interfaces::{ReadWriteable, Readable, Writeable};
//! use mmio_register::mmio_emu::EmulatedBus;
//! use mmio_register::{register_bitfields, ReadWrite};
//!
//! // Register fields and definitions look like this. Every bit of the word
//! // belongs to exactly one field; unused bits are declared as reserved.
//! register_bitfields![u32,
//!     Control [
//!         /// Peripheral enable
//!         ENABLE OFFSET(0) NUMBITS(1) [],
//!         /// Operating mode
//!         MODE OFFSET(1) NUMBITS(2) [
//!             Idle = 0,
//!             Receive = 1,
//!             Transmit = 2
//!         ],
//!         RESERVED OFFSET(3) NUMBITS(29) []
//!     ]
//! ];
//!
//! fn main() {
//!     // On hardware this would be `unsafe { ReadWrite::new(0x4000_0000) }`.
//!     let bus = EmulatedBus::new();
//!     let control: ReadWrite<u32, Control::Register, &EmulatedBus> =
//!         unsafe { ReadWrite::with_bus(0x4000_0000, &bus) };
//!
//!     control.write_fields(Control::ENABLE::SET + Control::MODE::Transmit);
//!     assert_eq!(control.read_raw(), 0b101);
//!
//!     control.modify(Control::MODE::Receive);
//!     assert_eq!(control.read_raw(), 0b011);
//!     assert!(control.is_set(Control::ENABLE));
//! }
//! ```
//!
//! Errors in a register description (overlapping bitfields, bits not covered
//! by any field, misaligned register offsets, `modify` on a register whose
//! read and write layouts differ) are rejected at compile time. Nothing is
//! checked when a register is accessed: an access to a real address always
//! happens, including its hardware side effects.

#![no_std]

#[cfg(any(test, feature = "emulation"))]
extern crate std;

mod array;
pub mod block;
mod bus;
mod fields;
pub mod interfaces;
pub mod layout;
mod local_register;
pub mod macros;
pub mod registers;

#[cfg(any(test, feature = "emulation"))]
pub mod mmio_emu;

pub use array::RegisterArray;
pub use block::Block;
pub use bus::{Bus, Mmio};
pub use fields::{Field, FieldValue, TryFromValue};
pub use layout::{BitLayout, FieldInfo, Raw};
pub use local_register::LocalRegisterCopy;
pub use registers::{Aliased, ReadOnly, ReadWrite, WriteOnly};

use core::fmt::Debug;
use core::ops::{BitAnd, BitOr, BitOrAssign, Not, Shl, Shr};

/// Trait representing the base type of registers.
///
/// UIntLike defines basic properties of types required to
/// read/write/modify a register through its methods and supertrait
/// requirements.
///
/// It is implemented for the unsigned integer types a register word can
/// have: [`u8`], [`u16`], [`u32`] and [`u64`].
pub trait UIntLike:
    BitAnd<Output = Self>
    + BitOr<Output = Self>
    + BitOrAssign
    + Not<Output = Self>
    + Eq
    + Shr<usize, Output = Self>
    + Shl<usize, Output = Self>
    + Copy
    + Clone
    + Debug
{
    /// Width of the word in bits.
    const BITS: usize;

    /// The value `0`, usable in constant expressions.
    const ZERO: Self;

    /// Return the representation of the value `0` in the implementing
    /// type.
    ///
    /// To get the largest representable value, use a bitwise negation:
    /// `!(<T as UIntLike>::zero())`.
    fn zero() -> Self {
        Self::ZERO
    }
}

// Helper macro for implementing the UIntLike trait on differrent
// types.
macro_rules! UIntLike_impl_for {
    ($type:ty) => {
        impl UIntLike for $type {
            const BITS: usize = <$type>::BITS as usize;
            const ZERO: Self = 0;
        }
    };
}

UIntLike_impl_for!(u8);
UIntLike_impl_for!(u16);
UIntLike_impl_for!(u32);
UIntLike_impl_for!(u64);

/// Error indicating an array index was out of bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OutOfBounds;
