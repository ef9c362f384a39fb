// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Implementation of registers and bitfields.
//!
//! Provides efficient mechanisms to express and use type-checked memory mapped
//! registers and bitfields.
//!
//! A register handle is an address together with the [`Bus`] used to reach
//! it. Handles are small `Copy` values: they do not own the register, and
//! copying one does not touch hardware. The access direction is part of the
//! type; a [`ReadOnly`] handle has no write methods at all.
//!
//! ```rust
//! use mmio_register::interfaces::{Readable, Writeable};
//! use mmio_register::mmio_emu::EmulatedBus;
//! use mmio_register::{register_bitfields, ReadOnly, WriteOnly};
//!
//! register_bitfields![u8,
//!     Status [
//!         READY OFFSET(0) NUMBITS(1) [],
//!         ERROR OFFSET(1) NUMBITS(1) [],
//!         RES OFFSET(2) NUMBITS(6) []
//!     ]
//! ];
//!
//! # fn main() {
//! let bus = EmulatedBus::new();
//! let data: WriteOnly<u8, mmio_register::Raw<u8>, &EmulatedBus> =
//!     unsafe { WriteOnly::with_bus(0x100, &bus) };
//! let status: ReadOnly<u8, Status::Register, &EmulatedBus> =
//!     unsafe { ReadOnly::with_bus(0x101, &bus) };
//!
//! data.write_raw(0x41);
//! bus.poke(0x101, 0b01u8);
//! assert!(status.is_set(Status::READY));
//! assert!(!status.is_set(Status::ERROR));
//! # }
//! ```

use core::fmt;
use core::marker::PhantomData;
use core::mem::size_of;

use crate::block::WithBus;
use crate::interfaces::{Readable, Writeable};
use crate::{BitLayout, Block, Bus, Mmio, Raw, UIntLike};

// Everything but the access traits is shared by the four handle types.
macro_rules! register_handle {
    ($(#[$attr:meta])* $name:ident [$($layout:ident),+]) => {
        $(#[$attr])*
        pub struct $name<T: UIntLike, $($layout: BitLayout<Word = T> = Raw<T>,)+ B = Mmio> {
            address: usize,
            bus: B,
            associated_register: PhantomData<($($layout,)+)>,
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B: Copy> $name<T, $($layout,)+ B> {
            /// Creates a handle to the register at `address`, reached through
            /// `bus`.
            ///
            /// # Panics
            /// If `address` is not aligned to the register word. In a
            /// `const` context this is a compile error.
            ///
            /// # Safety
            /// `address` must be a register of this width and layout on
            /// `bus` for as long as the handle, or any copy of it, is used.
            pub const unsafe fn with_bus(address: usize, bus: B) -> Self {
                assert!(
                    address % size_of::<T>() == 0,
                    "register address is not aligned to its width"
                );
                $name {
                    address,
                    bus,
                    associated_register: PhantomData,
                }
            }

            /// The register's address.
            pub const fn address(&self) -> usize {
                self.address
            }
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+> $name<T, $($layout,)+ Mmio> {
            /// Creates a handle to the memory mapped register at `address`.
            ///
            /// # Safety
            /// See [`with_bus`](Self::with_bus).
            pub const unsafe fn new(address: usize) -> Self {
                Self::with_bus(address, Mmio)
            }
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B: Copy> Clone
            for $name<T, $($layout,)+ B>
        {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B: Copy> Copy
            for $name<T, $($layout,)+ B>
        {
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B> fmt::Debug
            for $name<T, $($layout,)+ B>
        {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("address", &format_args!("{:#x}", self.address))
                    .finish()
            }
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B: Copy> Block
            for $name<T, $($layout,)+ B>
        {
            type Bus = B;
            const SIZE: usize = size_of::<T>();
            const ALIGN: usize = size_of::<T>();

            fn base(&self) -> usize {
                self.address
            }

            unsafe fn at(address: usize, bus: B) -> Self {
                Self::with_bus(address, bus)
            }

            unsafe fn byte_add(self, offset: usize) -> Self {
                Self::with_bus(self.address + offset, self.bus)
            }
        }

        impl<T: UIntLike, $($layout: BitLayout<Word = T>,)+ B0, B> WithBus<B>
            for $name<T, $($layout,)+ B0>
        {
            type Output = $name<T, $($layout,)+ B>;
        }
    };
}

register_handle! {
    /// Read/Write registers.
    ///
    /// For accessing and manipulating the register contents, the
    /// [`Readable`], [`Writeable`] and
    /// [`ReadWriteable`](crate::interfaces::ReadWriteable) traits are
    /// implemented.
    ReadWrite [R]
}

register_handle! {
    /// Read-only registers.
    ///
    /// For accessing the register contents the [`Readable`] trait is
    /// implemented.
    ReadOnly [R]
}

register_handle! {
    /// Write-only registers.
    ///
    /// For setting the register contents the [`Writeable`] trait is
    /// implemented.
    WriteOnly [R]
}

register_handle! {
    /// Read-only and write-only registers aliased to the same address.
    ///
    /// Unlike the [`ReadWrite`] register, this represents a register
    /// which has different meanings based on if it is written or read.
    /// This might be found on a device where control and status registers
    /// are accessed via the same memory address via writes and reads,
    /// respectively.
    ///
    /// This register implements [`Readable`] with layout `R` and
    /// [`Writeable`] with layout `W`. It only implements
    /// [`ReadWriteable`](crate::interfaces::ReadWriteable) if `R` and `W`
    /// are the same type, in which case a [`ReadWrite`] register might be a
    /// better choice.
    Aliased [R, W]
}

impl<T: UIntLike, R: BitLayout<Word = T>, B: Bus<T>> Readable for ReadWrite<T, R, B> {
    type T = T;
    type R = R;

    #[inline]
    fn read_raw(&self) -> T {
        unsafe { self.bus.load(self.address) }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>, B: Bus<T>> Writeable for ReadWrite<T, R, B> {
    type T = T;
    type R = R;

    #[inline]
    fn write_raw(&self, value: T) {
        unsafe { self.bus.store(self.address, value) }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>, B: Bus<T>> Readable for ReadOnly<T, R, B> {
    type T = T;
    type R = R;

    #[inline]
    fn read_raw(&self) -> T {
        unsafe { self.bus.load(self.address) }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>, B: Bus<T>> Writeable for WriteOnly<T, R, B> {
    type T = T;
    type R = R;

    #[inline]
    fn write_raw(&self, value: T) {
        unsafe { self.bus.store(self.address, value) }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>, W: BitLayout<Word = T>, B: Bus<T>> Readable
    for Aliased<T, R, W, B>
{
    type T = T;
    type R = R;

    #[inline]
    fn read_raw(&self) -> T {
        unsafe { self.bus.load(self.address) }
    }
}

impl<T: UIntLike, R: BitLayout<Word = T>, W: BitLayout<Word = T>, B: Bus<T>> Writeable
    for Aliased<T, R, W, B>
{
    type T = T;
    type R = W;

    #[inline]
    fn write_raw(&self, value: T) {
        unsafe { self.bus.store(self.address, value) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::ReadWriteable;
    use crate::mmio_emu::{AccessKind, BusAccess, EmulatedBus};
    use crate::{register_bitfields, LocalRegisterCopy};
    use std::format;

    register_bitfields![u32,
        CTRL [
            ENABLE OFFSET(0) NUMBITS(1) [],
            MODE OFFSET(1) NUMBITS(2) [
                Idle = 0,
                Receive = 1,
                Transmit = 2
            ],
            RESERVED OFFSET(3) NUMBITS(29) []
        ],
        STATUS [
            BUSY OFFSET(0) NUMBITS(1) [],
            RES OFFSET(1) NUMBITS(31) []
        ],
        COMMAND [
            START OFFSET(0) NUMBITS(1) [],
            STOP OFFSET(1) NUMBITS(1) [],
            RES OFFSET(2) NUMBITS(30) []
        ],
        PRESCALE [
            DIV OFFSET(0) NUMBITS(8) RESET(0x80) [],
            RES OFFSET(8) NUMBITS(24) []
        ]
    ];

    const ADDR: usize = 0x4000_1000;

    fn loads(bus: &EmulatedBus) -> usize {
        bus.accesses()
            .iter()
            .filter(|a| a.kind == AccessKind::Load)
            .count()
    }

    fn stores(bus: &EmulatedBus) -> usize {
        bus.accesses()
            .iter()
            .filter(|a| a.kind == AccessKind::Store)
            .count()
    }

    #[test]
    fn write_fields_then_modify() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, CTRL::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        reg.write_fields(CTRL::ENABLE::SET + CTRL::MODE::Transmit);
        assert_eq!(reg.read_raw(), 0b101);

        reg.modify(CTRL::MODE::Receive);
        assert_eq!(reg.read_raw(), 0b011);
        assert_eq!(
            reg.read_as_enum::<CTRL::MODE::Value>(CTRL::MODE),
            Some(CTRL::MODE::Value::Receive)
        );
    }

    #[test]
    fn write_stores_exact_bits() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, CTRL::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        for value in [0, u32::MAX, 0xA5A5_5A5A, 0x8000_0001] {
            reg.write(LocalRegisterCopy::new(value));
            assert_eq!(reg.read_raw(), value);
            assert_eq!(bus.peek::<u32>(ADDR), value);
        }
    }

    #[test]
    fn write_default_value_then_modify() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, CTRL::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        bus.poke(ADDR, u32::MAX);
        reg.write(
            reg.default_write_value()
                .modify(CTRL::ENABLE::SET + CTRL::MODE.val(2)),
        );
        assert_eq!(reg.read_raw(), 0b101);

        reg.modify(CTRL::MODE.val(1));
        assert_eq!(reg.read_raw(), 0b011);
    }

    #[test]
    fn aliased_write_stores_full_value() {
        let bus = EmulatedBus::new();
        let reg: Aliased<u32, STATUS::Register, COMMAND::Register, &EmulatedBus> =
            unsafe { Aliased::with_bus(ADDR, &bus) };

        reg.write(LocalRegisterCopy::<u32, COMMAND::Register>::new(0xDEAD_BEEF));
        assert_eq!(bus.peek::<u32>(ADDR), 0xDEAD_BEEF);
        assert_eq!(reg.read_raw(), 0xDEAD_BEEF);
        assert_eq!(stores(&bus), 1);
    }

    #[test]
    fn one_access_per_operation() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, CTRL::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        let _ = reg.read();
        assert_eq!((loads(&bus), stores(&bus)), (1, 0));
        bus.clear_accesses();

        reg.write(LocalRegisterCopy::new(0b1));
        assert_eq!((loads(&bus), stores(&bus)), (0, 1));
        bus.clear_accesses();

        reg.modify(CTRL::ENABLE::CLEAR);
        assert_eq!(
            bus.take_accesses(),
            [
                BusAccess {
                    kind: AccessKind::Load,
                    address: ADDR,
                    width: 4
                },
                BusAccess {
                    kind: AccessKind::Store,
                    address: ADDR,
                    width: 4
                },
            ]
        );

        let _ = reg.default_read_value();
        let _ = reg.default_write_value();
        assert!(bus.accesses().is_empty());
    }

    #[test]
    fn write_fields_uses_reset_for_other_fields() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, PRESCALE::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        bus.poke(ADDR + 1, 0xFFu8);
        reg.write_fields(PRESCALE::RES.val(1));
        assert_eq!(reg.read_raw(), 0x180);
        assert_eq!(reg.default_write_value().get(), 0x80);
    }

    #[test]
    fn modify_no_read_skips_load() {
        let bus = EmulatedBus::new();
        let reg: ReadWrite<u32, CTRL::Register, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(ADDR, &bus) };

        reg.modify_no_read(LocalRegisterCopy::new(0b100), CTRL::ENABLE::SET);
        assert_eq!((loads(&bus), stores(&bus)), (0, 1));
        assert_eq!(reg.read_raw(), 0b101);
    }

    #[test]
    fn aliased_uses_separate_layouts() {
        let bus = EmulatedBus::new();
        let reg: Aliased<u32, STATUS::Register, COMMAND::Register, &EmulatedBus> =
            unsafe { Aliased::with_bus(ADDR, &bus) };

        reg.write_fields(COMMAND::STOP::SET);
        assert_eq!(bus.peek::<u32>(ADDR), 0b10);
        assert!(!reg.is_set(STATUS::BUSY));

        bus.poke(ADDR, 0b1u32);
        assert!(reg.is_set(STATUS::BUSY));
        assert_eq!(format!("{:?}", reg.read()), "STATUS { BUSY: 1, RES: 0 }");
    }

    #[test]
    fn handles_are_copies_of_an_address() {
        let bus = EmulatedBus::new();
        let reg: ReadOnly<u16, Raw<u16>, &EmulatedBus> =
            unsafe { ReadOnly::with_bus(0x2002, &bus) };
        let copy = reg;
        assert_eq!(copy.address(), reg.address());
        assert!(bus.accesses().is_empty());
        assert_eq!(format!("{:?}", copy), "ReadOnly { address: 0x2002 }");
    }

    #[test]
    fn write_only_stores_full_word() {
        let bus = EmulatedBus::new();
        let reg: WriteOnly<u64, Raw<u64>, &EmulatedBus> =
            unsafe { WriteOnly::with_bus(0x3000, &bus) };
        reg.write_raw(0x0102_0304_0506_0708);
        assert_eq!(bus.peek::<u64>(0x3000), 0x0102_0304_0506_0708);
        assert_eq!(bus.peek::<u8>(0x3000), 0x08);
        assert_eq!(bus.accesses()[0].width, 8);
    }

    #[test]
    #[should_panic(expected = "not aligned")]
    fn misaligned_handle_is_rejected() {
        let bus = EmulatedBus::new();
        let _reg: ReadWrite<u32, Raw<u32>, &EmulatedBus> =
            unsafe { ReadWrite::with_bus(0x1002, &bus) };
    }

    #[test]
    fn byte_add_moves_handle() {
        let reg: ReadWrite<u32> = unsafe { ReadWrite::new(0x4000_0000) };
        let moved = unsafe { reg.byte_add(0x20) };
        assert_eq!(moved.base(), 0x4000_0020);
        assert_eq!(<ReadWrite<u32> as Block>::SIZE, 4);
        assert_eq!(<ReadOnly<u8> as Block>::ALIGN, 1);
    }
}
