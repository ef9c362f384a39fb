// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! General-purpose I/O ports.
//!
//! The eight ports share one register layout and sit 1 KiB apart starting at
//! [`GPIO_BASE`], so they are exposed as a single [`RegisterArray`].

use mmio_register::interfaces::{ReadWriteable, Readable, Writeable};
use mmio_register::{
    peripheral, register_bitfields, Bus, Field, FieldValue, OutOfBounds, Raw, ReadOnly, ReadWrite,
    RegisterArray, WriteOnly,
};

peripheral! {
    /// GPIO port
    pub GpioRegisters {
        /// GPIO port mode register
        (0x00 => moder: ReadWrite<u32, MODER::Register>),
        /// GPIO port output type register
        (0x04 => otyper: ReadWrite<u32, OTYPER::Register>),
        /// GPIO port output speed register
        (0x08 => ospeedr: ReadWrite<u32, Raw<u32>>),
        /// GPIO port pull-up/pull-down register
        (0x0C => pupdr: ReadWrite<u32, Raw<u32>>),
        /// GPIO port input data register
        (0x10 => idr: ReadOnly<u32, IDR::Register>),
        /// GPIO port output data register
        (0x14 => odr: ReadWrite<u32, ODR::Register>),
        /// GPIO port bit set/reset register
        (0x18 => bsrr: WriteOnly<u32, BSRR::Register>),
        /// GPIO port configuration lock register
        (0x1C => lckr: ReadWrite<u32, Raw<u32>>),
        /// GPIO alternate function low and high registers
        (0x20 => afr: [ReadWrite<u32, AFR::Register>; 2]),
        (0x28 => @END),
    }
}

register_bitfields![u32,
    MODER [
        MODER0 OFFSET(0) NUMBITS(2) [
            Input = 0b00,
            Output = 0b01,
            AlternateFunction = 0b10,
            Analog = 0b11
        ],
        MODER1 OFFSET(2) NUMBITS(2) [],
        MODER2 OFFSET(4) NUMBITS(2) [],
        MODER3 OFFSET(6) NUMBITS(2) [],
        MODER4 OFFSET(8) NUMBITS(2) [],
        MODER5 OFFSET(10) NUMBITS(2) [],
        MODER6 OFFSET(12) NUMBITS(2) [],
        MODER7 OFFSET(14) NUMBITS(2) [],
        MODER8 OFFSET(16) NUMBITS(2) [],
        MODER9 OFFSET(18) NUMBITS(2) [],
        MODER10 OFFSET(20) NUMBITS(2) [],
        MODER11 OFFSET(22) NUMBITS(2) [],
        MODER12 OFFSET(24) NUMBITS(2) [],
        MODER13 OFFSET(26) NUMBITS(2) [],
        MODER14 OFFSET(28) NUMBITS(2) [],
        MODER15 OFFSET(30) NUMBITS(2) []
    ],
    OTYPER [
        OT0 OFFSET(0) NUMBITS(1) [],
        OT1 OFFSET(1) NUMBITS(1) [],
        OT2 OFFSET(2) NUMBITS(1) [],
        OT3 OFFSET(3) NUMBITS(1) [],
        OT4 OFFSET(4) NUMBITS(1) [],
        OT5 OFFSET(5) NUMBITS(1) [],
        OT6 OFFSET(6) NUMBITS(1) [],
        OT7 OFFSET(7) NUMBITS(1) [],
        OT8 OFFSET(8) NUMBITS(1) [],
        OT9 OFFSET(9) NUMBITS(1) [],
        OT10 OFFSET(10) NUMBITS(1) [],
        OT11 OFFSET(11) NUMBITS(1) [],
        OT12 OFFSET(12) NUMBITS(1) [],
        OT13 OFFSET(13) NUMBITS(1) [],
        OT14 OFFSET(14) NUMBITS(1) [],
        OT15 OFFSET(15) NUMBITS(1) [],
        RES OFFSET(16) NUMBITS(16) []
    ],
    IDR [
        IDR0 OFFSET(0) NUMBITS(1) [],
        IDR1 OFFSET(1) NUMBITS(1) [],
        IDR2 OFFSET(2) NUMBITS(1) [],
        IDR3 OFFSET(3) NUMBITS(1) [],
        IDR4 OFFSET(4) NUMBITS(1) [],
        IDR5 OFFSET(5) NUMBITS(1) [],
        IDR6 OFFSET(6) NUMBITS(1) [],
        IDR7 OFFSET(7) NUMBITS(1) [],
        IDR8 OFFSET(8) NUMBITS(1) [],
        IDR9 OFFSET(9) NUMBITS(1) [],
        IDR10 OFFSET(10) NUMBITS(1) [],
        IDR11 OFFSET(11) NUMBITS(1) [],
        IDR12 OFFSET(12) NUMBITS(1) [],
        IDR13 OFFSET(13) NUMBITS(1) [],
        IDR14 OFFSET(14) NUMBITS(1) [],
        IDR15 OFFSET(15) NUMBITS(1) [],
        RES OFFSET(16) NUMBITS(16) []
    ],
    ODR [
        ODR0 OFFSET(0) NUMBITS(1) [],
        ODR1 OFFSET(1) NUMBITS(1) [],
        ODR2 OFFSET(2) NUMBITS(1) [],
        ODR3 OFFSET(3) NUMBITS(1) [],
        ODR4 OFFSET(4) NUMBITS(1) [],
        ODR5 OFFSET(5) NUMBITS(1) [],
        ODR6 OFFSET(6) NUMBITS(1) [],
        ODR7 OFFSET(7) NUMBITS(1) [],
        ODR8 OFFSET(8) NUMBITS(1) [],
        ODR9 OFFSET(9) NUMBITS(1) [],
        ODR10 OFFSET(10) NUMBITS(1) [],
        ODR11 OFFSET(11) NUMBITS(1) [],
        ODR12 OFFSET(12) NUMBITS(1) [],
        ODR13 OFFSET(13) NUMBITS(1) [],
        ODR14 OFFSET(14) NUMBITS(1) [],
        ODR15 OFFSET(15) NUMBITS(1) [],
        RES OFFSET(16) NUMBITS(16) []
    ],
    BSRR [
        /// Port x set bit y (y= 0..15)
        BS OFFSET(0) NUMBITS(16) [],
        /// Port x reset bit y (y = 0..15)
        BR OFFSET(16) NUMBITS(16) []
    ],
    AFR [
        AFR0 OFFSET(0) NUMBITS(4) [],
        AFR1 OFFSET(4) NUMBITS(4) [],
        AFR2 OFFSET(8) NUMBITS(4) [],
        AFR3 OFFSET(12) NUMBITS(4) [],
        AFR4 OFFSET(16) NUMBITS(4) [],
        AFR5 OFFSET(20) NUMBITS(4) [],
        AFR6 OFFSET(24) NUMBITS(4) [],
        AFR7 OFFSET(28) NUMBITS(4) []
    ]
];

pub const GPIO_BASE: usize = 0x4002_0000;
pub const GPIO_STRIDE: usize = 0x400;

pub const GPIO: RegisterArray<GpioRegisters, 8> =
    unsafe { RegisterArray::new(GpioRegisters::new(GPIO_BASE), GPIO_STRIDE) };

/// Pin mode, as encoded in MODER.
pub type Mode = MODER::MODER0::Value;

/// Number of pins per port.
pub const PINS: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl Port {
    pub fn registers(self) -> GpioRegisters {
        // There is one array element per port.
        unsafe { GPIO.get_unchecked(self as usize) }
    }
}

/// A pin within a port.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pin {
    P0 = 0,
    P1 = 1,
    P2 = 2,
    P3 = 3,
    P4 = 4,
    P5 = 5,
    P6 = 6,
    P7 = 7,
    P8 = 8,
    P9 = 9,
    P10 = 10,
    P11 = 11,
    P12 = 12,
    P13 = 13,
    P14 = 14,
    P15 = 15,
}

impl Pin {
    const ALL: [Pin; PINS] = [
        Pin::P0,
        Pin::P1,
        Pin::P2,
        Pin::P3,
        Pin::P4,
        Pin::P5,
        Pin::P6,
        Pin::P7,
        Pin::P8,
        Pin::P9,
        Pin::P10,
        Pin::P11,
        Pin::P12,
        Pin::P13,
        Pin::P14,
        Pin::P15,
    ];

    pub const fn number(self) -> usize {
        self as usize
    }

    fn mask(self) -> u32 {
        1 << self.number()
    }
}

impl TryFrom<usize> for Pin {
    type Error = OutOfBounds;

    fn try_from(number: usize) -> Result<Pin, OutOfBounds> {
        Pin::ALL.get(number).copied().ok_or(OutOfBounds)
    }
}

impl<B: Bus<u32>> GpioRegisters<B> {
    pub fn set_mode(&self, pin: Pin, mode: Mode) {
        // MODER0 sits at bit 0, so its field value is the raw mode.
        let bits = FieldValue::<u32, MODER::Register>::from(mode).value;
        self.moder.modify(mode_field(pin).val(bits));
    }

    pub fn mode(&self, pin: Pin) -> Option<Mode> {
        self.moder.read_as_enum(mode_field(pin))
    }

    pub fn set_alternate_function(&self, pin: Pin, function: u32) {
        let field = Field::<u32, AFR::Register>::with_width((pin.number() % 8) * 4, 4);
        // Pins 0-7 are in AFRL and 8-15 in AFRH.
        if let Some(afr) = self.afr.get(pin.number() / 8) {
            afr.modify(field.val(function));
        }
        self.set_mode(pin, Mode::AlternateFunction);
    }

    /// Drives `pin` high with a single store to BSRR.
    pub fn set(&self, pin: Pin) {
        self.bsrr.write_fields(BSRR::BS.val(pin.mask()));
    }

    /// Drives `pin` low with a single store to BSRR.
    pub fn clear(&self, pin: Pin) {
        self.bsrr.write_fields(BSRR::BR.val(pin.mask()));
    }

    pub fn is_high(&self, pin: Pin) -> bool {
        self.idr.read_raw() & pin.mask() != 0
    }
}

fn mode_field(pin: Pin) -> Field<u32, MODER::Register> {
    Field::<u32, MODER::Register>::with_width(pin.number() * 2, 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmio_register::mmio_emu::{AccessKind, EmulatedBus, MmioDevice};
    use mmio_register::Block;
    use std::sync::{Arc, Mutex};
    use std::vec::Vec;

    /// Output latch with set/reset semantics; IDR reads back the latch.
    struct GpioPort {
        odr: u32,
    }

    impl MmioDevice for GpioPort {
        fn mmio_read(&mut self, offset: usize, data: &mut [u8]) {
            let value = match offset {
                0x10 | 0x14 => self.odr,
                _ => 0,
            };
            data.copy_from_slice(&value.to_le_bytes());
        }

        fn mmio_write(&mut self, offset: usize, data: &[u8]) {
            let value = u32::from_le_bytes(data.try_into().unwrap());
            match offset {
                0x14 => self.odr = value & 0xFFFF,
                0x18 => {
                    self.odr |= value & 0xFFFF;
                    self.odr &= !(value >> 16);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn port_addresses() {
        let addresses: Vec<usize> = GPIO.addresses().collect();
        assert_eq!(addresses[0], 0x4002_0000);
        assert_eq!(addresses[7], 0x4002_1C00);
        assert_eq!(Port::C.registers().bsrr.address(), 0x4002_0818);
        assert_eq!(Port::H.registers().afr.get(1).map(|r| r.address()), Some(0x4002_1C24));
        assert_eq!(<GpioRegisters as Block>::SIZE, 0x28);
    }

    #[test]
    fn bsrr_drives_pins() {
        let bus = EmulatedBus::new();
        let device = Arc::new(Mutex::new(GpioPort { odr: 0 }));
        bus.add_device(GPIO_BASE, GPIO_STRIDE, device).unwrap();
        let port = unsafe { GpioRegisters::with_bus(GPIO_BASE, &bus) };

        port.set(Pin::P5);
        port.set(Pin::P9);
        assert!(port.is_high(Pin::P5));
        assert!(port.is_high(Pin::P9));
        port.clear(Pin::P5);
        assert!(!port.is_high(Pin::P5));
        assert_eq!(port.odr.read_raw(), 1 << 9);

        // Set and clear never read the port.
        let stores: Vec<_> = bus
            .accesses()
            .into_iter()
            .filter(|a| a.address == GPIO_BASE + 0x18)
            .collect();
        assert_eq!(stores.len(), 3);
        assert!(stores.iter().all(|a| a.kind == AccessKind::Store));
    }

    #[test]
    fn mode_and_alternate_function() {
        let bus = EmulatedBus::new();
        let ports: RegisterArray<GpioRegisters<&EmulatedBus>, 8> =
            unsafe { RegisterArray::init_range(GPIO_BASE, GPIO_STRIDE, &bus) };
        let port_b = ports.get(Port::B as usize).unwrap();

        port_b.set_mode(Pin::P3, Mode::Output);
        assert_eq!(port_b.mode(Pin::P3), Some(Mode::Output));
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x400), 0b01 << 6);

        port_b.set_alternate_function(Pin::P10, 7);
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x424), 7 << 8);
        assert_eq!(port_b.mode(Pin::P10), Some(Mode::AlternateFunction));
        assert_eq!(port_b.mode(Pin::P3), Some(Mode::Output));

        // Port A is untouched.
        assert_eq!(bus.peek::<u32>(GPIO_BASE), 0);
    }

    #[test]
    fn pin_numbers_stop_at_fifteen() {
        assert_eq!(Pin::try_from(0), Ok(Pin::P0));
        assert_eq!(Pin::try_from(15), Ok(Pin::P15));
        assert_eq!(Pin::try_from(16), Err(OutOfBounds));
        assert_eq!(Pin::try_from(32), Err(OutOfBounds));
    }

    #[test]
    fn highest_pin_uses_top_bits() {
        let bus = EmulatedBus::new();
        let port = unsafe { GpioRegisters::with_bus(GPIO_BASE, &bus) };

        port.set(Pin::P15);
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x18), 1 << 15);
        port.clear(Pin::P15);
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x18), 1 << 31);

        port.set_mode(Pin::P15, Mode::Analog);
        assert_eq!(bus.peek::<u32>(GPIO_BASE), 0b11 << 30);
        port.set_alternate_function(Pin::P15, 0xF);
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x24), 0xF << 28);
        assert_eq!(bus.peek::<u32>(GPIO_BASE + 0x20), 0);
    }
}
