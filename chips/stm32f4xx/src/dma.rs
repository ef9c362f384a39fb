// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! DMA controllers.
//!
//! Each controller has eight identical streams laid out back to back, which
//! the controller block holds as a nested [`RegisterArray`]. Interrupt flags
//! for the streams are packed four to a register, in LISR/LIFCR for streams
//! 0 to 3 and HISR/HIFCR for streams 4 to 7.

use mmio_register::interfaces::{ReadWriteable, Readable, Writeable};
use mmio_register::{
    peripheral, register_bitfields, Bus, FieldValue, ReadOnly, ReadWrite, RegisterArray, WriteOnly,
};

peripheral! {
    /// DMA stream x
    pub DmaStreamRegisters {
        /// stream x configuration register
        (0x00 => cr: ReadWrite<u32, CR::Register>),
        /// stream x number of data register
        (0x04 => ndtr: ReadWrite<u32, NDTR::Register>),
        /// stream x peripheral address register
        (0x08 => par: ReadWrite<u32>),
        /// stream x memory 0 address register
        (0x0C => m0ar: ReadWrite<u32>),
        /// stream x memory 1 address register
        (0x10 => m1ar: ReadWrite<u32>),
        /// stream x FIFO control register
        (0x14 => fcr: ReadWrite<u32, FCR::Register>),
        (0x18 => @END),
    }
}

peripheral! {
    /// DMA controller
    pub DmaRegisters {
        /// low interrupt status register
        (0x00 => lisr: ReadOnly<u32, ISR::Register>),
        /// high interrupt status register
        (0x04 => hisr: ReadOnly<u32, ISR::Register>),
        /// low interrupt flag clear register
        (0x08 => lifcr: WriteOnly<u32, IFCR::Register>),
        /// high interrupt flag clear register
        (0x0C => hifcr: WriteOnly<u32, IFCR::Register>),
        (0x10 => streams: [DmaStreamRegisters; 8]),
        (0xD0 => @END),
    }
}

register_bitfields![u32,
    /// Flags of four streams. Slot `n` holds stream `n` in LISR and stream
    /// `n + 4` in HISR.
    ISR [
        FEIF0 OFFSET(0) NUMBITS(1) [],
        RES0 OFFSET(1) NUMBITS(1) [],
        DMEIF0 OFFSET(2) NUMBITS(1) [],
        TEIF0 OFFSET(3) NUMBITS(1) [],
        HTIF0 OFFSET(4) NUMBITS(1) [],
        TCIF0 OFFSET(5) NUMBITS(1) [],
        FEIF1 OFFSET(6) NUMBITS(1) [],
        RES1 OFFSET(7) NUMBITS(1) [],
        DMEIF1 OFFSET(8) NUMBITS(1) [],
        TEIF1 OFFSET(9) NUMBITS(1) [],
        HTIF1 OFFSET(10) NUMBITS(1) [],
        TCIF1 OFFSET(11) NUMBITS(1) [],
        RES2 OFFSET(12) NUMBITS(4) [],
        FEIF2 OFFSET(16) NUMBITS(1) [],
        RES3 OFFSET(17) NUMBITS(1) [],
        DMEIF2 OFFSET(18) NUMBITS(1) [],
        TEIF2 OFFSET(19) NUMBITS(1) [],
        HTIF2 OFFSET(20) NUMBITS(1) [],
        TCIF2 OFFSET(21) NUMBITS(1) [],
        FEIF3 OFFSET(22) NUMBITS(1) [],
        RES4 OFFSET(23) NUMBITS(1) [],
        DMEIF3 OFFSET(24) NUMBITS(1) [],
        TEIF3 OFFSET(25) NUMBITS(1) [],
        HTIF3 OFFSET(26) NUMBITS(1) [],
        TCIF3 OFFSET(27) NUMBITS(1) [],
        RES5 OFFSET(28) NUMBITS(4) []
    ],
    IFCR [
        CFEIF0 OFFSET(0) NUMBITS(1) [],
        RES0 OFFSET(1) NUMBITS(1) [],
        CDMEIF0 OFFSET(2) NUMBITS(1) [],
        CTEIF0 OFFSET(3) NUMBITS(1) [],
        CHTIF0 OFFSET(4) NUMBITS(1) [],
        CTCIF0 OFFSET(5) NUMBITS(1) [],
        CFEIF1 OFFSET(6) NUMBITS(1) [],
        RES1 OFFSET(7) NUMBITS(1) [],
        CDMEIF1 OFFSET(8) NUMBITS(1) [],
        CTEIF1 OFFSET(9) NUMBITS(1) [],
        CHTIF1 OFFSET(10) NUMBITS(1) [],
        CTCIF1 OFFSET(11) NUMBITS(1) [],
        RES2 OFFSET(12) NUMBITS(4) [],
        CFEIF2 OFFSET(16) NUMBITS(1) [],
        RES3 OFFSET(17) NUMBITS(1) [],
        CDMEIF2 OFFSET(18) NUMBITS(1) [],
        CTEIF2 OFFSET(19) NUMBITS(1) [],
        CHTIF2 OFFSET(20) NUMBITS(1) [],
        CTCIF2 OFFSET(21) NUMBITS(1) [],
        CFEIF3 OFFSET(22) NUMBITS(1) [],
        RES4 OFFSET(23) NUMBITS(1) [],
        CDMEIF3 OFFSET(24) NUMBITS(1) [],
        CTEIF3 OFFSET(25) NUMBITS(1) [],
        CHTIF3 OFFSET(26) NUMBITS(1) [],
        CTCIF3 OFFSET(27) NUMBITS(1) [],
        RES5 OFFSET(28) NUMBITS(4) []
    ],
    CR [
        /// Stream enable / flag stream ready when read low
        EN OFFSET(0) NUMBITS(1) [],
        /// Direct mode error interrupt enable
        DMEIE OFFSET(1) NUMBITS(1) [],
        /// Transfer error interrupt enable
        TEIE OFFSET(2) NUMBITS(1) [],
        /// Half transfer interrupt enable
        HTIE OFFSET(3) NUMBITS(1) [],
        /// Transfer complete interrupt enable
        TCIE OFFSET(4) NUMBITS(1) [],
        /// Peripheral flow controller
        PFCTRL OFFSET(5) NUMBITS(1) [],
        /// Data transfer direction
        DIR OFFSET(6) NUMBITS(2) [
            PeripheralToMemory = 0b00,
            MemoryToPeripheral = 0b01,
            MemoryToMemory = 0b10
        ],
        /// Circular mode
        CIRC OFFSET(8) NUMBITS(1) [],
        /// Peripheral increment mode
        PINC OFFSET(9) NUMBITS(1) [],
        /// Memory increment mode
        MINC OFFSET(10) NUMBITS(1) [],
        /// Peripheral data size
        PSIZE OFFSET(11) NUMBITS(2) [
            Byte = 0b00,
            HalfWord = 0b01,
            Word = 0b10
        ],
        /// Memory data size
        MSIZE OFFSET(13) NUMBITS(2) [
            Byte = 0b00,
            HalfWord = 0b01,
            Word = 0b10
        ],
        /// Peripheral increment offset size
        PINCOS OFFSET(15) NUMBITS(1) [],
        /// Priority level
        PL OFFSET(16) NUMBITS(2) [
            Low = 0b00,
            Medium = 0b01,
            High = 0b10,
            VeryHigh = 0b11
        ],
        /// Double buffer mode
        DBM OFFSET(18) NUMBITS(1) [],
        /// Current target (only in double buffer mode)
        CT OFFSET(19) NUMBITS(1) [],
        RES0 OFFSET(20) NUMBITS(1) [],
        /// Peripheral burst transfer configuration
        PBURST OFFSET(21) NUMBITS(2) [],
        /// Memory burst transfer configuration
        MBURST OFFSET(23) NUMBITS(2) [],
        /// Channel selection
        CHSEL OFFSET(25) NUMBITS(3) [],
        RES1 OFFSET(28) NUMBITS(4) []
    ],
    NDTR [
        /// Number of data items to transfer
        NDT OFFSET(0) NUMBITS(16) [],
        RES OFFSET(16) NUMBITS(16) []
    ],
    FCR [
        /// FIFO threshold selection
        FTH OFFSET(0) NUMBITS(2) RESET(0b01) [
            Quarter = 0b00,
            Half = 0b01,
            ThreeQuarters = 0b10,
            Full = 0b11
        ],
        /// Direct mode disable
        DMDIS OFFSET(2) NUMBITS(1) [],
        /// FIFO status
        FS OFFSET(3) NUMBITS(3) RESET(0b100) [],
        RES0 OFFSET(6) NUMBITS(1) [],
        /// FIFO error interrupt enable
        FEIE OFFSET(7) NUMBITS(1) [],
        RES1 OFFSET(8) NUMBITS(24) []
    ]
];

pub const DMA1_BASE: usize = 0x4002_6000;
pub const DMA2_BASE: usize = 0x4002_6400;

/// DMA1 and DMA2.
pub const DMA: RegisterArray<DmaRegisters, 2> =
    unsafe { RegisterArray::new(DmaRegisters::new(DMA1_BASE), DMA2_BASE - DMA1_BASE) };

pub const STREAMS: usize = 8;

pub type Direction = CR::DIR::Value;
pub type Size = CR::PSIZE::Value;
pub type Priority = CR::PL::Value;

// Bit position of each stream's flags within its interrupt register.
const FLAG_SHIFT: [usize; 4] = [0, 6, 16, 22];

// FEIF, DMEIF, TEIF, HTIF and TCIF, without the reserved bit.
const FLAG_MASK: u32 = 0b11_1101;

const TCIF: usize = 5;

impl<B: Bus<u32>> DmaRegisters<B> {
    pub fn stream(&self, stream: usize) -> Option<DmaStreamRegisters<B>> {
        self.streams.get(stream)
    }

    /// The interrupt flags of `stream`, in slot 0 position.
    pub fn flags(&self, stream: usize) -> u32 {
        let isr = match stream {
            0..=3 => self.lisr.read_raw(),
            4..=7 => self.hisr.read_raw(),
            _ => return 0,
        };
        (isr >> FLAG_SHIFT[stream % 4]) & FLAG_MASK
    }

    pub fn transfer_complete(&self, stream: usize) -> bool {
        self.flags(stream) & (1 << TCIF) != 0
    }

    /// Clears every interrupt flag of `stream` with one store to the flag
    /// clear register. Flags of the other streams are untouched.
    pub fn clear_flags(&self, stream: usize) {
        let clear = FieldValue::<u32, IFCR::Register>::new(
            FLAG_MASK,
            FLAG_SHIFT[stream % 4],
            FLAG_MASK,
        );
        match stream {
            0..=3 => self.lifcr.write_fields(clear),
            4..=7 => self.hifcr.write_fields(clear),
            _ => {}
        }
    }
}

impl<B: Bus<u32>> DmaStreamRegisters<B> {
    /// Programs and enables a single transfer of `count` items of `size`,
    /// with the memory address incremented after each item.
    pub fn start_transfer(
        &self,
        direction: Direction,
        size: Size,
        peripheral_address: u32,
        memory_address: u32,
        count: u16,
    ) {
        self.disable();
        self.par.write_raw(peripheral_address);
        self.m0ar.write_raw(memory_address);
        self.ndtr.write_fields(NDTR::NDT.val(count as u32));

        let psize = FieldValue::<u32, CR::Register>::from(size);
        let msize = CR::MSIZE.val(psize.value >> CR::PSIZE.shift);
        self.cr.write_fields(
            FieldValue::<u32, CR::Register>::from(direction)
                + psize
                + msize
                + CR::MINC::SET
                + CR::TCIE::SET
                + CR::TEIE::SET
                + CR::EN::SET,
        );
    }

    pub fn set_priority(&self, priority: Priority) {
        self.cr.modify(priority.into());
    }

    pub fn disable(&self) {
        self.cr.modify(CR::EN::CLEAR);
    }

    pub fn is_enabled(&self) -> bool {
        self.cr.is_set(CR::EN)
    }

    pub fn direction(&self) -> Option<Direction> {
        self.cr.read_as_enum(CR::DIR)
    }

    /// Items left to transfer.
    pub fn remaining(&self) -> u16 {
        self.ndtr.read_field(NDTR::NDT) as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mmio_register::mmio_emu::EmulatedBus;
    use mmio_register::{BitLayout, Block};

    #[test]
    fn register_addresses() {
        let dma2 = DMA.get(1).unwrap();
        assert_eq!(dma2.base(), DMA2_BASE);
        assert_eq!(dma2.stream(7).unwrap().cr.address(), 0x4002_64B8);
        assert_eq!(dma2.stream(0).unwrap().fcr.address(), 0x4002_6424);
        assert!(dma2.stream(STREAMS).is_none());
        assert_eq!(DMA.get(0).unwrap().hifcr.address(), 0x4002_600C);

        assert_eq!(<DmaStreamRegisters as Block>::SIZE, 0x18);
        assert_eq!(<DmaRegisters as Block>::SIZE, 0xD0);
        assert_eq!(DMA.get(0).unwrap().streams.stride(), 0x18);
    }

    #[test]
    fn reset_values() {
        assert_eq!(<FCR::Register as BitLayout>::RESET, 0x21);
        assert_eq!(<CR::Register as BitLayout>::RESET, 0);
        assert_eq!(DMA.get(0).unwrap().stream(3).unwrap().fcr.default_read_value().get(), 0x21);
    }

    #[test]
    fn flags_per_stream() {
        let bus = EmulatedBus::new();
        let dma = unsafe { DmaRegisters::with_bus(DMA2_BASE, &bus) };

        // TCIF2 and HTIF5.
        bus.poke(DMA2_BASE, 1u32 << 21);
        bus.poke(DMA2_BASE + 0x04, 1u32 << 10);
        assert!(dma.transfer_complete(2));
        assert!(!dma.transfer_complete(6));
        assert_eq!(dma.flags(5), 1 << 4);
        assert_eq!(dma.flags(STREAMS), 0);

        dma.clear_flags(1);
        assert_eq!(bus.peek::<u32>(DMA2_BASE + 0x08), 0b11_1101 << 6);
        dma.clear_flags(7);
        assert_eq!(bus.peek::<u32>(DMA2_BASE + 0x0C), 0b11_1101 << 22);
    }

    #[test]
    fn stream_transfer() {
        let bus = EmulatedBus::new();
        let dma = unsafe { DmaRegisters::with_bus(DMA1_BASE, &bus) };
        let stream = dma.stream(4).unwrap();
        let base = DMA1_BASE + 0x10 + 4 * 0x18;

        stream.start_transfer(
            Direction::MemoryToPeripheral,
            Size::HalfWord,
            0x4000_4404,
            0x2000_0100,
            64,
        );
        assert!(stream.is_enabled());
        assert_eq!(stream.direction(), Some(Direction::MemoryToPeripheral));
        assert_eq!(stream.remaining(), 64);
        assert_eq!(bus.peek::<u32>(base + 0x08), 0x4000_4404);
        assert_eq!(bus.peek::<u32>(base + 0x0C), 0x2000_0100);
        // DIR=01, PSIZE=01, MSIZE=01, MINC, TCIE, TEIE, EN
        assert_eq!(
            bus.peek::<u32>(base),
            (1 << 6) | (1 << 11) | (1 << 13) | (1 << 10) | (1 << 4) | (1 << 2) | 1
        );

        stream.set_priority(Priority::High);
        stream.disable();
        assert!(!stream.is_enabled());
        assert_eq!((bus.peek::<u32>(base) >> 16) & 0b11, 0b10);

        // Neighbouring streams are untouched.
        assert_eq!(bus.peek::<u32>(base - 0x18), 0);
        assert_eq!(bus.peek::<u32>(base + 0x18), 0);
    }
}
