// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! General purpose timer TIM2.

use mmio_register::interfaces::{ReadWriteable, Readable, Writeable};
use mmio_register::{peripheral, register_bitfields, Bus, OutOfBounds, Raw, ReadWrite, WriteOnly};

peripheral! {
    /// General purpose timers
    pub Tim2Registers {
        /// control register 1
        (0x00 => cr1: ReadWrite<u32, CR1::Register>),
        /// control register 2
        (0x04 => cr2: ReadWrite<u32, Raw<u32>>),
        /// slave mode control register
        (0x08 => smcr: ReadWrite<u32, Raw<u32>>),
        /// DMA/Interrupt enable register
        (0x0C => dier: ReadWrite<u32, DIER::Register>),
        /// status register
        (0x10 => sr: ReadWrite<u32, SR::Register>),
        /// event generation register
        (0x14 => egr: WriteOnly<u32, EGR::Register>),
        /// capture/compare mode register 1
        (0x18 => ccmr1: ReadWrite<u32, Raw<u32>>),
        /// capture/compare mode register 2
        (0x1C => ccmr2: ReadWrite<u32, Raw<u32>>),
        /// capture/compare enable register
        (0x20 => ccer: ReadWrite<u32, Raw<u32>>),
        /// counter
        (0x24 => cnt: ReadWrite<u32, Raw<u32>>),
        /// prescaler
        (0x28 => psc: ReadWrite<u32, PSC::Register>),
        /// auto-reload register
        (0x2C => arr: ReadWrite<u32, Raw<u32>>),
        /// capture/compare registers 1 to 4
        (0x34 => ccr: [ReadWrite<u32, Raw<u32>>; 4]),
        /// DMA control register
        (0x48 => dcr: ReadWrite<u32, Raw<u32>>),
        /// DMA address for full transfer
        (0x4C => dmar: ReadWrite<u32, Raw<u32>>),
        /// TIM2 option register
        (0x50 => or_: ReadWrite<u32, Raw<u32>>),
        (0x54 => @END),
    }
}

register_bitfields![u32,
    CR1 [
        /// Counter enable
        CEN OFFSET(0) NUMBITS(1) [],
        /// Update disable
        UDIS OFFSET(1) NUMBITS(1) [],
        /// Update request source
        URS OFFSET(2) NUMBITS(1) [],
        /// One-pulse mode
        OPM OFFSET(3) NUMBITS(1) [],
        /// Direction
        DIR OFFSET(4) NUMBITS(1) [
            Up = 0,
            Down = 1
        ],
        /// Center-aligned mode selection
        CMS OFFSET(5) NUMBITS(2) [],
        /// Auto-reload preload enable
        ARPE OFFSET(7) NUMBITS(1) [],
        /// Clock division
        CKD OFFSET(8) NUMBITS(2) [],
        RES OFFSET(10) NUMBITS(22) []
    ],
    DIER [
        /// Update interrupt enable
        UIE OFFSET(0) NUMBITS(1) [],
        /// Capture/Compare 1 interrupt enable
        CC1IE OFFSET(1) NUMBITS(1) [],
        /// Capture/Compare 2 interrupt enable
        CC2IE OFFSET(2) NUMBITS(1) [],
        /// Capture/Compare 3 interrupt enable
        CC3IE OFFSET(3) NUMBITS(1) [],
        /// Capture/Compare 4 interrupt enable
        CC4IE OFFSET(4) NUMBITS(1) [],
        RES0 OFFSET(5) NUMBITS(1) [],
        /// Trigger interrupt enable
        TIE OFFSET(6) NUMBITS(1) [],
        RES1 OFFSET(7) NUMBITS(1) [],
        /// Update DMA request enable
        UDE OFFSET(8) NUMBITS(1) [],
        /// Capture/Compare 1 DMA request enable
        CC1DE OFFSET(9) NUMBITS(1) [],
        /// Capture/Compare 2 DMA request enable
        CC2DE OFFSET(10) NUMBITS(1) [],
        /// Capture/Compare 3 DMA request enable
        CC3DE OFFSET(11) NUMBITS(1) [],
        /// Capture/Compare 4 DMA request enable
        CC4DE OFFSET(12) NUMBITS(1) [],
        RES2 OFFSET(13) NUMBITS(1) [],
        /// Trigger DMA request enable
        TDE OFFSET(14) NUMBITS(1) [],
        RES3 OFFSET(15) NUMBITS(17) []
    ],
    SR [
        /// Update interrupt flag
        UIF OFFSET(0) NUMBITS(1) [],
        /// Capture/compare 1 interrupt flag
        CC1IF OFFSET(1) NUMBITS(1) [],
        /// Capture/Compare 2 interrupt flag
        CC2IF OFFSET(2) NUMBITS(1) [],
        /// Capture/Compare 3 interrupt flag
        CC3IF OFFSET(3) NUMBITS(1) [],
        /// Capture/Compare 4 interrupt flag
        CC4IF OFFSET(4) NUMBITS(1) [],
        RES0 OFFSET(5) NUMBITS(1) [],
        /// Trigger interrupt flag
        TIF OFFSET(6) NUMBITS(1) [],
        RES1 OFFSET(7) NUMBITS(2) [],
        /// Capture/Compare 1 overcapture flag
        CC1OF OFFSET(9) NUMBITS(1) [],
        /// Capture/compare 2 overcapture flag
        CC2OF OFFSET(10) NUMBITS(1) [],
        /// Capture/Compare 3 overcapture flag
        CC3OF OFFSET(11) NUMBITS(1) [],
        /// Capture/Compare 4 overcapture flag
        CC4OF OFFSET(12) NUMBITS(1) [],
        RES2 OFFSET(13) NUMBITS(19) []
    ],
    EGR [
        /// Update generation
        UG OFFSET(0) NUMBITS(1) [],
        /// Capture/compare 1 generation
        CC1G OFFSET(1) NUMBITS(1) [],
        /// Capture/compare 2 generation
        CC2G OFFSET(2) NUMBITS(1) [],
        /// Capture/compare 3 generation
        CC3G OFFSET(3) NUMBITS(1) [],
        /// Capture/compare 4 generation
        CC4G OFFSET(4) NUMBITS(1) [],
        RES0 OFFSET(5) NUMBITS(1) [],
        /// Trigger generation
        TG OFFSET(6) NUMBITS(1) [],
        RES1 OFFSET(7) NUMBITS(25) []
    ],
    PSC [
        /// Prescaler value
        PSC OFFSET(0) NUMBITS(16) [],
        RES OFFSET(16) NUMBITS(16) []
    ]
];

pub const TIM2_BASE: usize = 0x4000_0000;

pub const TIM2: Tim2Registers = unsafe { Tim2Registers::new(TIM2_BASE) };

impl<B: Bus<u32>> Tim2Registers<B> {
    /// Counts up from zero to `reload` at the input clock divided by
    /// `prescaler + 1`.
    pub fn start(&self, prescaler: u16, reload: u32) {
        self.psc.write_fields(PSC::PSC.val(prescaler as u32));
        self.arr.write_raw(reload);
        // Load the prescaler and reload value now rather than at the next
        // overflow. This raises UIF.
        self.egr.write_fields(EGR::UG::SET);
        self.clear_update();
        self.cr1.modify(CR1::ARPE::SET + CR1::DIR::Up + CR1::CEN::SET);
    }

    pub fn stop(&self) {
        self.cr1.modify(CR1::CEN::CLEAR);
    }

    pub fn is_running(&self) -> bool {
        self.cr1.is_set(CR1::CEN)
    }

    pub fn counter(&self) -> u32 {
        self.cnt.read_raw()
    }

    /// Sets the compare value of `channel` (0 to 3).
    pub fn set_compare(&self, channel: usize, value: u32) -> Result<(), OutOfBounds> {
        self.ccr.try_get(channel)?.write_raw(value);
        Ok(())
    }

    pub fn update_pending(&self) -> bool {
        self.sr.is_set(SR::UIF)
    }

    /// Clears UIF only.
    ///
    /// Status flags are cleared by writing 0 and unaffected by writing 1, so
    /// this is a single store. A read-modify-write would also clear any flag
    /// raised between its load and its store. Reserved bits are written 0.
    pub fn clear_update(&self) {
        self.sr.write_fields(
            SR::CC1IF::SET
                + SR::CC2IF::SET
                + SR::CC3IF::SET
                + SR::CC4IF::SET
                + SR::TIF::SET
                + SR::CC1OF::SET
                + SR::CC2OF::SET
                + SR::CC3OF::SET
                + SR::CC4OF::SET,
        );
    }
}
