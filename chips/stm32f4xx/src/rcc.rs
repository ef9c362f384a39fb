// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

use mmio_register::interfaces::{ReadWriteable, Readable};
use mmio_register::{peripheral, register_bitfields, Bus, Field, Raw, ReadWrite};

use crate::gpio::Port;

peripheral! {
    /// Reset and clock control
    pub RccRegisters {
        /// clock control register
        (0x00 => cr: ReadWrite<u32, Raw<u32>>),
        /// PLL configuration register
        (0x04 => pllcfgr: ReadWrite<u32, Raw<u32>>),
        /// clock configuration register
        (0x08 => cfgr: ReadWrite<u32, Raw<u32>>),
        /// AHB1 peripheral reset register
        (0x10 => ahb1rstr: ReadWrite<u32, Raw<u32>>),
        /// AHB1 peripheral clock register
        (0x30 => ahb1enr: ReadWrite<u32, AHB1ENR::Register>),
        /// APB1 peripheral clock enable register
        (0x40 => apb1enr: ReadWrite<u32, APB1ENR::Register>),
        (0x94 => @END),
    }
}

register_bitfields![u32,
    AHB1ENR [
        /// IO port A clock enable
        GPIOAEN OFFSET(0) NUMBITS(1) [],
        /// IO port B clock enable
        GPIOBEN OFFSET(1) NUMBITS(1) [],
        /// IO port C clock enable
        GPIOCEN OFFSET(2) NUMBITS(1) [],
        /// IO port D clock enable
        GPIODEN OFFSET(3) NUMBITS(1) [],
        /// IO port E clock enable
        GPIOEEN OFFSET(4) NUMBITS(1) [],
        /// IO port F clock enable
        GPIOFEN OFFSET(5) NUMBITS(1) [],
        /// IO port G clock enable
        GPIOGEN OFFSET(6) NUMBITS(1) [],
        /// IO port H clock enable
        GPIOHEN OFFSET(7) NUMBITS(1) [],
        RES0 OFFSET(8) NUMBITS(4) [],
        /// CRC clock enable
        CRCEN OFFSET(12) NUMBITS(1) [],
        RES1 OFFSET(13) NUMBITS(5) [],
        /// Backup SRAM interface clock enable
        BKPSRAMEN OFFSET(18) NUMBITS(1) [],
        RES2 OFFSET(19) NUMBITS(2) RESET(0b10) [],
        /// DMA1 clock enable
        DMA1EN OFFSET(21) NUMBITS(1) [],
        /// DMA2 clock enable
        DMA2EN OFFSET(22) NUMBITS(1) [],
        RES3 OFFSET(23) NUMBITS(6) [],
        /// USB OTG HS clock enable
        OTGHSEN OFFSET(29) NUMBITS(1) [],
        /// USB OTG HSULPI clock enable
        OTGHSULPIEN OFFSET(30) NUMBITS(1) [],
        RES4 OFFSET(31) NUMBITS(1) []
    ],
    APB1ENR [
        /// TIM2 clock enable
        TIM2EN OFFSET(0) NUMBITS(1) [],
        /// TIM3 clock enable
        TIM3EN OFFSET(1) NUMBITS(1) [],
        /// TIM4 clock enable
        TIM4EN OFFSET(2) NUMBITS(1) [],
        /// TIM5 clock enable
        TIM5EN OFFSET(3) NUMBITS(1) [],
        /// TIM6 clock enable
        TIM6EN OFFSET(4) NUMBITS(1) [],
        /// TIM7 clock enable
        TIM7EN OFFSET(5) NUMBITS(1) [],
        RES0 OFFSET(6) NUMBITS(5) [],
        /// Window watchdog clock enable
        WWDGEN OFFSET(11) NUMBITS(1) [],
        RES1 OFFSET(12) NUMBITS(2) [],
        /// SPI2 clock enable
        SPI2EN OFFSET(14) NUMBITS(1) [],
        /// SPI3 clock enable
        SPI3EN OFFSET(15) NUMBITS(1) [],
        RES2 OFFSET(16) NUMBITS(1) [],
        /// USART 2 clock enable
        USART2EN OFFSET(17) NUMBITS(1) [],
        /// USART3 clock enable
        USART3EN OFFSET(18) NUMBITS(1) [],
        /// UART4 clock enable
        UART4EN OFFSET(19) NUMBITS(1) [],
        /// UART5 clock enable
        UART5EN OFFSET(20) NUMBITS(1) [],
        /// I2C1 clock enable
        I2C1EN OFFSET(21) NUMBITS(1) [],
        /// I2C2 clock enable
        I2C2EN OFFSET(22) NUMBITS(1) [],
        /// I2C3 clock enable
        I2C3EN OFFSET(23) NUMBITS(1) [],
        RES3 OFFSET(24) NUMBITS(4) [],
        /// Power interface clock enable
        PWREN OFFSET(28) NUMBITS(1) [],
        /// DAC interface clock enable
        DACEN OFFSET(29) NUMBITS(1) [],
        RES4 OFFSET(30) NUMBITS(2) []
    ]
];

pub const RCC_BASE: usize = 0x4002_3800;

pub const RCC: RccRegisters = unsafe { RccRegisters::new(RCC_BASE) };

/// Peripheral clocks gated by the RCC.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PeripheralClock {
    Gpio(Port),
    Dma1,
    Dma2,
    Tim2,
}

impl<B: Bus<u32>> RccRegisters<B> {
    pub fn enable_clock(&self, clock: PeripheralClock) {
        match clock {
            PeripheralClock::Gpio(port) => self.ahb1enr.modify(gpio_enable_field(port).val(1)),
            PeripheralClock::Dma1 => self.ahb1enr.modify(AHB1ENR::DMA1EN::SET),
            PeripheralClock::Dma2 => self.ahb1enr.modify(AHB1ENR::DMA2EN::SET),
            PeripheralClock::Tim2 => self.apb1enr.modify(APB1ENR::TIM2EN::SET),
        }
    }

    pub fn disable_clock(&self, clock: PeripheralClock) {
        match clock {
            PeripheralClock::Gpio(port) => self.ahb1enr.modify(gpio_enable_field(port).val(0)),
            PeripheralClock::Dma1 => self.ahb1enr.modify(AHB1ENR::DMA1EN::CLEAR),
            PeripheralClock::Dma2 => self.ahb1enr.modify(AHB1ENR::DMA2EN::CLEAR),
            PeripheralClock::Tim2 => self.apb1enr.modify(APB1ENR::TIM2EN::CLEAR),
        }
    }

    pub fn is_enabled_clock(&self, clock: PeripheralClock) -> bool {
        match clock {
            PeripheralClock::Gpio(port) => self.ahb1enr.is_set(gpio_enable_field(port)),
            PeripheralClock::Dma1 => self.ahb1enr.is_set(AHB1ENR::DMA1EN),
            PeripheralClock::Dma2 => self.ahb1enr.is_set(AHB1ENR::DMA2EN),
            PeripheralClock::Tim2 => self.apb1enr.is_set(APB1ENR::TIM2EN),
        }
    }
}

// GPIOxEN bits follow the port index.
fn gpio_enable_field(port: Port) -> Field<u32, AHB1ENR::Register> {
    Field::<u32, AHB1ENR::Register>::with_width(port as usize, 1)
}
