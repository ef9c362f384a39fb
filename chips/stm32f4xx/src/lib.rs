// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! Register maps for the STM32F4xx MCU.
//!
//! STM32F446RE: <https://www.st.com/en/microcontrollers/stm32f4.html>
//!
//! Each peripheral module declares its register layouts with
//! `register_bitfields!`, its register block with `peripheral!`, and `const`
//! instances at the chip's base addresses. Peripherals are generic over the
//! bus, so the same definitions run against `EmulatedBus` in host tests.

#![no_std]

#[cfg(test)]
extern crate std;

pub mod dma;
pub mod gpio;
pub mod rcc;
pub mod tim;
