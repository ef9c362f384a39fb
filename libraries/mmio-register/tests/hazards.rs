// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! `modify` is a load followed by a store. These tests pin down what happens
//! when something else writes the register in between.

use std::sync::{Arc, Mutex};

use mmio_register::interfaces::{ReadWriteable, Readable, Writeable};
use mmio_register::mmio_emu::{AccessKind, EmulatedBus, MmioDevice};
use mmio_register::{register_bitfields, LocalRegisterCopy, ReadWrite, WriteOnly};

register_bitfields![u32,
    Ctrl [
        ENABLE OFFSET(0) NUMBITS(1) [],
        RES0 OFFSET(1) NUMBITS(2) [],
        IRQ OFFSET(3) NUMBITS(1) [],
        RES1 OFFSET(4) NUMBITS(28) []
    ],
    SetClear [
        BS OFFSET(0) NUMBITS(16) [],
        BR OFFSET(16) NUMBITS(16) []
    ]
];

const BASE: usize = 0x1000;

/// A control word at offset 0 and a set/clear alias for it at offset 4.
///
/// When `interfere` is set, the next read of the control word is followed by
/// another agent setting IRQ, as an interrupt handler would between the two
/// halves of a read-modify-write.
#[derive(Default)]
struct SharedControl {
    value: u32,
    interfere: bool,
}

impl MmioDevice for SharedControl {
    fn mmio_read(&mut self, offset: usize, data: &mut [u8]) {
        let value = if offset == 0 { self.value } else { 0 };
        data.copy_from_slice(&value.to_le_bytes());
        if offset == 0 && self.interfere {
            self.interfere = false;
            self.value |= 1 << 3;
        }
    }

    fn mmio_write(&mut self, offset: usize, data: &[u8]) {
        let value = u32::from_le_bytes(data.try_into().unwrap());
        match offset {
            0 => self.value = value,
            4 => {
                self.value |= value & 0xFFFF;
                self.value &= !(value >> 16);
            }
            _ => {}
        }
    }
}

fn setup() -> (EmulatedBus, Arc<Mutex<SharedControl>>) {
    let bus = EmulatedBus::new();
    let device = Arc::new(Mutex::new(SharedControl::default()));
    bus.add_device(BASE, 8, device.clone()).unwrap();
    (bus, device)
}

#[test]
fn modify_overwrites_intervening_write() {
    let (bus, device) = setup();
    let ctrl: ReadWrite<u32, Ctrl::Register, &EmulatedBus> =
        unsafe { ReadWrite::with_bus(BASE, &bus) };

    device.lock().unwrap().interfere = true;
    ctrl.modify(Ctrl::ENABLE::SET);

    // The store carries the value loaded before IRQ was set.
    assert_eq!(device.lock().unwrap().value, 0b0001);
    assert!(!ctrl.is_set(Ctrl::IRQ));

    let kinds: Vec<AccessKind> = bus.take_accesses().iter().map(|a| a.kind).collect();
    assert_eq!(kinds, [AccessKind::Load, AccessKind::Store, AccessKind::Load]);
}

#[test]
fn modify_without_interference_keeps_other_bits() {
    let (bus, device) = setup();
    let ctrl: ReadWrite<u32, Ctrl::Register, &EmulatedBus> =
        unsafe { ReadWrite::with_bus(BASE, &bus) };

    device.lock().unwrap().value = 1 << 3;
    ctrl.modify(Ctrl::ENABLE::SET);
    assert_eq!(device.lock().unwrap().value, 0b1001);
}

#[test]
fn set_clear_register_needs_no_load() {
    let (bus, device) = setup();
    let set_clear: WriteOnly<u32, SetClear::Register, &EmulatedBus> =
        unsafe { WriteOnly::with_bus(BASE + 4, &bus) };

    device.lock().unwrap().value = 1 << 3;
    set_clear.write_fields(SetClear::BS.val(1));
    assert_eq!(device.lock().unwrap().value, 0b1001);

    set_clear.write_fields(SetClear::BR.val(1));
    assert_eq!(device.lock().unwrap().value, 0b1000);

    let accesses = bus.take_accesses();
    assert_eq!(accesses.len(), 2);
    assert!(accesses.iter().all(|a| a.kind == AccessKind::Store));
}

#[test]
fn modify_no_read_uses_the_cached_copy() {
    let (bus, device) = setup();
    let ctrl: ReadWrite<u32, Ctrl::Register, &EmulatedBus> =
        unsafe { ReadWrite::with_bus(BASE, &bus) };

    let cached: LocalRegisterCopy<u32, Ctrl::Register> = ctrl.read();
    device.lock().unwrap().value = 1 << 3;
    bus.clear_accesses();

    ctrl.modify_no_read(cached, Ctrl::ENABLE::SET);
    assert_eq!(device.lock().unwrap().value, 0b0001);
    assert_eq!(bus.take_accesses().len(), 1);
}
