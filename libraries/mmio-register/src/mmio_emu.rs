// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2026.

//! MMIO backend for emulating register reads and writes.
//!
//! [`EmulatedBus`] is a [`Bus`] backed by host memory, so that drivers can be
//! exercised in ordinary `#[test]` functions. Plain addresses behave like
//! zero-initialised RAM. Address ranges claimed by an [`MmioDevice`] are
//! forwarded to that device instead, which lets tests model registers with
//! side effects. Every load and store is recorded, so tests can check exactly
//! which accesses a driver performed.
//!
//! Words are stored little-endian.

// This module requires libstd.
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::vec::Vec;

use crate::{Bus, UIntLike};

/// Errors that can be encountered by MMIO emulation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    RegionOverlaps(usize, usize),
    ZeroSizedRegion(usize),
}

pub type Result<T> = std::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use self::Error::*;

        match self {
            RegionOverlaps(base, size) => write!(
                f,
                "region overlaps with existing region of base {:#x} size {:#x}",
                base, size
            ),
            ZeroSizedRegion(base) => {
                write!(f, "region at base address {:#x} cannot be zero-sized", base)
            }
        }
    }
}

impl std::error::Error for Error {}

#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
struct MmioRegion {
    base: usize,
    size: usize,
}

impl MmioRegion {
    /// Returns true if there is overlap with the given range.
    fn overlaps(&self, base: usize, size: usize) -> bool {
        self.base < (base + size) && base < self.base + self.size
    }
}

/// A trait for devices that can be controlled by reading or writing MMIO registers.
pub trait MmioDevice: Send {
    /// Reads at `offset` from this device into `data`.
    fn mmio_read(&mut self, offset: usize, data: &mut [u8]);
    /// Writes `data` at `offset` of this device.
    fn mmio_write(&mut self, offset: usize, data: &[u8]);
}

/// Direction of a recorded access.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessKind {
    Load,
    Store,
}

/// One access performed through an [`EmulatedBus`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BusAccess {
    pub kind: AccessKind,
    pub address: usize,
    /// Width of the access in bytes.
    pub width: usize,
}

/// Register words the emulator can move through byte-addressed memory.
pub trait EmulatedWord: UIntLike {
    const BYTES: usize;

    /// Writes the little-endian bytes of `self` into `out`.
    fn to_bytes(self, out: &mut [u8]);

    /// Reads a word from little-endian `bytes`.
    fn from_bytes(bytes: &[u8]) -> Self;
}

macro_rules! EmulatedWord_impl_for {
    ($type:ty) => {
        impl EmulatedWord for $type {
            const BYTES: usize = core::mem::size_of::<$type>();

            fn to_bytes(self, out: &mut [u8]) {
                out.copy_from_slice(&self.to_le_bytes());
            }

            fn from_bytes(bytes: &[u8]) -> Self {
                let mut buf = [0u8; core::mem::size_of::<$type>()];
                buf.copy_from_slice(bytes);
                <$type>::from_le_bytes(buf)
            }
        }
    };
}

EmulatedWord_impl_for!(u8);
EmulatedWord_impl_for!(u16);
EmulatedWord_impl_for!(u32);
EmulatedWord_impl_for!(u64);

#[derive(Default)]
struct State {
    memory: BTreeMap<usize, u8>,
    devices: BTreeMap<MmioRegion, Arc<Mutex<dyn MmioDevice>>>,
    log: Vec<BusAccess>,
}

impl State {
    /// Finds the first region with a base address before `addr`. This region could contain
    /// `addr`, but only if it is large enough.
    fn first_before(&self, addr: usize) -> Option<(MmioRegion, &Arc<Mutex<dyn MmioDevice>>)> {
        let (range, dev) = self
            .devices
            .range(
                ..=MmioRegion {
                    base: addr,
                    size: usize::MAX,
                },
            )
            .next_back()?;
        Some((*range, dev))
    }

    /// Gets the device associated with `addr`, if any.
    ///
    /// If `addr` lies in a register block owned by a device, returns the offset
    /// into that register block and the device. Otherwise, returns None.
    fn get_device(&self, addr: usize) -> Option<(usize, Arc<Mutex<dyn MmioDevice>>)> {
        let (range, dev) = self.first_before(addr)?;
        let offset = addr - range.base;
        if offset < range.size {
            Some((offset, Arc::clone(dev)))
        } else {
            None
        }
    }

    fn read_memory(&self, addr: usize, data: &mut [u8]) {
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.memory.get(&(addr + i)).copied().unwrap_or(0);
        }
    }

    fn write_memory(&mut self, addr: usize, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.memory.insert(addr + i, *byte);
        }
    }
}

/// A bus backed by host memory and emulated devices.
///
/// Register handles use the bus by shared reference:
///
/// ```rust
/// use mmio_register::interfaces::{Readable, Writeable};
/// use mmio_register::mmio_emu::{AccessKind, EmulatedBus};
/// use mmio_register::ReadWrite;
///
/// let bus = EmulatedBus::new();
/// let reg: ReadWrite<u32, mmio_register::Raw<u32>, &EmulatedBus> =
///     unsafe { ReadWrite::with_bus(0x4000_0000, &bus) };
/// reg.write_raw(7);
/// assert_eq!(reg.read_raw(), 7);
///
/// let log = bus.take_accesses();
/// assert_eq!(log.len(), 2);
/// assert_eq!(log[0].kind, AccessKind::Store);
/// ```
#[derive(Default)]
pub struct EmulatedBus {
    state: Mutex<State>,
}

impl EmulatedBus {
    /// Creates a bus with no devices and all memory reading as zero.
    pub fn new() -> Self {
        EmulatedBus::default()
    }

    // Poisoning is ignored; a test may have panicked inside a device.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `device` to be associated with the memory region of `size` bytes at `base`.
    ///
    /// This may fail if the region is invalid (zero size), or the region conflicts with the
    /// region of a different device.
    pub fn add_device(
        &self,
        base: usize,
        size: usize,
        device: Arc<Mutex<dyn MmioDevice>>,
    ) -> Result<()> {
        if size == 0 {
            return Err(Error::ZeroSizedRegion(base));
        }

        let mut state = self.state();
        // Reject all cases where the new device's range overlaps with an existing device.
        if state
            .devices
            .keys()
            .any(|range| range.overlaps(base, size))
        {
            return Err(Error::RegionOverlaps(base, size));
        }
        state.devices.insert(MmioRegion { base, size }, device);
        Ok(())
    }

    /// Emulates a load of `T` from `address`, recording the access.
    ///
    /// # Panics
    ///
    /// Panics if `address` is not aligned to `T`.
    pub fn load<T: EmulatedWord>(&self, address: usize) -> T {
        assert!(
            address % T::BYTES == 0,
            "mmio_emu: unaligned load of {} bytes at {:#x}",
            T::BYTES,
            address
        );
        let mut bytes = [0u8; 8];
        let data = &mut bytes[..T::BYTES];

        let mut state = self.state();
        state.log.push(BusAccess {
            kind: AccessKind::Load,
            address,
            width: T::BYTES,
        });
        let device = state.get_device(address);
        match device {
            Some((offset, dev)) => {
                // Devices may access the bus themselves.
                drop(state);
                dev.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .mmio_read(offset, data);
            }
            None => state.read_memory(address, data),
        }
        T::from_bytes(data)
    }

    /// Emulates a store of `value` to `address`, recording the access.
    ///
    /// # Panics
    ///
    /// Panics if `address` is not aligned to `T`.
    pub fn store<T: EmulatedWord>(&self, address: usize, value: T) {
        assert!(
            address % T::BYTES == 0,
            "mmio_emu: unaligned store of {} bytes at {:#x}",
            T::BYTES,
            address
        );
        let mut bytes = [0u8; 8];
        let data = &mut bytes[..T::BYTES];
        value.to_bytes(data);

        let mut state = self.state();
        state.log.push(BusAccess {
            kind: AccessKind::Store,
            address,
            width: T::BYTES,
        });
        let device = state.get_device(address);
        match device {
            Some((offset, dev)) => {
                drop(state);
                dev.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .mmio_write(offset, data);
            }
            None => state.write_memory(address, data),
        }
    }

    /// Reads emulated RAM directly. Not recorded, and never reaches a device.
    pub fn peek<T: EmulatedWord>(&self, address: usize) -> T {
        let mut bytes = [0u8; 8];
        let data = &mut bytes[..T::BYTES];
        self.state().read_memory(address, data);
        T::from_bytes(data)
    }

    /// Writes emulated RAM directly. Not recorded, and never reaches a device.
    pub fn poke<T: EmulatedWord>(&self, address: usize, value: T) {
        let mut bytes = [0u8; 8];
        let data = &mut bytes[..T::BYTES];
        value.to_bytes(data);
        self.state().write_memory(address, data);
    }

    /// Every access recorded so far, oldest first.
    pub fn accesses(&self) -> Vec<BusAccess> {
        self.state().log.clone()
    }

    /// Returns the recorded accesses and clears the record.
    pub fn take_accesses(&self) -> Vec<BusAccess> {
        core::mem::take(&mut self.state().log)
    }

    pub fn clear_accesses(&self) {
        self.state().log.clear();
    }
}

impl fmt::Debug for EmulatedBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("EmulatedBus")
            .field("devices", &state.devices.keys().collect::<Vec<_>>())
            .field("accesses", &state.log.len())
            .finish()
    }
}

impl<'a, T: EmulatedWord> Bus<T> for &'a EmulatedBus {
    unsafe fn load(self, address: usize) -> T {
        EmulatedBus::load(self, address)
    }

    unsafe fn store(self, address: usize, value: T) {
        EmulatedBus::store(self, address, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::{Readable, Writeable};
    use crate::{ReadOnly, WriteOnly};
    use std::string::ToString;

    /// Internal state of a monotonically increasing counter device.
    struct CounterDevice {
        value: u64,
    }

    impl CounterDevice {
        /// Creates a new counter device with an initial counter value of 0.
        fn new() -> Self {
            CounterDevice { value: 0u64 }
        }
    }

    impl MmioDevice for CounterDevice {
        fn mmio_read(&mut self, offset: usize, data: &mut [u8]) {
            match offset {
                0x0 => data.copy_from_slice(&self.value.to_le_bytes()),
                _ => panic!("CounterDevice: illegal read offset {:#x}", offset),
            }
        }

        fn mmio_write(&mut self, offset: usize, data: &[u8]) {
            match offset {
                0x8 => {
                    let increment = u32::from_le_bytes(data.try_into().unwrap());
                    self.value += u64::from(increment);
                }
                _ => panic!("CounterDevice: illegal write offset {:#x}", offset),
            }
        }
    }

    const COUNTER_BASE: usize = 0x5000_0000;

    #[test]
    fn counter_device() {
        let bus = EmulatedBus::new();
        let device = Arc::new(Mutex::new(CounterDevice::new()));
        bus.add_device(COUNTER_BASE, 0x10, device).unwrap();

        // Current counter value.
        let counter: ReadOnly<u64, crate::Raw<u64>, &EmulatedBus> =
            unsafe { ReadOnly::with_bus(COUNTER_BASE, &bus) };
        // Writing to this register increments the counter value.
        let increment: WriteOnly<u32, crate::Raw<u32>, &EmulatedBus> =
            unsafe { WriteOnly::with_bus(COUNTER_BASE + 8, &bus) };

        assert_eq!(counter.read_raw(), 0);
        increment.write_raw(5);
        assert_eq!(counter.read_raw(), 5);
        increment.write_raw(1);
        assert_eq!(counter.read_raw(), 6);

        // Device registers are not backed by RAM.
        assert_eq!(bus.peek::<u64>(COUNTER_BASE), 0);
    }

    #[test]
    fn ram_is_little_endian() {
        let bus = EmulatedBus::new();
        bus.store(0x100, 0x1122_3344u32);
        assert_eq!(bus.peek::<u8>(0x100), 0x44);
        assert_eq!(bus.peek::<u16>(0x102), 0x1122);
        assert_eq!(bus.load::<u32>(0x104), 0);
    }

    #[test]
    fn accesses_are_recorded() {
        let bus = EmulatedBus::new();
        bus.poke(0x10, 1u16);
        let _ = bus.load::<u16>(0x10);
        bus.store(0x20, 2u8);
        assert_eq!(
            bus.take_accesses(),
            [
                BusAccess {
                    kind: AccessKind::Load,
                    address: 0x10,
                    width: 2
                },
                BusAccess {
                    kind: AccessKind::Store,
                    address: 0x20,
                    width: 1
                },
            ]
        );
        assert!(bus.accesses().is_empty());
    }

    #[test]
    fn add_device_errors() {
        let bus = EmulatedBus::new();
        let device = Arc::new(Mutex::new(CounterDevice::new()));
        bus.add_device(0x1000, 0x10, device.clone()).unwrap();

        assert_eq!(
            bus.add_device(0x1008, 0x10, device.clone()),
            Err(Error::RegionOverlaps(0x1008, 0x10))
        );
        assert_eq!(
            bus.add_device(0x0ff0, 0x11, device.clone()),
            Err(Error::RegionOverlaps(0x0ff0, 0x11))
        );
        assert_eq!(
            bus.add_device(0x2000, 0, device.clone()),
            Err(Error::ZeroSizedRegion(0x2000))
        );
        assert!(bus.add_device(0x1010, 0x10, device).is_ok());
        assert_eq!(
            Error::ZeroSizedRegion(0x2000).to_string(),
            "region at base address 0x2000 cannot be zero-sized"
        );
    }

    #[test]
    #[should_panic(expected = "unaligned load")]
    fn unaligned_load() {
        let bus = EmulatedBus::new();
        let _ = bus.load::<u32>(0x102);
    }

    #[test]
    #[should_panic(expected = "unaligned store")]
    fn unaligned_store() {
        let bus = EmulatedBus::new();
        bus.store(0x101, 0u16);
    }
}
