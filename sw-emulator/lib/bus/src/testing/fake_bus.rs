/*++

Licensed under the Apache-2.0 license.

File Name:

    fake_bus.rs

Abstract:

    File contains a fake implementation of the Bus trait.

--*/
use histogram_emu_types::{EmuAddr, EmuData, EmuSize};

use crate::{testing::Log, Bus, BusError};
use std::fmt::Write;

/// A Bus implementation that logs all calls, and allows the user to override
/// the return value of the methods.
///
/// # Example
///
/// ```
/// use histogram_emu_bus::{Bus, testing::FakeBus};
/// use histogram_emu_types::EmuSize;
///
/// let mut fake_bus = FakeBus::new();
/// fake_bus.read_result = Ok(35);
/// assert_eq!(fake_bus.read(EmuSize::Byte, 0x5), Ok(35));
/// assert_eq!("read(EmuSize::Byte, 0x5)\n", fake_bus.log.take());
/// ```
pub struct FakeBus {
    pub log: Log,
    pub read_result: Result<EmuData, BusError>,
    pub write_result: Result<(), BusError>,
}
impl FakeBus {
    pub fn new() -> Self {
        Self {
            log: Log::new(),
            read_result: Ok(0),
            write_result: Ok(()),
        }
    }
}
impl Default for FakeBus {
    fn default() -> Self {
        Self::new()
    }
}
impl Bus for FakeBus {
    fn read(&mut self, size: EmuSize, addr: EmuAddr) -> Result<EmuData, BusError> {
        let _ = writeln!(self.log.w(), "read(EmuSize::{size:?}, {addr:#x})");
        self.read_result
    }

    fn write(&mut self, size: EmuSize, addr: EmuAddr, val: EmuData) -> Result<(), BusError> {
        let _ = writeln!(self.log.w(), "write(EmuSize::{size:?}, {addr:#x}, {val:#x})");
        self.write_result
    }

    fn poll(&mut self) {
        let _ = writeln!(self.log.w(), "poll()");
    }

    fn warm_reset(&mut self) {
        let _ = writeln!(self.log.w(), "warm_reset()");
    }
}
