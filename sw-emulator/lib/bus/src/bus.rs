/*++

Licensed under the Apache-2.0 license.

File Name:

    bus.rs

Abstract:

    File contains definition of the Bus trait.

--*/

use histogram_emu_types::{EmuAddr, EmuData, EmuSize};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BusError {
    /// Read from an unmapped or write-only register, or with the wrong size
    LoadAccessFault,

    /// Write to an unmapped or read-only register, or with the wrong size
    StoreAccessFault,
}

impl std::fmt::Display for BusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BusError::LoadAccessFault => write!(f, "load access fault"),
            BusError::StoreAccessFault => write!(f, "store access fault"),
        }
    }
}

impl std::error::Error for BusError {}

/// Represents an abstract register bus. Used by a host model to read and
/// write peripheral registers.
pub trait Bus {
    /// Read data of specified size from given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the read
    /// * `addr` - Address to read from
    ///
    /// # Error
    ///
    /// * `BusError::LoadAccessFault` - The register is not readable with `size`
    fn read(&mut self, size: EmuSize, addr: EmuAddr) -> Result<EmuData, BusError>;

    /// Write data of specified size to given address
    ///
    /// # Arguments
    ///
    /// * `size` - Size of the write
    /// * `addr` - Address to write
    /// * `val` - Data to write
    ///
    /// # Error
    ///
    /// * `BusError::StoreAccessFault` - The register is not writable with `size`
    fn write(&mut self, size: EmuSize, addr: EmuAddr, val: EmuData) -> Result<(), BusError>;

    /// This method is used to notify peripherals of the passage of time. The
    /// owner of this bus MAY call this function periodically, or in response to
    /// a previously scheduled timer event.
    fn poll(&mut self) {
        // By default, do nothing
    }

    /// Synchronously returns the peripheral to its power-on state.
    fn warm_reset(&mut self) {
        // By default, do nothing
    }
}

impl<T: Bus> Bus for Box<T> {
    fn read(&mut self, size: EmuSize, addr: EmuAddr) -> Result<EmuData, BusError> {
        T::read(self, size, addr)
    }

    fn write(&mut self, size: EmuSize, addr: EmuAddr, val: EmuData) -> Result<(), BusError> {
        T::write(self, size, addr, val)
    }

    fn poll(&mut self) {
        T::poll(self)
    }

    fn warm_reset(&mut self) {
        T::warm_reset(self)
    }
}
