/*++

Licensed under the Apache-2.0 license.

File Name:

    pins.rs

Abstract:

    File contains the pin-level signal bundles of the histogram device.

--*/

/// Signals driven into the device by the test bench on each clock edge.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SigIn {
    /// Active-low, level-sensitive reset.
    pub rst_n: bool,

    /// Global enable. Writes and drain requests are ignored while low.
    pub ena: bool,

    /// Dedicated inputs: write enable, manual drain request and upper data bits.
    pub ui_in: u8,

    /// Bidirectional pins used as inputs: the bin index.
    pub uio_in: u8,
}

impl Default for SigIn {
    fn default() -> Self {
        Self {
            rst_n: false,
            ena: true,
            ui_in: 0,
            uio_in: 0,
        }
    }
}

/// Signals produced by the device, valid after each clock edge.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SigOut {
    /// Drained bin value.
    pub uo_out: u8,

    /// Status bits: valid, last bin, ready, draining.
    pub uio_out: u8,

    /// Output enables of the bidirectional pins.
    pub uio_oe: u8,
}
