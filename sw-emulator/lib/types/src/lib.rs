/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Histogram Emulator Types library.

--*/

mod macros;
mod pins;

pub use crate::pins::{SigIn, SigOut};

/// Register data width of the host-facing register view
pub type EmuData = u32;

/// Register address width of the host-facing register view
pub type EmuAddr = u32;

emu_enum!(
    /// Register access size
    #[derive(Debug, Eq, PartialEq, Copy, Clone)]
    pub EmuSize;
    usize;
    {
        Byte = 1,
        HalfWord = 2,
        Word = 4,
    };
    Invalid
);
