/*++

Licensed under the Apache-2.0 license.

File Name:

    lib.rs

Abstract:

    File contains exports for the Histogram Emulator Peripheral library.

--*/

mod cmd_decoder;
mod config;
mod counter_bank;
mod drain;
mod histogram;
mod write_ctrl;

pub use cmd_decoder::{encode_pins, Command, CommandDecoder};
pub use config::{DrainPolicy, HistogramConfig};
pub use counter_bank::{
    max_for, width_class, BinIndex, CounterBank, WidthClass, BIN_COUNT, LAST_BIN, WIDE_BIN_COUNT,
};
pub use drain::{DrainBeat, DrainSequencer};
pub use histogram::{Histogram, Status, UIO_OE};
pub use write_ctrl::{WriteCtrl, WriteGate};
