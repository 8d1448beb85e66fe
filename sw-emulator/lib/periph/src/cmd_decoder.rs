/*++

Licensed under the Apache-2.0 license.

File Name:

    cmd_decoder.rs

Abstract:

    File contains the decoder for the histogram command pins.

--*/

use crate::counter_bank::BinIndex;
use tock_registers::{register_bitfields, LocalRegisterCopy};

register_bitfields! [
    u8,

    /// Dedicated input pins
    UiIn [
        /// Upper data bits; not used for addressing
        DATA_HI OFFSET(0) NUMBITS(6) [],
        /// Manual drain request, acted on at its rising edge
        GET OFFSET(6) NUMBITS(1) [],
        WRITE_EN OFFSET(7) NUMBITS(1) [],
    ],

    /// Bidirectional pins, driven as inputs
    UioIn [
        BIN OFFSET(0) NUMBITS(6) [],
        RSVD OFFSET(6) NUMBITS(2) [],
    ],
];

/// One cycle's worth of decoded command pins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Command {
    pub bin: BinIndex,
    pub write_enable: bool,
    /// Set only on the cycle `GET` rises.
    pub drain_request: bool,
}

/// Splits the command pins into fields. The only state kept is the level of
/// `GET` seen by the previous call to [`CommandDecoder::decode`]; the device
/// skips decoding while disabled.
#[derive(Debug, Default)]
pub struct CommandDecoder {
    get_level: bool,
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn decode(&mut self, ui_in: u8, uio_in: u8) -> Command {
        let ui = LocalRegisterCopy::<u8, UiIn::Register>::new(ui_in);
        let uio = LocalRegisterCopy::<u8, UioIn::Register>::new(uio_in);

        let get = ui.is_set(UiIn::GET);
        let drain_request = get && !self.get_level;
        self.get_level = get;

        Command {
            bin: BinIndex::new_masked(uio.read(UioIn::BIN)),
            write_enable: ui.is_set(UiIn::WRITE_EN),
            drain_request,
        }
    }

    pub fn reset(&mut self) {
        self.get_level = false;
    }
}

/// Builds the `(ui_in, uio_in)` pin values for a command. Bits above the
/// 6-bit index are dropped.
pub fn encode_pins(bin: u8, write_enable: bool, get: bool) -> (u8, u8) {
    let ui_in = UiIn::WRITE_EN.val(u8::from(write_enable)) + UiIn::GET.val(u8::from(get));
    let uio_in = UioIn::BIN.val(bin);
    (ui_in.value, uio_in.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_write() {
        let mut decoder = CommandDecoder::new();
        let cmd = decoder.decode(0x80, 0x05);
        assert_eq!(cmd.bin.get(), 5);
        assert!(cmd.write_enable);
        assert!(!cmd.drain_request);

        let cmd = decoder.decode(0x00, 0x05);
        assert!(!cmd.write_enable);
    }

    #[test]
    fn test_upper_bits_are_ignored() {
        let mut decoder = CommandDecoder::new();
        // Upper data bits on ui_in and reserved bits on uio_in never reach
        // the index.
        let cmd = decoder.decode(0x80 | 0x3f, 0xc0 | 0x3f);
        assert_eq!(cmd.bin.get(), 63);
        assert!(cmd.write_enable);
        assert!(!cmd.drain_request);

        let cmd = decoder.decode(0x80, 0x47);
        assert_eq!(cmd.bin.get(), 7);
    }

    #[test]
    fn test_get_is_edge_triggered() {
        let mut decoder = CommandDecoder::new();
        assert!(decoder.decode(0x40, 0).drain_request);
        assert!(!decoder.decode(0x40, 0).drain_request);
        assert!(!decoder.decode(0x00, 0).drain_request);
        assert!(decoder.decode(0x40, 0).drain_request);

        decoder.reset();
        assert!(decoder.decode(0x40, 0).drain_request);
    }

    #[test]
    fn test_encode_pins() {
        assert_eq!(encode_pins(5, true, false), (0x80, 0x05));
        assert_eq!(encode_pins(63, false, true), (0x40, 0x3f));
        assert_eq!(encode_pins(0x45, true, false), (0x80, 0x05));

        let mut decoder = CommandDecoder::new();
        let (ui_in, uio_in) = encode_pins(42, true, false);
        let cmd = decoder.decode(ui_in, uio_in);
        assert_eq!(cmd.bin.get(), 42);
        assert!(cmd.write_enable);
    }
}
