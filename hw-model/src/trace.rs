// Licensed under the Apache-2.0 license

use std::fmt::Display;
use std::io::{self, LineWriter, Write};

use histogram_emu_periph::Status;
use histogram_emu_types::{SigIn, SigOut};

struct PrettyU64(u64);
impl Display for PrettyU64 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const RANKS: [u64; 7] = [
            1_000_000_000_000_000_000,
            1_000_000_000_000_000,
            1_000_000_000_000,
            1_000_000_000,
            1_000_000,
            1_000,
            1,
        ];
        const PADDING_RANK: u64 = 1_000_000_000;
        let mut prev_numbers = false;
        for rank in RANKS {
            if (self.0 / rank) > 0 || rank == 1 {
                if prev_numbers {
                    write!(f, "{:03}", (self.0 / rank) % 1000)?;
                } else if rank >= PADDING_RANK {
                    write!(f, "{}", (self.0 / rank) % 1000)?;
                } else {
                    write!(f, "{:>3}", (self.0 / rank) % 1000)?;
                }
                if rank > 1 {
                    write!(f, ",")?;
                }
                prev_numbers = true;
            } else if rank < PADDING_RANK {
                write!(f, "    ")?;
            }
        }
        Ok(())
    }
}

/// Writes one line per clock cycle with the pin levels.
pub struct Trace {
    writer: LineWriter<Box<dyn Write>>,
}

impl Trace {
    pub fn new(writer: Box<dyn Write>) -> Self {
        Self {
            writer: LineWriter::new(writer),
        }
    }

    pub fn record(&mut self, cycle: u64, input: &SigIn, output: &SigOut) -> io::Result<()> {
        let status = Status::from(output.uio_out);
        writeln!(
            self.writer,
            "{} rst_n={} ena={} ui_in=0x{:02x} uio_in=0x{:02x} uo_out=0x{:02x} valid={} last={} ready={} draining={}",
            PrettyU64(cycle),
            u8::from(input.rst_n),
            u8::from(input.ena),
            input.ui_in,
            input.uio_in,
            output.uo_out,
            u8::from(status.valid),
            u8::from(status.last_bin),
            u8::from(status.ready),
            u8::from(status.draining),
        )
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }
}
