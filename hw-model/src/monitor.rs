// Licensed under the Apache-2.0 license

use std::collections::VecDeque;

use histogram_emu_periph::{Status, BIN_COUNT};
use histogram_emu_types::{SigIn, SigOut};

use crate::DrainCapture;

/// Reassembles drain sessions from the output pins, one cycle at a time.
#[derive(Debug, Default)]
pub struct DrainMonitor {
    partial: Vec<u8>,
    start_cycle: u64,
    completed: VecDeque<DrainCapture>,
}

impl DrainMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the pins sampled after the rising edge of `cycle`.
    pub fn observe(&mut self, cycle: u64, input: &SigIn, output: &SigOut) {
        if !input.rst_n {
            if !self.partial.is_empty() {
                log::info!("drain interrupted by reset after {} bins", self.partial.len());
                self.partial.clear();
            }
            return;
        }

        let status = Status::from(output.uio_out);
        if !status.valid {
            return;
        }
        if self.partial.is_empty() {
            self.start_cycle = cycle;
        }
        self.partial.push(output.uo_out);

        if status.last_bin {
            match <[u8; BIN_COUNT]>::try_from(self.partial.as_slice()) {
                Ok(values) => self.completed.push_back(DrainCapture {
                    values,
                    start_cycle: self.start_cycle,
                    end_cycle: cycle,
                }),
                Err(_) => log::warn!(
                    "discarding drain of {} bins ending at cycle {cycle}",
                    self.partial.len()
                ),
            }
            self.partial.clear();
        } else if self.partial.len() >= BIN_COUNT {
            log::warn!("{BIN_COUNT} beats without last_bin at cycle {cycle}, discarding");
            self.partial.clear();
        }
    }

    pub fn take(&mut self) -> Option<DrainCapture> {
        self.completed.pop_front()
    }

    pub fn partial_len(&self) -> usize {
        self.partial.len()
    }
}
