// Licensed under the Apache-2.0 license

use std::error::Error;
use std::fmt;
use std::io::Write;

use histogram_emu_bus::Bus;
use histogram_emu_periph::{encode_pins, HistogramConfig, Status, BIN_COUNT};
use histogram_emu_types::{SigIn, SigOut};

mod model_emulated;
mod monitor;
mod trace;

pub use model_emulated::{EmulatedRegBus, ModelEmulated};
pub use monitor::DrainMonitor;
pub use trace::Trace;

pub type DefaultHwModel = ModelEmulated;

#[derive(Default)]
pub struct InitParams {
    pub config: HistogramConfig,

    // Per-cycle pin trace destination
    pub trace: Option<Box<dyn Write>>,
}

/// Cycles taken by [`HwModel::write_bin`].
pub const WRITE_BIN_CYCLES: u64 = 3;

/// Creates the default model and takes it through reset.
pub fn new(params: InitParams) -> Result<DefaultHwModel, Box<dyn Error>> {
    let mut model = DefaultHwModel::init(params)?;
    model.apply_reset(10);
    Ok(model)
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModelError {
    /// No drain produced a single beat before the timeout.
    DrainTimeout { cycles: u64 },

    /// A drain was underway but did not reach bin 63 before the timeout.
    IncompleteDrain { received: usize },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::DrainTimeout { cycles } => {
                write!(f, "no drain output within {cycles} cycles")
            }
            ModelError::IncompleteDrain { received } => write!(
                f,
                "drain incomplete: received {received} of {BIN_COUNT} bins"
            ),
        }
    }
}

impl Error for ModelError {}

/// One complete drain session, as seen on the output pins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DrainCapture {
    pub values: [u8; BIN_COUNT],

    /// Cycle that carried bin 0
    pub start_cycle: u64,

    /// Cycle that carried bin 63
    pub end_cycle: u64,
}

impl DrainCapture {
    pub fn value(&self, bin: usize) -> u8 {
        self.values[bin]
    }

    /// `(bin, value)` pairs for every bin that is not zero.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        self.values
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, v)| *v != 0)
    }
}

// Represents an emulator or simulation of the histogram device, to be called
// from tests.
pub trait HwModel {
    type TBus<'a>: Bus
    where
        Self: 'a;

    fn init(params: InitParams) -> Result<Self, Box<dyn Error>>
    where
        Self: Sized;

    /// The byte-wide register view of the pins.
    fn reg_bus<'a>(&'a mut self) -> Self::TBus<'a>;

    /// Step execution ahead one clock cycle.
    fn step(&mut self);

    /// Number of clock cycles stepped so far.
    fn cycle_count(&self) -> u64;

    /// Pin levels applied on the next call to `step`.
    fn input(&mut self) -> &mut SigIn;

    /// Pin levels produced by the last call to `step`.
    fn output(&self) -> SigOut;

    /// Oldest drain session that completed and has not been taken yet.
    fn take_drain(&mut self) -> Option<DrainCapture>;

    /// Number of beats seen so far from a session that has not completed.
    fn partial_drain_len(&self) -> usize;

    /// True once the device has left reset and its settle window has elapsed.
    fn is_settled(&self) -> bool;

    fn status(&self) -> Status {
        Status::from(self.output().uio_out)
    }

    /// Execute until the result of `predicate` becomes true.
    fn step_until(&mut self, mut predicate: impl FnMut(&mut Self) -> bool) {
        while !predicate(self) {
            self.step();
        }
    }

    /// Execute until the result of `predicate` becomes true, giving up after
    /// `max_cycles`. Returns the final result of `predicate`.
    fn step_until_within(
        &mut self,
        max_cycles: u64,
        mut predicate: impl FnMut(&mut Self) -> bool,
    ) -> bool {
        for _ in 0..max_cycles {
            if predicate(self) {
                return true;
            }
            self.step();
        }
        predicate(self)
    }

    fn step_n(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.step();
        }
    }

    /// Holds `rst_n` low for `cycles`, then releases it and waits for the
    /// settle window to elapse. Steps at most `max_cycles` in total and
    /// returns false if the device did not settle within them.
    fn reset_within(&mut self, cycles: u64, max_cycles: u64) -> bool {
        let input = self.input();
        input.rst_n = false;
        input.ui_in = 0;
        input.uio_in = 0;
        if cycles > max_cycles {
            self.step_n(max_cycles);
            return false;
        }
        self.step_n(cycles);
        self.input().rst_n = true;
        self.step_until_within(max_cycles - cycles, |m| m.is_settled())
    }

    /// Takes the device through reset, then steps one more cycle so the
    /// outputs reflect the settled device.
    fn apply_reset(&mut self, cycles: u64) {
        self.reset_within(cycles, u64::MAX);
        self.step();
    }

    fn set_enable(&mut self, ena: bool) {
        self.input().ena = ena;
    }

    fn drive(&mut self, bin: u8, write_enable: bool, get: bool) {
        let (ui_in, uio_in) = encode_pins(bin, write_enable, get);
        let input = self.input();
        input.ui_in = ui_in;
        input.uio_in = uio_in;
    }

    /// Presents one increment command the way the bench drives it: pins
    /// cleared for a cycle, then the command held for two. The pins are
    /// cleared again on return.
    fn write_bin(&mut self, bin: u8, write_enable: bool) {
        self.drive(0, false, false);
        self.step();
        self.drive(bin, write_enable, false);
        self.step_n(2);
        self.drive(0, false, false);
    }

    /// Pulses `GET` for one cycle.
    fn request_drain(&mut self) {
        self.drive(0, false, true);
        self.step();
        self.drive(0, false, false);
    }

    /// Returns the next completed drain session, stepping for at most
    /// `timeout` cycles while waiting for it.
    fn capture_drain(&mut self, timeout: u64) -> Result<DrainCapture, ModelError> {
        let deadline = self.cycle_count().saturating_add(timeout);
        loop {
            if let Some(capture) = self.take_drain() {
                log::info!(
                    "captured drain, cycles {}..={}",
                    capture.start_cycle,
                    capture.end_cycle
                );
                return Ok(capture);
            }
            if self.cycle_count() >= deadline {
                break;
            }
            self.step();
        }
        match self.partial_drain_len() {
            0 => Err(ModelError::DrainTimeout { cycles: timeout }),
            received => Err(ModelError::IncompleteDrain { received }),
        }
    }

    /// Requests a drain and waits for it to complete.
    fn drain(&mut self, timeout: u64) -> Result<DrainCapture, ModelError> {
        self.request_drain();
        self.capture_drain(timeout)
    }
}
