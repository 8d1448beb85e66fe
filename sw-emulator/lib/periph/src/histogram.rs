/*++

Licensed under the Apache-2.0 license.

File Name:

    histogram.rs

Abstract:

    File contains the histogram accumulator device: pin interface, clocking
    and the host-facing register view.

--*/

use crate::cmd_decoder::{Command, CommandDecoder};
use crate::config::{DrainPolicy, HistogramConfig};
use crate::counter_bank::CounterBank;
use crate::drain::{DrainBeat, DrainSequencer};
use crate::write_ctrl::{WriteCtrl, WriteGate};
use histogram_emu_bus::{ActionHandle, Bus, BusError, Clock, Timer};
use histogram_emu_types::{EmuAddr, EmuData, EmuSize, SigIn, SigOut};
use tock_registers::{register_bitfields, LocalRegisterCopy};

register_bitfields! [
    u8,

    /// Status pins
    UioOut [
        VALID OFFSET(0) NUMBITS(1) [],
        LAST_BIN OFFSET(1) NUMBITS(1) [],
        READY OFFSET(2) NUMBITS(1) [],
        DRAINING OFFSET(3) NUMBITS(1) [],
    ],

    /// Control register of the register view
    Ctrl [
        ENA OFFSET(0) NUMBITS(1) [],
        RST_N OFFSET(1) NUMBITS(1) [],
    ],
];

/// The status bits of `uio_out` are outputs, the rest stay inputs.
pub const UIO_OE: u8 = 0x0f;

/// Decoded view of the status pins.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Status {
    pub valid: bool,
    pub last_bin: bool,
    pub ready: bool,
    pub draining: bool,
}

impl From<u8> for Status {
    fn from(uio_out: u8) -> Self {
        let reg = LocalRegisterCopy::<u8, UioOut::Register>::new(uio_out);
        Self {
            valid: reg.is_set(UioOut::VALID),
            last_bin: reg.is_set(UioOut::LAST_BIN),
            ready: reg.is_set(UioOut::READY),
            draining: reg.is_set(UioOut::DRAINING),
        }
    }
}

impl From<Status> for u8 {
    fn from(status: Status) -> u8 {
        (UioOut::VALID.val(u8::from(status.valid))
            + UioOut::LAST_BIN.val(u8::from(status.last_bin))
            + UioOut::READY.val(u8::from(status.ready))
            + UioOut::DRAINING.val(u8::from(status.draining)))
        .value
    }
}

/// Histogram accumulator.
///
/// Drive `input`, call [`Histogram::eval`] once per rising clock edge, then
/// sample `output`. The owner advances the shared [`Clock`] after each edge
/// with [`Clock::increment_and_process_timer_actions`] so the reset settle
/// window can expire.
pub struct Histogram {
    timer: Timer,
    config: HistogramConfig,
    decoder: CommandDecoder,
    write_ctrl: WriteCtrl,
    drain: DrainSequencer,

    /// Pending end of the post-reset settle window
    settle_action: Option<ActionHandle>,
    settled: bool,
    in_reset: bool,

    pub input: SigIn,
    pub output: SigOut,
}

impl Histogram {
    /// UI_IN Register
    const ADDR_UI_IN: EmuAddr = 0x00;

    /// UIO_IN Register
    const ADDR_UIO_IN: EmuAddr = 0x01;

    /// CTRL Register
    const ADDR_CTRL: EmuAddr = 0x02;

    /// UO_OUT Register
    const ADDR_UO_OUT: EmuAddr = 0x04;

    /// UIO_OUT Register
    const ADDR_UIO_OUT: EmuAddr = 0x05;

    /// UIO_OE Register
    const ADDR_UIO_OE: EmuAddr = 0x06;

    pub fn new(clock: &Clock, config: HistogramConfig) -> Self {
        Self {
            timer: clock.timer(),
            decoder: CommandDecoder::new(),
            write_ctrl: WriteCtrl::new(config.write_cooldown_cycles, config.overflow_drain),
            drain: DrainSequencer::new(),
            config,
            settle_action: None,
            settled: false,
            in_reset: true,
            input: SigIn::default(),
            output: SigOut {
                uio_oe: UIO_OE,
                ..SigOut::default()
            },
        }
    }

    /// Memory map size.
    pub fn mmap_size(&self) -> EmuAddr {
        8
    }

    pub fn config(&self) -> &HistogramConfig {
        &self.config
    }

    /// Current counter values. Reading them has no effect on the device.
    pub fn bank(&self) -> &CounterBank {
        self.write_ctrl.bank()
    }

    pub fn is_draining(&self) -> bool {
        self.drain.is_draining()
    }

    /// True once the post-reset settle window has elapsed.
    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn status(&self) -> Status {
        Status::from(self.output.uio_out)
    }

    /// Evaluates one rising clock edge.
    pub fn eval(&mut self) {
        if !self.input.rst_n {
            self.hold_reset();
            return;
        }
        if self.in_reset {
            self.release_reset();
        }

        let enabled = self.input.ena;
        // The pins are not sampled while disabled, so a GET held across
        // `ena` rising is seen as a fresh request.
        let cmd = if enabled {
            self.decoder.decode(self.input.ui_in, self.input.uio_in)
        } else {
            Command::default()
        };
        let gate = WriteGate {
            enabled,
            settled: self.settled,
            draining: self.drain.is_draining(),
        };

        // The sequencer holds its position while the device is disabled.
        let beat = if enabled {
            self.drain.step(self.write_ctrl.bank())
        } else {
            DrainBeat::default()
        };
        if beat.last && self.config.drain_policy == DrainPolicy::ClearOnComplete {
            self.write_ctrl.clear_bank();
        }

        self.write_ctrl.accept(&cmd, gate);

        let overflow = self.write_ctrl.take_drain_request();
        let manual = cmd.drain_request && self.settled;
        if overflow || manual {
            self.drain.start();
        }

        self.drive_outputs(beat);
    }

    fn drive_outputs(&mut self, beat: DrainBeat) {
        // The beat carrying bin 63 still counts as part of the session.
        let draining = beat.valid || self.drain.is_draining();
        let ready = self.write_ctrl.ready(WriteGate {
            enabled: self.input.ena,
            settled: self.settled,
            draining,
        });
        let status = Status {
            valid: beat.valid,
            last_bin: beat.last,
            ready,
            draining,
        };
        self.output = SigOut {
            uo_out: beat.data,
            uio_out: status.into(),
            uio_oe: UIO_OE,
        };
    }

    fn hold_reset(&mut self) {
        if !self.in_reset {
            log::debug!("reset asserted");
        }
        self.in_reset = true;
        self.settled = false;
        if let Some(action) = self.settle_action.take() {
            self.timer.cancel(action);
        }
        self.decoder.reset();
        self.write_ctrl.reset();
        self.drain.abort();
        self.output = SigOut {
            uio_oe: UIO_OE,
            ..SigOut::default()
        };
    }

    fn release_reset(&mut self) {
        self.in_reset = false;
        let settle = self.config.reset_settle_cycles;
        log::debug!("reset released, settling for {settle} cycles");
        if settle == 0 {
            self.settled = true;
        } else {
            self.settle_action = Some(self.timer.schedule_poll_in(settle));
        }
    }

    fn ctrl(&self) -> u8 {
        (Ctrl::ENA.val(u8::from(self.input.ena)) + Ctrl::RST_N.val(u8::from(self.input.rst_n)))
            .value
    }

    fn set_ctrl(&mut self, val: u8) {
        let ctrl = LocalRegisterCopy::<u8, Ctrl::Register>::new(val);
        self.input.ena = ctrl.is_set(Ctrl::ENA);
        self.input.rst_n = ctrl.is_set(Ctrl::RST_N);
    }
}

impl Bus for Histogram {
    /// Read data of specified size from given address
    ///
    /// # Error
    ///
    /// * `BusError::LoadAccessFault` - Non-byte access or unmapped address
    fn read(&mut self, size: EmuSize, addr: EmuAddr) -> Result<EmuData, BusError> {
        match (size, addr) {
            (EmuSize::Byte, Histogram::ADDR_UI_IN) => Ok(self.input.ui_in as EmuData),
            (EmuSize::Byte, Histogram::ADDR_UIO_IN) => Ok(self.input.uio_in as EmuData),
            (EmuSize::Byte, Histogram::ADDR_CTRL) => Ok(self.ctrl() as EmuData),
            (EmuSize::Byte, Histogram::ADDR_UO_OUT) => Ok(self.output.uo_out as EmuData),
            (EmuSize::Byte, Histogram::ADDR_UIO_OUT) => Ok(self.output.uio_out as EmuData),
            (EmuSize::Byte, Histogram::ADDR_UIO_OE) => Ok(self.output.uio_oe as EmuData),
            _ => Err(BusError::LoadAccessFault),
        }
    }

    /// Write data of specified size to given address
    ///
    /// # Error
    ///
    /// * `BusError::StoreAccessFault` - Non-byte access, read-only register or
    ///   unmapped address
    fn write(&mut self, size: EmuSize, addr: EmuAddr, val: EmuData) -> Result<(), BusError> {
        match (size, addr) {
            (EmuSize::Byte, Histogram::ADDR_UI_IN) => self.input.ui_in = val as u8,
            (EmuSize::Byte, Histogram::ADDR_UIO_IN) => self.input.uio_in = val as u8,
            (EmuSize::Byte, Histogram::ADDR_CTRL) => self.set_ctrl(val as u8),
            _ => Err(BusError::StoreAccessFault)?,
        }
        Ok(())
    }

    fn poll(&mut self) {
        if self.timer.fired(&mut self.settle_action) {
            log::debug!("reset settle window elapsed");
            self.settled = true;
        }
    }

    fn warm_reset(&mut self) {
        self.hold_reset();
    }
}
