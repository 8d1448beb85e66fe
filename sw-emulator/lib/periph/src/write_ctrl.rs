/*++

Licensed under the Apache-2.0 license.

File Name:

    write_ctrl.rs

Abstract:

    File contains the write admission controller, which owns the counter bank
    and decides which increment commands are applied.

--*/

use crate::cmd_decoder::Command;
use crate::counter_bank::{max_for, CounterBank};

/// Device-level conditions sampled at the start of a cycle.
#[derive(Clone, Copy, Debug, Default)]
pub struct WriteGate {
    /// `ena` pin level
    pub enabled: bool,

    /// The reset settle window has elapsed
    pub settled: bool,

    /// The drain sequencer is walking the bank
    pub draining: bool,
}

pub struct WriteCtrl {
    bank: CounterBank,

    /// Busy cycles remaining before another write is accepted
    busy_cycles: u32,

    /// Cycles of busy time following each accepted write
    cooldown_cycles: u32,

    /// Raise a drain request when a bin reaches its maximum
    overflow_drain: bool,

    drain_request: bool,
}

impl WriteCtrl {
    pub fn new(cooldown_cycles: u32, overflow_drain: bool) -> Self {
        Self {
            bank: CounterBank::new(),
            busy_cycles: 0,
            cooldown_cycles,
            overflow_drain,
            drain_request: false,
        }
    }

    /// True when a write presented this cycle would be applied, given `gate`.
    pub fn ready(&self, gate: WriteGate) -> bool {
        gate.enabled
            && gate.settled
            && !gate.draining
            && !self.drain_request
            && self.busy_cycles == 0
    }

    /// Runs one cycle of admission. Returns true if `cmd` incremented a bin.
    ///
    /// Writes that arrive while the controller is not ready are dropped.
    pub fn accept(&mut self, cmd: &Command, gate: WriteGate) -> bool {
        let ready = self.ready(gate);
        if !ready && self.busy_cycles > 0 {
            self.busy_cycles -= 1;
        }
        if !(ready && cmd.write_enable) {
            if cmd.write_enable && !ready {
                log::trace!("write to bin {} dropped, not ready", cmd.bin);
            }
            return false;
        }

        let value = self.bank.increment(cmd.bin);
        self.busy_cycles = self.cooldown_cycles;
        log::trace!("bin {} incremented to {value}", cmd.bin);

        if self.overflow_drain && value == max_for(cmd.bin) {
            log::debug!("bin {} saturated at {value}, requesting drain", cmd.bin);
            self.drain_request = true;
        }
        true
    }

    /// Returns and clears the pending drain request.
    pub fn take_drain_request(&mut self) -> bool {
        std::mem::take(&mut self.drain_request)
    }

    pub fn bank(&self) -> &CounterBank {
        &self.bank
    }

    /// Zeroes the counters without touching the flow-control state.
    pub fn clear_bank(&mut self) {
        self.bank.reset();
    }

    pub fn reset(&mut self) {
        self.bank.reset();
        self.busy_cycles = 0;
        self.drain_request = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd_decoder::Command;
    use crate::counter_bank::BinIndex;

    const OPEN: WriteGate = WriteGate {
        enabled: true,
        settled: true,
        draining: false,
    };

    fn write(bin: u8) -> Command {
        Command {
            bin: BinIndex::new_masked(bin),
            write_enable: true,
            drain_request: false,
        }
    }

    #[test]
    fn test_accept_and_cooldown() {
        let mut ctrl = WriteCtrl::new(1, true);
        assert!(ctrl.accept(&write(5), OPEN));
        assert!(!ctrl.ready(OPEN));
        // Held command on the following cycle lands in the busy window.
        assert!(!ctrl.accept(&write(5), OPEN));
        assert!(ctrl.ready(OPEN));
        assert!(ctrl.accept(&write(5), OPEN));
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(5)), 2);
    }

    #[test]
    fn test_no_cooldown() {
        let mut ctrl = WriteCtrl::new(0, true);
        for _ in 0..3 {
            assert!(ctrl.accept(&write(12), OPEN));
        }
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(12)), 3);
    }

    #[test]
    fn test_write_enable_gating() {
        let mut ctrl = WriteCtrl::new(0, true);
        let mut cmd = write(5);
        cmd.write_enable = false;
        for _ in 0..256 {
            assert!(!ctrl.accept(&cmd, OPEN));
        }
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(5)), 0);
    }

    #[test]
    fn test_gate_conditions() {
        let mut ctrl = WriteCtrl::new(0, true);
        for gate in [
            WriteGate {
                enabled: false,
                ..OPEN
            },
            WriteGate {
                settled: false,
                ..OPEN
            },
            WriteGate {
                draining: true,
                ..OPEN
            },
        ] {
            assert!(!ctrl.accept(&write(1), gate));
        }
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(1)), 0);
    }

    #[test]
    fn test_not_ready_while_disabled() {
        let mut ctrl = WriteCtrl::new(2, true);
        let disabled = WriteGate {
            enabled: false,
            ..OPEN
        };
        assert!(!ctrl.ready(disabled));
        assert!(ctrl.ready(OPEN));

        // The busy window keeps counting down while disabled.
        assert!(ctrl.accept(&write(4), OPEN));
        assert!(!ctrl.accept(&write(4), disabled));
        assert!(!ctrl.accept(&write(4), disabled));
        assert!(ctrl.ready(OPEN));
    }

    #[test]
    fn test_saturation_requests_drain() {
        let mut ctrl = WriteCtrl::new(0, true);
        for _ in 0..14 {
            assert!(ctrl.accept(&write(15), OPEN));
        }
        assert!(!ctrl.take_drain_request());
        assert!(ctrl.accept(&write(15), OPEN));
        assert!(!ctrl.ready(OPEN));
        assert!(!ctrl.accept(&write(15), OPEN));
        assert!(ctrl.take_drain_request());
        assert!(!ctrl.take_drain_request());
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(15)), 15);
    }

    #[test]
    fn test_overflow_drain_disabled() {
        let mut ctrl = WriteCtrl::new(0, false);
        for _ in 0..20 {
            assert!(ctrl.accept(&write(20), OPEN));
        }
        assert!(!ctrl.take_drain_request());
        assert_eq!(ctrl.bank().read(BinIndex::new_masked(20)), 15);
    }

    #[test]
    fn test_reset() {
        let mut ctrl = WriteCtrl::new(3, true);
        for _ in 0..15 {
            while !ctrl.accept(&write(11), OPEN) {}
        }
        ctrl.reset();
        assert!(ctrl.ready(OPEN));
        assert!(!ctrl.take_drain_request());
        assert!(ctrl.bank().iter().all(|v| v == 0));
    }
}
