/*++

Licensed under the Apache-2.0 license.

File Name:

    drain.rs

Abstract:

    File contains the drain sequencer, which walks the counter bank in index
    order and emits one bin per cycle.

--*/

use crate::counter_bank::{BinIndex, CounterBank, LAST_BIN};
use smlang::statemachine;

statemachine! {
    transitions: {
        // CurrentState Event / action = NextState

        *Idle + Start / start = Draining,

        // Bins 0..=62
        Draining + Emit / advance = Draining,

        // Bin 63
        Draining + EmitLast / finish = Idle,

        // Reset aborts a session without emitting anything further.
        Draining + Abort / abort = Idle
    }
}

/// State machine extended variables.
#[derive(Debug, Default)]
pub struct Context {
    /// Next bin to emit
    cursor: u8,
}

impl StateMachineContext for Context {
    fn start(&mut self) {
        self.cursor = 0;
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn finish(&mut self) {
        self.cursor = 0;
    }

    fn abort(&mut self) {
        self.cursor = 0;
    }
}

/// Output of the sequencer for one cycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct DrainBeat {
    pub data: u8,
    pub valid: bool,
    pub last: bool,
}

pub struct DrainSequencer {
    state_machine: StateMachine<Context>,
}

impl Default for DrainSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl DrainSequencer {
    pub fn new() -> Self {
        Self {
            state_machine: StateMachine::new(Context::default()),
        }
    }

    pub fn is_draining(&self) -> bool {
        matches!(self.state_machine.state, States::Draining)
    }

    /// Bin that the next beat will carry, if a session is active.
    pub fn cursor(&self) -> Option<BinIndex> {
        self.is_draining()
            .then(|| BinIndex::new_masked(self.state_machine.context.cursor))
    }

    /// Opens a session. Returns false, and leaves the running session alone,
    /// if a drain is already in progress.
    pub fn start(&mut self) -> bool {
        let started = self.state_machine.process_event(Events::Start).is_ok();
        if started {
            log::debug!("drain started");
        }
        started
    }

    /// Emits the bin under the cursor and advances. Produces an idle beat when
    /// no session is active.
    pub fn step(&mut self, bank: &CounterBank) -> DrainBeat {
        let Some(bin) = self.cursor() else {
            return DrainBeat::default();
        };

        let last = bin.get() == LAST_BIN;
        let event = if last { Events::EmitLast } else { Events::Emit };
        if self.state_machine.process_event(event).is_err() {
            return DrainBeat::default();
        }
        if last {
            log::debug!("drain finished");
        }

        DrainBeat {
            data: bank.read(bin),
            valid: true,
            last,
        }
    }

    /// Drops any active session.
    pub fn abort(&mut self) {
        if self.state_machine.process_event(Events::Abort).is_ok() {
            log::debug!("drain aborted");
        }
    }
}
