/*++

Licensed under the Apache-2.0 license.

File Name:

    clock.rs

Abstract:

    File contains Clock and Timer types, used to implement timer-based deferred
    execution for peripherals.

--*/
use std::{
    cell::{Cell, RefCell},
    collections::BTreeMap,
    rc::Rc,
};

use crate::Bus;

/// Peripherals that want to use timer-based deferred execution store a clone
/// of Timer inside themselves, and use it to schedule a future notification
/// via [`Bus::poll`].
///
/// # Example
///
/// ```
/// use histogram_emu_bus::{Bus, BusError, Clock, Timer, ActionHandle};
/// use histogram_emu_types::{EmuAddr, EmuData, EmuSize};
/// struct SettleWindow {
///     timer: Timer,
///     settle: Option<ActionHandle>,
///     settled: bool,
/// }
/// impl Bus for SettleWindow {
///     fn read(&mut self, _: EmuSize, _: EmuAddr) -> Result<EmuData, BusError> {
///         Ok(self.settled as EmuData)
///     }
///     fn write(&mut self, _: EmuSize, _: EmuAddr, _: EmuData) -> Result<(), BusError> {
///         if let Some(settle) = self.settle.take() {
///             self.timer.cancel(settle);
///         }
///         self.settled = false;
///         self.settle = Some(self.timer.schedule_poll_in(10));
///         Ok(())
///     }
///     fn poll(&mut self) {
///         if self.timer.fired(&mut self.settle) {
///             self.settled = true;
///         }
///     }
/// }
///
/// let clock = Clock::new();
/// let mut periph = SettleWindow { timer: clock.timer(), settle: None, settled: false };
/// periph.write(EmuSize::Byte, 0, 0).unwrap();
/// clock.increment_and_process_timer_actions(9, &mut periph);
/// assert!(!periph.settled);
/// clock.increment_and_process_timer_actions(1, &mut periph);
/// assert!(periph.settled);
/// ```
#[derive(Clone)]
pub struct Timer {
    clock: Rc<ClockImpl>,
}
impl Timer {
    /// Constructs a new timer bound to the specified clock.
    pub fn new(clock: &Clock) -> Self {
        Self {
            clock: Rc::clone(&clock.clock),
        }
    }

    /// Returns the number of clock cycles that have elapsed since
    /// simulation start.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// If the scheduled time for `action` has come, `action` will be set to
    /// None and the function will return true. Otherwise (or if action is None),
    /// the function will return false.
    pub fn fired(&self, action: &mut Option<ActionHandle>) -> bool {
        let has_fired = match action {
            Some(handle) => {
                debug_assert!(
                    std::ptr::eq(handle.clock, Rc::as_ptr(&self.clock)),
                    "Supplied action was not created by this timer."
                );
                handle.time <= self.now()
            }
            None => false,
        };
        if has_fired {
            *action = None;
        }
        has_fired
    }

    /// Schedules a call to [`Bus::poll()`] `ticks_from_now` cycles in the
    /// future.
    pub fn schedule_poll_in(&self, ticks_from_now: u64) -> ActionHandle {
        self.schedule_action_in(ticks_from_now, TimerAction::Poll)
    }

    /// Schedules `action` `ticks_from_now` cycles in the future.
    pub fn schedule_action_in(&self, ticks_from_now: u64, action: TimerAction) -> ActionHandle {
        self.clock
            .schedule_action_at(self.now() + ticks_from_now, action)
    }

    /// Cancels a previously scheduled action.
    ///
    /// # Panics
    ///
    /// Panics if the supplied `ActionHandle` was not created by this Timer.
    pub fn cancel(&self, handle: ActionHandle) {
        self.clock.cancel(handle)
    }
}

pub struct Clock {
    clock: Rc<ClockImpl>,
}
impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
impl Clock {
    /// Constructs a new Clock with the cycle counter set to 0.
    pub fn new() -> Clock {
        Self {
            clock: Rc::new(ClockImpl::default()),
        }
    }

    /// Constructs a `Timer` associated with this clock.
    pub fn timer(&self) -> Timer {
        Timer::new(self)
    }

    /// Returns the number of simulated clock cycles that have elapsed since
    /// simulation start.
    #[inline]
    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Increments the clock by `delta`, and returns the timer actions that
    /// fired, in the order they were due.
    pub fn increment(&self, delta: u64) -> Vec<TimerAction> {
        self.clock.increment(delta)
    }

    /// Increments the clock by `delta`, and notifies the bus of any
    /// scheduled timer actions that fired.
    pub fn increment_and_process_timer_actions(
        &self,
        delta: u64,
        bus: &mut impl Bus,
    ) -> Vec<TimerAction> {
        let fired_actions = self.increment(delta);
        for action in fired_actions.iter() {
            match action {
                TimerAction::Poll => bus.poll(),
                TimerAction::WarmReset => {
                    bus.warm_reset();
                    break;
                }
            }
        }
        fired_actions
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum TimerAction {
    Poll,
    WarmReset,
}

/// Represents an action scheduled with a `Timer`. Returned by
/// [`Timer::schedule_poll_in`] and passed to [`Timer::fired()`] or
/// [`Timer::cancel`].
#[derive(Debug)]
pub struct ActionHandle {
    time: u64,
    id: u64,
    /// Identifies the clock the action was scheduled on. Never dereferenced.
    clock: *const ClockImpl,
}

#[derive(Default)]
struct ClockImpl {
    now: Cell<u64>,
    next_action_id: Cell<u64>,
    /// Pending actions keyed by (due time, id).
    actions: RefCell<BTreeMap<(u64, u64), TimerAction>>,
}
impl ClockImpl {
    #[inline]
    fn now(&self) -> u64 {
        self.now.get()
    }

    fn increment(&self, delta: u64) -> Vec<TimerAction> {
        let now = self
            .now()
            .checked_add(delta)
            .expect("Cannot increment the clock past u64::MAX cycles.");
        self.now.set(now);

        let mut actions = self.actions.borrow_mut();
        let pending = actions.split_off(&(now + 1, 0));
        let fired = std::mem::replace(&mut *actions, pending);
        fired.into_values().collect()
    }

    fn schedule_action_at(self: &Rc<Self>, time: u64, action: TimerAction) -> ActionHandle {
        let id = self.next_action_id.get();
        self.next_action_id.set(id + 1);
        self.actions.borrow_mut().insert((time, id), action);
        ActionHandle {
            time,
            id,
            clock: Rc::as_ptr(self),
        }
    }

    fn cancel(self: &Rc<Self>, handle: ActionHandle) {
        assert!(
            std::ptr::eq(handle.clock, Rc::as_ptr(self)),
            "Supplied action was not created by this timer."
        );
        self.actions.borrow_mut().remove(&(handle.time, handle.id));
    }
}
