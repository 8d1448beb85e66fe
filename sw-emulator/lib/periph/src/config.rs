/*++

Licensed under the Apache-2.0 license.

File Name:

    config.rs

Abstract:

    File contains the construction parameters of the histogram device.

--*/

/// What happens to the counters once a drain has emitted bin 63.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DrainPolicy {
    /// Zero the bank, so each drain reports the increments since the last one.
    #[default]
    ClearOnComplete,

    /// Leave the bank untouched.
    Retain,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HistogramConfig {
    /// Cycles `ready` stays low after each accepted write.
    pub write_cooldown_cycles: u32,

    /// Cycles after `rst_n` rises before commands are accepted.
    pub reset_settle_cycles: u64,

    /// Start a drain when an increment leaves a bin at its maximum.
    pub overflow_drain: bool,

    pub drain_policy: DrainPolicy,
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            write_cooldown_cycles: 1,
            reset_settle_cycles: 2,
            overflow_drain: true,
            drain_policy: DrainPolicy::ClearOnComplete,
        }
    }
}
