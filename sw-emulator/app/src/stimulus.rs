/*++

Licensed under the Apache-2.0 license.

File Name:

   stimulus.rs

Abstract:

    File contains the stimulus file format and the runner that plays it
    against a histogram model.

--*/

use anyhow::{anyhow, Context};
use histogram_emu_periph::BIN_COUNT;
use histogram_hw_model::{DrainCapture, HwModel, WRITE_BIN_CYCLES};
use serde_derive::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;

fn default_count() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_reset_cycles() -> u64 {
    10
}

fn default_timeout() -> u64 {
    5000
}

/// One stimulus step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub(crate) enum Step {
    /// Present `count` increment commands for `bin`
    Write {
        bin: u8,
        #[serde(default = "default_count")]
        count: u32,
        #[serde(default = "default_true")]
        write_enable: bool,
    },

    /// Pulse the manual drain request
    Get,

    Reset {
        #[serde(default = "default_reset_cycles")]
        cycles: u64,
    },

    Idle { cycles: u64 },

    /// Drive the `ena` pin
    Enable { ena: bool },

    /// Wait for the next complete drain and print it
    Capture {
        #[serde(default = "default_timeout")]
        timeout: u64,
    },
}

#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Stimulus {
    #[serde(rename = "step", default)]
    pub steps: Vec<Step>,
}

/// Load Stimulus from file
pub(crate) fn load_stimulus(path: &Path) -> anyhow::Result<Stimulus> {
    let stimulus_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the stimulus file {}", path.display()))?;

    let stimulus: Stimulus = toml::from_str(&stimulus_str)
        .with_context(|| format!("Failed to parse stimulus file {}", path.display()))?;

    Ok(stimulus)
}

/// Clock cycles the runner may still spend before reaching `--max-cycles`.
struct CycleBudget {
    max_cycles: u64,
}

impl CycleBudget {
    fn remaining(&self, model: &impl HwModel) -> u64 {
        self.max_cycles.saturating_sub(model.cycle_count())
    }

    fn exceeded(&self, model: &impl HwModel, step: usize) -> anyhow::Error {
        anyhow!(
            "step {step}: exceeded {} cycles (at {})",
            self.max_cycles,
            model.cycle_count()
        )
    }

    /// Fails unless `cycles` more cycles fit in the budget.
    fn reserve(&self, model: &impl HwModel, step: usize, cycles: u64) -> anyhow::Result<()> {
        if cycles > self.remaining(model) {
            return Err(self.exceeded(model, step));
        }
        Ok(())
    }
}

/// Plays `stimulus` against `model`, printing every captured drain to `out`.
/// The model never runs past `max_cycles`.
pub(crate) fn run(
    model: &mut impl HwModel,
    stimulus: &Stimulus,
    max_cycles: u64,
    out: &mut impl Write,
) -> anyhow::Result<Vec<DrainCapture>> {
    let budget = CycleBudget { max_cycles };
    let mut captures = vec![];
    for (i, step) in stimulus.steps.iter().enumerate() {
        log::debug!("step {i}: {step:?}");
        match *step {
            Step::Write {
                bin,
                count,
                write_enable,
            } => {
                for _ in 0..count {
                    budget.reserve(model, i, WRITE_BIN_CYCLES)?;
                    model.write_bin(bin, write_enable);
                }
            }
            Step::Get => {
                budget.reserve(model, i, 1)?;
                model.request_drain();
            }
            Step::Reset { cycles } => {
                if !model.reset_within(cycles, budget.remaining(model)) {
                    return Err(budget.exceeded(model, i));
                }
            }
            Step::Idle { cycles } => {
                let remaining = budget.remaining(model);
                model.step_n(cycles.min(remaining));
                if cycles > remaining {
                    return Err(budget.exceeded(model, i));
                }
            }
            Step::Enable { ena } => model.set_enable(ena),
            Step::Capture { timeout } => {
                let remaining = budget.remaining(model);
                let capture = match model.capture_drain(timeout.min(remaining)) {
                    Ok(capture) => capture,
                    Err(_) if timeout > remaining => return Err(budget.exceeded(model, i)),
                    Err(e) => Err(e).with_context(|| format!("step {i}: capture failed"))?,
                };
                print_capture(out, captures.len(), &capture)?;
                for (bin, value) in capture.nonzero() {
                    log::info!("bin {bin}: {value}");
                }
                captures.push(capture);
            }
        }
    }
    Ok(captures)
}

const TABLE_COLUMNS: usize = 8;

fn print_capture(out: &mut impl Write, n: usize, capture: &DrainCapture) -> std::io::Result<()> {
    writeln!(
        out,
        "drain {n} (cycles {}..={}):",
        capture.start_cycle, capture.end_cycle
    )?;
    for row in (0..BIN_COUNT).step_by(TABLE_COLUMNS) {
        write!(out, "  {row:>2}:")?;
        for value in &capture.values[row..row + TABLE_COLUMNS] {
            write!(out, " {value:>3}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}
