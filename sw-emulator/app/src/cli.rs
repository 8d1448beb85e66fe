// Licensed under the Apache-2.0 license

use clap::{ArgAction, Parser, ValueEnum};
use histogram_emu_periph::DrainPolicy;
use log::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, arg_required_else_help = true)]
pub struct Args {
    /// Stimulus file (TOML list of steps)
    #[arg(long)]
    pub stimulus: PathBuf,

    /// Device configuration file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Write a per-cycle pin trace to this file
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Abort once the model has run this many clock cycles
    #[arg(long, default_value_t = 1_000_000)]
    pub max_cycles: u64,

    /// Cycles ready stays low after each accepted write
    #[arg(long)]
    pub write_cooldown_cycles: Option<u32>,

    /// Cycles after reset release before writes are accepted
    #[arg(long)]
    pub reset_settle_cycles: Option<u64>,

    /// Only drain on an explicit get request
    #[arg(long)]
    pub no_overflow_drain: bool,

    /// What happens to the counters after a drain completes
    #[arg(long, value_enum)]
    pub drain_policy: Option<ArgsDrainPolicy>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum ArgsDrainPolicy {
    Clear,
    Retain,
}

impl From<ArgsDrainPolicy> for DrainPolicy {
    fn from(value: ArgsDrainPolicy) -> Self {
        match value {
            ArgsDrainPolicy::Clear => DrainPolicy::ClearOnComplete,
            ArgsDrainPolicy::Retain => DrainPolicy::Retain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_args() {
        let args = Args::parse_from([
            "histogram-emu",
            "--stimulus",
            "run.toml",
            "--drain-policy",
            "retain",
            "--no-overflow-drain",
            "-vv",
        ]);
        assert_eq!(args.stimulus, PathBuf::from("run.toml"));
        assert_eq!(args.drain_policy, Some(ArgsDrainPolicy::Retain));
        assert!(args.no_overflow_drain);
        assert_eq!(args.max_cycles, 1_000_000);
        assert_eq!(args.log_level(), LevelFilter::Debug);
    }
}
