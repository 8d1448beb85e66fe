/*++

Licensed under the Apache-2.0 license.

File Name:

   config.rs

Abstract:

    File contains utilities for parsing the device configuration file

--*/

use anyhow::Context;
use histogram_emu_periph::{DrainPolicy, HistogramConfig};
use serde_derive::{Deserialize, Serialize};
use std::path::Path;

use crate::cli::Args;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum DrainPolicyConfig {
    Clear,
    Retain,
}

impl From<DrainPolicyConfig> for DrainPolicy {
    fn from(value: DrainPolicyConfig) -> Self {
        match value {
            DrainPolicyConfig::Clear => DrainPolicy::ClearOnComplete,
            DrainPolicyConfig::Retain => DrainPolicy::Retain,
        }
    }
}

/// Device Configuration. Fields left out keep their defaults.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct DeviceConfig {
    pub write_cooldown_cycles: Option<u32>,

    pub reset_settle_cycles: Option<u64>,

    pub overflow_drain: Option<bool>,

    pub drain_policy: Option<DrainPolicyConfig>,
}

impl DeviceConfig {
    fn apply(&self, config: &mut HistogramConfig) {
        if let Some(cycles) = self.write_cooldown_cycles {
            config.write_cooldown_cycles = cycles;
        }
        if let Some(cycles) = self.reset_settle_cycles {
            config.reset_settle_cycles = cycles;
        }
        if let Some(overflow_drain) = self.overflow_drain {
            config.overflow_drain = overflow_drain;
        }
        if let Some(policy) = self.drain_policy {
            config.drain_policy = policy.into();
        }
    }
}

/// Load Device Configuration from file
pub(crate) fn load_device_config(path: &Path) -> anyhow::Result<DeviceConfig> {
    let config_str = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read the config file {}", path.display()))?;

    parse_device_config(&config_str)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn parse_device_config(s: &str) -> anyhow::Result<DeviceConfig> {
    Ok(toml::from_str(s)?)
}

/// Builds the device configuration: defaults, then the config file, then
/// command-line flags.
pub(crate) fn resolve(args: &Args) -> anyhow::Result<HistogramConfig> {
    let mut config = HistogramConfig::default();
    if let Some(path) = &args.config {
        load_device_config(path)?.apply(&mut config);
    }
    override_from_args(args, &mut config);
    Ok(config)
}

fn override_from_args(args: &Args, config: &mut HistogramConfig) {
    if let Some(cycles) = args.write_cooldown_cycles {
        config.write_cooldown_cycles = cycles;
    }
    if let Some(cycles) = args.reset_settle_cycles {
        config.reset_settle_cycles = cycles;
    }
    if args.no_overflow_drain {
        config.overflow_drain = false;
    }
    if let Some(policy) = args.drain_policy {
        config.drain_policy = policy.into();
    }
}
