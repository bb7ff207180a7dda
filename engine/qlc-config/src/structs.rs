//! Configuration struct definitions.

use crate::defaults;
use serde::Deserialize;

// Serde default functions (required for #[serde(default = "...")])

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_max_branches() -> usize {
    defaults::max_branches()
}
fn d_epsilon() -> f64 {
    defaults::epsilon()
}
fn d_seed() -> Option<u64> {
    defaults::seed()
}

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Settings shared by every consumer of the engine
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    /// Filter for the tracing subscriber a binary installs around the
    /// engine. The library crates only emit events and install none.
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Branch engine tuning
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on simultaneously tracked branches
    #[serde(default = "d_max_branches")]
    pub max_branches: usize,
    /// Squared-amplitude threshold below which merged branches are dropped
    #[serde(default = "d_epsilon")]
    pub epsilon: f64,
    /// Measurement seed; `None` means draw one per board
    #[serde(default = "d_seed")]
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_branches: defaults::max_branches(),
            epsilon: defaults::epsilon(),
            seed: defaults::seed(),
        }
    }
}
