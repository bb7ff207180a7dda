//! Default configuration values loaded from config.defaults.toml.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    engine: EngineDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct EngineDefaults {
    max_branches: usize,
    epsilon: f64,
    #[serde(default)]
    seed: Option<u64>,
}

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Engine
pub fn max_branches() -> usize {
    DEFAULTS.engine.max_branches
}
pub fn epsilon() -> f64 {
    DEFAULTS.engine.epsilon
}
pub fn seed() -> Option<u64> {
    DEFAULTS.engine.seed
}
