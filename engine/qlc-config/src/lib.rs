//! Centralized configuration loading from config.toml.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`QLC_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (`config.defaults.toml`)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! QLC_<SECTION>_<KEY>=value
//!
//! Examples:
//!     QLC_COMMON_LOG_LEVEL=debug
//!     QLC_ENGINE_MAX_BRANCHES=128
//!     QLC_ENGINE_EPSILON=1e-20
//!     QLC_ENGINE_SEED=7
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;
