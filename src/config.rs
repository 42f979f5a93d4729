//! Configuration System
//!
//! Provides hierarchical configuration loading from:
//! - groundflow.toml (default configuration)
//! - groundflow.local.toml (git-ignored local overrides)
//! - Environment variables (GROUNDFLOW_* prefix)
//!
//! ## Example
//!
//! ```toml
//! # groundflow.toml
//! [grounding]
//! parallel_kernels = true
//! default_activation = false
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```
//!
//! Environment variable overrides:
//! ```bash
//! GROUNDFLOW_GROUNDING__PARALLEL_KERNELS=false
//! GROUNDFLOW_LOGGING__LEVEL=trace
//! ```

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main configuration struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grounding: GroundingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Grounding pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundingConfig {
    /// Ground independent rule kernels in parallel
    #[serde(default = "default_true")]
    pub parallel_kernels: bool,

    /// Worker threads for parallel grounding (0 = all available cores)
    #[serde(default)]
    pub num_threads: usize,

    /// Row-capacity hint for materialized query results
    #[serde(default = "default_result_capacity")]
    pub initial_result_capacity: usize,

    /// Whether newly interned atoms start active.
    /// `false` gives lazy grounding driven entirely by activation events.
    #[serde(default = "default_true")]
    pub default_activation: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

// Default value functions
fn default_true() -> bool {
    true
}
fn default_result_capacity() -> usize {
    1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "text".to_string()
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Merges in order:
    /// 1. groundflow.toml (base configuration)
    /// 2. groundflow.local.toml (local overrides, git-ignored)
    /// 3. Environment variables (GROUNDFLOW_* prefix)
    pub fn load() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file("groundflow.toml"))
            .merge(Toml::file("groundflow.local.toml"))
            .merge(Env::prefixed("GROUNDFLOW_").split("__"))
            .extract()
    }

    /// Load configuration from a specific file path
    pub fn from_file(path: &str) -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("GROUNDFLOW_").split("__"))
            .extract()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grounding: GroundingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for GroundingConfig {
    fn default() -> Self {
        GroundingConfig {
            parallel_kernels: true,
            num_threads: 0, // 0 = use all available CPU cores
            initial_result_capacity: default_result_capacity(),
            default_activation: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}
