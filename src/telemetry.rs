//! Tracing Setup
//!
//! Installs the global tracing subscriber from [`LoggingConfig`]. Safe to
//! call more than once; later calls are no-ops.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Initialize the global subscriber with the configured level and format.
pub fn init(config: &LoggingConfig) {
    let filter = EnvFilter::try_new(&config.level).unwrap_or_else(|_| EnvFilter::new("info"));

    let result = if config.format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };
    // a subscriber installed by the embedder wins
    let _ = result;
}
