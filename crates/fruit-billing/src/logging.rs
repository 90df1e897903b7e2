//! Tracing subscriber initialisation.
//!
//! ## Log Levels
//! - `RUST_LOG=debug` - Show debug messages (wins over configuration)
//! - `RUST_LOG=fruit_core=debug` - Show matching detail only
//! - Otherwise `logging.level` / `FRUIT_LOG_LEVEL`

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

fn build_env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},redis=warn", settings.level)))
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init(settings: &LoggingSettings) -> Result<(), TryInitError> {
    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(settings))
        .with_target(true)
        .finish()
        .try_init()
}
