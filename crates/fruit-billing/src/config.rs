//! # Billing Configuration
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     FRUIT_REDIS_URL=redis://cache:6379                                 │
//! │     FRUIT_DISCOUNT_TTL_SECS=3600                                       │
//! │     FRUIT_DISCOUNT_LOOKUP_POLICY=degrade                               │
//! │     FRUIT_LOG_LEVEL=debug                                              │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     --config <path>, else $FRUIT_CONFIG, else ./fruit.toml             │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     local Redis, 1 hour TTL, fail policy, no store-wide sales         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [redis]
//! url = "redis://127.0.0.1:6379"
//!
//! [discount]
//! ttl_secs = 3600
//! lookup_policy = "fail"   # fail | degrade
//!
//! [logging]
//! level = "info"
//!
//! # Store-wide sales, evaluated in this order after the personal discount
//! [[sales]]
//! rule = "eq"
//! discountPercent = 30
//! requiredUnits = { Pears = 4, Bananas = 2 }
//!
//! [[sales]]
//! rule = "more"
//! discountPercent = 10
//! requiredUnits = { Apples = 7 }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use fruit_core::validation::validate_sale;
use fruit_core::{GeneralSale, ValidationError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Config file used when no path is given and `FRUIT_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "fruit.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// A `[[sales]]` entry failed validation (index is zero based).
    #[error("Invalid store-wide sale #{index}: {source}")]
    InvalidSale {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

// =============================================================================
// Lookup Policy
// =============================================================================

/// What pricing does when the personal discount cannot be read.
///
/// ```text
/// FAIL (default)  → the request fails with the store error
/// DEGRADE         → logged at error level, priced without the discount
/// ```
///
/// A missing discount is never a failure under either policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountLookupPolicy {
    #[default]
    Fail,
    Degrade,
}

impl std::fmt::Display for DiscountLookupPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountLookupPolicy::Fail => write!(f, "fail"),
            DiscountLookupPolicy::Degrade => write!(f, "degrade"),
        }
    }
}

impl std::str::FromStr for DiscountLookupPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fail" => Ok(DiscountLookupPolicy::Fail),
            "degrade" => Ok(DiscountLookupPolicy::Degrade),
            other => Err(ConfigError::Invalid(format!(
                "Unknown discount lookup policy: '{}'. Valid options: fail, degrade",
                other
            ))),
        }
    }
}

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisSettings {
    #[serde(default = "default_redis_url")]
    pub url: String,
}

fn default_redis_url() -> String {
    "redis://127.0.0.1:6379".to_string()
}

impl Default for RedisSettings {
    fn default() -> Self {
        RedisSettings {
            url: default_redis_url(),
        }
    }
}

/// Personal discount settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountSettings {
    /// How long a claimed discount stays active (seconds).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,

    #[serde(default)]
    pub lookup_policy: DiscountLookupPolicy,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for DiscountSettings {
    fn default() -> Self {
        DiscountSettings {
            ttl_secs: default_ttl_secs(),
            lookup_policy: DiscountLookupPolicy::default(),
        }
    }
}

impl DiscountSettings {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset, e.g. `info` or
    /// `fruit_core=debug,info`.
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: default_log_level(),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete billing configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BillingConfig {
    #[serde(default)]
    pub redis: RedisSettings,

    #[serde(default)]
    pub discount: DiscountSettings,

    #[serde(default)]
    pub logging: LoggingSettings,

    /// Store-wide sales in evaluation order.
    #[serde(default)]
    pub sales: Vec<GeneralSale>,
}

impl BillingConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file: `config_path` (must exist), else `$FRUIT_CONFIG`
    ///    (must exist), else `./fruit.toml` if present
    /// 3. Environment variables
    ///
    /// The result is validated before it is returned.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let explicit = config_path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("FRUIT_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None => {
                let path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides()?;
        config.validate()?;

        info!(
            sales = config.sales.len(),
            ttl_secs = config.discount.ttl_secs,
            lookup_policy = %config.discount.lookup_policy,
            "Billing configuration loaded"
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!(?path, "Loading billing config from file");
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses TOML without applying overrides or validation.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.redis.url;
        if !url.starts_with("redis://") && !url.starts_with("rediss://") && !url.starts_with("unix://") {
            return Err(ConfigError::Invalid(format!(
                "Redis URL must start with redis://, rediss:// or unix://, got: {}",
                url
            )));
        }

        if self.discount.ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "discount.ttl_secs must be greater than 0".into(),
            ));
        }

        if EnvFilter::try_new(&self.logging.level).is_err() {
            return Err(ConfigError::Invalid(format!(
                "logging.level is not a valid filter: {}",
                self.logging.level
            )));
        }

        for (index, sale) in self.sales.iter().enumerate() {
            validate_sale(sale).map_err(|source| ConfigError::InvalidSale { index, source })?;
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from any `FRUIT_*` lookup.
    ///
    /// Unparsable values are rejected with `ConfigError::Invalid`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("FRUIT_REDIS_URL") {
            debug!("Overriding Redis URL from environment");
            self.redis.url = url;
        }

        if let Some(ttl) = lookup("FRUIT_DISCOUNT_TTL_SECS") {
            self.discount.ttl_secs = ttl.parse::<u64>().map_err(|_| {
                ConfigError::Invalid(format!(
                    "FRUIT_DISCOUNT_TTL_SECS must be a whole number of seconds, got: {}",
                    ttl
                ))
            })?;
        }

        if let Some(policy) = lookup("FRUIT_DISCOUNT_LOOKUP_POLICY") {
            let parsed: DiscountLookupPolicy = policy.parse().map_err(|e| match e {
                ConfigError::Invalid(msg) => ConfigError::Invalid(format!("FRUIT_DISCOUNT_LOOKUP_POLICY: {}", msg)),
                other => other,
            })?;
            debug!(policy = %parsed, "Overriding lookup policy from environment");
            self.discount.lookup_policy = parsed;
        }

        if let Some(level) = lookup("FRUIT_LOG_LEVEL") {
            self.logging.level = level;
        }

        Ok(())
    }
}
