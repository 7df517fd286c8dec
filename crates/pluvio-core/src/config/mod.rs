//! Engine configuration with layered loading.
//!
//! # Configuration Hierarchy
//!
//! Configuration is loaded in this order (later overrides earlier):
//!
//! 1. **Compiled defaults**: Hardcoded in struct `Default` implementations
//! 2. **Config file**: TOML file specified by `PLUVIO_CONFIG` env var
//! 3. **Environment variables**: `PLUVIO__*` env vars override specific
//!    fields, `__` as the nesting separator
//!    (e.g., `PLUVIO__CONSENSUS__QUORUM=5`)
//!
//! # Configuration Sections
//!
//! - [`ConsensusConfig`]: quorum size and freshness window
//! - [`ReputationConfig`]: deviation tolerance, penalties, suspension
//! - [`HistoryConfig`]: bound on the retained round log
//! - [`LoggingConfig`]: log level and output format
//!
//! Configuration is validated at load time; nonsensical values (zero
//! quorum, non-positive tolerances) return errors rather than failing
//! silently mid-round.
//!
//! # Example
//!
//! ```toml
//! [consensus]
//! quorum = 3
//! freshness_window_seconds = 30
//!
//! [reputation]
//! max_deviation = 10.0
//! suspension_threshold = 30.0
//! ```

use crate::{consensus::ConsensusConfig, errors::EngineError, reputation::ReputationConfig};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Bound on the retained consensus-round log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of consensus records kept; the oldest record is
    /// evicted on overflow. Defaults to `1000`.
    #[serde(default = "default_round_capacity")]
    pub round_capacity: usize,
}

fn default_round_capacity() -> usize {
    1000
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { round_capacity: default_round_capacity() }
    }
}

/// Log level and format settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter. Defaults to `"info"`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format, `"json"` or `"pretty"`. Defaults to `"pretty"`.
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level(), format: default_log_format() }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub consensus: ConsensusConfig,

    #[serde(default)]
    pub reputation: ReputationConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl EngineConfig {
    /// Loads configuration from a TOML file layered over compiled
    /// defaults, then applies `PLUVIO__*` environment overrides. The
    /// file is optional; a missing file yields pure defaults.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] if the file cannot be parsed or
    /// deserialized, or [`EngineError::InvalidConfig`] if validation
    /// fails.
    pub fn from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, EngineError> {
        let builder = Config::builder()
            .set_default("consensus.quorum", 3)?
            .set_default("consensus.freshness_window_seconds", 30)?
            .set_default("reputation.max_deviation", 10.0)?
            .set_default("reputation.suspension_threshold", 30.0)?
            .set_default("reputation.severe_multiplier", 3.0)?
            .set_default("reputation.severe_penalty", 15.0)?
            .set_default("reputation.history_capacity", 100)?
            .set_default("history.round_capacity", 1000)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .add_source(File::with_name(&config_path.as_ref().to_string_lossy()).required(false))
            .add_source(Environment::with_prefix("PLUVIO").separator("__"))
            .build()?;

        let config: Self = builder.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `config/config.toml` with fallback to
    /// defaults. The path can be overridden via `PLUVIO_CONFIG`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] or [`EngineError::InvalidConfig`]
    /// as [`Self::from_file`] does.
    pub fn load() -> Result<Self, EngineError> {
        let config_path =
            std::env::var("PLUVIO_CONFIG").unwrap_or_else(|_| "config/config.toml".to_string());
        Self::from_file(&config_path)
    }

    /// Checks that all values are usable before the engine starts.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.consensus.quorum == 0 {
            return Err(EngineError::InvalidConfig("consensus.quorum must be at least 1".into()));
        }
        if self.consensus.freshness_window_seconds == 0 {
            return Err(EngineError::InvalidConfig(
                "consensus.freshness_window_seconds must be greater than 0".into(),
            ));
        }
        if self.reputation.max_deviation <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "reputation.max_deviation must be greater than 0".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.reputation.suspension_threshold) {
            return Err(EngineError::InvalidConfig(
                "reputation.suspension_threshold must be within [0, 100]".into(),
            ));
        }
        if self.reputation.severe_multiplier <= 1.0 {
            return Err(EngineError::InvalidConfig(
                "reputation.severe_multiplier must be greater than 1".into(),
            ));
        }
        if self.reputation.severe_penalty < 0.0 {
            return Err(EngineError::InvalidConfig(
                "reputation.severe_penalty must not be negative".into(),
            ));
        }
        if self.reputation.history_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "reputation.history_capacity must be greater than 0".into(),
            ));
        }
        if self.history.round_capacity == 0 {
            return Err(EngineError::InvalidConfig(
                "history.round_capacity must be greater than 0".into(),
            ));
        }
        match self.logging.format.as_str() {
            "json" | "pretty" => Ok(()),
            other => Err(EngineError::InvalidConfig(format!(
                "logging.format must be \"json\" or \"pretty\", got \"{other}\""
            ))),
        }
    }
}

/// Installs the global tracing subscriber for embedders that do not
/// bring their own. Level comes from `RUST_LOG` when set, otherwise
/// from the configuration.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,pluvio_core={}", config.level)));

    let registry = tracing_subscriber::registry().with(filter);
    if config.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
