//! # vigil-config
//!
//! Layered configuration loading for Vigil using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Bare deployment variables (`EVENT_FEED_MAX_LIMIT`, `FILE_LOCK_MAX_RETRIES`, ...)
//! 2. Environment variables (`VIGIL_*` prefix, `__` as separator)
//! 3. Project-level `.vigil/config.toml`
//! 4. User-level `~/.config/vigil/config.toml`
//! 5. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VIGIL_EVENT_FEED__MAX_LIMIT` -> `event_feed.max_limit`,
//! `VIGIL_FILE_LOCK__MAX_RETRIES` -> `file_lock.max_retries`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! Every loader validates the result; an inconsistent configuration fails at
//! startup instead of at the first request.
//!
//! # Usage
//!
//! ```no_run
//! use vigil_config::VigilConfig;
//!
//! let config = VigilConfig::load_with_dotenv().expect("config");
//! println!("feed page cap: {}", config.event_feed.max_limit);
//! ```

mod error;
mod event_feed;
mod file_lock;
mod findings;
mod fusion;
mod storage;

pub use error::ConfigError;
pub use event_feed::{EventFeedConfig, PollConfig};
pub use file_lock::FileLockConfig;
pub use findings::FindingsConfig;
pub use fusion::FusionConfig;
pub use storage::StorageConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::Uncased,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Deployment-style variable names and the config keys they set.
const BARE_ENV_KEYS: &[(&str, &str)] = &[
    ("EVENT_FEED_DEFAULT_LIMIT", "event_feed.default_limit"),
    ("EVENT_FEED_MAX_LIMIT", "event_feed.max_limit"),
    ("EVENT_FEED_CURSOR_EXPIRY_DAYS", "event_feed.cursor_expiry_days"),
    ("FILE_LOCK_MAX_RETRIES", "file_lock.max_retries"),
    ("FILE_LOCK_BASE_BACKOFF_MS", "file_lock.base_backoff_ms"),
    ("FILE_LOCK_MAX_BACKOFF_MS", "file_lock.max_backoff_ms"),
];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VigilConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub event_feed: EventFeedConfig,
    #[serde(default)]
    pub file_lock: FileLockConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub findings: FindingsConfig,
}

impl VigilConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed, or
    /// `ConfigError::InvalidValue` if the merged values are inconsistent.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the figment provider chain.
    ///
    /// This is public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".vigil/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment
            .merge(Env::prefixed("VIGIL_").split("__"))
            .merge(Self::bare_env())
    }

    /// Provider for the un-prefixed deployment variables.
    fn bare_env() -> Env {
        Env::raw().filter_map(|key| {
            BARE_ENV_KEYS
                .iter()
                .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
                .map(|(_, path)| Uncased::from(*path))
        })
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vigil").join("config.toml"))
    }

    /// Reject values that would make the store misbehave at runtime.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.database_path.trim().is_empty() {
            return Err(ConfigError::invalid("storage.database_path", "must not be empty"));
        }

        let feed = &self.event_feed;
        if feed.max_limit == 0 {
            return Err(ConfigError::invalid("event_feed.max_limit", "must be at least 1"));
        }
        if feed.default_limit == 0 || feed.default_limit > feed.max_limit {
            return Err(ConfigError::invalid(
                "event_feed.default_limit",
                format!("must be between 1 and max_limit ({})", feed.max_limit),
            ));
        }
        if feed.cursor_expiry_days == 0 {
            return Err(ConfigError::invalid(
                "event_feed.cursor_expiry_days",
                "must be at least 1",
            ));
        }
        if feed.poll.active_secs > feed.poll.idle_secs {
            return Err(ConfigError::invalid(
                "event_feed.poll.active_secs",
                "must not exceed poll.idle_secs",
            ));
        }

        let lock = &self.file_lock;
        if lock.max_retries < 2 {
            return Err(ConfigError::invalid(
                "file_lock.max_retries",
                "must be at least 2 so a held lock is retried",
            ));
        }
        if lock.base_backoff_ms == 0 {
            return Err(ConfigError::invalid("file_lock.base_backoff_ms", "must be at least 1"));
        }
        if lock.max_backoff_ms < lock.base_backoff_ms {
            return Err(ConfigError::invalid(
                "file_lock.max_backoff_ms",
                "must be >= base_backoff_ms",
            ));
        }

        let fusion = &self.fusion;
        for (field, value) in [
            ("fusion.high_variance_threshold", fusion.high_variance_threshold),
            ("fusion.discordance_threshold", fusion.discordance_threshold),
            ("fusion.discordance_min_confidence", fusion.discordance_min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, "must be within [0, 1]"));
            }
        }

        Ok(())
    }
}
