//! Engine configuration file support.
//!
//! Reads engine settings from a TOML file (`engine.toml`) or environment
//! variables: repository backend selection, the booking lock acquisition
//! timeout, and an optional slot step override for finer-grained slot
//! offers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::repository::RepositoryError;

/// Engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub booking: BookingSettings,
    #[serde(default)]
    pub slots: SlotSettings,
}

/// Repository backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(default = "default_backend")]
    pub backend: String,
}

/// Booking conflict-guard settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingSettings {
    /// Maximum time to wait for the per-organizer booking lock before
    /// failing fast, in milliseconds.
    #[serde(default = "default_lock_wait_ms")]
    pub lock_wait_ms: u64,
}

/// Slot generation settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotSettings {
    /// Step between offered slot starts, in minutes. Defaults to the event
    /// type's duration (no overlapping offers).
    #[serde(default)]
    pub step_minutes: Option<i64>,
}

fn default_backend() -> String {
    "local".to_string()
}

fn default_lock_wait_ms() -> u64 {
    5_000
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
        }
    }
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            lock_wait_ms: default_lock_wait_ms(),
        }
    }
}

impl EngineConfig {
    /// Load engine configuration from a TOML file.
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file
    ///
    /// # Returns
    /// * `Ok(EngineConfig)` if successful
    /// * `Err(RepositoryError)` if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            RepositoryError::configuration(format!("Failed to read config file: {}", e))
        })?;

        let config: EngineConfig = toml::from_str(&content).map_err(|e| {
            RepositoryError::configuration(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Load engine configuration from the default location.
    ///
    /// Searches for `engine.toml` in the current directory and its parent,
    /// falling back to defaults when no file exists.
    pub fn from_default_location() -> Result<Self, RepositoryError> {
        let search_paths = [
            PathBuf::from("engine.toml"),
            PathBuf::from("../engine.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Apply environment-variable overrides (`MEETX_REPOSITORY`,
    /// `MEETX_LOCK_WAIT_MS`, `MEETX_SLOT_STEP_MINUTES`).
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(backend) = std::env::var("MEETX_REPOSITORY") {
            self.repository.backend = backend;
        }
        if let Some(wait) = env_parse("MEETX_LOCK_WAIT_MS") {
            self.booking.lock_wait_ms = wait;
        }
        if let Some(step) = env_parse("MEETX_SLOT_STEP_MINUTES") {
            self.slots.step_minutes = Some(step);
        }
        self
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
