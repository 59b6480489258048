//! PIN gate configuration persistence
//!
//! Loads and saves the integrator-facing constants: PIN length, lockout
//! policy, countdown period and the credential key.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::lockout::LockoutPolicy;
use crate::{
    DEFAULT_COUNTDOWN_TICK_MS, DEFAULT_LOCKOUT_DURATION_MS, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_PIN_LENGTH, SECURE_KEY,
};

/// Configuration file name
const CONFIG_FILE_NAME: &str = "config.json";

/// Configuration directory under ~/.config
const CONFIG_DIR_NAME: &str = "photo-lab";

/// Shortest PIN accepted
pub const MIN_PIN_LENGTH: usize = 4;

/// Longest PIN accepted
pub const MAX_PIN_LENGTH: usize = 12;

/// PIN gate configuration that persists across sessions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinConfig {
    /// Number of digits in a PIN
    #[serde(default = "default_pin_length")]
    pub pin_length: usize,

    /// Failed checks before a lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Lockout window in milliseconds
    #[serde(default = "default_lockout_duration_ms")]
    pub lockout_duration_ms: u64,

    /// Countdown scheduler period in milliseconds
    #[serde(default = "default_countdown_tick_ms")]
    pub countdown_tick_ms: u64,

    /// Submit as soon as the last digit is entered
    #[serde(default = "default_auto_submit")]
    pub auto_submit: bool,

    /// Key the PIN is stored under
    #[serde(default = "default_store_key")]
    pub store_key: String,
}

fn default_pin_length() -> usize {
    DEFAULT_PIN_LENGTH
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_lockout_duration_ms() -> u64 {
    DEFAULT_LOCKOUT_DURATION_MS
}

fn default_countdown_tick_ms() -> u64 {
    DEFAULT_COUNTDOWN_TICK_MS
}

fn default_auto_submit() -> bool {
    true
}

fn default_store_key() -> String {
    SECURE_KEY.to_string()
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            pin_length: default_pin_length(),
            max_attempts: default_max_attempts(),
            lockout_duration_ms: default_lockout_duration_ms(),
            countdown_tick_ms: default_countdown_tick_ms(),
            auto_submit: default_auto_submit(),
            store_key: default_store_key(),
        }
    }
}

impl PinConfig {
    /// Lockout window
    pub fn lockout_duration(&self) -> Duration {
        Duration::from_millis(self.lockout_duration_ms)
    }

    /// Countdown scheduler period
    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    /// Lockout policy built from this configuration
    pub fn lockout_policy(&self) -> LockoutPolicy {
        LockoutPolicy::new(self.max_attempts, self.lockout_duration())
    }

    /// Reject values the entry surface cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PIN_LENGTH..=MAX_PIN_LENGTH).contains(&self.pin_length) {
            return Err(ConfigError::Invalid(format!(
                "pin_length must be between {} and {}",
                MIN_PIN_LENGTH, MAX_PIN_LENGTH
            )));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.lockout_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "lockout_duration_ms must be positive".to_string(),
            ));
        }
        if self.countdown_tick_ms == 0 {
            return Err(ConfigError::Invalid(
                "countdown_tick_ms must be positive".to_string(),
            ));
        }
        if self.store_key.is_empty() {
            return Err(ConfigError::Invalid(
                "store_key must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the configuration directory path
    pub fn config_dir() -> Option<PathBuf> {
        // Try XDG_CONFIG_HOME first, then fall back to ~/.config
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            return Some(PathBuf::from(xdg_config).join(CONFIG_DIR_NAME));
        }

        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME))
    }

    /// Get the full config file path
    pub fn config_file_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location
    ///
    /// Returns default configuration if the file doesn't exist or can't be used.
    pub fn load() -> Self {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from `path`
    ///
    /// Returns default configuration if the file doesn't exist or can't be used.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let config: Self = match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                    return Self::default();
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file {:?}: {}", path, e);
                return Self::default();
            }
        };

        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Ignoring config file {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_file = Self::config_file_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&config_file)
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        fs::write(path, contents).map_err(|e| ConfigError::Io(e.to_string()))?;

        tracing::debug!("Saved config to {:?}", path);
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
