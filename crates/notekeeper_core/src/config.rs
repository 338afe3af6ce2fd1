//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe tunables for the note facade.
//! - Parse host-provided JSON into validated settings.
//!
//! # Invariants
//! - Missing fields fall back to defaults; unknown fields are rejected.
//! - A validated config never carries a zero stop timeout.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Default grace period before an unobserved facade stops relaying.
pub const DEFAULT_SUBSCRIPTION_STOP_TIMEOUT_MS: u64 = 5_000;
const MAX_SUBSCRIPTION_STOP_TIMEOUT_MS: u64 = 60_000;

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    /// Input is not valid config JSON.
    Parse(serde_json::Error),
    /// Input parsed but a value is out of range.
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Tunables for the note facade.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// How long the facade keeps relaying store updates after its last
    /// observer detaches, in milliseconds.
    pub subscription_stop_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            subscription_stop_timeout_ms: DEFAULT_SUBSCRIPTION_STOP_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Parses and validates config JSON.
    ///
    /// An empty or whitespace-only input yields the defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.subscription_stop_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "subscription_stop_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if self.subscription_stop_timeout_ms > MAX_SUBSCRIPTION_STOP_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "subscription_stop_timeout_ms must be at most {MAX_SUBSCRIPTION_STOP_TIMEOUT_MS}"
            )));
        }
        Ok(())
    }

    pub fn subscription_stop_timeout(&self) -> Duration {
        Duration::from_millis(self.subscription_stop_timeout_ms)
    }
}
