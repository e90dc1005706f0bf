//! Store configuration.
//!
//! # Example
//!
//! ```
//! use loading_store_runtime::LoadingStoreConfig;
//! use std::time::Duration;
//!
//! let config = LoadingStoreConfig::new().with_default_wait_timeout(Duration::from_secs(5));
//! assert!(config.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable overriding the default wait timeout, in milliseconds
pub const WAIT_TIMEOUT_ENV_VAR: &str = "LOADING_STORE_WAIT_TIMEOUT_MS";

/// Wait timeout used when neither the config nor the call overrides it
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable holds an unparsable value
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnvVar {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
    },

    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Configuration for a [`LoadingStore`](crate::LoadingStore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadingStoreConfig {
    /// How long a request waits for an in-flight attempt of the same type
    #[serde(rename = "wait_timeout_ms", with = "duration_millis")]
    pub default_wait_timeout: Duration,
}

impl LoadingStoreConfig {
    /// Create a configuration with default settings
    ///
    /// Defaults:
    /// - `default_wait_timeout`: 30 seconds
    #[must_use]
    pub const fn new() -> Self {
        Self {
            default_wait_timeout: DEFAULT_WAIT_TIMEOUT,
        }
    }

    /// Set the default wait timeout
    #[must_use]
    pub const fn with_default_wait_timeout(mut self, timeout: Duration) -> Self {
        self.default_wait_timeout = timeout;
        self
    }

    /// Load configuration from process environment variables
    ///
    /// Reads [`WAIT_TIMEOUT_ENV_VAR`]; unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is unparsable or the result
    /// fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through a variable lookup function
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is unparsable or the result
    /// fails validation.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::new();

        if let Some(value) = lookup(WAIT_TIMEOUT_ENV_VAR) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidEnvVar {
                    name: WAIT_TIMEOUT_ENV_VAR,
                    value: value.clone(),
                })?;
            config.default_wait_timeout = Duration::from_millis(millis);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if the wait timeout is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_wait_timeout.is_zero() {
            return Err(ConfigError::Validation(
                "default_wait_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for LoadingStoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_wait_timeout() {
        assert_eq!(
            LoadingStoreConfig::default().default_wait_timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_from_lookup_without_variables() {
        let config = LoadingStoreConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, LoadingStoreConfig::new());
    }

    #[test]
    fn test_from_lookup_overrides_timeout() {
        let config = LoadingStoreConfig::from_lookup(|name| {
            (name == WAIT_TIMEOUT_ENV_VAR).then(|| " 2500 ".to_string())
        })
        .unwrap();

        assert_eq!(config.default_wait_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let result = LoadingStoreConfig::from_lookup(|_| Some("soon".to_string()));

        assert_eq!(
            result,
            Err(ConfigError::InvalidEnvVar {
                name: WAIT_TIMEOUT_ENV_VAR,
                value: "soon".to_string(),
            })
        );
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let config = LoadingStoreConfig::new().with_default_wait_timeout(Duration::ZERO);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        let result = LoadingStoreConfig::from_lookup(|_| Some("0".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_serde_uses_milliseconds() {
        let config = LoadingStoreConfig::new().with_default_wait_timeout(Duration::from_millis(25));

        let json = serde_json::to_value(config).unwrap();
        assert_eq!(json, serde_json::json!({ "wait_timeout_ms": 25 }));

        let back: LoadingStoreConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
