// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration schema definitions for sunbridge.
//!
//! # Example Configuration (YAML)
//!
//! ```yaml
//! sdk:
//!   library_path: /usr/local/lib/libyasdimaster.so
//!   driver_config: yasdi.ini
//!
//! session:
//!   debug_level: 0
//!   max_value_age_secs: 5
//!   expected_devices: 2
//!   operation_timeout_secs: 30
//!
//! logging:
//!   level: info
//!   format: text
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sunbridge_core::SessionOptions;

use crate::error::{ConfigError, ConfigResult};

/// Default vendor library name.
pub const DEFAULT_LIBRARY_PATH: &str = "libyasdimaster.so";

/// Default driver configuration file.
pub const DEFAULT_DRIVER_CONFIG: &str = "yasdi.ini";

/// Default maximum value age in seconds.
pub const DEFAULT_MAX_VALUE_AGE_SECS: u64 = 5;

/// Largest accepted debug level.
pub const MAX_DEBUG_LEVEL: u8 = 5;

// =============================================================================
// Root Configuration
// =============================================================================

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SunbridgeConfig {
    /// Vendor SDK settings.
    #[serde(default)]
    pub sdk: SdkConfig,

    /// Session settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SunbridgeConfig {
    /// Validates the entire configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        self.sdk.validate()?;
        self.session.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

// =============================================================================
// SDK Configuration
// =============================================================================

/// Where to find the vendor library and its driver configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SdkConfig {
    /// Path or file name of the vendor shared library.
    ///
    /// A bare file name is left to the system loader's search path.
    #[serde(default = "default_library_path")]
    pub library_path: PathBuf,

    /// Driver configuration resource passed to the master layer as-is.
    #[serde(default = "default_driver_config")]
    pub driver_config: PathBuf,
}

fn default_library_path() -> PathBuf {
    PathBuf::from(DEFAULT_LIBRARY_PATH)
}

fn default_driver_config() -> PathBuf {
    PathBuf::from(DEFAULT_DRIVER_CONFIG)
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            library_path: default_library_path(),
            driver_config: default_driver_config(),
        }
    }
}

impl SdkConfig {
    /// Validates the SDK configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.library_path.as_os_str().is_empty() {
            return Err(ConfigError::validation("sdk.library_path", "cannot be empty"));
        }
        if self.driver_config.as_os_str().is_empty() {
            return Err(ConfigError::validation("sdk.driver_config", "cannot be empty"));
        }
        Ok(())
    }
}

// =============================================================================
// Session Configuration
// =============================================================================

/// Session tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Diagnostic verbosity (0 = quiet).
    #[serde(default)]
    pub debug_level: u8,

    /// Maximum age of a cached channel value, in seconds.
    #[serde(default = "default_max_value_age_secs")]
    pub max_value_age_secs: u64,

    /// Devices requested by a detection pass.
    #[serde(default = "default_expected_devices")]
    pub expected_devices: u32,

    /// Per-operation timeout in seconds. Unset waits indefinitely.
    #[serde(default)]
    pub operation_timeout_secs: Option<u64>,
}

fn default_max_value_age_secs() -> u64 {
    DEFAULT_MAX_VALUE_AGE_SECS
}

fn default_expected_devices() -> u32 {
    1
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debug_level: 0,
            max_value_age_secs: DEFAULT_MAX_VALUE_AGE_SECS,
            expected_devices: default_expected_devices(),
            operation_timeout_secs: None,
        }
    }
}

impl SessionConfig {
    /// Validates the session configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.debug_level > MAX_DEBUG_LEVEL {
            return Err(ConfigError::validation(
                "session.debug_level",
                format!("must be between 0 and {}", MAX_DEBUG_LEVEL),
            ));
        }
        if self.expected_devices == 0 {
            return Err(ConfigError::validation(
                "session.expected_devices",
                "must be at least 1",
            ));
        }
        if self.operation_timeout_secs == Some(0) {
            return Err(ConfigError::validation(
                "session.operation_timeout_secs",
                "must be greater than 0",
            ));
        }
        Ok(())
    }

    /// Returns the per-operation timeout.
    pub fn operation_timeout(&self) -> Option<Duration> {
        self.operation_timeout_secs.map(Duration::from_secs)
    }

    /// Converts into session options.
    pub fn to_options(&self) -> SessionOptions {
        SessionOptions::default()
            .with_debug_level(self.debug_level)
            .with_max_value_age(Duration::from_secs(self.max_value_age_secs))
            .with_expected_devices(self.expected_devices)
    }
}

// =============================================================================
// Logging Configuration
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Log format.
    #[serde(default)]
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Validates the logging configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Single-line compact text.
    Compact,
    /// JSON lines.
    Json,
}

impl LogFormat {
    /// Returns the format name.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Text => "text",
            LogFormat::Compact => "compact",
            LogFormat::Json => "json",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SunbridgeConfig::default();
        assert_eq!(config.sdk.library_path, PathBuf::from("libyasdimaster.so"));
        assert_eq!(config.sdk.driver_config, PathBuf::from("yasdi.ini"));
        assert_eq!(config.session.max_value_age_secs, 5);
        assert_eq!(config.session.expected_devices, 1);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.logging.format, LogFormat::Text);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_session_validation() {
        let mut session = SessionConfig::default();
        session.expected_devices = 0;
        assert!(session.validate().is_err());

        let mut session = SessionConfig::default();
        session.debug_level = 9;
        assert!(session.validate().is_err());

        let mut session = SessionConfig::default();
        session.operation_timeout_secs = Some(0);
        assert!(session.validate().is_err());
    }

    #[test]
    fn test_sdk_validation() {
        let sdk = SdkConfig {
            library_path: PathBuf::new(),
            driver_config: default_driver_config(),
        };
        let err = sdk.validate().unwrap_err();
        assert!(err.to_string().contains("sdk.library_path"));
    }

    #[test]
    fn test_to_options() {
        let session = SessionConfig {
            debug_level: 2,
            max_value_age_secs: 10,
            expected_devices: 3,
            operation_timeout_secs: Some(15),
        };

        let options = session.to_options();
        assert_eq!(options.debug_level, 2);
        assert_eq!(options.max_value_age, Duration::from_secs(10));
        assert_eq!(options.expected_devices, 3);
        assert_eq!(session.operation_timeout(), Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_log_enums_deserialize() {
        let logging: LoggingConfig =
            serde_json::from_str(r#"{"level": "debug", "format": "json"}"#).unwrap();
        assert_eq!(logging.level, LogLevel::Debug);
        assert_eq!(logging.format, LogFormat::Json);
        assert_eq!(logging.format.as_str(), "json");
    }
}
