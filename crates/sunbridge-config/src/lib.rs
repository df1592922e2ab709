// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sunbridge-config
//!
//! Configuration management for the sunbridge inverter session manager.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sunbridge_config::loader::load_config;
//!
//! let config = load_config("sunbridge.yaml").unwrap();
//!
//! println!("Library: {}", config.sdk.library_path.display());
//! println!("Expected devices: {}", config.session.expected_devices);
//! ```
//!
//! ## Configuration Schema
//!
//! - `sdk` - Vendor library and driver configuration paths
//! - `session` - Debug level, value age, detection count, timeouts
//! - `logging` - Log level and format
//!
//! The driver configuration file named by `sdk.driver_config` belongs to the
//! vendor layer and is never parsed here.
//!
//! ## Environment Variables
//!
//! ```text
//! SUNBRIDGE_DRIVER_CONFIG=/etc/yasdi.ini
//! SUNBRIDGE_EXPECTED_DEVICES=2
//! SUNBRIDGE_LOG_LEVEL=debug
//! ```
//!
//! Values in config files can reference environment variables:
//!
//! ```yaml
//! sdk:
//!   driver_config: "${YASDI_INI:/etc/yasdi.ini}"
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod error;
pub mod loader;
pub mod schema;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{ConfigError, ConfigResult};
pub use loader::{load_config, load_config_str, ConfigFormat, ConfigLoader, DEFAULT_ENV_PREFIX};
pub use schema::{LogFormat, LogLevel, LoggingConfig, SdkConfig, SessionConfig, SunbridgeConfig};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name() {
        assert_eq!(NAME, "sunbridge-config");
        assert!(!VERSION.is_empty());
    }
}
