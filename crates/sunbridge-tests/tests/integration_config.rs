// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Configuration Integration Tests
//!
//! Integration tests for sunbridge-config functionality including:
//!
//! - Loading every supported file format
//! - Environment variable overrides and placeholders
//! - Relative path resolution
//! - Validation rules and conversion into session options
//!
//! ## Test Categories
//!
//! - `test_load_*`: File loading
//! - `test_env_*`: Environment handling
//! - `test_validation_*`: Validation rules

use std::path::PathBuf;
use std::time::Duration;

use sunbridge_config::{
    ConfigError, ConfigFormat, ConfigLoader, LogFormat, LogLevel, SunbridgeConfig,
};
use sunbridge_core::InverterSession;
use sunbridge_tests::prelude::*;

fn write_config(name: &str, content: &str) -> (tempfile::TempDir, PathBuf) {
    let dir = temp_test_dir("sunbridge-config");
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

fn assert_sample(config: &SunbridgeConfig) {
    assert_eq!(
        config.sdk.library_path,
        PathBuf::from("/usr/local/lib/libyasdimaster.so")
    );
    assert_eq!(config.session.debug_level, 1);
    assert_eq!(config.session.max_value_age_secs, 10);
    assert_eq!(config.session.expected_devices, 2);
    assert_eq!(config.session.operation_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.logging.level, LogLevel::Debug);
    assert_eq!(config.logging.format, LogFormat::Json);
}

// =============================================================================
// Loading
// =============================================================================

#[test]
fn test_load_all_formats() {
    for (name, content) in [
        ("sunbridge.yaml", ConfigFixtures::YAML),
        ("sunbridge.toml", ConfigFixtures::TOML),
        ("sunbridge.json", ConfigFixtures::JSON),
    ] {
        let (dir, path) = write_config(name, content);
        let config = ConfigLoader::new()
            .with_env_prefix(unique_test_id().to_uppercase())
            .load(&path)
            .unwrap();

        assert_sample(&config);
        assert_eq!(config.sdk.driver_config, dir.path().join("yasdi.ini"));
    }
}

#[test]
fn test_load_empty_yaml_uses_defaults() {
    let (dir, path) = write_config("sunbridge.yaml", "");
    let config = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load(&path)
        .unwrap();

    assert_eq!(config.sdk.library_path, PathBuf::from("libyasdimaster.so"));
    assert_eq!(config.sdk.driver_config, dir.path().join("yasdi.ini"));
    assert_eq!(config.session, SunbridgeConfig::default().session);
}

#[test]
fn test_load_missing_file() {
    let result = ConfigLoader::new().load("/nonexistent/sunbridge.yaml");
    assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
}

#[test]
fn test_load_unsupported_extension() {
    let (_dir, path) = write_config("sunbridge.ini", "[sdk]");
    let result = ConfigLoader::new().load(&path);
    assert!(matches!(result, Err(ConfigError::UnsupportedFormat { .. })));
}

#[test]
fn test_load_parse_error_names_file() {
    let (_dir, path) = write_config("sunbridge.yaml", "session: [not, a, map");
    let err = ConfigLoader::new().load(&path).unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("sunbridge.yaml"));
}

#[test]
fn test_load_relative_library_path_resolved() {
    let (dir, path) = write_config(
        "sunbridge.yaml",
        "sdk:\n  library_path: lib/libyasdimaster.so\n  driver_config: conf/yasdi.ini\n",
    );
    let config = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load(&path)
        .unwrap();

    assert_eq!(config.sdk.library_path, dir.path().join("lib/libyasdimaster.so"));
    assert_eq!(config.sdk.driver_config, dir.path().join("conf/yasdi.ini"));
}

#[test]
fn test_load_without_path_resolution() {
    let (_dir, path) = write_config("sunbridge.yaml", ConfigFixtures::YAML);
    let config = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .with_path_resolution(false)
        .load(&path)
        .unwrap();

    assert_eq!(config.sdk.driver_config, PathBuf::from("yasdi.ini"));
}

// =============================================================================
// Environment
// =============================================================================

#[test]
fn test_env_overrides() {
    let prefix = unique_test_id().to_uppercase();
    std::env::set_var(format!("{}_EXPECTED_DEVICES", prefix), "4");
    std::env::set_var(format!("{}_DRIVER_CONFIG", prefix), "/etc/yasdi.ini");
    std::env::set_var(format!("{}_LOG_FORMAT", prefix), "compact");

    let config = ConfigLoader::new()
        .with_env_prefix(&prefix)
        .load_from_str(ConfigFixtures::YAML, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.session.expected_devices, 4);
    assert_eq!(config.sdk.driver_config, PathBuf::from("/etc/yasdi.ini"));
    assert_eq!(config.logging.format, LogFormat::Compact);
}

#[test]
fn test_env_invalid_number() {
    let prefix = unique_test_id().to_uppercase();
    std::env::set_var(format!("{}_MAX_VALUE_AGE_SECS", prefix), "soon");

    let result = ConfigLoader::new()
        .with_env_prefix(&prefix)
        .load_from_str("", ConfigFormat::Yaml);

    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn test_env_placeholder_default() {
    let var = unique_test_id().to_uppercase();
    let content = format!("sdk:\n  driver_config: \"${{{}:/opt/yasdi/yasdi.ini}}\"\n", var);

    let config = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load_from_str(&content, ConfigFormat::Yaml)
        .unwrap();

    assert_eq!(config.sdk.driver_config, PathBuf::from("/opt/yasdi/yasdi.ini"));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_validation_rejects_zero_devices() {
    let result = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load_from_str("session:\n  expected_devices: 0\n", ConfigFormat::Yaml);

    match result {
        Err(ConfigError::Validation { field, .. }) => {
            assert_eq!(field, "session.expected_devices")
        }
        other => panic!("Expected validation error, got {:?}", other),
    }
}

#[test]
fn test_validation_rejects_debug_level() {
    let result = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load_from_str("[session]\ndebug_level = 9\n", ConfigFormat::Toml);

    assert!(result.unwrap_err().is_validation());
}

#[test]
fn test_validation_unknown_log_level_rejected_in_file() {
    let result = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load_from_str("logging:\n  level: loud\n", ConfigFormat::Yaml);

    assert!(result.is_err());
}

// =============================================================================
// Session Options
// =============================================================================

#[test]
fn test_config_drives_session() {
    let config = ConfigLoader::new()
        .with_env_prefix(unique_test_id().to_uppercase())
        .load_from_str(ConfigFixtures::YAML, ConfigFormat::Yaml)
        .unwrap();
    let ini = DriverConfigFixture::new();
    let sdk = BusFixtures::single_inverter();

    let mut session = InverterSession::new(sdk.boxed(), config.session.to_options());
    assert_eq!(session.options().expected_devices, 2);
    assert!(session.options().verbose());

    session.initialize(ini.path()).unwrap();
    let _ = session.detect_devices(None);
    session
        .get_device_data(BusFixtures::INVERTER_NAME)
        .unwrap();

    assert_eq!(sdk.detection_requests(), vec![2]);
    assert_eq!(sdk.last_max_age(), Some(Duration::from_secs(10)));
}
