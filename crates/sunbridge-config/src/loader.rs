// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Configuration loading and processing for sunbridge.
//!
//! # Loading Pipeline
//!
//! 1. Read the file
//! 2. Resolve `${VAR}` / `${VAR:default}` placeholders
//! 3. Parse by extension (YAML, TOML or JSON)
//! 4. Apply environment variable overrides
//! 5. Resolve relative paths against the config file's directory
//! 6. Validate
//!
//! # Environment Variable Override
//!
//! ```text
//! SUNBRIDGE_LIBRARY_PATH=/opt/yasdi/lib/libyasdimaster.so
//! SUNBRIDGE_DRIVER_CONFIG=/etc/yasdi.ini
//! SUNBRIDGE_DEBUG_LEVEL=1
//! SUNBRIDGE_EXPECTED_DEVICES=3
//! SUNBRIDGE_LOG_LEVEL=debug
//! ```

use crate::error::{ConfigError, ConfigResult};
use crate::schema::{LogFormat, LogLevel, SunbridgeConfig};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "SUNBRIDGE";

// =============================================================================
// ConfigLoader
// =============================================================================

/// Configuration loader for sunbridge.
///
/// # Examples
///
/// ```no_run
/// use sunbridge_config::loader::ConfigLoader;
///
/// let loader = ConfigLoader::new();
/// let config = loader.load("sunbridge.yaml").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Base directory for resolving relative paths.
    base_path: Option<PathBuf>,

    /// Environment variable prefix.
    env_prefix: String,

    /// Whether to resolve environment variables.
    resolve_env_vars: bool,

    /// Whether to resolve relative paths.
    resolve_paths: bool,
}

impl ConfigLoader {
    /// Creates a new configuration loader with default settings.
    pub fn new() -> Self {
        Self {
            base_path: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            resolve_env_vars: true,
            resolve_paths: true,
        }
    }

    /// Sets the base path for resolving relative paths.
    pub fn with_base_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets the environment variable prefix.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Enables or disables environment variable resolution.
    pub fn with_env_vars(mut self, enabled: bool) -> Self {
        self.resolve_env_vars = enabled;
        self
    }

    /// Enables or disables relative path resolution.
    pub fn with_path_resolution(mut self, enabled: bool) -> Self {
        self.resolve_paths = enabled;
        self
    }

    /// Loads configuration from a file.
    ///
    /// The file format is determined by the file extension:
    /// - `.yaml` or `.yml` - YAML format
    /// - `.toml` - TOML format
    /// - `.json` - JSON format
    pub fn load(&self, path: impl AsRef<Path>) -> ConfigResult<SunbridgeConfig> {
        let path = path.as_ref();
        info!("Loading configuration from: {}", path.display());

        let base_path = self.base_path.clone().unwrap_or_else(|| {
            path.parent()
                .map(|p| p.to_path_buf())
                .unwrap_or_else(|| PathBuf::from("."))
        });

        let content = self.read_file(path)?;

        let format = ConfigFormat::from_path(path)?;
        let mut config = self.parse_content(&content, format, path)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        if self.resolve_paths {
            resolve_relative_paths(&mut config, &base_path);
        }

        config.validate()?;

        debug!(
            library = %config.sdk.library_path.display(),
            driver_config = %config.sdk.driver_config.display(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Loads configuration from a string. Relative paths are left untouched.
    pub fn load_from_str(&self, content: &str, format: ConfigFormat) -> ConfigResult<SunbridgeConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        let mut config = parse_str(&content, format)?;

        if self.resolve_env_vars {
            self.apply_env_overrides(&mut config)?;
        }

        config.validate()?;

        Ok(config)
    }

    /// Reads file content.
    fn read_file(&self, path: &Path) -> ConfigResult<String> {
        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))
    }

    /// Parses content based on format.
    fn parse_content(
        &self,
        content: &str,
        format: ConfigFormat,
        path: &Path,
    ) -> ConfigResult<SunbridgeConfig> {
        let content = if self.resolve_env_vars {
            resolve_env_placeholders(content)
        } else {
            content.to_string()
        };

        parse_str(&content, format).map_err(|e| match e {
            ConfigError::Serialization { message } => ConfigError::parse(path, message),
            other => other,
        })
    }

    fn env_var(&self, key: &str) -> Option<(String, String)> {
        let name = format!("{}_{}", self.env_prefix, key);
        env::var(&name).ok().map(|value| (name, value))
    }

    fn env_parsed<T: FromStr>(&self, key: &str, expected: &str) -> ConfigResult<Option<T>> {
        match self.env_var(key) {
            Some((name, value)) => value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::invalid_env_var(name, expected)),
            None => Ok(None),
        }
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&self, config: &mut SunbridgeConfig) -> ConfigResult<()> {
        if let Some((_, value)) = self.env_var("LIBRARY_PATH") {
            config.sdk.library_path = PathBuf::from(value);
        }
        if let Some((_, value)) = self.env_var("DRIVER_CONFIG") {
            config.sdk.driver_config = PathBuf::from(value);
        }

        if let Some(level) = self.env_parsed("DEBUG_LEVEL", "expected a number between 0 and 255")? {
            config.session.debug_level = level;
        }
        if let Some(age) = self.env_parsed("MAX_VALUE_AGE_SECS", "expected a number of seconds")? {
            config.session.max_value_age_secs = age;
        }
        if let Some(count) = self.env_parsed("EXPECTED_DEVICES", "expected a device count")? {
            config.session.expected_devices = count;
        }
        if let Some(timeout) =
            self.env_parsed("OPERATION_TIMEOUT_SECS", "expected a number of seconds")?
        {
            config.session.operation_timeout_secs = Some(timeout);
        }

        if let Some((name, value)) = self.env_var("LOG_LEVEL") {
            match parse_log_level(&value) {
                Some(level) => config.logging.level = level,
                None => warn!("Ignoring {}: unknown log level '{}'", name, value),
            }
        }
        if let Some((name, value)) = self.env_var("LOG_FORMAT") {
            config.logging.format = parse_log_format(&value)
                .ok_or_else(|| ConfigError::invalid_env_var(name, "expected text, compact or json"))?;
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// ConfigFormat
// =============================================================================

/// Supported configuration file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML format.
    Yaml,
    /// TOML format.
    Toml,
    /// JSON format.
    Json,
}

impl ConfigFormat {
    /// Determines the format from a file path.
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("toml") => Ok(ConfigFormat::Toml),
            Some("json") => Ok(ConfigFormat::Json),
            Some(other) => Err(ConfigError::unsupported_format(other)),
            None => Err(ConfigError::unsupported_format("(no extension)")),
        }
    }

    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "yaml",
            ConfigFormat::Toml => "toml",
            ConfigFormat::Json => "json",
        }
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parses a string based on format.
fn parse_str(content: &str, format: ConfigFormat) -> ConfigResult<SunbridgeConfig> {
    match format {
        ConfigFormat::Yaml => {
            // An empty YAML document means "all defaults".
            if content.trim().is_empty() {
                return Ok(SunbridgeConfig::default());
            }
            serde_yaml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Toml => {
            toml::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
        ConfigFormat::Json => {
            serde_json::from_str(content).map_err(|e| ConfigError::serialization(e.to_string()))
        }
    }
}

/// Resolves environment variable placeholders in content.
///
/// Supports the format: `${VAR_NAME}` or `${VAR_NAME:default}`
fn resolve_env_placeholders(content: &str) -> String {
    let mut result = String::with_capacity(content.len());
    let mut chars = content.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' || chars.peek() != Some(&'{') {
            result.push(c);
            continue;
        }
        chars.next(); // consume '{'

        let mut var_content = String::new();
        let mut found_close = false;
        for c in chars.by_ref() {
            if c == '}' {
                found_close = true;
                break;
            }
            var_content.push(c);
        }

        if !found_close {
            result.push_str("${");
            result.push_str(&var_content);
            continue;
        }

        let (var_name, default_value) = match var_content.split_once(':') {
            Some((name, default)) => (name, Some(default)),
            None => (var_content.as_str(), None),
        };

        match (env::var(var_name), default_value) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => {
                warn!("Environment variable '{}' not found", var_name);
                result.push_str(&format!("${{{}}}", var_name));
            }
        }
    }

    result
}

/// Resolves relative paths in configuration.
///
/// A bare library file name is left for the system loader to search.
fn resolve_relative_paths(config: &mut SunbridgeConfig, base_path: &Path) {
    if config.sdk.driver_config.is_relative() {
        config.sdk.driver_config = base_path.join(&config.sdk.driver_config);
    }

    let library = &config.sdk.library_path;
    let has_dir = library
        .parent()
        .map(|p| !p.as_os_str().is_empty())
        .unwrap_or(false);
    if library.is_relative() && has_dir {
        config.sdk.library_path = base_path.join(library);
    }
}

/// Parses a log level string.
fn parse_log_level(value: &str) -> Option<LogLevel> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Some(LogLevel::Trace),
        "debug" => Some(LogLevel::Debug),
        "info" => Some(LogLevel::Info),
        "warn" | "warning" => Some(LogLevel::Warn),
        "error" => Some(LogLevel::Error),
        _ => None,
    }
}

/// Parses a log format string.
fn parse_log_format(value: &str) -> Option<LogFormat> {
    match value.trim().to_lowercase().as_str() {
        "text" | "pretty" => Some(LogFormat::Text),
        "compact" => Some(LogFormat::Compact),
        "json" => Some(LogFormat::Json),
        _ => None,
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Loads configuration from a file with default settings.
///
/// # Examples
///
/// ```no_run
/// use sunbridge_config::loader::load_config;
///
/// let config = load_config("sunbridge.yaml").unwrap();
/// ```
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<SunbridgeConfig> {
    ConfigLoader::new().load(path)
}

/// Loads configuration from a string with the specified format.
pub fn load_config_str(content: &str, format: ConfigFormat) -> ConfigResult<SunbridgeConfig> {
    ConfigLoader::new().load_from_str(content, format)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn test_yaml() -> &'static str {
        r#"
sdk:
  library_path: /opt/yasdi/libyasdimaster.so
  driver_config: conf/yasdi.ini

session:
  debug_level: 1
  max_value_age_secs: 10
  expected_devices: 2

logging:
  level: debug
  format: json
"#
    }

    #[test]
    fn test_load_yaml() {
        let mut file = NamedTempFile::with_suffix(".yaml").unwrap();
        file.write_all(test_yaml().as_bytes()).unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("SBTEST_LOAD_YAML")
            .load(file.path())
            .unwrap();

        assert_eq!(
            config.sdk.library_path,
            PathBuf::from("/opt/yasdi/libyasdimaster.so")
        );
        let base = file.path().parent().unwrap();
        assert_eq!(config.sdk.driver_config, base.join("conf/yasdi.ini"));
        assert_eq!(config.session.expected_devices, 2);
        assert_eq!(config.session.to_options().max_value_age, Duration::from_secs(10));
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_load_toml() {
        let toml = r#"
[sdk]
driver_config = "/etc/yasdi.ini"

[session]
operation_timeout_secs = 20
"#;
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        file.write_all(toml.as_bytes()).unwrap();

        let config = ConfigLoader::new()
            .with_env_prefix("SBTEST_LOAD_TOML")
            .load(file.path())
            .unwrap();

        assert_eq!(config.sdk.driver_config, PathBuf::from("/etc/yasdi.ini"));
        assert_eq!(config.sdk.library_path, PathBuf::from("libyasdimaster.so"));
        assert_eq!(config.session.operation_timeout_secs, Some(20));
    }

    #[test]
    fn test_config_format_from_path() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("sunbridge.yaml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("sunbridge.yml")).unwrap(),
            ConfigFormat::Yaml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("sunbridge.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("sunbridge.json")).unwrap(),
            ConfigFormat::Json
        );
        assert!(ConfigFormat::from_path(Path::new("yasdi.ini")).is_err());
    }

    #[test]
    fn test_env_placeholder_with_default() {
        let result = resolve_env_placeholders("value: ${SBTEST_NONEXISTENT_VAR:default}");
        assert_eq!(result, "value: default");
    }

    #[test]
    fn test_env_placeholder_set() {
        env::set_var("SBTEST_PLACEHOLDER_SET", "/dev/ttyUSB0");
        let result = resolve_env_placeholders("port: ${SBTEST_PLACEHOLDER_SET:/dev/ttyS0}");
        assert_eq!(result, "port: /dev/ttyUSB0");
    }

    #[test]
    fn test_env_placeholder_unclosed() {
        assert_eq!(resolve_env_placeholders("a ${B"), "a ${B");
        assert_eq!(resolve_env_placeholders("cost $5"), "cost $5");
    }

    #[test]
    fn test_env_overrides() {
        env::set_var("SBTEST_OVR_EXPECTED_DEVICES", "4");
        env::set_var("SBTEST_OVR_LOG_LEVEL", "warning");
        env::set_var("SBTEST_OVR_DRIVER_CONFIG", "/srv/yasdi.ini");

        let config = ConfigLoader::new()
            .with_env_prefix("SBTEST_OVR")
            .load_from_str("", ConfigFormat::Yaml)
            .unwrap();

        assert_eq!(config.session.expected_devices, 4);
        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.sdk.driver_config, PathBuf::from("/srv/yasdi.ini"));
    }

    #[test]
    fn test_invalid_env_override() {
        env::set_var("SBTEST_BAD_DEBUG_LEVEL", "loud");

        let result = ConfigLoader::new()
            .with_env_prefix("SBTEST_BAD")
            .load_from_str("", ConfigFormat::Yaml);

        assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
    }

    #[test]
    fn test_validation_runs() {
        let result = ConfigLoader::new()
            .with_env_vars(false)
            .load_from_str("session:\n  expected_devices: 0\n", ConfigFormat::Yaml);
        assert!(matches!(result, Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_bare_library_name_not_resolved() {
        let mut config = SunbridgeConfig::default();
        config.sdk.library_path = PathBuf::from("lib/libyasdimaster.so");
        resolve_relative_paths(&mut config, Path::new("/etc/sunbridge"));
        assert_eq!(
            config.sdk.library_path,
            PathBuf::from("/etc/sunbridge/lib/libyasdimaster.so")
        );
        assert_eq!(
            config.sdk.driver_config,
            PathBuf::from("/etc/sunbridge/yasdi.ini")
        );

        let mut config = SunbridgeConfig::default();
        resolve_relative_paths(&mut config, Path::new("/etc/sunbridge"));
        assert_eq!(config.sdk.library_path, PathBuf::from("libyasdimaster.so"));
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Some(LogLevel::Trace));
        assert_eq!(parse_log_level("INFO"), Some(LogLevel::Info));
        assert_eq!(parse_log_level("warn"), Some(LogLevel::Warn));
        assert_eq!(parse_log_level("invalid"), None);
        assert_eq!(parse_log_format("compact"), Some(LogFormat::Compact));
        assert_eq!(parse_log_format("xml"), None);
    }

    #[test]
    fn test_file_not_found() {
        let result = ConfigLoader::new().load("/nonexistent/path/sunbridge.yaml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_error_carries_path() {
        let mut file = NamedTempFile::with_suffix(".json").unwrap();
        file.write_all(b"{ not json").unwrap();

        let result = ConfigLoader::new()
            .with_env_prefix("SBTEST_PARSE_ERR")
            .load(file.path());
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
