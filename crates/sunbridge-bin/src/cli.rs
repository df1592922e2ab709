// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI argument parsing and command definitions.
//!
//! - `devices`: Detect and list inverters (default)
//! - `read`: Poll the spot channels of one inverter
//! - `info`: Show range and unit of a channel
//! - `set`: Write a channel value
//! - `validate`: Validate the configuration file
//! - `version`: Show version information

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sunbridge_config::LoggingConfig;

/// Configuration file used when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "sunbridge.yaml";

// =============================================================================
// Main CLI Structure
// =============================================================================

/// sunbridge - RS485 solar inverter session manager
///
/// Detects inverters on an RS485 bus through the YASDI master library,
/// polls their measurement channels and writes settable channels.
#[derive(Parser, Debug)]
#[command(
    name = "sunbridge",
    author = "Sylvex <contact@sylvex.io>",
    version = sunbridge_core::VERSION,
    about = "RS485 solar inverter session manager",
    long_about = None,
    propagate_version = true
)]
pub struct Cli {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = DEFAULT_CONFIG_PATH,
        env = "SUNBRIDGE_CONFIG",
        global = true
    )]
    pub config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Log format (text, json, compact); overrides the config file
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,

    /// Enable quiet mode (minimal output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

// =============================================================================
// Subcommands
// =============================================================================

/// Available subcommands for the sunbridge CLI.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Detect inverters and list them
    ///
    /// This is the default command when no subcommand is specified.
    Devices(DevicesArgs),

    /// Poll the spot channels of an inverter
    Read(ReadArgs),

    /// Show name, valid range and unit of a channel
    Info(InfoArgs),

    /// Write a channel value
    ///
    /// Values outside the channel's valid range are rejected without
    /// contacting the inverter.
    Set(SetArgs),

    /// Validate the configuration file
    Validate(ValidateArgs),

    /// Show detailed version information
    Version,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the `devices` command.
#[derive(Args, Debug, Default, Clone)]
pub struct DevicesArgs {
    /// Number of devices to detect (defaults to session.expected_devices)
    #[arg(short = 'n', long)]
    pub count: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `read` command.
#[derive(Args, Debug, Clone)]
pub struct ReadArgs {
    /// Device handle or name
    pub device: String,

    /// Seconds between polls; reads once when omitted
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Stop after this many polls (with --interval)
    #[arg(short = 'n', long)]
    pub samples: Option<u32>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `info` command.
#[derive(Args, Debug, Clone)]
pub struct InfoArgs {
    /// Device handle or name
    pub device: String,

    /// Channel name (exact, case-sensitive)
    pub channel: String,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `set` command.
#[derive(Args, Debug, Clone)]
pub struct SetArgs {
    /// Device handle or name
    pub device: String,

    /// Channel name (exact, case-sensitive)
    pub channel: String,

    /// Value to write
    #[arg(allow_negative_numbers = true)]
    pub value: f64,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the `validate` command.
#[derive(Args, Debug, Default, Clone)]
pub struct ValidateArgs {
    /// Show parsed configuration after validation
    #[arg(short, long)]
    pub show_config: bool,

    /// Output format for validation results
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Strict mode: treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

// =============================================================================
// Enums
// =============================================================================

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for structured logging
    Json,
    /// Compact format for minimal output
    Compact,
}

impl From<sunbridge_config::LogFormat> for LogFormat {
    fn from(format: sunbridge_config::LogFormat) -> Self {
        match format {
            sunbridge_config::LogFormat::Text => LogFormat::Text,
            sunbridge_config::LogFormat::Compact => LogFormat::Compact,
            sunbridge_config::LogFormat::Json => LogFormat::Json,
        }
    }
}

/// Output format for command results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON format for programmatic parsing
    Json,
}

// =============================================================================
// Helper Methods
// =============================================================================

impl Cli {
    /// Parse CLI arguments from the command line.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective command, defaulting to `Devices` if none specified.
    pub fn effective_command(&self) -> Commands {
        self.command
            .clone()
            .unwrap_or_else(|| Commands::Devices(DevicesArgs::default()))
    }

    /// Check if verbose logging is enabled.
    pub fn is_verbose(&self) -> bool {
        self.verbose && !self.quiet
    }

    /// Get the effective log level: flags, then `--log-level`, then the config file.
    pub fn effective_log_level(&self, config: Option<&LoggingConfig>) -> String {
        if self.quiet {
            "warn".to_string()
        } else if self.verbose {
            "debug".to_string()
        } else if let Some(level) = &self.log_level {
            level.clone()
        } else {
            config
                .map(|c| c.level.as_str())
                .unwrap_or("info")
                .to_string()
        }
    }

    /// Get the effective log format: `--log-format`, then the config file.
    pub fn effective_log_format(&self, config: Option<&LoggingConfig>) -> LogFormat {
        self.log_format
            .or_else(|| config.map(|c| c.format.into()))
            .unwrap_or_default()
    }
}

// =============================================================================
// Tests
// =============================================================================
