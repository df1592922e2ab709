// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `validate` command.

use sunbridge_config::SunbridgeConfig;

use crate::cli::{Cli, OutputFormat, ValidateArgs};
use crate::error::{BinError, BinResult};
use crate::output;

/// Executes the `validate` command to validate configuration.
pub fn validate(cli: &Cli, args: ValidateArgs) -> BinResult<()> {
    let config_path = &cli.config;

    if !config_path.exists() {
        return Err(BinError::Configuration(format!(
            "Configuration file not found: {}",
            config_path.display()
        )));
    }

    let config = super::load(cli).map_err(|e| e.with_context("Configuration validation failed"))?;
    let warnings = collect_warnings(&config);

    match args.format {
        OutputFormat::Text => {
            println!("✓ Configuration is valid: {}", config_path.display());
            println!();
            println!("Summary:");
            println!("  Library:          {}", config.sdk.library_path.display());
            println!("  Driver config:    {}", config.sdk.driver_config.display());
            println!("  Expected devices: {}", config.session.expected_devices);
            println!("  Max value age:    {}s", config.session.max_value_age_secs);
            println!("  Debug level:      {}", config.session.debug_level);
            match config.session.operation_timeout_secs {
                Some(secs) => println!("  Op timeout:       {}s", secs),
                None => println!("  Op timeout:       none"),
            }
            println!(
                "  Logging:          {} ({})",
                config.logging.level.as_str(),
                config.logging.format.as_str()
            );

            if !warnings.is_empty() {
                println!();
                println!("Warnings:");
                for warning in &warnings {
                    println!("  ⚠ {}", warning);
                }
            }

            if args.show_config {
                println!();
                println!("Parsed configuration:");
                println!("{}", output::to_json(&config)?);
            }
        }
        OutputFormat::Json => {
            let report = serde_json::json!({
                "valid": true,
                "config_path": config_path.display().to_string(),
                "summary": {
                    "library_path": config.sdk.library_path.display().to_string(),
                    "driver_config": config.sdk.driver_config.display().to_string(),
                    "expected_devices": config.session.expected_devices,
                    "max_value_age_secs": config.session.max_value_age_secs,
                    "operation_timeout_secs": config.session.operation_timeout_secs,
                },
                "warnings": warnings,
                "config": if args.show_config { Some(&config) } else { None },
            });
            println!("{}", output::to_json(&report)?);
        }
    }

    if args.strict && !warnings.is_empty() {
        return Err(BinError::Configuration(format!(
            "Strict mode: {} warning(s) found",
            warnings.len()
        )));
    }

    Ok(())
}

/// Checks that can only warn: files that may appear before the next run.
fn collect_warnings(config: &SunbridgeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    if !config.sdk.driver_config.exists() {
        warnings.push(format!(
            "Driver configuration does not exist: {}",
            config.sdk.driver_config.display()
        ));
    }

    // A bare file name is resolved by the system loader, not checked here.
    let library = &config.sdk.library_path;
    if library.parent().is_some_and(|p| !p.as_os_str().is_empty()) && !library.exists() {
        warnings.push(format!("Vendor library does not exist: {}", library.display()));
    }

    if config.session.debug_level > 0 && config.session.operation_timeout_secs.is_none() {
        warnings.push("Debug output enabled without an operation timeout".to_string());
    }

    warnings
}
