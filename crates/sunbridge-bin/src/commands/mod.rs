// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! CLI command implementations.
//!
//! - `devices`: Detect and list inverters
//! - `read`: Poll spot channels
//! - `info`: Show channel metadata
//! - `set`: Write a channel value
//! - `validate`: Validate configuration file
//! - `version`: Show version information

mod devices;
mod info;
mod read;
mod set;
mod validate;
mod version;

pub use devices::devices;
pub use info::info;
pub use read::read;
pub use set::set;
pub use validate::validate;
pub use version::version;

use sunbridge_config::{ConfigLoader, SunbridgeConfig};

use crate::cli::{Cli, Commands};
use crate::error::BinResult;
use crate::logging::init_logging;

/// Executes the appropriate command based on CLI arguments.
///
/// Bus commands load the configuration before logging starts so the file's
/// `logging` section applies; `validate` and `version` log with CLI flags only.
pub async fn execute(cli: Cli) -> BinResult<()> {
    let command = cli.effective_command();

    match command {
        Commands::Validate(args) => {
            init_logging(&cli.effective_log_level(None), cli.effective_log_format(None));
            validate::validate(&cli, args)
        }
        Commands::Version => version::version(&cli),
        command => {
            let config = load(&cli)?;
            init_logging(
                &cli.effective_log_level(Some(&config.logging)),
                cli.effective_log_format(Some(&config.logging)),
            );

            match command {
                Commands::Devices(args) => devices::devices(&config, args).await,
                Commands::Read(args) => read::read(&config, args).await,
                Commands::Info(args) => info::info(&config, args).await,
                Commands::Set(args) => set::set(&config, args).await,
                Commands::Validate(_) | Commands::Version => Ok(()),
            }
        }
    }
}

/// Loads the configuration named on the command line.
///
/// A missing file at the default location falls back to built-in defaults
/// plus environment overrides; an explicitly named file must exist.
pub(crate) fn load(cli: &Cli) -> BinResult<SunbridgeConfig> {
    let loader = ConfigLoader::new();
    if cli.config.exists() {
        return Ok(loader.load(&cli.config)?);
    }

    if cli.config.as_os_str() == crate::cli::DEFAULT_CONFIG_PATH {
        return Ok(loader.load_from_str("", sunbridge_config::ConfigFormat::Yaml)?);
    }

    Err(crate::error::BinError::config(format!(
        "Configuration file not found: {}",
        cli.config.display()
    )))
}
