// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `devices` command.

use sunbridge_config::SunbridgeConfig;

use crate::cli::{DevicesArgs, OutputFormat};
use crate::error::BinResult;
use crate::output;
use crate::session::with_session;

/// Detects devices on the bus and prints them.
pub async fn devices(config: &SunbridgeConfig, args: DevicesArgs) -> BinResult<()> {
    let devices = with_session(config, args.count, |service| async move {
        Ok(service.get_devices().await?)
    })
    .await?;

    match args.format {
        OutputFormat::Text => println!("{}", output::devices_table(&devices)),
        OutputFormat::Json => println!("{}", output::to_json(&devices)?),
    }

    Ok(())
}
