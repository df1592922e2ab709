// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `set` command.

use sunbridge_config::SunbridgeConfig;

use super::info::device_ref;
use crate::cli::{OutputFormat, SetArgs};
use crate::error::{BinError, BinResult};
use crate::output;
use crate::session::with_session;

/// Writes a channel value and reports the outcome.
///
/// A rejected or failed write prints the outcome and exits non-zero.
pub async fn set(config: &SunbridgeConfig, args: SetArgs) -> BinResult<()> {
    let device = device_ref(&args.device);
    let channel = args.channel.clone();
    let value = args.value;

    let outcome = with_session(config, None, |service| async move {
        Ok(service.set_channel_value(device, channel, value).await?)
    })
    .await?;

    match args.format {
        OutputFormat::Text => println!("{}", output::write_outcome_text(&args.channel, value, &outcome)),
        OutputFormat::Json => println!("{}", output::to_json(&outcome)?),
    }

    if outcome.success {
        Ok(())
    } else {
        Err(BinError::write_failed(format!("{}: {}", args.channel, outcome)))
    }
}
