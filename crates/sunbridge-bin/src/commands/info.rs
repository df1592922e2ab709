// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `info` command.

use sunbridge_config::SunbridgeConfig;
use sunbridge_core::DeviceRef;

use crate::cli::{InfoArgs, OutputFormat};
use crate::error::BinResult;
use crate::output;
use crate::session::with_session;

/// Prints the valid range and unit of a channel.
pub async fn info(config: &SunbridgeConfig, args: InfoArgs) -> BinResult<()> {
    let device = device_ref(&args.device);
    let channel = args.channel.clone();

    let info = with_session(config, None, |service| async move {
        Ok(service.get_channel_info(device, channel).await?)
    })
    .await?;

    match args.format {
        OutputFormat::Text => println!("{}", output::channel_info_text(&info)),
        OutputFormat::Json => println!("{}", output::to_json(&info)?),
    }

    Ok(())
}

/// Interprets a command-line device argument.
pub(crate) fn device_ref(arg: &str) -> DeviceRef {
    match arg.parse::<DeviceRef>() {
        Ok(device) => device,
        Err(never) => match never {},
    }
}
