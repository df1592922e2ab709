// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Implementation of the `read` command.

use std::time::Duration;

use sunbridge_config::SunbridgeConfig;
use sunbridge_core::{DeviceRef, DeviceSnapshot, SessionService};
use tracing::{info, warn};

use super::info::device_ref;
use crate::cli::{OutputFormat, ReadArgs};
use crate::error::{BinError, BinResult};
use crate::output;
use crate::session::with_session;
use crate::signal::shutdown_signal;

/// Polls the spot channels of a device once, or repeatedly with `--interval`.
///
/// Repeated polling stops after `--samples` polls or on SIGINT/SIGTERM; the
/// session is shut down in either case.
pub async fn read(config: &SunbridgeConfig, args: ReadArgs) -> BinResult<()> {
    let device = device_ref(&args.device);

    if args.interval == Some(0) {
        return Err(BinError::config("--interval must be greater than 0"));
    }

    with_session(config, None, |service| async move {
        match args.interval {
            None => {
                let snapshot = service.get_device_data(device).await?;
                print_snapshot(&snapshot, args.format)
            }
            Some(secs) => {
                poll_loop(&service, device, Duration::from_secs(secs), args.samples, args.format)
                    .await
            }
        }
    })
    .await
}

async fn poll_loop(
    service: &SessionService,
    device: DeviceRef,
    period: Duration,
    samples: Option<u32>,
    format: OutputFormat,
) -> BinResult<()> {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let signal = shutdown_signal();
    tokio::pin!(signal);

    let mut taken: u32 = 0;
    loop {
        if samples.is_some_and(|limit| taken >= limit) {
            break;
        }

        tokio::select! {
            _ = &mut signal => {
                info!(samples = taken, "Polling interrupted");
                break;
            }
            _ = ticker.tick() => {
                match service.get_device_data(device.clone()).await {
                    Ok(snapshot) => print_snapshot(&snapshot, format)?,
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e, device = %device, "Poll failed, retrying next interval");
                    }
                    Err(e) => return Err(e.into()),
                }
                taken += 1;
            }
        }
    }

    Ok(())
}

fn print_snapshot(snapshot: &DeviceSnapshot, format: OutputFormat) -> BinResult<()> {
    match format {
        OutputFormat::Text => println!("{}\n", output::snapshot_table(snapshot)),
        OutputFormat::Json => println!("{}", output::to_json_line(snapshot)?),
    }
    Ok(())
}
