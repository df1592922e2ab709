// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session setup and teardown shared by the bus commands.

use std::future::Future;

use sunbridge_config::SunbridgeConfig;
use sunbridge_core::{DetectionError, InverterSession, SessionError, SessionService};
use sunbridge_yasdi::YasdiSdk;
use tracing::{debug, info, warn};

use crate::error::BinResult;

/// Loads the vendor library and brings the session online.
///
/// The returned service is initialized but devices are not yet detected.
pub async fn open_session(config: &SunbridgeConfig) -> BinResult<SessionService> {
    let sdk = YasdiSdk::load(&config.sdk.library_path)?;
    debug!(library = %sdk.path().display(), "Vendor library loaded");

    let session = InverterSession::new(Box::new(sdk), config.session.to_options());
    let service = match config.session.operation_timeout() {
        Some(timeout) => SessionService::new(session).with_timeout(timeout),
        None => SessionService::new(session),
    };

    service.initialize(config.sdk.driver_config.clone()).await?;
    info!(
        driver_config = %config.sdk.driver_config.display(),
        "Session initialized"
    );

    Ok(service)
}

/// Opens a session, detects devices and runs `f`, shutting down afterwards.
///
/// A detection pass that finds fewer devices than requested is not fatal;
/// `f` runs against whatever the bus reported.
///
/// Shutdown runs whether `f` succeeds or not; a shutdown failure is logged
/// and never masks the result of `f`.
pub async fn with_session<T, F, Fut>(
    config: &SunbridgeConfig,
    expected_devices: Option<u32>,
    f: F,
) -> BinResult<T>
where
    F: FnOnce(SessionService) -> Fut,
    Fut: Future<Output = BinResult<T>>,
{
    let service = open_session(config).await?;

    let result = match service.detect_devices(expected_devices).await {
        Ok(()) => f(service.clone()).await,
        Err(SessionError::Detection(e @ DetectionError::NotAllFound { .. })) => {
            warn!(error = %e, "Continuing with the devices that answered");
            f(service.clone()).await
        }
        Err(e) => Err(e.into()),
    };

    if let Err(e) = service.shutdown().await {
        warn!(error = %e, "Session shutdown failed");
    }

    let metrics = service.metrics();
    debug!(
        polls = metrics.polls_total,
        writes = metrics.writes_total,
        detections = metrics.detections_total,
        "Session closed"
    );

    result
}
