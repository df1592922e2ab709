// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! OS signal handling for long-running commands.

use tracing::{info, warn};

/// Resolves when the process receives SIGINT or SIGTERM (Ctrl-C elsewhere).
///
/// If no handler can be registered the future never resolves and the
/// command runs until its own end condition.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let (mut sigterm, mut sigint) = match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(term), Ok(int)) => (term, int),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Failed to register signal handlers");
                return std::future::pending().await;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => info!("Received SIGTERM"),
            _ = sigint.recv() => info!("Received SIGINT"),
        }
    }

    #[cfg(not(unix))]
    {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C"),
            Err(e) => {
                warn!(error = %e, "Failed to register Ctrl+C handler");
                std::future::pending::<()>().await;
            }
        }
    }
}
