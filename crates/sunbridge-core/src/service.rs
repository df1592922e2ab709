// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Async wrapper around [`InverterSession`].
//!
//! Every operation runs on the blocking thread pool while holding the session
//! mutex, so at most one bus transaction is in flight. Callers on the async
//! side only await the result.
//!
//! # Timeouts
//!
//! An optional per-operation timeout stops *waiting* for the result. The
//! native call cannot be interrupted and keeps the session locked until it
//! returns; the next operation queues behind it.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::warn;

use crate::error::{DetectionError, SessionError, SessionResult};
use crate::metrics::{SessionMetrics, SessionMetricsSnapshot};
use crate::sdk::WriteOutcome;
use crate::session::InverterSession;
use crate::state::SessionState;
use crate::types::{ChannelInfo, Device, DeviceRef, DeviceSnapshot};

/// Cloneable async handle to a session.
#[derive(Clone)]
pub struct SessionService {
    session: Arc<Mutex<InverterSession>>,
    detecting: Arc<AtomicBool>,
    metrics: Arc<SessionMetrics>,
    timeout: Option<Duration>,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("detecting", &self.detecting.load(Ordering::Relaxed))
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Clears the detection flag when the blocking detection ends, even by panic.
struct DetectionGuard(Arc<AtomicBool>);

impl Drop for DetectionGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionService {
    /// Wraps a session.
    pub fn new(session: InverterSession) -> Self {
        let metrics = session.metrics_handle();
        Self {
            session: Arc::new(Mutex::new(session)),
            detecting: Arc::new(AtomicBool::new(false)),
            metrics,
            timeout: None,
        }
    }

    /// Sets the per-operation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the per-operation timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns `true` while a detection pass is running.
    pub fn is_detecting(&self) -> bool {
        self.detecting.load(Ordering::Acquire)
    }

    /// Returns a metrics snapshot without waiting for the bus.
    pub fn metrics(&self) -> SessionMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns the session state, or `None` while an operation holds the session.
    pub fn try_state(&self) -> Option<SessionState> {
        self.session.try_lock().map(|session| session.state())
    }

    async fn run<T, F>(&self, operation: &'static str, f: F) -> SessionResult<T>
    where
        F: FnOnce(&mut InverterSession) -> SessionResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let session = Arc::clone(&self.session);
        let task = tokio::task::spawn_blocking(move || {
            let mut guard = session.lock();
            f(&mut *guard)
        });

        let joined = match self.timeout {
            Some(duration) => match tokio::time::timeout(duration, task).await {
                Ok(joined) => joined,
                Err(_) => {
                    warn!(operation, ?duration, "Session operation timed out, bus call still running");
                    return Err(SessionError::timeout(operation, duration));
                }
            },
            None => task.await,
        };

        joined.map_err(|e| SessionError::worker(format!("{}: {}", operation, e)))?
    }

    /// See [`InverterSession::initialize`].
    pub async fn initialize(&self, config: impl Into<PathBuf>) -> SessionResult<()> {
        let config = config.into();
        self.run("initialize", move |session| session.initialize(&config))
            .await
    }

    /// See [`InverterSession::detect_devices`].
    ///
    /// Returns `DetectionError::InProgress` at once if a detection submitted
    /// through this service is still running.
    pub async fn detect_devices(&self, expected: Option<u32>) -> SessionResult<()> {
        if self
            .detecting
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(DetectionError::InProgress.into());
        }

        let guard = DetectionGuard(Arc::clone(&self.detecting));
        self.run("detect_devices", move |session| {
            let _guard = guard;
            session.detect_devices(expected)
        })
        .await
    }

    /// See [`InverterSession::get_devices`].
    pub async fn get_devices(&self) -> SessionResult<Vec<Device>> {
        self.run("get_devices", |session| session.get_devices())
            .await
    }

    /// See [`InverterSession::get_device_data`].
    pub async fn get_device_data(&self, device: impl Into<DeviceRef>) -> SessionResult<DeviceSnapshot> {
        let device = device.into();
        self.run("get_device_data", move |session| session.get_device_data(device))
            .await
    }

    /// See [`InverterSession::get_channel_info`].
    pub async fn get_channel_info(
        &self,
        device: impl Into<DeviceRef>,
        channel: impl Into<String>,
    ) -> SessionResult<ChannelInfo> {
        let device = device.into();
        let channel = channel.into();
        self.run("get_channel_info", move |session| {
            session.get_channel_info(device, &channel)
        })
        .await
    }

    /// See [`InverterSession::set_channel_value`].
    pub async fn set_channel_value(
        &self,
        device: impl Into<DeviceRef>,
        channel: impl Into<String>,
        value: f64,
    ) -> SessionResult<WriteOutcome> {
        let device = device.into();
        let channel = channel.into();
        self.run("set_channel_value", move |session| {
            session.set_channel_value(device, &channel, value)
        })
        .await
    }

    /// See [`InverterSession::shutdown`].
    ///
    /// Runs without the operation timeout so teardown always completes.
    pub async fn shutdown(&self) -> SessionResult<()> {
        let session = Arc::clone(&self.session);
        tokio::task::spawn_blocking(move || session.lock().shutdown())
            .await
            .map_err(|e| SessionError::worker(format!("shutdown: {}", e)))?
    }
}
