// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Inverter session facade.
//!
//! [`InverterSession`] ties the driver lifecycle, device discovery and channel
//! access together behind one request/response API, resolves devices by name
//! or handle, and enforces the session state machine.
//!
//! # Single Instance
//!
//! The vendor master layer is process-global. Exactly one session should
//! drive a physical bus; the native binding rejects a second concurrent
//! master initialization.
//!
//! # Example
//!
//! ```rust,ignore
//! use sunbridge_core::{InverterSession, SessionOptions};
//!
//! let mut session = InverterSession::new(Box::new(sdk), SessionOptions::default());
//! session.initialize("yasdi.ini")?;
//! session.detect_devices(Some(1))?;
//!
//! for device in session.get_devices()? {
//!     let snapshot = session.get_device_data(device.handle)?;
//!     println!("{}: {} channels", device.name, snapshot.len());
//! }
//!
//! session.shutdown()?;
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::DeviceNameCache;
use crate::channel::{ChannelAccess, DEFAULT_MAX_VALUE_AGE};
use crate::discovery::DeviceDiscovery;
use crate::error::{SessionError, SessionResult};
use crate::lifecycle::DriverController;
use crate::metrics::{SessionMetrics, SessionMetricsSnapshot};
use crate::sdk::{NativeSdk, WriteError, WriteOutcome};
use crate::state::SessionState;
use crate::types::{
    ChannelHandle, ChannelInfo, Device, DeviceHandle, DeviceRef, DeviceSnapshot, Driver,
};

// =============================================================================
// SessionOptions
// =============================================================================

/// Tunables of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    /// Diagnostic verbosity. Values above 0 enable narration at debug level.
    pub debug_level: u8,
    /// Maximum age of a cached channel value.
    #[serde(with = "duration_secs")]
    pub max_value_age: Duration,
    /// Device count requested when `detect_devices` is called without one.
    pub expected_devices: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debug_level: 0,
            max_value_age: DEFAULT_MAX_VALUE_AGE,
            expected_devices: 1,
        }
    }
}

impl SessionOptions {
    /// Sets the debug level.
    pub fn with_debug_level(mut self, level: u8) -> Self {
        self.debug_level = level;
        self
    }

    /// Sets the maximum value age.
    pub fn with_max_value_age(mut self, max_age: Duration) -> Self {
        self.max_value_age = max_age;
        self
    }

    /// Sets the default expected device count.
    pub fn with_expected_devices(mut self, count: u32) -> Self {
        self.expected_devices = count;
        self
    }

    /// Returns `true` if diagnostic narration is enabled.
    pub fn verbose(&self) -> bool {
        self.debug_level > 0
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// =============================================================================
// InverterSession
// =============================================================================

/// A session against one RS485 bus.
pub struct InverterSession {
    sdk: Box<dyn NativeSdk>,
    options: SessionOptions,
    state: SessionState,
    config_path: Option<PathBuf>,
    lifecycle: DriverController,
    discovery: DeviceDiscovery,
    channels: ChannelAccess,
    devices: DeviceNameCache,
    metrics: Arc<SessionMetrics>,
}

impl std::fmt::Debug for InverterSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InverterSession")
            .field("sdk", &self.sdk.name())
            .field("state", &self.state)
            .field("config_path", &self.config_path)
            .field("drivers", &self.lifecycle.drivers().len())
            .field("cached_devices", &self.devices.len())
            .finish()
    }
}

impl InverterSession {
    /// Creates an uninitialized session over the given native SDK.
    pub fn new(sdk: Box<dyn NativeSdk>, options: SessionOptions) -> Self {
        let verbose = options.verbose();
        Self {
            sdk,
            lifecycle: DriverController::new(verbose),
            discovery: DeviceDiscovery::new(verbose),
            channels: ChannelAccess::new(options.max_value_age, verbose),
            options,
            state: SessionState::Uninitialized,
            config_path: None,
            devices: DeviceNameCache::new(),
            metrics: Arc::new(SessionMetrics::new()),
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` if the session is ready for device operations.
    pub fn is_initialized(&self) -> bool {
        self.state.is_ready()
    }

    /// Returns the session options.
    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Returns the driver configuration path given to `initialize`.
    pub fn config_path(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Returns the drivers brought up by `initialize`.
    pub fn drivers(&self) -> &[Driver] {
        self.lifecycle.drivers()
    }

    /// Returns a snapshot of the session metrics.
    pub fn metrics(&self) -> SessionMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Returns a shared handle to the live metrics.
    pub fn metrics_handle(&self) -> Arc<SessionMetrics> {
        Arc::clone(&self.metrics)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Brings the master layer and its drivers online.
    ///
    /// # Errors
    ///
    /// - `SessionError::AlreadyInitialized` - the session is already running
    /// - `SessionError::ShutDown` - the session was shut down
    /// - `SessionError::InvalidArgument` - empty configuration path
    /// - `SessionError::ConfigNotFound`, `NoDriversFound`, `NoDriversOnline`
    pub fn initialize(&mut self, config: impl AsRef<Path>) -> SessionResult<()> {
        self.state.require_initializable()?;

        let config = config.as_ref();
        if config.as_os_str().is_empty() {
            return Err(SessionError::invalid_argument("driver configuration path is empty"));
        }

        self.state = SessionState::Initializing;
        match self.lifecycle.bring_online(self.sdk.as_mut(), config) {
            Ok(online) => {
                self.state = SessionState::Ready;
                self.config_path = Some(config.to_path_buf());
                info!(
                    sdk = self.sdk.name(),
                    config = %config.display(),
                    drivers = online,
                    "Session initialized"
                );
                Ok(())
            }
            Err(e) => {
                self.state = SessionState::Uninitialized;
                self.metrics.record_error(&e.to_string());
                warn!(error = %e, config = %config.display(), "Session initialization failed");
                Err(e)
            }
        }
    }

    /// Sets every driver offline and shuts the master layer down.
    ///
    /// Idempotent. After this call every other operation fails with
    /// `SessionError::ShutDown`.
    pub fn shutdown(&mut self) -> SessionResult<()> {
        if self.state.holds_drivers() {
            self.state = SessionState::ShuttingDown;
            self.lifecycle.take_offline(self.sdk.as_mut());
            self.devices.clear();
            info!(sdk = self.sdk.name(), "Session shut down");
        } else if self.options.verbose() {
            debug!(state = %self.state, "Shutdown on inactive session");
        }

        self.state = SessionState::Closed;
        Ok(())
    }

    // =========================================================================
    // Devices
    // =========================================================================

    /// Runs a blocking detection pass.
    ///
    /// `None` requests the configured default device count. The device name
    /// cache is invalidated whatever the outcome. After a partial detection
    /// the native device table still holds the devices that answered, so
    /// they stay reachable through [`get_devices`](Self::get_devices).
    pub fn detect_devices(&mut self, expected: Option<u32>) -> SessionResult<()> {
        self.state.require_ready()?;

        let expected = expected.unwrap_or(self.options.expected_devices);
        if expected == 0 {
            return Err(SessionError::invalid_argument(
                "expected device count must be at least 1",
            ));
        }

        self.state = SessionState::Detecting;
        let result = self.discovery.detect(self.sdk.as_mut(), expected);
        self.state = SessionState::Ready;
        self.devices.clear();

        self.metrics.record_detection(result.is_ok());
        if let Err(e) = &result {
            self.metrics.record_error(&e.to_string());
        }

        result.map_err(SessionError::from)
    }

    /// Lists every known device, ordered by handle, and refreshes the name cache.
    pub fn get_devices(&mut self) -> SessionResult<Vec<Device>> {
        self.state.require_ready()?;
        Ok(self.refresh_devices())
    }

    fn refresh_devices(&mut self) -> Vec<Device> {
        let devices = self.discovery.list_devices(self.sdk.as_mut());
        self.devices.replace(&devices);
        devices
    }

    /// Resolves a device reference to a handle.
    ///
    /// Handles pass through unchanged. Names are looked up in the cache,
    /// which is refreshed once on a miss.
    pub fn resolve_device(&mut self, device: &DeviceRef) -> SessionResult<DeviceHandle> {
        self.state.require_ready()?;

        let name = match device {
            DeviceRef::Handle(handle) => return Ok(*handle),
            DeviceRef::Name(name) => name,
        };
        if name.is_empty() {
            return Err(SessionError::invalid_argument("device name is empty"));
        }

        if let Some(handle) = self.devices.get(name) {
            return Ok(handle);
        }

        if self.options.verbose() {
            debug!(device = %name, "Device name not cached, refreshing");
        }
        self.refresh_devices();

        self.devices
            .get(name)
            .ok_or_else(|| SessionError::device_not_found(name))
    }

    // =========================================================================
    // Channels
    // =========================================================================

    /// Polls every spot channel of a device.
    ///
    /// Channels that cannot be read are omitted; an empty snapshot is not an error.
    pub fn get_device_data(&mut self, device: impl Into<DeviceRef>) -> SessionResult<DeviceSnapshot> {
        let handle = self.resolve_device(&device.into())?;

        let started = Instant::now();
        let poll = self.channels.fetch_channel_data(self.sdk.as_mut(), handle);
        self.metrics
            .record_poll(started.elapsed(), poll.records.len(), poll.skipped.len());

        if !poll.skipped.is_empty() && self.options.verbose() {
            debug!(
                device = %handle,
                read = poll.records.len(),
                skipped = poll.skipped.len(),
                "Partial poll"
            );
        }

        Ok(DeviceSnapshot::from_records(handle, &poll.records))
    }

    /// Finds a channel of a device by exact name.
    pub fn find_channel_handle(
        &mut self,
        device: impl Into<DeviceRef>,
        channel: &str,
    ) -> SessionResult<Option<ChannelHandle>> {
        let handle = self.resolve_device(&device.into())?;
        require_channel_name(channel)?;

        Ok(self
            .channels
            .find_channel_handle(self.sdk.as_mut(), handle, channel))
    }

    /// Returns name, valid range and unit of a channel.
    pub fn get_channel_info(
        &mut self,
        device: impl Into<DeviceRef>,
        channel: &str,
    ) -> SessionResult<ChannelInfo> {
        let handle = self.resolve_device(&device.into())?;
        require_channel_name(channel)?;

        self.channels
            .get_channel_info(self.sdk.as_mut(), handle, channel)
    }

    /// Writes a channel value.
    ///
    /// Range rejections and native write failures are reported in the
    /// returned [`WriteOutcome`], not as errors.
    pub fn set_channel_value(
        &mut self,
        device: impl Into<DeviceRef>,
        channel: &str,
        value: f64,
    ) -> SessionResult<WriteOutcome> {
        let handle = self.resolve_device(&device.into())?;
        require_channel_name(channel)?;
        if !value.is_finite() {
            return Err(SessionError::invalid_argument(format!(
                "value for '{}' is not a finite number",
                channel
            )));
        }

        let outcome = self
            .channels
            .set_channel_value(self.sdk.as_mut(), handle, channel, value)?;

        let rejected = outcome.error == Some(WriteError::OutOfRange);
        self.metrics.record_write(outcome.success, rejected);
        if let Some(message) = outcome.message() {
            self.metrics.record_error(&message);
        }

        Ok(outcome)
    }
}

fn require_channel_name(channel: &str) -> SessionResult<()> {
    if channel.is_empty() {
        return Err(SessionError::invalid_argument("channel name is empty"));
    }
    Ok(())
}

impl Drop for InverterSession {
    fn drop(&mut self) {
        if self.state.holds_drivers() {
            warn!(state = %self.state, "Session dropped without shutdown, tearing down");
            self.lifecycle.take_offline(self.sdk.as_mut());
            self.state = SessionState::Closed;
        }
    }
}
