// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Mock Implementations
//!
//! An in-memory stand-in for the vendor SDK.
//!
//! ## Design Principles
//!
//! - Configurable bus contents and native status codes
//! - Recording of every native call for verification
//! - Cloneable: tests keep a handle after moving a clone into the session

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use sunbridge_core::{
    status, ChannelHandle, ChannelKind, ChannelValue, DeviceHandle, DriverHandle, NativeSdk,
    ValueRange,
};

// =============================================================================
// Bus Model
// =============================================================================

/// A channel on a mock device.
#[derive(Debug, Clone)]
pub struct MockChannel {
    /// Channel handle.
    pub handle: ChannelHandle,
    /// Channel name.
    pub name: String,
    /// Unit string.
    pub unit: String,
    /// Channel subset this channel belongs to.
    pub kind: ChannelKind,
    /// Value read result.
    pub value: Result<ChannelValue, i32>,
    /// Status returned by name reads, if they fail.
    pub name_error: Option<i32>,
    /// Range read result.
    pub range: Result<ValueRange, i32>,
}

impl MockChannel {
    /// A spot (measurement) channel with a numeric value.
    pub fn spot(handle: u32, name: &str, unit: &str, value: f64) -> Self {
        Self {
            handle: ChannelHandle::new(handle),
            name: name.to_string(),
            unit: unit.to_string(),
            kind: ChannelKind::Spot,
            value: Ok(ChannelValue::new(value, format!("{}", value))),
            name_error: None,
            range: Err(status::NO_RANGE),
        }
    }

    /// A spot channel whose value is a status text.
    pub fn status_text(handle: u32, name: &str, numeric: f64, text: &str) -> Self {
        Self {
            value: Ok(ChannelValue::new(numeric, text)),
            ..Self::spot(handle, name, "", numeric)
        }
    }

    /// A settable parameter channel with a valid range.
    pub fn parameter(handle: u32, name: &str, unit: &str, value: f64, range: ValueRange) -> Self {
        Self {
            kind: ChannelKind::Parameter,
            range: Ok(range),
            ..Self::spot(handle, name, unit, value)
        }
    }

    /// Makes value reads fail with `code`.
    pub fn with_value_error(mut self, code: i32) -> Self {
        self.value = Err(code);
        self
    }

    /// Makes name reads fail with `code`.
    pub fn with_name_error(mut self, code: i32) -> Self {
        self.name_error = Some(code);
        self
    }

    /// Makes range reads fail with `code`.
    pub fn without_range(mut self, code: i32) -> Self {
        self.range = Err(code);
        self
    }
}

/// A device on the mock bus.
#[derive(Debug, Clone)]
pub struct MockDevice {
    /// Device handle.
    pub handle: DeviceHandle,
    /// Raw name as the device reports it; `None` makes name reads fail.
    pub raw_name: Option<String>,
    /// Channels of the device.
    pub channels: Vec<MockChannel>,
}

impl MockDevice {
    /// Creates a device without channels.
    pub fn new(handle: u32, raw_name: &str) -> Self {
        Self {
            handle: DeviceHandle::new(handle),
            raw_name: Some(raw_name.to_string()),
            channels: Vec::new(),
        }
    }

    /// Adds a channel.
    pub fn with_channel(mut self, channel: MockChannel) -> Self {
        self.channels.push(channel);
        self
    }

    /// Makes name reads fail.
    pub fn without_name(mut self) -> Self {
        self.raw_name = None;
        self
    }
}

/// A driver declared by the mock configuration.
#[derive(Debug, Clone)]
pub struct MockDriver {
    /// Driver handle.
    pub handle: DriverHandle,
    /// Driver name; `None` makes name reads fail.
    pub name: Option<String>,
    /// Whether `set_driver_online` succeeds.
    pub goes_online: bool,
}

impl MockDriver {
    /// A driver that comes online.
    pub fn new(handle: u32, name: &str) -> Self {
        Self {
            handle: DriverHandle::new(handle),
            name: Some(name.to_string()),
            goes_online: true,
        }
    }

    /// A driver whose port cannot be opened.
    pub fn broken(handle: u32, name: &str) -> Self {
        Self {
            goes_online: false,
            ..Self::new(handle, name)
        }
    }
}

/// A recorded native write.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WriteCall {
    /// Written channel.
    pub channel: ChannelHandle,
    /// Target device.
    pub device: DeviceHandle,
    /// Written value.
    pub value: f64,
}

#[derive(Debug, Default)]
struct MockState {
    init_status: i32,
    declared_drivers: Option<u32>,
    drivers: Vec<MockDriver>,
    online: HashSet<DriverHandle>,
    master_up: bool,

    detection_status: i32,
    detection_delay: Duration,
    detected: bool,
    detection_requests: Vec<u32>,
    devices: Vec<MockDevice>,

    write_status: i32,
    writes: Vec<WriteCall>,
    last_max_age: Option<Duration>,

    calls: Vec<&'static str>,
}

impl MockState {
    fn channel(&self, handle: ChannelHandle) -> Option<&MockChannel> {
        self.devices
            .iter()
            .flat_map(|d| d.channels.iter())
            .find(|c| c.handle == handle)
    }
}

// =============================================================================
// MockSdk
// =============================================================================

/// In-memory implementation of [`NativeSdk`].
///
/// Devices only become visible after a detection pass, as on a real bus.
#[derive(Debug, Clone, Default)]
pub struct MockSdk {
    state: Arc<Mutex<MockState>>,
}

impl MockSdk {
    /// Creates an empty bus with no drivers.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Adds a driver.
    pub fn with_driver(self, driver: MockDriver) -> Self {
        self.state.lock().drivers.push(driver);
        self
    }

    /// Adds a device to the bus.
    pub fn with_device(self, device: MockDevice) -> Self {
        self.state.lock().devices.push(device);
        self
    }

    /// Sets the status returned by `master_initialize`.
    pub fn with_init_status(self, code: i32) -> Self {
        self.state.lock().init_status = code;
        self
    }

    /// Overrides the driver count reported by `master_initialize`.
    pub fn with_declared_drivers(self, count: u32) -> Self {
        self.state.lock().declared_drivers = Some(count);
        self
    }

    /// Sets the status returned by `start_detection`.
    pub fn with_detection_status(self, code: i32) -> Self {
        self.state.lock().detection_status = code;
        self
    }

    /// Makes `start_detection` block for `delay`.
    pub fn with_detection_delay(self, delay: Duration) -> Self {
        self.state.lock().detection_delay = delay;
        self
    }

    /// Sets the status returned by writes.
    pub fn with_write_status(self, code: i32) -> Self {
        self.state.lock().write_status = code;
        self
    }

    /// Changes the write status on a running bus.
    pub fn set_write_status(&self, code: i32) {
        self.state.lock().write_status = code;
    }

    /// Replaces a channel value on a running bus.
    pub fn set_channel_value(&self, channel: u32, value: Result<ChannelValue, i32>) {
        let handle = ChannelHandle::new(channel);
        let mut state = self.state.lock();
        for device in &mut state.devices {
            for c in &mut device.channels {
                if c.handle == handle {
                    c.value = value.clone();
                }
            }
        }
    }

    /// Boxes a clone for handing to a session.
    pub fn boxed(&self) -> Box<dyn NativeSdk> {
        Box::new(self.clone())
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    /// Every native call so far, in order.
    pub fn calls(&self) -> Vec<&'static str> {
        self.state.lock().calls.clone()
    }

    /// Number of calls to the named native operation.
    pub fn call_count(&self, name: &str) -> usize {
        self.state.lock().calls.iter().filter(|c| **c == name).count()
    }

    /// Recorded writes.
    pub fn writes(&self) -> Vec<WriteCall> {
        self.state.lock().writes.clone()
    }

    /// Whether the master layer is up.
    pub fn is_master_up(&self) -> bool {
        self.state.lock().master_up
    }

    /// Number of drivers currently online.
    pub fn online_drivers(&self) -> usize {
        self.state.lock().online.len()
    }

    /// Device counts passed to `start_detection`.
    pub fn detection_requests(&self) -> Vec<u32> {
        self.state.lock().detection_requests.clone()
    }

    /// Max age passed to the most recent value read.
    pub fn last_max_age(&self) -> Option<Duration> {
        self.state.lock().last_max_age
    }

    fn record(&self, call: &'static str) -> parking_lot::MutexGuard<'_, MockState> {
        let mut state = self.state.lock();
        state.calls.push(call);
        state
    }
}

impl NativeSdk for MockSdk {
    fn name(&self) -> &str {
        "mock"
    }

    fn master_initialize(&mut self, _config: &Path) -> (i32, u32) {
        let mut state = self.record("master_initialize");
        state.master_up = true;
        let declared = state
            .declared_drivers
            .unwrap_or(state.drivers.len() as u32);
        (state.init_status, declared)
    }

    fn master_shutdown(&mut self) {
        let mut state = self.record("master_shutdown");
        state.master_up = false;
        state.detected = false;
    }

    fn driver_handles(&mut self) -> Vec<DriverHandle> {
        self.record("driver_handles")
            .drivers
            .iter()
            .map(|d| d.handle)
            .collect()
    }

    fn driver_name(&mut self, driver: DriverHandle) -> Option<String> {
        self.record("driver_name")
            .drivers
            .iter()
            .find(|d| d.handle == driver)
            .and_then(|d| d.name.clone())
    }

    fn set_driver_online(&mut self, driver: DriverHandle) -> bool {
        let mut state = self.record("set_driver_online");
        let ok = state
            .drivers
            .iter()
            .any(|d| d.handle == driver && d.goes_online);
        if ok {
            state.online.insert(driver);
        }
        ok
    }

    fn set_driver_offline(&mut self, driver: DriverHandle) {
        self.record("set_driver_offline").online.remove(&driver);
    }

    fn start_detection(&mut self, count: u32) -> i32 {
        let delay = {
            let mut state = self.record("start_detection");
            state.detection_requests.push(count);
            state.detection_delay
        };

        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        state.detected = true;
        state.detection_status
    }

    fn device_handles(&mut self) -> Vec<DeviceHandle> {
        let state = self.record("device_handles");
        if !state.detected {
            return Vec::new();
        }
        state.devices.iter().map(|d| d.handle).collect()
    }

    fn device_name(&mut self, device: DeviceHandle) -> Option<String> {
        self.record("device_name")
            .devices
            .iter()
            .find(|d| d.handle == device)
            .and_then(|d| d.raw_name.clone())
    }

    fn channel_handles(&mut self, device: DeviceHandle, kind: ChannelKind) -> Vec<ChannelHandle> {
        self.record("channel_handles")
            .devices
            .iter()
            .find(|d| d.handle == device)
            .map(|d| {
                d.channels
                    .iter()
                    .filter(|c| kind == ChannelKind::All || c.kind == kind)
                    .map(|c| c.handle)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn channel_name(&mut self, channel: ChannelHandle) -> Result<String, i32> {
        let state = self.record("channel_name");
        match state.channel(channel) {
            Some(c) => match c.name_error {
                Some(code) => Err(code),
                None => Ok(c.name.clone()),
            },
            None => Err(status::UNKNOWN_HANDLE),
        }
    }

    fn channel_unit(&mut self, channel: ChannelHandle) -> Result<String, i32> {
        let state = self.record("channel_unit");
        state
            .channel(channel)
            .map(|c| c.unit.clone())
            .ok_or(status::UNKNOWN_HANDLE)
    }

    fn channel_value(
        &mut self,
        channel: ChannelHandle,
        _device: DeviceHandle,
        max_age: Duration,
    ) -> Result<ChannelValue, i32> {
        let mut state = self.record("channel_value");
        state.last_max_age = Some(max_age);
        state
            .channel(channel)
            .ok_or(status::UNKNOWN_HANDLE)?
            .value
            .clone()
    }

    fn channel_range(&mut self, channel: ChannelHandle) -> Result<ValueRange, i32> {
        let state = self.record("channel_range");
        state
            .channel(channel)
            .ok_or(status::UNKNOWN_HANDLE)?
            .range
    }

    fn write_channel_value(
        &mut self,
        channel: ChannelHandle,
        device: DeviceHandle,
        value: f64,
    ) -> i32 {
        let mut state = self.record("write_channel_value");
        state.writes.push(WriteCall {
            channel,
            device,
            value,
        });
        state.write_status
    }
}
