// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Native SDK abstraction.
//!
//! The vendor SDK owns the RS485 master/slave protocol. This module describes
//! the fixed operation set the session manager needs from it as the
//! [`NativeSdk`] trait, and interprets the SDK's raw status codes.
//!
//! # Blocking Semantics
//!
//! Every method is a blocking call against a shared half-duplex bus. Methods
//! take `&mut self`, so holding a `&mut dyn NativeSdk` is proof that no other
//! bus transaction is in flight.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut sdk: Box<dyn NativeSdk> = Box::new(YasdiSdk::load("libyasdimaster.so")?);
//!
//! let (status, drivers) = sdk.master_initialize(Path::new("yasdi.ini"));
//! for driver in sdk.driver_handles() {
//!     sdk.set_driver_online(driver);
//! }
//! ```

use std::fmt;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChannelHandle, ChannelKind, ChannelValue, DeviceHandle, DriverHandle, ValueRange};

// =============================================================================
// Status Codes
// =============================================================================

/// Raw status codes reported by the native layer.
///
/// Some codes are reused with a different meaning depending on the call, so
/// interpretation always happens per operation ([`DetectStatus`], [`WriteError`]).
pub mod status {
    /// Success.
    pub const OK: i32 = 0;
    /// Unknown handle (channel/device calls).
    pub const UNKNOWN_HANDLE: i32 = -1;
    /// Not all requested devices answered (detection).
    pub const NOT_ALL_DEVICES_FOUND: i32 = -1;
    /// The master layer is shutting down.
    pub const SHUTDOWN: i32 = -2;
    /// The device did not respond.
    pub const TIMEOUT: i32 = -3;
    /// The channel has no value range.
    pub const NO_RANGE: i32 = -3;
    /// The value is not valid for the channel.
    pub const VALUE_NOT_VALID: i32 = -4;
    /// Insufficient access rights to write the channel.
    pub const NO_ACCESS_RIGHTS: i32 = -5;
    /// Channel type does not support the operation.
    pub const CHANNEL_TYPE_MISMATCH: i32 = -6;
    /// Invalid argument.
    pub const INVALID_ARGUMENT: i32 = -7;
    /// Operation not supported.
    pub const NOT_SUPPORTED: i32 = -8;
    /// A detection is already running.
    pub const DETECTION_IN_PROGRESS: i32 = -9;
    /// Too many requests queued in the master layer.
    pub const TOO_MANY_REQUESTS: i32 = -10;
}

/// Interpreted outcome of a detection call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectStatus {
    /// All requested devices were found.
    Ok,
    /// Another detection is still running.
    InProgress,
    /// Fewer devices answered than requested.
    NotAllFound,
    /// Any other status.
    Unknown(i32),
}

impl DetectStatus {
    /// Interprets a raw detection status.
    pub fn from_code(code: i32) -> Self {
        match code {
            status::OK => DetectStatus::Ok,
            status::DETECTION_IN_PROGRESS => DetectStatus::InProgress,
            status::NOT_ALL_DEVICES_FOUND => DetectStatus::NotAllFound,
            other => DetectStatus::Unknown(other),
        }
    }
}

// =============================================================================
// Write Outcome
// =============================================================================

/// Why a channel write did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteError {
    /// Rejected locally by the range pre-check; the native write was not issued.
    #[error("Value out of range")]
    OutOfRange,
    /// The channel or device handle is unknown to the native layer.
    #[error("Invalid channel handle")]
    InvalidHandle,
    /// The master layer is shutting down.
    #[error("Driver layer is in shutdown mode")]
    Shutdown,
    /// The device did not answer.
    #[error("Device did not respond (timeout)")]
    Timeout,
    /// The device rejected the value.
    #[error("Channel value not within valid range")]
    ValueNotValid,
    /// Not enough access rights to write the channel.
    #[error("Not enough access rights to write to channel")]
    NoAccessRights,
    /// Any other status.
    #[error("Unknown error")]
    Unknown,
}

impl WriteError {
    /// Interprets a non-zero status returned by a native write.
    pub fn from_code(code: i32) -> Self {
        match code {
            status::UNKNOWN_HANDLE => WriteError::InvalidHandle,
            status::SHUTDOWN => WriteError::Shutdown,
            status::TIMEOUT => WriteError::Timeout,
            status::VALUE_NOT_VALID => WriteError::ValueNotValid,
            status::NO_ACCESS_RIGHTS => WriteError::NoAccessRights,
            _ => WriteError::Unknown,
        }
    }

    /// Returns `true` if the same write may succeed later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WriteError::Timeout | WriteError::Shutdown)
    }
}

/// Structured result of a channel write.
///
/// Serializes as `{success, code, error?, validRange?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteOutcome {
    /// Whether the value was written.
    pub success: bool,
    /// Raw native status (or the value-not-valid code for local rejections).
    pub code: i32,
    /// Failure reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<WriteError>,
    /// Range observed during a local rejection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_range: Option<ValueRange>,
}

impl WriteOutcome {
    /// A successful write.
    pub fn written() -> Self {
        Self {
            success: true,
            code: status::OK,
            error: None,
            valid_range: None,
        }
    }

    /// A local rejection, echoing the observed range.
    pub fn out_of_range(range: ValueRange) -> Self {
        Self {
            success: false,
            code: status::VALUE_NOT_VALID,
            error: Some(WriteError::OutOfRange),
            valid_range: Some(range),
        }
    }

    /// Maps a native write status into an outcome.
    pub fn from_code(code: i32) -> Self {
        if code == status::OK {
            return Self::written();
        }

        Self {
            success: false,
            code,
            error: Some(WriteError::from_code(code)),
            valid_range: None,
        }
    }

    /// Returns the human-readable error message, if any.
    pub fn message(&self) -> Option<String> {
        self.error.map(|e| e.to_string())
    }
}

impl fmt::Display for WriteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, &self.valid_range) {
            (None, _) => write!(f, "written"),
            (Some(error), Some(range)) => {
                write!(f, "{} (code {}, valid range {})", error, self.code, range)
            }
            (Some(error), None) => write!(f, "{} (code {})", error, self.code),
        }
    }
}

// =============================================================================
// NativeSdk Trait
// =============================================================================

/// The operation set of the vendor SDK the session manager drives.
///
/// Implementations translate handles and C buffers into owned Rust values.
/// Status-bearing calls return the raw code; interpretation lives in the
/// session manager.
///
/// # Lifecycle
///
/// 1. `master_initialize` with the driver configuration resource
/// 2. `driver_handles` + `set_driver_online` for each driver
/// 3. `start_detection`, then device/channel operations
/// 4. `set_driver_offline` for each driver, then `master_shutdown`
pub trait NativeSdk: Send {
    /// Returns a name for logging.
    fn name(&self) -> &str;

    // =========================================================================
    // Master & Drivers
    // =========================================================================

    /// Brings the master layer up. Returns the status and the number of
    /// drivers the configuration declares.
    fn master_initialize(&mut self, config: &Path) -> (i32, u32);

    /// Tears the master layer down.
    fn master_shutdown(&mut self);

    /// Enumerates all drivers.
    fn driver_handles(&mut self) -> Vec<DriverHandle>;

    /// Reads a driver's name.
    fn driver_name(&mut self, driver: DriverHandle) -> Option<String>;

    /// Sets a driver online. Returns `true` on success.
    fn set_driver_online(&mut self, driver: DriverHandle) -> bool;

    /// Sets a driver offline.
    fn set_driver_offline(&mut self, driver: DriverHandle);

    // =========================================================================
    // Devices
    // =========================================================================

    /// Runs a blocking detection for `count` devices and returns its status.
    fn start_detection(&mut self, count: u32) -> i32;

    /// Enumerates every device currently known to the master layer.
    fn device_handles(&mut self) -> Vec<DeviceHandle>;

    /// Reads a device's raw display name.
    fn device_name(&mut self, device: DeviceHandle) -> Option<String>;

    // =========================================================================
    // Channels
    // =========================================================================

    /// Enumerates the channels of `kind` on a device.
    fn channel_handles(&mut self, device: DeviceHandle, kind: ChannelKind) -> Vec<ChannelHandle>;

    /// Reads a channel's name.
    fn channel_name(&mut self, channel: ChannelHandle) -> Result<String, i32>;

    /// Reads a channel's unit.
    fn channel_unit(&mut self, channel: ChannelHandle) -> Result<String, i32>;

    /// Reads a channel value, accepting a cached value no older than `max_age`.
    fn channel_value(
        &mut self,
        channel: ChannelHandle,
        device: DeviceHandle,
        max_age: Duration,
    ) -> Result<ChannelValue, i32>;

    /// Reads a channel's valid range.
    fn channel_range(&mut self, channel: ChannelHandle) -> Result<ValueRange, i32>;

    /// Writes a channel value and returns the native status.
    fn write_channel_value(&mut self, channel: ChannelHandle, device: DeviceHandle, value: f64)
        -> i32;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_status() {
        assert_eq!(DetectStatus::from_code(0), DetectStatus::Ok);
        assert_eq!(DetectStatus::from_code(-9), DetectStatus::InProgress);
        assert_eq!(DetectStatus::from_code(-1), DetectStatus::NotAllFound);
        assert_eq!(DetectStatus::from_code(-3), DetectStatus::Unknown(-3));
    }

    #[test]
    fn test_write_error_mapping() {
        assert_eq!(WriteError::from_code(-1), WriteError::InvalidHandle);
        assert_eq!(WriteError::from_code(-2), WriteError::Shutdown);
        assert_eq!(WriteError::from_code(-3), WriteError::Timeout);
        assert_eq!(WriteError::from_code(-4), WriteError::ValueNotValid);
        assert_eq!(WriteError::from_code(-5), WriteError::NoAccessRights);
        assert_eq!(WriteError::from_code(-42), WriteError::Unknown);
        assert!(WriteError::Timeout.is_retryable());
        assert!(!WriteError::NoAccessRights.is_retryable());
    }

    #[test]
    fn test_write_outcome_from_code() {
        let ok = WriteOutcome::from_code(0);
        assert!(ok.success);
        assert!(ok.error.is_none());

        let timeout = WriteOutcome::from_code(status::TIMEOUT);
        assert!(!timeout.success);
        assert_eq!(timeout.code, -3);
        assert_eq!(timeout.error, Some(WriteError::Timeout));
        assert_eq!(
            timeout.message().as_deref(),
            Some("Device did not respond (timeout)")
        );
    }

    #[test]
    fn test_out_of_range_outcome() {
        let outcome = WriteOutcome::out_of_range(ValueRange::new(0.0, 10.0));
        assert!(!outcome.success);
        assert_eq!(outcome.code, status::VALUE_NOT_VALID);
        assert_eq!(outcome.valid_range, Some(ValueRange::new(0.0, 10.0)));

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "out_of_range");
        assert_eq!(json["validRange"]["min"], 0.0);
        assert_eq!(json["validRange"]["max"], 10.0);
    }

    #[test]
    fn test_written_outcome_omits_optional_fields() {
        let json = serde_json::to_value(WriteOutcome::written()).unwrap();
        assert!(json.get("error").is_none());
        assert!(json.get("validRange").is_none());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(WriteOutcome::written().to_string(), "written");
        assert_eq!(
            WriteOutcome::from_code(-5).to_string(),
            "Not enough access rights to write to channel (code -5)"
        );
    }
}
