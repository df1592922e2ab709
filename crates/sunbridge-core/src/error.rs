// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Error hierarchy for the session manager.
//!
//! ```text
//! SessionError (root)
//! ├── precondition  - NotInitialized, AlreadyInitialized, ShutDown
//! ├── argument      - InvalidArgument, ConfigNotFound
//! ├── lifecycle     - NoDriversFound, NoDriversOnline
//! ├── discovery     - Detection(DetectionError), DeviceNotFound
//! ├── resolution    - ChannelNotFound
//! ├── native        - RangeUnavailable
//! └── service       - Timeout, Worker
//! ```
//!
//! Write failures are not errors of this type: a write that reached the range
//! check or the native call returns a [`WriteOutcome`](crate::sdk::WriteOutcome)
//! carrying a [`WriteError`](crate::sdk::WriteError).
//!
//! # Examples
//!
//! ```
//! use sunbridge_core::error::{DetectionError, ErrorKind, SessionError};
//!
//! let error: SessionError = DetectionError::InProgress.into();
//! assert_eq!(error.kind(), ErrorKind::Discovery);
//! assert!(error.is_retryable());
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{ChannelHandle, DeviceHandle};

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

// =============================================================================
// ErrorKind
// =============================================================================

/// Coarse error category, stable across releases for callers that render status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Operation invoked before `initialize` or after `shutdown`.
    Precondition,
    /// Missing or malformed argument.
    Argument,
    /// Driver layer could not be brought online.
    Lifecycle,
    /// Detection or device resolution failed.
    Discovery,
    /// Channel not found for the given device.
    ChannelResolution,
    /// The native layer reported a failure.
    Native,
    /// The async wrapper gave up waiting or lost its worker.
    Service,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Precondition => "precondition",
            ErrorKind::Argument => "argument",
            ErrorKind::Lifecycle => "lifecycle",
            ErrorKind::Discovery => "discovery",
            ErrorKind::ChannelResolution => "channel_resolution",
            ErrorKind::Native => "native",
            ErrorKind::Service => "service",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// SessionError
// =============================================================================

/// Root error type of the session manager.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Operation requires an initialized session.
    #[error("Session not initialized. Call initialize() first")]
    NotInitialized,

    /// `initialize` called on a session that is already running.
    #[error("Session is already initialized")]
    AlreadyInitialized,

    /// Operation on a session that has been shut down.
    #[error("Session has been shut down")]
    ShutDown,

    /// Missing or malformed argument.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// The driver configuration resource does not exist.
    #[error("Driver configuration not found: {path}")]
    ConfigNotFound {
        /// Path that was given.
        path: PathBuf,
    },

    /// The master layer enumerated no drivers.
    #[error("No drivers found (master initialization returned {code})")]
    NoDriversFound {
        /// Status returned by master initialization.
        code: i32,
    },

    /// Drivers were enumerated but none could be set online.
    #[error("No drivers could be set online ({count} enumerated)")]
    NoDriversOnline {
        /// Number of drivers that were tried.
        count: usize,
    },

    /// Device detection failed.
    #[error("Device detection failed: {0}")]
    Detection(#[from] DetectionError),

    /// No device matches the given name or handle.
    #[error("Device not found: {device}")]
    DeviceNotFound {
        /// The device that was requested.
        device: String,
    },

    /// No channel with that exact name exists on the device.
    #[error("Channel '{channel}' not found on {device}")]
    ChannelNotFound {
        /// Device the lookup ran against.
        device: DeviceHandle,
        /// Requested channel name.
        channel: String,
    },

    /// The native range read failed.
    #[error("Failed to get value range of {channel} (code {code})")]
    RangeUnavailable {
        /// Channel whose range was requested.
        channel: ChannelHandle,
        /// Native status code.
        code: i32,
    },

    /// The caller-imposed timeout elapsed. The bus transaction may still be running.
    #[error("Operation '{operation}' timed out after {duration:?}")]
    Timeout {
        /// Operation name.
        operation: &'static str,
        /// Timeout that elapsed.
        duration: Duration,
    },

    /// The blocking worker panicked or was cancelled.
    #[error("Session worker failed: {message}")]
    Worker {
        /// Error message.
        message: String,
    },
}

impl SessionError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a device not found error.
    pub fn device_not_found(device: impl fmt::Display) -> Self {
        Self::DeviceNotFound {
            device: device.to_string(),
        }
    }

    /// Creates a channel not found error.
    pub fn channel_not_found(device: DeviceHandle, channel: impl Into<String>) -> Self {
        Self::ChannelNotFound {
            device,
            channel: channel.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(operation: &'static str, duration: Duration) -> Self {
        Self::Timeout {
            operation,
            duration,
        }
    }

    /// Creates a worker error.
    pub fn worker(message: impl Into<String>) -> Self {
        Self::Worker {
            message: message.into(),
        }
    }

    /// Returns the error category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::NotInitialized
            | SessionError::AlreadyInitialized
            | SessionError::ShutDown => ErrorKind::Precondition,
            SessionError::InvalidArgument { .. } | SessionError::ConfigNotFound { .. } => {
                ErrorKind::Argument
            }
            SessionError::NoDriversFound { .. } | SessionError::NoDriversOnline { .. } => {
                ErrorKind::Lifecycle
            }
            SessionError::Detection(_) | SessionError::DeviceNotFound { .. } => {
                ErrorKind::Discovery
            }
            SessionError::ChannelNotFound { .. } => ErrorKind::ChannelResolution,
            SessionError::RangeUnavailable { .. } => ErrorKind::Native,
            SessionError::Timeout { .. } | SessionError::Worker { .. } => ErrorKind::Service,
        }
    }

    /// Returns `true` if retrying the same call later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            SessionError::Detection(e) => e.is_retryable(),
            SessionError::RangeUnavailable { .. } | SessionError::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` for errors caused by calling out of order.
    pub fn is_precondition(&self) -> bool {
        self.kind() == ErrorKind::Precondition
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            SessionError::NotInitialized => "not_initialized",
            SessionError::AlreadyInitialized => "already_initialized",
            SessionError::ShutDown => "shut_down",
            SessionError::InvalidArgument { .. } => "invalid_argument",
            SessionError::ConfigNotFound { .. } => "config_not_found",
            SessionError::NoDriversFound { .. } => "no_drivers_found",
            SessionError::NoDriversOnline { .. } => "no_drivers_online",
            SessionError::Detection(e) => e.error_type(),
            SessionError::DeviceNotFound { .. } => "device_not_found",
            SessionError::ChannelNotFound { .. } => "channel_not_found",
            SessionError::RangeUnavailable { .. } => "range_unavailable",
            SessionError::Timeout { .. } => "timeout",
            SessionError::Worker { .. } => "worker",
        }
    }
}

// =============================================================================
// DetectionError
// =============================================================================

/// Failure outcomes of a detection pass.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    /// Another detection is still running.
    #[error("Detection in progress")]
    InProgress,

    /// Fewer devices answered than were requested.
    #[error("Not all devices were found ({requested} requested)")]
    NotAllFound {
        /// Number of devices requested.
        requested: u32,
    },

    /// Any other native status.
    #[error("Unknown detection error (code {code})")]
    Failed {
        /// Native status code.
        code: i32,
    },
}

impl DetectionError {
    /// Returns `true` if the caller may retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DetectionError::InProgress | DetectionError::NotAllFound { .. })
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            DetectionError::InProgress => "detection_in_progress",
            DetectionError::NotAllFound { .. } => "not_all_devices_found",
            DetectionError::Failed { .. } => "detection_failed",
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(SessionError::NotInitialized.kind(), ErrorKind::Precondition);
        assert_eq!(SessionError::ShutDown.kind(), ErrorKind::Precondition);
        assert_eq!(
            SessionError::invalid_argument("empty name").kind(),
            ErrorKind::Argument
        );
        assert_eq!(
            SessionError::NoDriversOnline { count: 2 }.kind(),
            ErrorKind::Lifecycle
        );
        assert_eq!(
            SessionError::channel_not_found(DeviceHandle::new(1), "Pac").kind(),
            ErrorKind::ChannelResolution
        );
        assert_eq!(
            SessionError::timeout("detect", Duration::from_secs(1)).kind(),
            ErrorKind::Service
        );
    }

    #[test]
    fn test_detection_error_conversion() {
        let error: SessionError = DetectionError::NotAllFound { requested: 3 }.into();
        assert!(matches!(
            error,
            SessionError::Detection(DetectionError::NotAllFound { requested: 3 })
        ));
        assert_eq!(error.error_type(), "not_all_devices_found");
        assert!(error.is_retryable());

        let unknown: SessionError = DetectionError::Failed { code: -7 }.into();
        assert!(!unknown.is_retryable());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SessionError::channel_not_found(DeviceHandle::new(4), "nonexistent_channel")
                .to_string(),
            "Channel 'nonexistent_channel' not found on device#4"
        );
        assert_eq!(
            SessionError::NoDriversFound { code: 0 }.to_string(),
            "No drivers found (master initialization returned 0)"
        );
        assert_eq!(
            DetectionError::InProgress.to_string(),
            "Detection in progress"
        );
    }

    #[test]
    fn test_precondition_helper() {
        assert!(SessionError::NotInitialized.is_precondition());
        assert!(SessionError::AlreadyInitialized.is_precondition());
        assert!(!SessionError::device_not_found("inv").is_precondition());
    }
}
