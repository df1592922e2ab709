// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sunbridge-core
//!
//! Device and channel session manager for RS485-connected solar inverters.
//!
//! The crate drives a vendor master/slave SDK through the [`NativeSdk`] trait
//! and turns its numeric handles and C buffers into typed values:
//!
//! - **Types**: handles, devices, channel records, snapshots
//! - **Lifecycle**: bringing drivers online and tearing them down
//! - **Discovery**: detection passes and device enumeration
//! - **Channel**: polling, lookup, metadata and range-checked writes
//! - **Session**: the request/response facade with name resolution
//! - **Service**: async wrapper running the session on the blocking pool
//!
//! ## Example
//!
//! ```rust,ignore
//! use sunbridge_core::{InverterSession, SessionOptions, SessionService};
//!
//! let session = InverterSession::new(Box::new(sdk), SessionOptions::default());
//! let service = SessionService::new(session);
//!
//! service.initialize("yasdi.ini").await?;
//! service.detect_devices(None).await?;
//! let snapshot = service.get_device_data("WR21TL06_SN_2000112233").await?;
//! service.shutdown().await?;
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Core Modules
// =============================================================================

pub mod error;
pub mod sdk;
pub mod state;
pub mod types;

// =============================================================================
// Session Components
// =============================================================================

pub mod cache;
pub mod channel;
pub mod discovery;
pub mod lifecycle;
pub mod metrics;

// =============================================================================
// Facade
// =============================================================================

pub mod service;
pub mod session;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DetectionError, ErrorKind, SessionError, SessionResult};
pub use metrics::{SessionMetrics, SessionMetricsSnapshot};
pub use sdk::{status, DetectStatus, NativeSdk, WriteError, WriteOutcome};
pub use service::SessionService;
pub use session::{InverterSession, SessionOptions};
pub use state::SessionState;
pub use types::{
    normalize_device_name, ChannelHandle, ChannelInfo, ChannelKind, ChannelReading, ChannelRecord,
    ChannelValue, Device, DeviceHandle, DeviceRef, DeviceSnapshot, Driver, DriverHandle,
    ValueRange,
};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
