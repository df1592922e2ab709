// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Core data types for the inverter session manager.
//!
//! Handles are session-scoped numeric identifiers handed out by the native
//! driver layer. They are wrapped in newtypes so a channel handle can never be
//! passed where a device handle is expected.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Handles
// =============================================================================

macro_rules! native_handle {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u32);

        impl $name {
            /// Wraps a raw native handle.
            #[inline]
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw native handle.
            #[inline]
            pub const fn raw(&self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }
    };
}

native_handle!(
    /// Identifier of one communication driver instance (e.g. one serial port binding).
    DriverHandle,
    "driver"
);

native_handle!(
    /// Session-scoped handle of a discovered inverter.
    ///
    /// Handles are not stable across restarts and must not be persisted.
    DeviceHandle,
    "device"
);

native_handle!(
    /// Handle of one channel, meaningful only together with the device it was
    /// resolved from.
    ChannelHandle,
    "channel"
);

// =============================================================================
// Drivers & Devices
// =============================================================================

/// A communication driver known to the lifecycle controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Native driver identifier.
    pub handle: DriverHandle,
    /// Human-readable driver name.
    pub name: String,
    /// Whether the driver was successfully set online.
    pub online: bool,
}

/// A discovered inverter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    /// Session-scoped device handle.
    pub handle: DeviceHandle,
    /// Display name with spaces replaced by underscores.
    pub name: String,
}

impl Device {
    /// Creates a device entry from a raw native name, normalizing it.
    pub fn from_raw(handle: DeviceHandle, raw_name: &str) -> Self {
        Self {
            handle,
            name: normalize_device_name(raw_name),
        }
    }
}

/// Normalizes a native device name into a token-safe form.
///
/// Every space is replaced by an underscore; nothing else is touched, so a
/// name with N spaces yields exactly N underscores at the same positions.
///
/// # Examples
///
/// ```
/// use sunbridge_core::types::normalize_device_name;
///
/// assert_eq!(normalize_device_name("WR21TL06 SN 2000112233"), "WR21TL06_SN_2000112233");
/// ```
pub fn normalize_device_name(raw: &str) -> String {
    raw.replace(' ', "_")
}

/// A reference to a device, either by handle or by normalized name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DeviceRef {
    /// Device addressed by its session handle.
    Handle(DeviceHandle),
    /// Device addressed by its normalized display name.
    Name(String),
}

impl fmt::Display for DeviceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceRef::Handle(handle) => write!(f, "{}", handle),
            DeviceRef::Name(name) => write!(f, "{}", name),
        }
    }
}

impl From<DeviceHandle> for DeviceRef {
    fn from(handle: DeviceHandle) -> Self {
        Self::Handle(handle)
    }
}

impl From<&str> for DeviceRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for DeviceRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl FromStr for DeviceRef {
    type Err = std::convert::Infallible;

    /// Purely numeric input is a handle, anything else is a name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.parse::<u32>() {
            Ok(raw) => Self::Handle(DeviceHandle::new(raw)),
            Err(_) => Self::Name(trimmed.to_string()),
        })
    }
}

// =============================================================================
// Channels
// =============================================================================

/// Channel subsets the native layer can enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    /// Live measurement channels.
    Spot,
    /// Settable parameter channels.
    Parameter,
    /// Service/test channels.
    Test,
    /// Every channel of the device.
    All,
}

impl ChannelKind {
    /// Returns the native channel-type selector.
    pub fn as_native(&self) -> u32 {
        match self {
            ChannelKind::Spot => 0,
            ChannelKind::Parameter => 1,
            ChannelKind::Test => 2,
            ChannelKind::All => 3,
        }
    }
}

impl fmt::Display for ChannelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelKind::Spot => "spot",
            ChannelKind::Parameter => "parameter",
            ChannelKind::Test => "test",
            ChannelKind::All => "all",
        };
        write!(f, "{}", s)
    }
}

/// Inclusive numeric range a channel accepts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    /// Lower bound.
    pub min: f64,
    /// Upper bound.
    pub max: f64,
}

impl ValueRange {
    /// Creates a range.
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns `true` if `value` lies within `[min, max]`.
    ///
    /// NaN is never contained.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// A value read from a channel: the numeric value and its textual rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelValue {
    /// Numeric value.
    pub numeric: f64,
    /// Textual value as reported by the device (status texts, formatted numbers).
    pub text: String,
}

impl ChannelValue {
    /// Creates a channel value.
    pub fn new(numeric: f64, text: impl Into<String>) -> Self {
        Self {
            numeric,
            text: text.into(),
        }
    }
}

/// One measurement or setting point as read during a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelRecord {
    /// Channel handle.
    pub handle: ChannelHandle,
    /// Channel name.
    pub name: String,
    /// Unit string, empty if unavailable.
    pub unit: String,
    /// Last-read textual value.
    pub value: String,
    /// Last-read numeric value.
    pub numeric_value: f64,
    /// Valid range, if one was read.
    pub range: Option<ValueRange>,
}

impl ChannelRecord {
    /// Returns the externally visible reading for this record.
    pub fn reading(&self) -> ChannelReading {
        ChannelReading {
            value: self.value.clone(),
            unit: self.unit.clone(),
            numeric_value: self.numeric_value,
        }
    }
}

/// The `{value, unit, numericValue}` triple returned per channel by a poll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelReading {
    /// Textual value.
    pub value: String,
    /// Unit string.
    pub unit: String,
    /// Numeric value.
    pub numeric_value: f64,
}

/// Result of polling all spot channels of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSnapshot {
    /// Device that was polled.
    pub device: DeviceHandle,
    /// Time the poll completed.
    pub timestamp: DateTime<Utc>,
    /// Readings keyed by channel name.
    pub channels: BTreeMap<String, ChannelReading>,
}

impl DeviceSnapshot {
    /// Builds a snapshot from polled records, stamping it with the current time.
    pub fn from_records(device: DeviceHandle, records: &[ChannelRecord]) -> Self {
        let channels = records
            .iter()
            .map(|record| (record.name.clone(), record.reading()))
            .collect();

        Self {
            device,
            timestamp: Utc::now(),
            channels,
        }
    }

    /// Returns the reading for a channel.
    pub fn get(&self, channel: &str) -> Option<&ChannelReading> {
        self.channels.get(channel)
    }

    /// Returns the number of channels in the snapshot.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if no channel could be read.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

/// Metadata of a settable channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    /// Channel handle.
    pub handle: ChannelHandle,
    /// Channel name.
    pub name: String,
    /// Lower bound of the valid range.
    pub min_value: f64,
    /// Upper bound of the valid range.
    pub max_value: f64,
    /// Unit string, empty if unavailable.
    pub unit: String,
}

impl ChannelInfo {
    /// Returns the valid range as a [`ValueRange`].
    pub fn range(&self) -> ValueRange {
        ValueRange::new(self.min_value, self.max_value)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_device_name() {
        assert_eq!(normalize_device_name("SB 3000 SN 123"), "SB_3000_SN_123");
        assert_eq!(normalize_device_name("  "), "__");
        assert_eq!(normalize_device_name("NoSpaces"), "NoSpaces");
        assert_eq!(normalize_device_name(""), "");
    }

    #[test]
    fn test_normalize_preserves_positions() {
        let raw = "a b  c d";
        let normalized = normalize_device_name(raw);

        assert_eq!(normalized.len(), raw.len());
        let spaces: Vec<usize> = raw.match_indices(' ').map(|(i, _)| i).collect();
        let underscores: Vec<usize> = normalized.match_indices('_').map(|(i, _)| i).collect();
        assert_eq!(spaces, underscores);
        assert_eq!(normalize_device_name(raw), normalized);
    }

    #[test]
    fn test_normalize_leaves_other_whitespace() {
        assert_eq!(normalize_device_name("a\tb"), "a\tb");
    }

    #[test]
    fn test_device_ref_parse() {
        assert_eq!(
            "42".parse::<DeviceRef>().unwrap(),
            DeviceRef::Handle(DeviceHandle::new(42))
        );
        assert_eq!(
            "SB_3000".parse::<DeviceRef>().unwrap(),
            DeviceRef::Name("SB_3000".to_string())
        );
        assert_eq!(
            "-1".parse::<DeviceRef>().unwrap(),
            DeviceRef::Name("-1".to_string())
        );
    }

    #[test]
    fn test_handle_display() {
        assert_eq!(DeviceHandle::new(7).to_string(), "device#7");
        assert_eq!(ChannelHandle::new(12).to_string(), "channel#12");
        assert_eq!(DriverHandle::new(1).to_string(), "driver#1");
    }

    #[test]
    fn test_value_range_contains() {
        let range = ValueRange::new(0.0, 100.0);
        assert!(range.contains(0.0));
        assert!(range.contains(100.0));
        assert!(range.contains(55.5));
        assert!(!range.contains(-0.1));
        assert!(!range.contains(100.1));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn test_channel_kind_native() {
        assert_eq!(ChannelKind::Spot.as_native(), 0);
        assert_eq!(ChannelKind::All.as_native(), 3);
        assert_eq!(ChannelKind::Parameter.to_string(), "parameter");
    }

    #[test]
    fn test_reading_serializes_camel_case() {
        let reading = ChannelReading {
            value: "230.1".to_string(),
            unit: "V".to_string(),
            numeric_value: 230.1,
        };
        let json = serde_json::to_value(&reading).unwrap();
        assert_eq!(json["numericValue"], 230.1);
        assert_eq!(json["unit"], "V");
    }

    #[test]
    fn test_snapshot_from_records() {
        let records = vec![
            ChannelRecord {
                handle: ChannelHandle::new(1),
                name: "Pac".to_string(),
                unit: "W".to_string(),
                value: "1500".to_string(),
                numeric_value: 1500.0,
                range: None,
            },
            ChannelRecord {
                handle: ChannelHandle::new(2),
                name: "Upv-Ist".to_string(),
                unit: "V".to_string(),
                value: "312".to_string(),
                numeric_value: 312.0,
                range: None,
            },
        ];

        let snapshot = DeviceSnapshot::from_records(DeviceHandle::new(3), &records);
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("Pac").unwrap().numeric_value, 1500.0);
        assert!(snapshot.get("missing").is_none());
    }
}
