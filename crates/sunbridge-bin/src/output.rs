// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Rendering of command results to stdout.

use std::fmt::Write as _;

use anyhow::Context;
use serde::Serialize;
use sunbridge_core::{ChannelInfo, Device, DeviceSnapshot, WriteOutcome};

/// Serializes a value as pretty-printed JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("failed to serialize command output")
}

/// Serializes a value as single-line JSON, for streamed output.
pub fn to_json_line<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string(value).context("failed to serialize command output")
}

/// Renders the device list as a table.
pub fn devices_table(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "No devices found".to_string();
    }

    let width = devices
        .iter()
        .map(|d| d.name.len())
        .max()
        .unwrap_or(0)
        .max("NAME".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:>8}  {:<width$}", "HANDLE", "NAME", width = width);
    for device in devices {
        let _ = writeln!(
            out,
            "{:>8}  {:<width$}",
            device.handle.raw(),
            device.name,
            width = width
        );
    }
    let _ = write!(out, "{} device(s)", devices.len());
    out
}

/// Renders a poll result, one channel per line.
pub fn snapshot_table(snapshot: &DeviceSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} at {}",
        snapshot.device,
        snapshot.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
    );

    let width = snapshot.channels.keys().map(String::len).max().unwrap_or(0);
    for (name, reading) in &snapshot.channels {
        let _ = writeln!(
            out,
            "  {:<width$}  {} {}",
            name,
            reading.value,
            reading.unit,
            width = width
        );
    }
    let _ = write!(out, "{} channel(s)", snapshot.len());
    out
}

/// Renders channel metadata.
pub fn channel_info_text(info: &ChannelInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Channel: {}", info.name);
    let _ = writeln!(out, "  Handle: {}", info.handle.raw());
    let _ = writeln!(out, "  Range:  {}", info.range());
    let _ = write!(
        out,
        "  Unit:   {}",
        if info.unit.is_empty() { "-" } else { &info.unit }
    );
    out
}

/// Renders a write outcome.
pub fn write_outcome_text(channel: &str, value: f64, outcome: &WriteOutcome) -> String {
    if outcome.success {
        format!("{} = {}: written", channel, value)
    } else {
        format!("{} = {}: {}", channel, value, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sunbridge_core::{ChannelHandle, ChannelRecord, DeviceHandle, ValueRange, WriteError};

    #[test]
    fn test_devices_table() {
        let devices = vec![
            Device::from_raw(DeviceHandle::new(1), "WR 21TL06 SN 2000112233"),
            Device::from_raw(DeviceHandle::new(2), "SB 3000"),
        ];

        let table = devices_table(&devices);
        assert!(table.contains("WR_21TL06_SN_2000112233"));
        assert!(table.contains("SB_3000"));
        assert!(table.ends_with("2 device(s)"));
        assert_eq!(devices_table(&[]), "No devices found");
    }

    #[test]
    fn test_snapshot_table() {
        let records = vec![ChannelRecord {
            handle: ChannelHandle::new(3),
            name: "Pac".to_string(),
            unit: "W".to_string(),
            value: "1520".to_string(),
            numeric_value: 1520.0,
            range: None,
        }];
        let snapshot = DeviceSnapshot::from_records(DeviceHandle::new(7), &records);

        let text = snapshot_table(&snapshot);
        assert!(text.starts_with("device#7"));
        assert!(text.contains("Pac  1520 W"));
        assert!(text.ends_with("1 channel(s)"));
    }

    #[test]
    fn test_channel_info_text() {
        let info = ChannelInfo {
            handle: ChannelHandle::new(12),
            name: "Plimit".to_string(),
            min_value: 0.0,
            max_value: 5000.0,
            unit: String::new(),
        };

        let text = channel_info_text(&info);
        assert!(text.contains("Range:  [0, 5000]"));
        assert!(text.contains("Unit:   -"));
    }

    #[test]
    fn test_write_outcome_text() {
        let rejected = WriteOutcome::out_of_range(ValueRange::new(0.0, 100.0));
        let text = write_outcome_text("Plimit", 150.0, &rejected);
        assert!(text.contains("[0, 100]"));
        assert_eq!(rejected.error, Some(WriteError::OutOfRange));

        let written = WriteOutcome::written();
        assert_eq!(write_outcome_text("Plimit", 50.0, &written), "Plimit = 50: written");
    }

    #[test]
    fn test_to_json() {
        let json = to_json(&WriteOutcome::written()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("error").is_none());
    }
}
