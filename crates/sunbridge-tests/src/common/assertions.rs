// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Custom Test Assertions
//!
//! Domain-specific assertion helpers with informative failure messages.

use sunbridge_core::{DeviceSnapshot, SessionError, ValueRange, WriteError, WriteOutcome};

// =============================================================================
// Snapshot Assertions
// =============================================================================

/// Assertion extensions for [`DeviceSnapshot`].
pub trait SnapshotAssertions {
    /// Assert that a channel was read with the given numeric value.
    fn assert_reading(&self, channel: &str, numeric: f64);

    /// Assert the exact set of channel names.
    fn assert_channels(&self, expected: &[&str]);
}

impl SnapshotAssertions for DeviceSnapshot {
    fn assert_reading(&self, channel: &str, numeric: f64) {
        let reading = self.get(channel).unwrap_or_else(|| {
            panic!(
                "Channel '{}' missing from snapshot of {}; present: {:?}",
                channel,
                self.device,
                self.channels.keys().collect::<Vec<_>>()
            )
        });
        assert_eq!(
            reading.numeric_value, numeric,
            "Unexpected value for '{}' on {}",
            channel, self.device
        );
    }

    fn assert_channels(&self, expected: &[&str]) {
        let mut actual: Vec<&str> = self.channels.keys().map(String::as_str).collect();
        let mut expected = expected.to_vec();
        actual.sort_unstable();
        expected.sort_unstable();
        assert_eq!(actual, expected, "Channel set mismatch for {}", self.device);
    }
}

// =============================================================================
// Write Assertions
// =============================================================================

/// Assertion extensions for [`WriteOutcome`].
pub trait OutcomeAssertions {
    /// Assert that the write succeeded.
    fn assert_written(&self);

    /// Assert a local range rejection echoing `range`.
    fn assert_rejected(&self, range: ValueRange);

    /// Assert a native failure with the given mapped error.
    fn assert_failed(&self, error: WriteError, code: i32);
}

impl OutcomeAssertions for WriteOutcome {
    fn assert_written(&self) {
        assert!(self.success, "Expected successful write, got: {}", self);
        assert!(self.error.is_none());
    }

    fn assert_rejected(&self, range: ValueRange) {
        assert!(!self.success, "Expected range rejection, got success");
        assert_eq!(self.error, Some(WriteError::OutOfRange), "Outcome: {}", self);
        assert_eq!(self.valid_range, Some(range));
    }

    fn assert_failed(&self, error: WriteError, code: i32) {
        assert!(!self.success, "Expected failed write, got success");
        assert_eq!(self.error, Some(error), "Outcome: {}", self);
        assert_eq!(self.code, code);
        assert!(self.valid_range.is_none());
    }
}

// =============================================================================
// Error Assertions
// =============================================================================

/// Assert that a result failed with an error matching `predicate`.
pub fn assert_session_err<T: std::fmt::Debug>(
    result: Result<T, SessionError>,
    expected: &str,
    predicate: impl FnOnce(&SessionError) -> bool,
) {
    match result {
        Ok(value) => panic!("Expected {} error, got Ok({:?})", expected, value),
        Err(e) => assert!(predicate(&e), "Expected {} error, got: {:?}", expected, e),
    }
}
