// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session metrics.
//!
//! Counters are atomics so that a snapshot can be taken from another task
//! while the session itself is busy on the bus.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Live counters of one session.
#[derive(Debug, Default)]
pub struct SessionMetrics {
    detections_total: AtomicU64,
    detections_failed: AtomicU64,

    polls_total: AtomicU64,
    poll_duration_us: AtomicU64,
    channels_read: AtomicU64,
    channels_skipped: AtomicU64,

    writes_total: AtomicU64,
    writes_success: AtomicU64,
    writes_rejected: AtomicU64,
    writes_failed: AtomicU64,

    /// Last successful bus operation (unix timestamp).
    last_success: AtomicU64,
    last_error: RwLock<Option<String>>,
}

impl SessionMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    fn touch(&self) {
        self.last_success
            .store(Utc::now().timestamp() as u64, Ordering::Relaxed);
    }

    /// Records a detection pass.
    pub fn record_detection(&self, success: bool) {
        self.detections_total.fetch_add(1, Ordering::Relaxed);
        if success {
            self.touch();
        } else {
            self.detections_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records a spot channel poll.
    pub fn record_poll(&self, duration: Duration, read: usize, skipped: usize) {
        self.polls_total.fetch_add(1, Ordering::Relaxed);
        self.poll_duration_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.channels_read.fetch_add(read as u64, Ordering::Relaxed);
        self.channels_skipped
            .fetch_add(skipped as u64, Ordering::Relaxed);
        if read > 0 {
            self.touch();
        }
    }

    /// Records a write that reached the range check.
    ///
    /// `rejected` marks a local range rejection; otherwise `success` tells
    /// whether the native write succeeded.
    pub fn record_write(&self, success: bool, rejected: bool) {
        self.writes_total.fetch_add(1, Ordering::Relaxed);
        if rejected {
            self.writes_rejected.fetch_add(1, Ordering::Relaxed);
        } else if success {
            self.writes_success.fetch_add(1, Ordering::Relaxed);
            self.touch();
        } else {
            self.writes_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Records an error message.
    pub fn record_error(&self, error: &str) {
        let mut guard = self.last_error.write();
        *guard = Some(error.to_string());
    }

    /// Returns a snapshot of the metrics.
    pub fn snapshot(&self) -> SessionMetricsSnapshot {
        let polls_total = self.polls_total.load(Ordering::Relaxed);
        let poll_duration_us = self.poll_duration_us.load(Ordering::Relaxed);
        let last_success_ts = self.last_success.load(Ordering::Relaxed);

        SessionMetricsSnapshot {
            detections_total: self.detections_total.load(Ordering::Relaxed),
            detections_failed: self.detections_failed.load(Ordering::Relaxed),
            polls_total,
            poll_avg_duration: if polls_total > 0 {
                Duration::from_micros(poll_duration_us / polls_total)
            } else {
                Duration::ZERO
            },
            channels_read: self.channels_read.load(Ordering::Relaxed),
            channels_skipped: self.channels_skipped.load(Ordering::Relaxed),
            writes_total: self.writes_total.load(Ordering::Relaxed),
            writes_success: self.writes_success.load(Ordering::Relaxed),
            writes_rejected: self.writes_rejected.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
            last_success: if last_success_ts > 0 {
                DateTime::from_timestamp(last_success_ts as i64, 0)
            } else {
                None
            },
            last_error: self.last_error.read().clone(),
        }
    }
}

/// A snapshot of session metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMetricsSnapshot {
    /// Detection passes run.
    pub detections_total: u64,
    /// Detection passes that did not find every device.
    pub detections_failed: u64,
    /// Spot channel polls.
    pub polls_total: u64,
    /// Average poll duration.
    pub poll_avg_duration: Duration,
    /// Channels read across all polls.
    pub channels_read: u64,
    /// Channels skipped across all polls.
    pub channels_skipped: u64,
    /// Writes attempted.
    pub writes_total: u64,
    /// Writes the device accepted.
    pub writes_success: u64,
    /// Writes rejected by the local range check.
    pub writes_rejected: u64,
    /// Writes the native layer reported as failed.
    pub writes_failed: u64,
    /// Last successful bus operation.
    pub last_success: Option<DateTime<Utc>>,
    /// Last error message.
    pub last_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_metrics() {
        let metrics = SessionMetrics::new();

        metrics.record_detection(true);
        metrics.record_detection(false);
        metrics.record_poll(Duration::from_millis(10), 4, 1);
        metrics.record_poll(Duration::from_millis(30), 0, 5);
        metrics.record_write(true, false);
        metrics.record_write(false, true);
        metrics.record_write(false, false);
        metrics.record_error("Device did not respond (timeout)");

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.detections_total, 2);
        assert_eq!(snapshot.detections_failed, 1);
        assert_eq!(snapshot.polls_total, 2);
        assert_eq!(snapshot.poll_avg_duration, Duration::from_millis(20));
        assert_eq!(snapshot.channels_read, 4);
        assert_eq!(snapshot.channels_skipped, 6);
        assert_eq!(snapshot.writes_total, 3);
        assert_eq!(snapshot.writes_success, 1);
        assert_eq!(snapshot.writes_rejected, 1);
        assert_eq!(snapshot.writes_failed, 1);
        assert!(snapshot.last_success.is_some());
        assert_eq!(
            snapshot.last_error.as_deref(),
            Some("Device did not respond (timeout)")
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = SessionMetrics::new().snapshot();
        assert_eq!(snapshot.poll_avg_duration, Duration::ZERO);
        assert!(snapshot.last_success.is_none());
        assert!(snapshot.last_error.is_none());

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("writes_rejected"));
    }
}
