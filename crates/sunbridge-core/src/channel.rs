// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Channel access: polling, lookup, metadata and range-checked writes.
//!
//! # Read Policy
//!
//! A poll never fails as a whole because of one channel. Channels whose name
//! or value cannot be read are skipped and reported in [`ChannelPoll::skipped`];
//! a missing unit degrades to an empty string.
//!
//! # Write Policy
//!
//! When the native layer reports a range, a value outside it is rejected
//! locally and the native write is never issued. When no range is available
//! the write is forwarded and the device has the final word.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{SessionError, SessionResult};
use crate::sdk::{NativeSdk, WriteOutcome};
use crate::types::{ChannelHandle, ChannelInfo, ChannelKind, ChannelRecord, DeviceHandle};

/// Number of channels a device usually exposes at most.
pub const CHANNEL_CAPACITY_HINT: usize = 500;

/// Default maximum age of a cached value the native layer may return.
pub const DEFAULT_MAX_VALUE_AGE: Duration = Duration::from_secs(5);

// =============================================================================
// Poll Result
// =============================================================================

/// Step at which a channel read failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStage {
    /// Reading the channel name.
    Name,
    /// Reading the channel value.
    Value,
}

/// A channel left out of a poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedChannel {
    /// Channel handle.
    pub handle: ChannelHandle,
    /// Channel name, if it was read before the failure.
    pub name: Option<String>,
    /// Failing step.
    pub stage: ReadStage,
    /// Native status.
    pub code: i32,
}

/// Outcome of polling a device's spot channels.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelPoll {
    /// Channels that were read.
    pub records: Vec<ChannelRecord>,
    /// Channels that were skipped.
    pub skipped: Vec<SkippedChannel>,
}

// =============================================================================
// ChannelAccess
// =============================================================================

/// Reads and writes channels of one device at a time.
#[derive(Debug, Clone)]
pub struct ChannelAccess {
    max_age: Duration,
    verbose: bool,
}

impl Default for ChannelAccess {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_VALUE_AGE, false)
    }
}

impl ChannelAccess {
    /// Creates a channel accessor.
    pub fn new(max_age: Duration, verbose: bool) -> Self {
        Self { max_age, verbose }
    }

    /// Returns the maximum value age passed to native reads.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    fn enumerate(
        &self,
        sdk: &mut dyn NativeSdk,
        device: DeviceHandle,
        kind: ChannelKind,
    ) -> Vec<ChannelHandle> {
        let handles = sdk.channel_handles(device, kind);
        if handles.len() > CHANNEL_CAPACITY_HINT {
            warn!(
                %device,
                %kind,
                count = handles.len(),
                hint = CHANNEL_CAPACITY_HINT,
                "More channels than expected"
            );
        }
        handles
    }

    /// Polls every spot channel of a device.
    pub fn fetch_channel_data(&self, sdk: &mut dyn NativeSdk, device: DeviceHandle) -> ChannelPoll {
        let handles = self.enumerate(sdk, device, ChannelKind::Spot);
        if self.verbose {
            debug!(%device, count = handles.len(), "Reading spot channels");
        }

        let mut poll = ChannelPoll {
            records: Vec::with_capacity(handles.len()),
            skipped: Vec::new(),
        };

        for handle in handles {
            let name = match sdk.channel_name(handle) {
                Ok(name) => name,
                Err(code) => {
                    if self.verbose {
                        debug!(%device, channel = %handle, code, "Skipping channel without name");
                    }
                    poll.skipped.push(SkippedChannel {
                        handle,
                        name: None,
                        stage: ReadStage::Name,
                        code,
                    });
                    continue;
                }
            };

            let unit = sdk.channel_unit(handle).unwrap_or_default();

            match sdk.channel_value(handle, device, self.max_age) {
                Ok(value) => poll.records.push(ChannelRecord {
                    handle,
                    name,
                    unit,
                    value: value.text,
                    numeric_value: value.numeric,
                    range: None,
                }),
                Err(code) => {
                    if self.verbose {
                        debug!(%device, channel = %name, code, "Skipping unreadable channel");
                    }
                    poll.skipped.push(SkippedChannel {
                        handle,
                        name: Some(name),
                        stage: ReadStage::Value,
                        code,
                    });
                }
            }
        }

        poll
    }

    /// Finds a channel of any kind by exact (case-sensitive) name.
    ///
    /// Returns the first match in enumeration order.
    pub fn find_channel_handle(
        &self,
        sdk: &mut dyn NativeSdk,
        device: DeviceHandle,
        channel: &str,
    ) -> Option<ChannelHandle> {
        self.enumerate(sdk, device, ChannelKind::All)
            .into_iter()
            .find(|&handle| matches!(sdk.channel_name(handle), Ok(name) if name == channel))
    }

    fn resolve(
        &self,
        sdk: &mut dyn NativeSdk,
        device: DeviceHandle,
        channel: &str,
    ) -> SessionResult<ChannelHandle> {
        self.find_channel_handle(sdk, device, channel)
            .ok_or_else(|| SessionError::channel_not_found(device, channel))
    }

    /// Returns name, range and unit of a channel.
    ///
    /// # Errors
    ///
    /// - `SessionError::ChannelNotFound` - no channel with that name
    /// - `SessionError::RangeUnavailable` - the range read failed
    pub fn get_channel_info(
        &self,
        sdk: &mut dyn NativeSdk,
        device: DeviceHandle,
        channel: &str,
    ) -> SessionResult<ChannelInfo> {
        let handle = self.resolve(sdk, device, channel)?;

        let range = sdk
            .channel_range(handle)
            .map_err(|code| SessionError::RangeUnavailable {
                channel: handle,
                code,
            })?;
        let unit = sdk.channel_unit(handle).unwrap_or_default();

        Ok(ChannelInfo {
            handle,
            name: channel.to_string(),
            min_value: range.min,
            max_value: range.max,
            unit,
        })
    }

    /// Writes a channel value after a best-effort range check.
    ///
    /// Only a failed channel lookup is an error. Everything that happens after
    /// the lookup is reported through the returned [`WriteOutcome`].
    pub fn set_channel_value(
        &self,
        sdk: &mut dyn NativeSdk,
        device: DeviceHandle,
        channel: &str,
        value: f64,
    ) -> SessionResult<WriteOutcome> {
        let handle = self.resolve(sdk, device, channel)?;

        match sdk.channel_range(handle) {
            Ok(range) if !range.contains(value) => {
                warn!(%device, channel, value, %range, "Rejected write outside valid range");
                return Ok(WriteOutcome::out_of_range(range));
            }
            Ok(_) => {}
            Err(code) => {
                if self.verbose {
                    debug!(%device, channel, code, "No range available, writing unchecked");
                }
            }
        }

        let outcome = WriteOutcome::from_code(sdk.write_channel_value(handle, device, value));
        if outcome.success {
            if self.verbose {
                debug!(%device, channel, value, "Channel written");
            }
        } else {
            warn!(%device, channel, value, code = outcome.code, outcome = %outcome, "Channel write failed");
        }

        Ok(outcome)
    }
}
