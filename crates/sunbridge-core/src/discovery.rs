// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Device discovery.
//!
//! Detection is a blocking bus scan. Its outcome is interpreted per call, and
//! the device table it leaves behind is read back through [`DeviceDiscovery::list_devices`].

use tracing::{debug, warn};

use crate::error::DetectionError;
use crate::sdk::{DetectStatus, NativeSdk};
use crate::types::Device;

/// Number of devices a single bus usually carries at most.
///
/// Soft limit: larger tables are returned in full and logged.
pub const DEVICE_CAPACITY_HINT: usize = 50;

/// Runs detection passes and enumerates detected devices.
#[derive(Debug, Clone, Default)]
pub struct DeviceDiscovery {
    verbose: bool,
}

impl DeviceDiscovery {
    /// Creates a discovery component. `verbose` enables diagnostic narration.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Runs a blocking detection pass for `expected` devices.
    ///
    /// # Errors
    ///
    /// - `DetectionError::InProgress` - another detection is still running
    /// - `DetectionError::NotAllFound` - fewer devices answered than expected
    /// - `DetectionError::Failed` - any other native status
    pub fn detect(&self, sdk: &mut dyn NativeSdk, expected: u32) -> Result<(), DetectionError> {
        if self.verbose {
            debug!(expected, "Starting device detection");
        }

        let code = sdk.start_detection(expected);
        match DetectStatus::from_code(code) {
            DetectStatus::Ok => {
                if self.verbose {
                    debug!(expected, "Device detection complete");
                }
                Ok(())
            }
            DetectStatus::InProgress => Err(DetectionError::InProgress),
            DetectStatus::NotAllFound => {
                warn!(expected, "Not all devices answered detection");
                Err(DetectionError::NotAllFound {
                    requested: expected,
                })
            }
            DetectStatus::Unknown(code) => {
                warn!(code, "Device detection failed");
                Err(DetectionError::Failed { code })
            }
        }
    }

    /// Lists every device the native layer currently knows, ordered by handle.
    ///
    /// Names are normalized. A device whose name cannot be read keeps its
    /// handle's display form as its name.
    pub fn list_devices(&self, sdk: &mut dyn NativeSdk) -> Vec<Device> {
        let mut handles = sdk.device_handles();
        handles.sort_unstable();
        handles.dedup();

        if handles.len() > DEVICE_CAPACITY_HINT {
            warn!(
                count = handles.len(),
                hint = DEVICE_CAPACITY_HINT,
                "More devices than expected"
            );
        }

        handles
            .into_iter()
            .map(|handle| match sdk.device_name(handle) {
                Some(raw) => {
                    let device = Device::from_raw(handle, &raw);
                    if self.verbose {
                        debug!(%handle, name = %device.name, "Found device");
                    }
                    device
                }
                None => {
                    warn!(%handle, "Failed to read device name");
                    Device {
                        handle,
                        name: handle.to_string(),
                    }
                }
            })
            .collect()
    }
}
