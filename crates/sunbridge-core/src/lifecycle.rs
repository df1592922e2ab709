// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Driver lifecycle controller.
//!
//! Brings the master layer and its communication drivers online, and takes
//! them offline again. Teardown is best-effort: a driver that refuses to go
//! offline never blocks the master shutdown that follows.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::{SessionError, SessionResult};
use crate::sdk::{status, NativeSdk};
use crate::types::Driver;

/// Number of drivers the vendor layer usually exposes at most.
///
/// This is a soft limit: more drivers are accepted and only logged.
pub const DRIVER_CAPACITY_HINT: usize = 10;

/// Owns the list of drivers the master layer reported.
#[derive(Debug, Default)]
pub struct DriverController {
    drivers: Vec<Driver>,
    verbose: bool,
}

impl DriverController {
    /// Creates a controller. `verbose` enables diagnostic narration.
    pub fn new(verbose: bool) -> Self {
        Self {
            drivers: Vec::new(),
            verbose,
        }
    }

    /// Returns the drivers known since the last successful bring-up.
    pub fn drivers(&self) -> &[Driver] {
        &self.drivers
    }

    /// Returns the number of drivers that went online.
    pub fn online_count(&self) -> usize {
        self.drivers.iter().filter(|d| d.online).count()
    }

    /// Initializes the master layer and sets every driver online.
    ///
    /// Succeeds if at least one driver went online and returns how many did.
    /// On failure the master layer is torn down again before returning.
    ///
    /// # Errors
    ///
    /// - `SessionError::ConfigNotFound` - the configuration resource does not exist
    /// - `SessionError::NoDriversFound` - no driver was enumerated
    /// - `SessionError::NoDriversOnline` - no driver could be set online
    pub fn bring_online(&mut self, sdk: &mut dyn NativeSdk, config: &Path) -> SessionResult<usize> {
        if !config.exists() {
            return Err(SessionError::ConfigNotFound {
                path: config.to_path_buf(),
            });
        }

        let (code, declared) = sdk.master_initialize(config);
        if self.verbose {
            debug!(code, declared, sdk = sdk.name(), "Master initialization returned");
        }
        if code != status::OK {
            warn!(code, config = %config.display(), "Master initialization reported a non-zero status");
        }

        let handles = if declared == 0 { Vec::new() } else { sdk.driver_handles() };
        if handles.is_empty() {
            sdk.master_shutdown();
            return Err(SessionError::NoDriversFound { code });
        }
        if handles.len() > DRIVER_CAPACITY_HINT {
            warn!(
                count = handles.len(),
                hint = DRIVER_CAPACITY_HINT,
                "More drivers than expected"
            );
        }

        self.drivers.clear();
        for handle in handles {
            let name = sdk
                .driver_name(handle)
                .unwrap_or_else(|| handle.to_string());

            if self.verbose {
                debug!(driver = %name, %handle, "Switching on driver");
            }

            let online = sdk.set_driver_online(handle);
            if !online {
                warn!(driver = %name, %handle, "Driver could not be set online");
            }

            self.drivers.push(Driver { handle, name, online });
        }

        let online = self.online_count();
        if online == 0 {
            let count = self.drivers.len();
            self.take_offline(sdk);
            return Err(SessionError::NoDriversOnline { count });
        }

        info!(online, total = self.drivers.len(), "Drivers online");
        Ok(online)
    }

    /// Sets every known driver offline, then shuts the master layer down.
    pub fn take_offline(&mut self, sdk: &mut dyn NativeSdk) {
        for driver in self.drivers.drain(..) {
            if self.verbose {
                debug!(driver = %driver.name, handle = %driver.handle, "Switching off driver");
            }
            sdk.set_driver_offline(driver.handle);
        }

        sdk.master_shutdown();
    }
}
