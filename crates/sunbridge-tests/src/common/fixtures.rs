// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # Test Fixtures
//!
//! Pre-built buses and configuration files for consistent testing.

use std::path::PathBuf;

use sunbridge_core::{status, ValueRange};
use tempfile::TempDir;

use super::mocks::{MockChannel, MockDevice, MockDriver, MockSdk};

// =============================================================================
// Bus Fixtures
// =============================================================================

/// Fixture providing standard mock buses.
pub struct BusFixtures;

impl BusFixtures {
    /// Raw name of the primary inverter.
    pub const INVERTER_RAW_NAME: &'static str = "WR21TL06 SN 2000112233";

    /// Normalized name of the primary inverter.
    pub const INVERTER_NAME: &'static str = "WR21TL06_SN_2000112233";

    /// Handle of the primary inverter.
    pub const INVERTER_HANDLE: u32 = 1;

    /// Raw name of the secondary inverter.
    pub const SECOND_RAW_NAME: &'static str = "SB 3000 SN 1234";

    /// Normalized name of the secondary inverter.
    pub const SECOND_NAME: &'static str = "SB_3000_SN_1234";

    /// Handle of the power limit parameter on the primary inverter.
    pub const PLIMIT_HANDLE: u32 = 110;

    /// Valid range of the power limit parameter.
    pub fn plimit_range() -> ValueRange {
        ValueRange::new(0.0, 5000.0)
    }

    /// Spot channel names of the primary inverter, in enumeration order.
    pub fn spot_channel_names() -> Vec<&'static str> {
        vec!["Pac", "Upv-Ist", "E-Total", "Mode"]
    }

    /// The primary inverter: four spot channels and two parameters.
    pub fn inverter() -> MockDevice {
        MockDevice::new(Self::INVERTER_HANDLE, Self::INVERTER_RAW_NAME)
            .with_channel(MockChannel::spot(101, "Pac", "W", 1520.0))
            .with_channel(MockChannel::spot(102, "Upv-Ist", "V", 352.0))
            .with_channel(MockChannel::spot(103, "E-Total", "kWh", 18344.5))
            .with_channel(MockChannel::status_text(104, "Mode", 2.0, "Mpp"))
            .with_channel(MockChannel::parameter(
                Self::PLIMIT_HANDLE,
                "Plimit",
                "W",
                5000.0,
                Self::plimit_range(),
            ))
            .with_channel(
                MockChannel::parameter(
                    111,
                    "Default",
                    "",
                    0.0,
                    ValueRange::new(0.0, 0.0),
                )
                .without_range(status::NO_RANGE),
            )
    }

    /// A second inverter with one spot channel.
    pub fn second_inverter() -> MockDevice {
        MockDevice::new(2, Self::SECOND_RAW_NAME)
            .with_channel(MockChannel::spot(201, "Pac", "W", 870.0))
    }

    /// One serial driver and the primary inverter.
    pub fn single_inverter() -> MockSdk {
        MockSdk::new()
            .with_driver(MockDriver::new(1, "COM1"))
            .with_device(Self::inverter())
    }

    /// One serial driver and two inverters, registered out of handle order.
    pub fn two_inverters() -> MockSdk {
        MockSdk::new()
            .with_driver(MockDriver::new(1, "COM1"))
            .with_device(Self::second_inverter())
            .with_device(Self::inverter())
    }
}

// =============================================================================
// Config Fixtures
// =============================================================================

/// A temporary directory holding a driver configuration file.
#[derive(Debug)]
pub struct DriverConfigFixture {
    dir: TempDir,
    path: PathBuf,
}

impl DriverConfigFixture {
    /// Writes a minimal `yasdi.ini` into a fresh temporary directory.
    pub fn new() -> Self {
        let dir = super::temp_test_dir("sunbridge-ini");
        let path = dir.path().join("yasdi.ini");
        std::fs::write(&path, Self::INI).expect("Failed to write driver config");
        Self { dir, path }
    }

    /// Driver configuration content.
    pub const INI: &'static str =
        "[DriverModules]\nDriver0=yasdi_drv_serial\n\n[COM1]\nDevice=/dev/ttyUSB0\nMedia=RS485\nBaudrate=1200\nProtocol=SMANet\n";

    /// Path of the driver configuration file.
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    /// The temporary directory.
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for DriverConfigFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample application configuration files.
pub struct ConfigFixtures;

impl ConfigFixtures {
    /// A complete YAML configuration.
    pub const YAML: &'static str = r#"
sdk:
  library_path: /usr/local/lib/libyasdimaster.so
  driver_config: yasdi.ini

session:
  debug_level: 1
  max_value_age_secs: 10
  expected_devices: 2
  operation_timeout_secs: 30

logging:
  level: debug
  format: json
"#;

    /// The same configuration in TOML.
    pub const TOML: &'static str = r#"
[sdk]
library_path = "/usr/local/lib/libyasdimaster.so"
driver_config = "yasdi.ini"

[session]
debug_level = 1
max_value_age_secs = 10
expected_devices = 2
operation_timeout_secs = 30

[logging]
level = "debug"
format = "json"
"#;

    /// The same configuration in JSON.
    pub const JSON: &'static str = r#"{
  "sdk": {
    "library_path": "/usr/local/lib/libyasdimaster.so",
    "driver_config": "yasdi.ini"
  },
  "session": {
    "debug_level": 1,
    "max_value_age_secs": 10,
    "expected_devices": 2,
    "operation_timeout_secs": 30
  },
  "logging": { "level": "debug", "format": "json" }
}"#;
}
