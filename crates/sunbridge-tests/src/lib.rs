// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sunbridge Integration Tests
//!
//! Integration tests for the sunbridge session manager, run against an
//! in-memory stand-in for the vendor SDK.
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p sunbridge-tests
//! cargo test -p sunbridge-tests --test integration_session
//! cargo test -p sunbridge-tests --test integration_service
//! cargo test -p sunbridge-tests --test integration_config
//! ```
//!
//! ## Test Categories
//!
//! ### Session Tests (`integration_session.rs`)
//! - Lifecycle ordering and idempotent shutdown
//! - Detection outcomes and device naming
//! - Polling, channel lookup, range-checked writes
//!
//! ### Service Tests (`integration_service.rs`)
//! - Async wrapper, concurrent detection, timeouts
//!
//! ### Config Tests (`integration_config.rs`)
//! - File formats, environment overrides, validation
//!
//! ## Writing New Tests
//!
//! ```rust,ignore
//! use sunbridge_core::{InverterSession, SessionOptions};
//! use sunbridge_tests::prelude::*;
//!
//! #[test]
//! fn test_something() {
//!     let sdk = BusFixtures::single_inverter();
//!     let ini = DriverConfigFixture::new();
//!     let mut session = InverterSession::new(sdk.boxed(), SessionOptions::default());
//!     session.initialize(ini.path()).unwrap();
//!     assert!(sdk.is_master_up());
//! }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod common;

/// Re-export commonly used items for convenience.
pub mod prelude {
    pub use crate::common::assertions::*;
    pub use crate::common::fixtures::*;
    pub use crate::common::mocks::*;
    pub use crate::common::{init_test_logging, temp_test_dir, unique_test_id};
}
