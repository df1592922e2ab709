// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sunbridge-bin
//!
//! Command-line front end for the sunbridge inverter session manager.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   main.rs    │
//! └──────┬───────┘
//!        │
//! ┌──────▼───────┐     ┌──────────────┐
//! │    cli.rs    │────►│  logging.rs  │
//! └──────┬───────┘     └──────────────┘
//!        │
//! ┌──────▼───────┐     ┌──────────────┐
//! │   commands   │────►│  session.rs  │──► SessionService
//! └──────┬───────┘     └──────┬───────┘
//!        │                    │
//! ┌──────▼───────┐     ┌──────▼───────┐
//! │  output.rs   │     │  signal.rs   │
//! └──────────────┘     └──────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Detect and list inverters (default command)
//! sunbridge
//!
//! # Detect two inverters with a custom config
//! sunbridge -c /etc/sunbridge/sunbridge.yaml devices -n 2
//!
//! # Poll every 10 seconds until Ctrl-C
//! sunbridge read WR21TL06_SN_2000112233 --interval 10
//!
//! # Show and write a parameter channel
//! sunbridge info 1 Plimit
//! sunbridge set 1 Plimit 3000
//!
//! # Validate configuration
//! sunbridge validate --show-config
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// =============================================================================
// Modules
// =============================================================================

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;
pub mod session;
pub mod signal;

// =============================================================================
// Re-exports
// =============================================================================

pub use cli::{Cli, Commands};
pub use error::{BinError, BinResult};
pub use logging::init_logging;
pub use session::{open_session, with_session};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
