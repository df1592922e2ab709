// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! # sunbridge-yasdi
//!
//! Binding to the YASDI master library for the sunbridge session manager.
//!
//! The library is opened at runtime, so a build host does not need the vendor
//! SDK installed. [`YasdiSdk`] implements `sunbridge_core::NativeSdk`.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │       InverterSession        │
//! └──────────────┬───────────────┘
//!                │ NativeSdk
//! ┌──────────────┴───────────────┐
//! │          YasdiSdk            │ ← handle tables, text buffers
//! │          YasdiApi            │ ← symbols resolved once
//! └──────────────┬───────────────┘
//!                │ C ABI
//! ┌──────────────┴───────────────┐
//! │     libyasdimaster.so        │
//! └──────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sunbridge_core::{InverterSession, SessionOptions};
//! use sunbridge_yasdi::YasdiSdk;
//!
//! let sdk = YasdiSdk::load("/usr/local/lib/libyasdimaster.so")?;
//! let mut session = InverterSession::new(Box::new(sdk), SessionOptions::default());
//! session.initialize("yasdi.ini")?;
//! ```

#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod buffer;
pub mod error;
pub mod ffi;
pub mod sdk;

pub use error::{YasdiError, YasdiResult};
pub use sdk::{master_active, YasdiSdk, DEFAULT_LIBRARY, MASTER_BUSY};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
