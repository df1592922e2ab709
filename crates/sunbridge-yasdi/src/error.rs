// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Errors raised while loading the vendor library.
//!
//! Once loaded, the binding reports failures through the raw status codes of
//! the `NativeSdk` trait; only library and symbol resolution fail with
//! [`YasdiError`].
//!
//! # Examples
//!
//! ```
//! use sunbridge_yasdi::error::YasdiError;
//!
//! let error = YasdiError::missing_symbol("yasdiMasterInitialize", "undefined symbol");
//! assert_eq!(error.error_type(), "missing_symbol");
//! assert!(error.to_string().contains("yasdiMasterInitialize"));
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// Result type for library loading.
pub type YasdiResult<T> = Result<T, YasdiError>;

/// Failure to load the vendor library.
#[derive(Debug, Error)]
pub enum YasdiError {
    /// The shared library could not be opened.
    #[error("Failed to load vendor library {path}: {message}")]
    LibraryLoad {
        /// Path that was tried.
        path: PathBuf,
        /// Loader message.
        message: String,
    },

    /// A required entry point is missing from the library.
    #[error("Vendor library does not export '{symbol}': {message}")]
    MissingSymbol {
        /// Symbol name.
        symbol: &'static str,
        /// Loader message.
        message: String,
    },
}

impl YasdiError {
    /// Creates a library load error.
    pub fn library_load(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::LibraryLoad {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Creates a missing symbol error.
    pub fn missing_symbol(symbol: &'static str, message: impl ToString) -> Self {
        Self::MissingSymbol {
            symbol,
            message: message.to_string(),
        }
    }

    /// Returns the error type as a string for logging/metrics.
    pub fn error_type(&self) -> &'static str {
        match self {
            YasdiError::LibraryLoad { .. } => "library_load",
            YasdiError::MissingSymbol { .. } => "missing_symbol",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_load_message() {
        let error = YasdiError::library_load("/opt/yasdi/libyasdimaster.so", "not found");
        assert_eq!(
            error.to_string(),
            "Failed to load vendor library /opt/yasdi/libyasdimaster.so: not found"
        );
        assert_eq!(error.error_type(), "library_load");
    }
}
