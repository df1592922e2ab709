// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0
// Copyright (c) 2025 Sylvex. All rights reserved.

//! Session state machine.
//!
//! ```text
//! Uninitialized ──initialize──▶ Initializing ──ok──▶ Ready ◀──▶ Detecting
//!       ▲                            │                 │
//!       └──────────failed────────────┘                 ▼
//!                                               ShuttingDown ──▶ Closed
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SessionError, SessionResult};

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Created, driver layer not yet online.
    #[default]
    Uninitialized,
    /// `initialize` is running.
    Initializing,
    /// Drivers online; device and channel operations are allowed.
    Ready,
    /// A blocking detection pass is running.
    Detecting,
    /// `shutdown` is running.
    ShuttingDown,
    /// Shut down. Only `shutdown` is still accepted.
    Closed,
}

impl SessionState {
    /// Returns `true` if device and channel operations are allowed.
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready)
    }

    /// Returns `true` if the driver layer is (or is being brought) online.
    pub fn holds_drivers(&self) -> bool {
        matches!(
            self,
            SessionState::Initializing | SessionState::Ready | SessionState::Detecting
        )
    }

    /// Fails with the matching precondition error unless the state is `Ready`.
    pub fn require_ready(&self) -> SessionResult<()> {
        match self {
            SessionState::Ready => Ok(()),
            SessionState::Closed | SessionState::ShuttingDown => Err(SessionError::ShutDown),
            _ => Err(SessionError::NotInitialized),
        }
    }

    /// Checks whether `initialize` may start from this state.
    pub fn require_initializable(&self) -> SessionResult<()> {
        match self {
            SessionState::Uninitialized => Ok(()),
            SessionState::Closed | SessionState::ShuttingDown => Err(SessionError::ShutDown),
            _ => Err(SessionError::AlreadyInitialized),
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Initializing => "initializing",
            SessionState::Ready => "ready",
            SessionState::Detecting => "detecting",
            SessionState::ShuttingDown => "shutting_down",
            SessionState::Closed => "closed",
        };
        write!(f, "{}", s)
    }
}
