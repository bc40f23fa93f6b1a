//! Load state types

use crate::error::Error;
use crate::types::SharedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Direction of a load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadType {
    /// Rebuilds the whole list from the initial key
    Refresh,
    /// Extends the list forward from the last returned key
    Append,
}

impl LoadType {
    /// Lowercase name of the direction
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Append => "append",
        }
    }
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of one load direction
#[derive(Debug, Clone, Default)]
pub enum LoadState {
    /// Nothing has been requested in this direction yet
    #[default]
    Idle,
    /// A load is in flight
    Loading,
    /// The last load succeeded
    Success {
        /// No further load is possible in this direction
        fully: bool,
    },
    /// The last load failed
    Failure(SharedError),
}

impl LoadState {
    /// Create a failure state
    pub fn failure(error: Error) -> Self {
        Self::Failure(Arc::new(error))
    }

    /// Check if a load is in flight
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Check if the last load succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Check if the direction has nothing more to load
    pub fn is_fully_loaded(&self) -> bool {
        matches!(self, Self::Success { fully: true })
    }

    /// Check if the last load failed
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Check if the direction reached a terminal (non-loading, non-idle) state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure(_))
    }

    /// The failure, if any
    pub fn error(&self) -> Option<&SharedError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }
}

// Failures compare by message; the error types themselves are not comparable.
impl PartialEq for LoadState {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Idle, Self::Idle) | (Self::Loading, Self::Loading) => true,
            (Self::Success { fully: a }, Self::Success { fully: b }) => a == b,
            (Self::Failure(a), Self::Failure(b)) => {
                Arc::ptr_eq(a, b) || a.to_string() == b.to_string()
            }
            _ => false,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Loading => f.write_str("loading"),
            Self::Success { fully: true } => f.write_str("success (fully loaded)"),
            Self::Success { fully: false } => f.write_str("success"),
            Self::Failure(error) => write!(f, "failure: {error}"),
        }
    }
}

/// Refresh and append status, snapshotted into every event
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadStates {
    /// Refresh direction
    pub refresh: LoadState,
    /// Append direction
    pub append: LoadState,
}

impl LoadStates {
    /// Both directions idle
    pub fn idle() -> Self {
        Self::default()
    }

    /// Create a pair
    pub fn new(refresh: LoadState, append: LoadState) -> Self {
        Self { refresh, append }
    }

    /// State of the given direction
    pub fn get(&self, load_type: LoadType) -> &LoadState {
        match load_type {
            LoadType::Refresh => &self.refresh,
            LoadType::Append => &self.append,
        }
    }

    /// Replace the state of the given direction
    pub fn set(&mut self, load_type: LoadType, state: LoadState) {
        match load_type {
            LoadType::Refresh => self.refresh = state,
            LoadType::Append => self.append = state,
        }
    }

    /// Check if either direction has a load in flight
    pub fn is_loading(&self) -> bool {
        self.refresh.is_loading() || self.append.is_loading()
    }

    /// Whether append loads are currently allowed by the refresh/append states
    ///
    /// Refresh must have succeeded without reaching the end, and append must
    /// not be fully loaded itself.
    pub fn allows_append(&self) -> bool {
        matches!(self.refresh, LoadState::Success { fully: false })
            && !self.append.is_fully_loaded()
    }
}

impl fmt::Display for LoadStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "refresh={}, append={}", self.refresh, self.append)
    }
}
