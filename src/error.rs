//! Error types and the delivery policy.
//!
//! Every failure a request can hit is a [`WandError`]. Each variant answers
//! two questions, decided once here and nowhere else:
//!
//! - **What kind of failure is it?** [`WandError::kind`] maps to the five
//!   caller-facing [`ErrorKind`]s.
//! - **How does it reach the caller?** [`WandError::delivery`] picks the lane:
//!
//! | Variant | Kind | Lane |
//! |---|---|---|
//! | `InvalidOptions` | `InvalidInput` | Immediate |
//! | `InvalidPath` | `InvalidInput` | Deferred |
//! | `NotFound` | `NotFound` | Deferred |
//! | `PermissionDenied` | `PermissionDenied` | Deferred |
//! | `LimitExceeded` | `LimitExceeded` | Deferred |
//! | `Engine` | `EngineFailure` | Deferred |
//!
//! Immediate errors are call-site defects (a malformed options set) and are
//! returned from the operation itself. Deferred errors are runtime or input
//! faults and always arrive through the completion callback, on a worker
//! thread, even when they were detected before any work was scheduled.

use crate::imaging::EngineError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WandError {
    /// Malformed options: empty option set, negative dimensions,
    /// out-of-range quality, unparseable option values.
    #[error("{0}")]
    InvalidOptions(String),
    /// The path argument is unusable: empty, not UTF-8, contains a null
    /// byte, or names something other than a regular file.
    #[error("{0}")]
    InvalidPath(String),
    /// Carries the base filename only.
    #[error("image file not found: {0}")]
    NotFound(String),
    /// Carries the base filename only.
    #[error("permission denied reading image file: {0}")]
    PermissionDenied(String),
    #[error("requested {dimension} {requested} exceeds the maximum of {max}")]
    LimitExceeded {
        dimension: &'static str,
        requested: u32,
        max: u32,
    },
    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Caller-facing failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    PermissionDenied,
    LimitExceeded,
    EngineFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidInput => "InvalidInput",
            ErrorKind::NotFound => "NotFound",
            ErrorKind::PermissionDenied => "PermissionDenied",
            ErrorKind::LimitExceeded => "LimitExceeded",
            ErrorKind::EngineFailure => "EngineFailure",
        };
        f.write_str(name)
    }
}

/// The channel an error travels through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Returned synchronously from the operation; the callback is never called.
    Immediate,
    /// Passed to the callback on a later scheduling turn.
    Deferred,
}

impl WandError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WandError::InvalidOptions(_) | WandError::InvalidPath(_) => ErrorKind::InvalidInput,
            WandError::NotFound(_) => ErrorKind::NotFound,
            WandError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            WandError::LimitExceeded { .. } => ErrorKind::LimitExceeded,
            WandError::Engine(_) => ErrorKind::EngineFailure,
        }
    }

    pub fn delivery(&self) -> Delivery {
        match self {
            WandError::InvalidOptions(_) => Delivery::Immediate,
            WandError::InvalidPath(_)
            | WandError::NotFound(_)
            | WandError::PermissionDenied(_)
            | WandError::LimitExceeded { .. }
            | WandError::Engine(_) => Delivery::Deferred,
        }
    }
}
