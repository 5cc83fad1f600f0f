//! Shared error types for the rewind crates.
//!
//! The taxonomy mirrors how callers are expected to react:
//!
//! - `UnsupportedConstruct`: surfaced to the caller, which decides whether to abort the branch
//! - `InvariantViolation`: a bug or corrupted state, never retried
//! - `TransientResolutionFailure`: generated keys were unavailable; only ever handled by
//!   the one documented fallback query
//! - `Driver`: anything the underlying store reported, propagated unchanged
//!
//! ## Example Usage
//!
//! ```rust
//! use rewind_commons::errors::{Result, RewindError};
//!
//! fn require_single_key(keys: &[String]) -> Result<&str> {
//!     match keys {
//!         [only] => Ok(only.as_str()),
//!         _ => Err(RewindError::unsupported("composite primary key is not supported")),
//!     }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure reported by the driver/session collaborator.
///
/// Opaque to the engine apart from the optional SQLSTATE code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverError {
    pub sql_state: Option<String>,
    pub message: String,
}

impl DriverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            sql_state: None,
            message: message.into(),
        }
    }

    pub fn with_state(sql_state: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sql_state: Some(sql_state.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sql_state {
            Some(state) => write!(f, "[{}] {}", state, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for DriverError {}

/// Main error type for the undo engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RewindError {
    #[error("Not supported: {0}")]
    UnsupportedConstruct(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Generated keys unavailable: {0}")]
    TransientResolutionFailure(String),

    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid SQL: {0}")]
    InvalidSql(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Dirty image: {0}")]
    DirtyImage(String),
}

impl RewindError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn invalid_sql(msg: impl Into<String>) -> Self {
        Self::InvalidSql(msg.into())
    }

    /// True for errors that indicate a bug in the calling code rather than a
    /// condition the caller can react to.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RewindError::InvariantViolation(_))
    }
}

/// Result type alias using RewindError.
pub type Result<T> = std::result::Result<T, RewindError>;
