//! Error types for the session crate.
//!
//! Both error kinds are deliberately swallowed by callers: a cache or
//! audit failure is logged and never surfaces to the user-facing request.

use std::fmt;

/// Errors from the session cache backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    /// The backing store rejected or failed the operation.
    Backend { reason: String },
}

impl fmt::Display for SessionStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend { reason } => write!(f, "session store error: {reason}"),
        }
    }
}

impl std::error::Error for SessionStoreError {}

/// Errors from the login audit ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditError {
    /// Database error while inserting a login event.
    Database { details: String },
}

impl fmt::Display for AuditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Database { details } => write!(f, "login ledger error: {details}"),
        }
    }
}

impl std::error::Error for AuditError {}
