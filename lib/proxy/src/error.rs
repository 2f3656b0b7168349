//! Error types for the proxy crate.

use std::fmt;

/// Errors detected while building a route table.
///
/// All of these are configuration mistakes and abort startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTableError {
    /// Pattern is not a supported shape.
    InvalidPattern { pattern: String, reason: String },
    /// Target base URL does not parse.
    InvalidTarget { pattern: String, reason: String },
    /// Two patterns share a literal prefix, so neither can win
    /// deterministically.
    AmbiguousPatterns { first: String, second: String },
}

impl fmt::Display for RouteTableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern '{pattern}': {reason}")
            }
            Self::InvalidTarget { pattern, reason } => {
                write!(f, "invalid target for route '{pattern}': {reason}")
            }
            Self::AmbiguousPatterns { first, second } => {
                write!(
                    f,
                    "route patterns '{first}' and '{second}' overlap with no defined precedence"
                )
            }
        }
    }
}

impl std::error::Error for RouteTableError {}

/// Errors from forwarding a request to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyError {
    /// The forwarding HTTP client could not be constructed.
    Configuration { reason: String },
    /// The backend call failed at the transport level.
    Forward { target: String, reason: String },
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "proxy configuration error: {reason}")
            }
            Self::Forward { target, reason } => {
                write!(f, "failed to forward to '{target}': {reason}")
            }
        }
    }
}

impl std::error::Error for ProxyError {}
