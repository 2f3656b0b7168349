//! Error types for the authentication crate.

use crate::token::TokenKind;
use wicket_core::Provider;
use std::fmt;

/// Errors from talking to an external identity provider.
///
/// Every variant aborts the login flow; nothing here is retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamAuthError {
    /// Provider configuration is unusable (bad URL, missing credential).
    Configuration { reason: String },
    /// The authorization-code exchange failed.
    Exchange { provider: Provider, reason: String },
    /// The userinfo fetch failed.
    Userinfo { provider: Provider, reason: String },
    /// A provider response parsed, but a required field was absent.
    MissingField {
        provider: Provider,
        field: &'static str,
    },
}

impl fmt::Display for UpstreamAuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration { reason } => {
                write!(f, "provider configuration error: {reason}")
            }
            Self::Exchange { provider, reason } => {
                write!(f, "token exchange with '{provider}' failed: {reason}")
            }
            Self::Userinfo { provider, reason } => {
                write!(f, "userinfo request to '{provider}' failed: {reason}")
            }
            Self::MissingField { provider, field } => {
                write!(f, "'{provider}' response is missing '{field}'")
            }
        }
    }
}

impl std::error::Error for UpstreamAuthError {}

/// Errors from validating or refreshing a gateway session token.
///
/// All variants mean the presented token grants nothing; callers map them
/// to 401 without distinguishing further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signature mismatch, malformed structure, or past expiry.
    Invalid { reason: String },
    /// A structurally valid token of the wrong kind was presented.
    WrongKind { expected: TokenKind },
    /// Token could not be signed. Does not occur with a valid secret.
    Signing { reason: String },
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid { reason } => write!(f, "invalid token: {reason}"),
            Self::WrongKind { expected } => {
                write!(f, "expected {expected} token")
            }
            Self::Signing { reason } => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl std::error::Error for TokenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exchange_error_names_provider() {
        let err = UpstreamAuthError::Exchange {
            provider: Provider::Naver,
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("naver"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn missing_field_error_names_field() {
        let err = UpstreamAuthError::MissingField {
            provider: Provider::Kakao,
            field: "access_token",
        };
        assert!(err.to_string().contains("access_token"));
    }

    #[test]
    fn token_error_display() {
        let err = TokenError::Invalid {
            reason: "signature mismatch".to_string(),
        };
        assert!(err.to_string().contains("signature mismatch"));

        let err = TokenError::WrongKind {
            expected: TokenKind::Refresh,
        };
        assert!(err.to_string().contains("refresh"));
    }
}
