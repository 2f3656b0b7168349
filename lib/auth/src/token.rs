//! Signed session tokens issued by the gateway.
//!
//! Tokens are HS256 JWTs signed with a process-wide secret and carrying
//! the principal's subject. A `kind` claim distinguishes the short-lived
//! access token from the long-lived refresh token so one can never stand
//! in for the other. Every operation here is a pure function of the token,
//! the secret, and the clock; no I/O, no shared mutable state.

use crate::error::TokenError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rootcause::Report;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default access token lifetime: 30 minutes.
const DEFAULT_ACCESS_TTL_SECONDS: i64 = 30 * 60;

/// Default refresh token lifetime: 7 days.
const DEFAULT_REFRESH_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Which role a token plays in the session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived credential proving an authenticated session.
    Access,
    /// Long-lived credential used only to mint new access tokens.
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Provider-assigned subject the token vouches for.
    sub: String,
    /// Token role; checked on every validation.
    kind: TokenKind,
    /// Issued-at (Unix timestamp).
    iat: i64,
    /// Expiry (Unix timestamp).
    exp: i64,
}

/// The pair of tokens issued at login.
///
/// Invariant: `access_expires_at < refresh_expires_at`, guaranteed by
/// [`TokenConfig`] validation at service construction.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_expires_at: DateTime<Utc>,
}

/// A replacement access token minted from a refresh token.
///
/// The refresh token itself is not rotated; the caller keeps presenting
/// the one issued at login.
#[derive(Debug, Clone)]
pub struct RefreshedAccess {
    pub access_token: String,
    pub access_expires_at: DateTime<Utc>,
}

/// Token signing configuration.
///
/// Fields with defaults can be omitted when loading from the environment.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenConfig {
    /// Process-wide signing secret. Must be non-empty.
    pub secret: String,
    /// Access token lifetime in seconds.
    #[serde(default = "default_access_ttl_seconds")]
    pub access_ttl_seconds: i64,
    /// Refresh token lifetime in seconds. Must exceed the access lifetime.
    #[serde(default = "default_refresh_ttl_seconds")]
    pub refresh_ttl_seconds: i64,
}

fn default_access_ttl_seconds() -> i64 {
    DEFAULT_ACCESS_TTL_SECONDS
}

fn default_refresh_ttl_seconds() -> i64 {
    DEFAULT_REFRESH_TTL_SECONDS
}

/// Error returned when token configuration is unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidTokenConfig {
    /// The reason the configuration was rejected.
    pub reason: String,
}

impl fmt::Display for InvalidTokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid token configuration: {}", self.reason)
    }
}

impl std::error::Error for InvalidTokenConfig {}

/// Stateless signing and verification of session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTokenConfig`] for an empty secret, non-positive
    /// lifetimes, or an access lifetime that does not undercut the
    /// refresh lifetime.
    pub fn new(config: &TokenConfig) -> Result<Self, InvalidTokenConfig> {
        if config.secret.is_empty() {
            return Err(InvalidTokenConfig {
                reason: "signing secret must not be empty".to_string(),
            });
        }
        if config.access_ttl_seconds <= 0 || config.refresh_ttl_seconds <= 0 {
            return Err(InvalidTokenConfig {
                reason: "token lifetimes must be positive".to_string(),
            });
        }
        if config.access_ttl_seconds >= config.refresh_ttl_seconds {
            return Err(InvalidTokenConfig {
                reason: format!(
                    "access lifetime ({}s) must be shorter than refresh lifetime ({}s)",
                    config.access_ttl_seconds, config.refresh_ttl_seconds
                ),
            });
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_ttl: Duration::seconds(config.access_ttl_seconds),
            refresh_ttl: Duration::seconds(config.refresh_ttl_seconds),
        })
    }

    /// Returns the configured refresh token lifetime.
    ///
    /// Session cache entries share this lifetime.
    #[must_use]
    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issues a fresh access/refresh token pair for `subject`.
    pub fn issue(&self, subject: &str) -> Result<TokenPair, Report<TokenError>> {
        let (access_token, access_expires_at) =
            self.sign(subject, TokenKind::Access, self.access_ttl)?;
        let (refresh_token, refresh_expires_at) =
            self.sign(subject, TokenKind::Refresh, self.refresh_ttl)?;

        Ok(TokenPair {
            access_token,
            access_expires_at,
            refresh_token,
            refresh_expires_at,
        })
    }

    /// Validates an access token and returns its subject.
    ///
    /// Fails if the signature does not verify, the token is malformed or
    /// expired, or a refresh token was presented instead.
    pub fn validate(&self, token: &str) -> Result<String, Report<TokenError>> {
        let claims = self.decode(token, TokenKind::Access)?;
        Ok(claims.sub)
    }

    /// Mints a new access token from a valid refresh token.
    ///
    /// The refresh token is not rotated and no revocation list exists; a
    /// refresh token stays usable until its original expiry.
    pub fn refresh(&self, refresh_token: &str) -> Result<RefreshedAccess, Report<TokenError>> {
        let claims = self.decode(refresh_token, TokenKind::Refresh)?;
        let (access_token, access_expires_at) =
            self.sign(&claims.sub, TokenKind::Access, self.access_ttl)?;

        Ok(RefreshedAccess {
            access_token,
            access_expires_at,
        })
    }

    fn sign(
        &self,
        subject: &str,
        kind: TokenKind,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), Report<TokenError>> {
        let now = Utc::now();
        let expires_at = now + ttl;

        let claims = Claims {
            sub: subject.to_string(),
            kind,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token =
            encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
                TokenError::Signing {
                    reason: e.to_string(),
                }
            })?;

        Ok((token, expires_at))
    }

    fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, Report<TokenError>> {
        let validation = Validation::default();

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            TokenError::Invalid {
                reason: e.to_string(),
            }
        })?;

        if data.claims.kind != expected {
            return Err(TokenError::WrongKind { expected }.into());
        }

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> TokenConfig {
        TokenConfig {
            secret: "test-secret-key-for-testing".to_string(),
            access_ttl_seconds: 15 * 60,
            refresh_ttl_seconds: 24 * 60 * 60,
        }
    }

    fn service() -> TokenService {
        TokenService::new(&test_config()).expect("valid config")
    }

    #[test]
    fn issued_access_token_validates_to_subject() {
        let service = service();
        let pair = service.issue("999").expect("issue");

        assert_eq!(service.validate(&pair.access_token).expect("validate"), "999");
        assert!(pair.access_expires_at < pair.refresh_expires_at);
    }

    #[test]
    fn distinct_subjects_never_cross_contaminate() {
        let service = service();
        let alice = service.issue("alice").expect("issue");
        let bob = service.issue("bob").expect("issue");

        assert_ne!(alice.access_token, bob.access_token);
        assert_ne!(alice.refresh_token, bob.refresh_token);
        assert_eq!(service.validate(&alice.access_token).expect("validate"), "alice");
        assert_eq!(service.validate(&bob.access_token).expect("validate"), "bob");
    }

    #[test]
    fn refresh_token_does_not_pass_access_validation() {
        let service = service();
        let pair = service.issue("999").expect("issue");

        let err = service
            .validate(&pair.refresh_token)
            .expect_err("refresh token must not validate as access");
        assert!(err.to_string().contains("access"));
    }

    #[test]
    fn access_token_does_not_refresh() {
        let service = service();
        let pair = service.issue("999").expect("issue");

        service
            .refresh(&pair.access_token)
            .expect_err("access token must not refresh");
    }

    #[test]
    fn refresh_mints_access_token_for_same_subject() {
        let service = service();
        let pair = service.issue("999").expect("issue");

        let refreshed = service.refresh(&pair.refresh_token).expect("refresh");
        assert_eq!(service.validate(&refreshed.access_token).expect("validate"), "999");
    }

    #[test]
    fn expired_token_fails_validation() {
        let service = service();

        // Sign claims whose expiry is far enough in the past to defeat
        // the validator's clock-skew leeway.
        let now = Utc::now();
        let claims = Claims {
            sub: "999".to_string(),
            kind: TokenKind::Access,
            iat: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let expired = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(test_config().secret.as_bytes()),
        )
        .expect("encode");

        service
            .validate(&expired)
            .expect_err("expired token must fail");
    }

    #[test]
    fn tampered_token_fails_validation() {
        let service = service();
        let pair = service.issue("999").expect("issue");

        let mut tampered = pair.access_token.clone();
        let last = tampered.pop().expect("non-empty token");
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        service
            .validate(&tampered)
            .expect_err("tampered token must fail");
    }

    #[test]
    fn malformed_token_fails_validation() {
        let service = service();
        service
            .validate("not-a-jwt")
            .expect_err("malformed token must fail");
    }

    #[test]
    fn token_signed_with_other_secret_fails() {
        let service = service();
        let other = TokenService::new(&TokenConfig {
            secret: "a-different-secret".to_string(),
            ..test_config()
        })
        .expect("valid config");

        let pair = other.issue("999").expect("issue");
        service
            .validate(&pair.access_token)
            .expect_err("foreign signature must fail");
    }

    #[test]
    fn config_rejects_empty_secret() {
        let err = TokenService::new(&TokenConfig {
            secret: String::new(),
            ..test_config()
        })
        .expect_err("must reject");
        assert!(err.to_string().contains("secret"));
    }

    #[test]
    fn config_rejects_access_ttl_not_below_refresh_ttl() {
        let err = TokenService::new(&TokenConfig {
            secret: "s".to_string(),
            access_ttl_seconds: 3600,
            refresh_ttl_seconds: 3600,
        })
        .expect_err("must reject");
        assert!(err.to_string().contains("shorter"));
    }

    #[test]
    fn config_defaults_order_minutes_and_days() {
        let config: TokenConfig =
            serde_json::from_str(r#"{"secret": "s"}"#).expect("deserialize");
        assert_eq!(config.access_ttl_seconds, 30 * 60);
        assert_eq!(config.refresh_ttl_seconds, 7 * 24 * 60 * 60);
    }
}
