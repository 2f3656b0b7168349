//! Cookie transport for session tokens.
//!
//! Two cookies carry the session: `access` and `refresh`. Both are
//! always HttpOnly with Path=/; Secure and SameSite are configured
//! process-wide. A third, short-lived `oauth_state` cookie round-trips
//! the anti-CSRF state between the login redirect and the provider
//! callback.

use crate::config::{CookieConfig, SameSitePolicy};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Utc};
use std::fmt;
use time::Duration as TimeDuration;
use wicket_auth::TokenPair;

/// Name of the access token cookie.
pub const ACCESS_COOKIE: &str = "access";

/// Name of the refresh token cookie.
pub const REFRESH_COOKIE: &str = "refresh";

/// Name of the anti-CSRF state cookie used during the login flow.
pub const STATE_COOKIE: &str = "oauth_state";

/// Lifetime of the anti-CSRF state cookie.
const STATE_COOKIE_TTL_MINUTES: i64 = 10;

/// Error returned for a cookie configuration browsers would ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidCookiePolicy {
    /// The reason the policy was rejected.
    pub reason: String,
}

impl fmt::Display for InvalidCookiePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid cookie policy: {}", self.reason)
    }
}

impl std::error::Error for InvalidCookiePolicy {}

/// Validated, process-wide cookie attributes.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    secure: bool,
    same_site: SameSite,
}

impl CookiePolicy {
    /// Builds a policy from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidCookiePolicy`] for SameSite=None without Secure:
    /// browsers discard such cookies, so the combination is a
    /// misconfiguration rather than a choice.
    pub fn new(config: &CookieConfig) -> Result<Self, InvalidCookiePolicy> {
        let same_site = match config.same_site {
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::None => SameSite::None,
        };

        if same_site == SameSite::None && !config.secure {
            return Err(InvalidCookiePolicy {
                reason: "SameSite=None requires Secure=true".to_string(),
            });
        }

        Ok(Self {
            secure: config.secure,
            same_site,
        })
    }

    fn session_cookie(&self, name: &'static str, value: String, max_age: TimeDuration) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(self.same_site)
            .max_age(max_age)
            .build()
    }

    /// Attaches both session cookies, each living for its token's
    /// remaining TTL.
    #[must_use]
    pub fn login_cookies(&self, jar: CookieJar, pair: &TokenPair) -> CookieJar {
        jar.add(self.session_cookie(
            ACCESS_COOKIE,
            pair.access_token.clone(),
            remaining(pair.access_expires_at),
        ))
        .add(self.session_cookie(
            REFRESH_COOKIE,
            pair.refresh_token.clone(),
            remaining(pair.refresh_expires_at),
        ))
    }

    /// Attaches a replacement access cookie after a refresh.
    #[must_use]
    pub fn access_cookie(
        &self,
        jar: CookieJar,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> CookieJar {
        jar.add(self.session_cookie(ACCESS_COOKIE, token.to_string(), remaining(expires_at)))
    }

    /// Attaches both session cookies emptied with MaxAge=0 so browsers
    /// delete them immediately, whether or not a session existed.
    #[must_use]
    pub fn logout_cookies(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.session_cookie(ACCESS_COOKIE, String::new(), TimeDuration::ZERO))
            .add(self.session_cookie(REFRESH_COOKIE, String::new(), TimeDuration::ZERO))
    }

    /// Attaches the anti-CSRF state cookie for the duration of one login
    /// attempt. Always Lax: the provider callback is a top-level
    /// navigation, which Strict would block.
    #[must_use]
    pub fn state_cookie(&self, jar: CookieJar, state: &str) -> CookieJar {
        jar.add(
            Cookie::build((STATE_COOKIE, state.to_string()))
                .path("/")
                .http_only(true)
                .secure(self.secure)
                .same_site(SameSite::Lax)
                .max_age(TimeDuration::minutes(STATE_COOKIE_TTL_MINUTES))
                .build(),
        )
    }

    /// Removes the anti-CSRF state cookie.
    #[must_use]
    pub fn clear_state_cookie(&self, jar: CookieJar) -> CookieJar {
        jar.add(
            Cookie::build((STATE_COOKIE, ""))
                .path("/")
                .max_age(TimeDuration::ZERO)
                .build(),
        )
    }
}

/// Reads a token cookie by exact name.
#[must_use]
pub fn read_token(jar: &CookieJar, name: &str) -> Option<String> {
    jar.get(name).map(|cookie| cookie.value().to_string())
}

/// Remaining lifetime of a token, clamped at zero.
fn remaining(expires_at: DateTime<Utc>) -> TimeDuration {
    TimeDuration::seconds((expires_at - Utc::now()).num_seconds().max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wicket_auth::{TokenConfig, TokenService};

    fn policy() -> CookiePolicy {
        CookiePolicy::new(&CookieConfig {
            secure: false,
            same_site: SameSitePolicy::Lax,
        })
        .expect("valid policy")
    }

    fn token_pair() -> TokenPair {
        TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            access_ttl_seconds: 600,
            refresh_ttl_seconds: 3600,
        })
        .expect("service")
        .issue("999")
        .expect("issue")
    }

    #[test]
    fn samesite_none_requires_secure() {
        let err = CookiePolicy::new(&CookieConfig {
            secure: false,
            same_site: SameSitePolicy::None,
        })
        .expect_err("must reject");
        assert!(err.to_string().contains("Secure"));

        CookiePolicy::new(&CookieConfig {
            secure: true,
            same_site: SameSitePolicy::None,
        })
        .expect("secure None is honored by browsers");
    }

    #[test]
    fn login_cookies_carry_tokens_with_remaining_ttl() {
        let jar = policy().login_cookies(CookieJar::new(), &token_pair());

        let access = jar.get(ACCESS_COOKIE).expect("access cookie");
        assert!(!access.value().is_empty());
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.path(), Some("/"));
        let access_age = access.max_age().expect("max age");
        assert!(access_age > TimeDuration::seconds(590));
        assert!(access_age <= TimeDuration::seconds(600));

        let refresh = jar.get(REFRESH_COOKIE).expect("refresh cookie");
        assert!(refresh.max_age().expect("max age") > access_age);
    }

    #[test]
    fn logout_cookies_expire_both_immediately() {
        let jar = policy().logout_cookies(CookieJar::new());

        for name in [ACCESS_COOKIE, REFRESH_COOKIE] {
            let cookie = jar.get(name).expect("cookie present");
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(TimeDuration::ZERO));
            assert_eq!(cookie.http_only(), Some(true));
        }
    }

    #[test]
    fn state_cookie_roundtrip() {
        let policy = policy();
        let jar = policy.state_cookie(CookieJar::new(), "abc123");
        assert_eq!(read_token(&jar, STATE_COOKIE).as_deref(), Some("abc123"));

        let jar = policy.clear_state_cookie(jar);
        let cleared = jar.get(STATE_COOKIE).expect("tombstone cookie");
        assert_eq!(cleared.max_age(), Some(TimeDuration::ZERO));
    }

    #[test]
    fn read_token_is_exact_match_only() {
        let jar = CookieJar::new().add(Cookie::new("access_extra", "nope"));
        assert_eq!(read_token(&jar, ACCESS_COOKIE), None);
    }
}
