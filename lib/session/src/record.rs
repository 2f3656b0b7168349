//! The cached record of a login.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wicket_core::Provider;

/// Returns the cache key for a subject's session entry.
#[must_use]
pub fn session_key(subject: &str) -> String {
    format!("session:{subject}")
}

/// An advisory record of a completed login.
///
/// Written at login, overwritten at re-login, expired by TTL. Absence of
/// a record says nothing about whether the user is authenticated; the
/// signed token is the authority.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Provider-assigned subject.
    pub subject: String,
    /// Provider that performed the login.
    pub provider: Provider,
    /// When the login completed.
    pub login_time: DateTime<Utc>,
}

impl SessionRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(subject: impl Into<String>, provider: Provider) -> Self {
        Self {
            subject: subject.into(),
            provider,
            login_time: Utc::now(),
        }
    }

    /// Returns the cache key for this record.
    #[must_use]
    pub fn key(&self) -> String {
        session_key(&self.subject)
    }
}
