//! The authenticated principal produced by a login flow.

use crate::provider::Provider;
use serde::{Deserialize, Serialize};

/// An identity resolved from an external provider.
///
/// A principal exists only for the duration of a single login flow: it is
/// produced when the provider's userinfo response is normalized, consumed
/// when session tokens are issued, and never stored as such. The `subject`
/// is the provider-assigned user id and becomes the subject claim of the
/// gateway's own tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
    provider: Provider,
}

impl Principal {
    /// Creates a principal from a provider-assigned subject.
    #[must_use]
    pub fn new(subject: impl Into<String>, provider: Provider) -> Self {
        Self {
            subject: subject.into(),
            provider,
        }
    }

    /// Returns the provider-assigned subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the provider that vouched for this identity.
    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }
}
