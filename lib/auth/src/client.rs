//! OAuth2 client for provider interactions.
//!
//! One [`ProviderClient`] instance serves one configured provider. Each
//! operation is a single outbound call with no retry and no caching of
//! provider tokens; any failure aborts the login flow that invoked it.

use crate::error::UpstreamAuthError;
use crate::settings::ProviderSettings;
use rand::Rng;
use std::time::Duration;
use url::Url;
use wicket_core::{Principal, Result};

/// Token returned by a provider's code exchange.
///
/// Only the access token is kept; the gateway issues its own refresh
/// tokens and never stores provider credentials.
#[derive(Debug, Clone)]
pub struct ProviderToken {
    /// The provider's bearer token for the userinfo endpoint.
    pub access_token: String,
}

/// A provider identity normalized to the one field the gateway uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderIdentity {
    /// Provider-assigned user id, normalized to a string.
    pub id: String,
}

impl ProviderIdentity {
    /// Promotes the identity to a [`Principal`] for the given provider.
    #[must_use]
    pub fn into_principal(self, provider: wicket_core::Provider) -> Principal {
        Principal::new(self.id, provider)
    }
}

/// OAuth2 client for a single configured provider.
pub struct ProviderClient {
    settings: ProviderSettings,
    http: reqwest::Client,
}

impl ProviderClient {
    /// Creates a client with an explicit per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamAuthError::Configuration`] if the HTTP client
    /// cannot be constructed.
    pub fn new(
        settings: ProviderSettings,
        timeout: Duration,
    ) -> Result<Self, UpstreamAuthError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| UpstreamAuthError::Configuration {
                reason: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self { settings, http })
    }

    /// Returns the settings this client was built from.
    #[must_use]
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }

    /// Builds the provider's consent-screen URL.
    ///
    /// When the provider uses a `state` parameter, a fresh random value is
    /// generated, appended to the URL, and returned; the caller must
    /// persist it and re-check it on callback.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamAuthError::Configuration`] if the configured
    /// authorize URL does not parse.
    pub fn authorization_url(&self) -> Result<(Url, Option<String>), UpstreamAuthError> {
        let mut url =
            Url::parse(&self.settings.authorize_url).map_err(|e| {
                UpstreamAuthError::Configuration {
                    reason: format!("invalid authorize URL: {e}"),
                }
            })?;

        let state = self.settings.uses_state.then(generate_state);

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.settings.client_id)
                .append_pair("redirect_uri", &self.settings.redirect_uri)
                .append_pair("response_type", "code");
            if !self.settings.scopes.is_empty() {
                query.append_pair("scope", &self.settings.scopes.join(" "));
            }
            for (name, value) in &self.settings.extra_authorize_params {
                query.append_pair(name, value);
            }
            if let Some(state) = &state {
                query.append_pair("state", state);
            }
        }

        Ok((url, state))
    }

    /// Exchanges an authorization code for a provider token.
    ///
    /// A single form-encoded POST; the `state` field is forwarded when the
    /// provider round-trips one. Any non-2xx response or a response
    /// without an `access_token` fails the exchange.
    pub async fn exchange_code(
        &self,
        code: &str,
        state: Option<&str>,
    ) -> Result<ProviderToken, UpstreamAuthError> {
        let provider = self.settings.provider;

        let mut form: Vec<(&str, &str)> = vec![
            ("grant_type", "authorization_code"),
            ("code", code),
            ("client_id", &self.settings.client_id),
            ("client_secret", &self.settings.client_secret),
            ("redirect_uri", &self.settings.redirect_uri),
        ];
        if self.settings.uses_state
            && let Some(state) = state
        {
            form.push(("state", state));
        }

        let response = self
            .http
            .post(&self.settings.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| UpstreamAuthError::Exchange {
                provider,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamAuthError::Exchange {
                provider,
                reason: format!("token endpoint returned {status}: {body}"),
            }
            .into());
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| UpstreamAuthError::Exchange {
                    provider,
                    reason: format!("unparseable token response: {e}"),
                })?;

        let access_token = payload
            .get("access_token")
            .and_then(|v| v.as_str())
            .ok_or(UpstreamAuthError::MissingField {
                provider,
                field: "access_token",
            })?;

        tracing::debug!(%provider, "authorization code exchanged");

        Ok(ProviderToken {
            access_token: access_token.to_string(),
        })
    }

    /// Fetches the authenticated user's identity from the provider.
    ///
    /// A single GET with bearer auth. The provider-specific response shape
    /// is normalized to `{id}` via the configured subject pointer; numeric
    /// ids are rendered in decimal.
    pub async fn fetch_identity(
        &self,
        token: &ProviderToken,
    ) -> Result<ProviderIdentity, UpstreamAuthError> {
        let provider = self.settings.provider;

        let response = self
            .http
            .get(&self.settings.userinfo_url)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| UpstreamAuthError::Userinfo {
                provider,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamAuthError::Userinfo {
                provider,
                reason: format!("userinfo endpoint returned {status}: {body}"),
            }
            .into());
        }

        let payload: serde_json::Value =
            response
                .json()
                .await
                .map_err(|e| UpstreamAuthError::Userinfo {
                    provider,
                    reason: format!("unparseable userinfo response: {e}"),
                })?;

        let id = subject_at(&payload, &self.settings.subject_pointer).ok_or(
            UpstreamAuthError::MissingField {
                provider,
                field: "id",
            },
        )?;

        Ok(ProviderIdentity { id })
    }
}

/// Generates a random anti-CSRF state value (16 bytes, hex-encoded).
fn generate_state() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 16] = rng.r#gen();
    hex::encode(bytes)
}

/// Extracts the subject at a JSON pointer, normalizing numbers to strings.
fn subject_at(payload: &serde_json::Value, pointer: &str) -> Option<String> {
    match payload.pointer(pointer)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
