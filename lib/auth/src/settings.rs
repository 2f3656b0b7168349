//! Per-provider OAuth2 configuration.
//!
//! All provider differences the gateway cares about are captured here as
//! data: endpoint URLs, requested scopes, whether the provider round-trips
//! an anti-CSRF `state` value, extra authorization parameters, and where
//! the user id lives in the userinfo response. Adding a provider means
//! adding a settings entry, not a handler.

use serde::{Deserialize, Serialize};
use wicket_core::Provider;

/// Configuration for one external OAuth2 identity provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Which provider this entry configures.
    pub provider: Provider,
    /// Consent-screen URL the browser is sent to.
    pub authorize_url: String,
    /// Endpoint for exchanging an authorization code.
    pub token_url: String,
    /// Endpoint for fetching the authenticated user's profile.
    pub userinfo_url: String,
    /// OAuth2 client ID registered with the provider.
    pub client_id: String,
    /// OAuth2 client secret.
    pub client_secret: String,
    /// Redirect URI for the provider callback.
    pub redirect_uri: String,
    /// Scopes to request on the consent screen.
    #[serde(default)]
    pub scopes: Vec<String>,
    /// Whether the provider round-trips an anti-CSRF `state` value that
    /// must be generated at login and re-checked on callback.
    #[serde(default)]
    pub uses_state: bool,
    /// Additional query parameters for the authorization URL.
    #[serde(default)]
    pub extra_authorize_params: Vec<(String, String)>,
    /// JSON pointer to the user id within the userinfo response.
    #[serde(default = "default_subject_pointer")]
    pub subject_pointer: String,
}

fn default_subject_pointer() -> String {
    "/id".to_string()
}

impl ProviderSettings {
    /// Google settings. Offline access and forced consent are requested so
    /// the provider returns a refresh-capable grant.
    #[must_use]
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider: Provider::Google,
            authorize_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            uses_state: false,
            extra_authorize_params: vec![
                ("access_type".to_string(), "offline".to_string()),
                ("prompt".to_string(), "consent".to_string()),
            ],
            subject_pointer: "/id".to_string(),
        }
    }

    /// Kakao settings. Kakao identifies users by a numeric `id`.
    #[must_use]
    pub fn kakao(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider: Provider::Kakao,
            authorize_url: "https://kauth.kakao.com/oauth/authorize".to_string(),
            token_url: "https://kauth.kakao.com/oauth/token".to_string(),
            userinfo_url: "https://kapi.kakao.com/v2/user/me".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            uses_state: false,
            extra_authorize_params: Vec::new(),
            subject_pointer: "/id".to_string(),
        }
    }

    /// Naver settings. Naver requires the `state` parameter on both the
    /// consent screen and the token exchange, and nests the profile under
    /// a `response` object.
    #[must_use]
    pub fn naver(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            provider: Provider::Naver,
            authorize_url: "https://nid.naver.com/oauth2.0/authorize".to_string(),
            token_url: "https://nid.naver.com/oauth2.0/token".to_string(),
            userinfo_url: "https://openapi.naver.com/v1/nid/me".to_string(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: redirect_uri.into(),
            scopes: Vec::new(),
            uses_state: true,
            extra_authorize_params: Vec::new(),
            subject_pointer: "/response/id".to_string(),
        }
    }

    /// Returns the preset for `provider` with the given credentials.
    #[must_use]
    pub fn preset(
        provider: Provider,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        match provider {
            Provider::Google => Self::google(client_id, client_secret, redirect_uri),
            Provider::Kakao => Self::kakao(client_id, client_secret, redirect_uri),
            Provider::Naver => Self::naver(client_id, client_secret, redirect_uri),
        }
    }
}
