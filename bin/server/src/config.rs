//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the gateway,
//! loaded via the `config` crate from an optional `wicket.toml` file and
//! environment variables (`__` separator, environment wins).
//!
//! Token lifetimes and the signing secret live in
//! [`TokenConfig`](wicket_auth::TokenConfig); proxy routes are
//! [`RouteDef`](wicket_proxy::RouteDef) entries.

use serde::Deserialize;
use wicket_auth::{ProviderSettings, TokenConfig};
use wicket_core::Provider;
use wicket_proxy::RouteDef;

/// Gateway configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Frontend base URL that completed logins redirect back to.
    pub frontend_base_url: String,

    /// PostgreSQL URL for the login ledger. Absent disables the ledger.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Cookie policy applied to every cookie the gateway sets.
    #[serde(default)]
    pub cookie: CookieConfig,

    /// Session token signing configuration.
    pub tokens: TokenConfig,

    /// Identity provider credentials; unset providers are not served.
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Proxy route table, most specific first or not; ordering is
    /// re-established at construction.
    #[serde(default)]
    pub routes: Vec<RouteDef>,

    /// Timeout in seconds for every outbound call (provider endpoints
    /// and proxied backends).
    #[serde(default = "default_upstream_timeout_seconds")]
    pub upstream_timeout_seconds: u64,
}

fn default_listen_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_upstream_timeout_seconds() -> u64 {
    10
}

/// Cookie attributes applied process-wide.
#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local
    /// HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure: bool,

    /// SameSite attribute for all cookies.
    #[serde(default)]
    pub same_site: SameSitePolicy,
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            secure: default_secure_cookies(),
            same_site: SameSitePolicy::default(),
        }
    }
}

/// Configurable SameSite attribute values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    #[default]
    Lax,
    Strict,
    None,
}

/// Credentials for one provider; endpoints come from the preset.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

/// Per-provider credential table.
#[derive(Debug, Default, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub google: Option<ProviderCredentials>,
    #[serde(default)]
    pub kakao: Option<ProviderCredentials>,
    #[serde(default)]
    pub naver: Option<ProviderCredentials>,
}

impl ProvidersConfig {
    /// Materializes settings for every configured provider.
    #[must_use]
    pub fn settings(&self) -> Vec<ProviderSettings> {
        let entries = [
            (Provider::Google, &self.google),
            (Provider::Kakao, &self.kakao),
            (Provider::Naver, &self.naver),
        ];

        entries
            .into_iter()
            .filter_map(|(provider, credentials)| {
                credentials.as_ref().map(|c| {
                    ProviderSettings::preset(
                        provider,
                        c.client_id.clone(),
                        c.client_secret.clone(),
                        c.redirect_uri.clone(),
                    )
                })
            })
            .collect()
    }
}

impl ServerConfig {
    /// Loads configuration from `wicket.toml` (optional) and environment
    /// variables, with the environment taking precedence.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn load() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(config::File::with_name("wicket").required(false))
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn cookie_config_defaults_are_safe() {
        let config = CookieConfig::default();
        assert!(config.secure);
        assert_eq!(config.same_site, SameSitePolicy::Lax);
    }

    #[test]
    fn providers_config_skips_unset_providers() {
        let providers = ProvidersConfig {
            naver: Some(ProviderCredentials {
                client_id: "naver-id".to_string(),
                client_secret: "naver-secret".to_string(),
                redirect_uri: "http://localhost:8080/auth/naver/callback".to_string(),
            }),
            ..ProvidersConfig::default()
        };

        let settings = providers.settings();
        assert_eq!(settings.len(), 1);
        assert_eq!(settings[0].provider, Provider::Naver);
        assert_eq!(settings[0].client_id, "naver-id");
    }

    #[test]
    fn config_file_deserializes_full_shape() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("tempfile");
        write!(
            file,
            r#"
            frontend_base_url = "http://localhost:3000"
            upstream_timeout_seconds = 5

            [cookie]
            secure = false
            same_site = "lax"

            [tokens]
            secret = "local-dev-secret"

            [providers.kakao]
            client_id = "app-key"
            client_secret = "app-secret"
            redirect_uri = "http://localhost:8080/auth/kakao/callback"

            [[routes]]
            pattern = "/api/users/**"
            target_base = "http://localhost:8082"

            [[routes]]
            pattern = "/api/ai/ml/**"
            target_base = "http://localhost:9006"
            rewrite_prefix = "/titanic"
            "#
        )
        .expect("write config");

        let config: ServerConfig = config::Config::builder()
            .add_source(config::File::from(file.path()))
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.listen_addr, "127.0.0.1:8080");
        assert_eq!(config.frontend_base_url, "http://localhost:3000");
        assert_eq!(config.upstream_timeout_seconds, 5);
        assert!(!config.cookie.secure);
        assert_eq!(config.tokens.secret, "local-dev-secret");
        assert!(config.providers.kakao.is_some());
        assert!(config.providers.google.is_none());
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[1].rewrite_prefix.as_deref(), Some("/titanic"));
        assert!(config.database_url.is_none());
    }
}
