//! Shared application state.

use crate::cookies::CookiePolicy;
use crate::error::GatewayError;
use std::collections::HashMap;
use std::sync::Arc;
use wicket_auth::{ProviderClient, TokenService};
use wicket_core::Provider;
use wicket_proxy::{Forwarder, RouteTable};
use wicket_session::{LoginSink, SessionStore};

/// Everything handlers need, built once at startup and shared read-only.
pub struct AppState {
    /// One OAuth2 client per configured provider.
    pub providers: HashMap<Provider, ProviderClient>,
    /// Session token signing and verification.
    pub tokens: TokenService,
    /// Best-effort session cache.
    pub sessions: Arc<dyn SessionStore>,
    /// Optional login audit ledger.
    pub ledger: Option<Arc<dyn LoginSink>>,
    /// Immutable proxy route table.
    pub routes: RouteTable,
    /// Backend request forwarder.
    pub forwarder: Forwarder,
    /// Process-wide cookie attributes.
    pub cookies: CookiePolicy,
    /// Frontend base URL, normalized without a trailing slash.
    frontend_base_url: String,
}

impl AppState {
    /// Creates the shared state, normalizing the frontend base URL.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        providers: HashMap<Provider, ProviderClient>,
        tokens: TokenService,
        sessions: Arc<dyn SessionStore>,
        ledger: Option<Arc<dyn LoginSink>>,
        routes: RouteTable,
        forwarder: Forwarder,
        cookies: CookiePolicy,
        frontend_base_url: impl Into<String>,
    ) -> Self {
        let frontend_base_url = frontend_base_url
            .into()
            .trim_end_matches('/')
            .to_string();

        Self {
            providers,
            tokens,
            sessions,
            ledger,
            routes,
            forwarder,
            cookies,
            frontend_base_url,
        }
    }

    /// Resolves a provider path segment to a configured client.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UnknownProvider`] for names the gateway
    /// does not recognize or has no credentials for.
    pub fn lookup_provider(
        &self,
        name: &str,
    ) -> Result<(Provider, &ProviderClient), GatewayError> {
        let provider: Provider = name.parse().map_err(|_| GatewayError::UnknownProvider {
            name: name.to_string(),
        })?;

        let client = self
            .providers
            .get(&provider)
            .ok_or_else(|| GatewayError::UnknownProvider {
                name: name.to_string(),
            })?;

        Ok((provider, client))
    }

    /// Frontend URL a completed login for `provider` redirects to.
    #[must_use]
    pub fn frontend_callback_url(&self, provider: Provider) -> String {
        format!("{}/login/{}/callback", self.frontend_base_url, provider)
    }
}
