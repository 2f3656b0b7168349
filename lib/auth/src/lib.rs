//! Authentication building blocks for the wicket gateway.
//!
//! This crate provides the two stateless halves of the login flow:
//!
//! - [`ProviderClient`]: a single OAuth2 client parameterized by
//!   [`ProviderSettings`], covering the authorization-code exchange and
//!   userinfo fetch for every configured identity provider. Provider
//!   differences (endpoints, scopes, state usage, response shape) are
//!   configuration, not code.
//! - [`TokenService`]: issuance, validation, and refresh of the gateway's
//!   own signed session tokens.
//!
//! Neither half holds mutable state; both are safe to share across
//! request handlers.

pub mod client;
pub mod error;
pub mod settings;
pub mod token;

pub use client::{ProviderClient, ProviderIdentity, ProviderToken};
pub use error::{TokenError, UpstreamAuthError};
pub use settings::ProviderSettings;
pub use token::{InvalidTokenConfig, RefreshedAccess, TokenConfig, TokenKind, TokenPair, TokenService};
