//! Core domain types and utilities for the wicket gateway.
//!
//! This crate provides the foundational types shared by the authentication,
//! session, and proxy layers: the identity-provider vocabulary, the
//! authenticated `Principal`, strongly-typed IDs, and error handling.

pub mod error;
pub mod id;
pub mod principal;
pub mod provider;

pub use error::Result;
pub use id::LoginEventId;
pub use principal::Principal;
pub use provider::{ParseProviderError, Provider};
