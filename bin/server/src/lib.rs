//! The wicket gateway server.
//!
//! A single axum application dispatches by path: the fixed `/auth/...`
//! endpoints run the login/refresh/logout flows, and everything else
//! falls through to the reverse-proxy layer, which either forwards the
//! request along a configured route or answers 404. The two halves never
//! call each other.

pub mod config;
pub mod cookies;
pub mod error;
pub mod routes;
pub mod state;
