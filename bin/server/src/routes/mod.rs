//! HTTP routing for the gateway.
//!
//! The fixed auth endpoints are registered explicitly; every other path
//! falls through to the proxy handler, which consults the route table.

pub mod auth;
pub mod proxy;

use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Builds the gateway router over shared state.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/auth/{provider}/login", get(auth::login))
        .route("/auth/{provider}/callback", get(auth::callback))
        .route("/auth/me", get(auth::me))
        .route("/auth/refresh", post(auth::refresh))
        .route("/auth/logout", post(auth::logout))
        .fallback(proxy::forward)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
