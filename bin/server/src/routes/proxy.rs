//! Fallback handler: forward anything the auth endpoints did not claim.

use axum::body::{Body, to_bytes};
use axum::extract::{Request, State};
use axum::response::Response;
use std::sync::Arc;

use crate::error::GatewayError;
use crate::state::AppState;

/// Largest request body the gateway will buffer for forwarding.
const MAX_FORWARD_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Matches the request path against the route table and relays the
/// request to the backend, or answers 404 echoing the path.
pub async fn forward(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> Result<Response, GatewayError> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();
    let query = parts.uri.query().map(str::to_string);

    let route = state
        .routes
        .matched(&path)
        .ok_or_else(|| GatewayError::RouteNotFound { path: path.clone() })?;

    let body = to_bytes(body, MAX_FORWARD_BODY_BYTES)
        .await
        .map_err(|e| GatewayError::Internal {
            reason: format!("failed to read request body: {e}"),
        })?;

    let forwarded = state
        .forwarder
        .forward(
            route,
            parts.method,
            &path,
            query.as_deref(),
            &parts.headers,
            body.to_vec(),
        )
        .await?;

    let mut response = Response::new(Body::from(forwarded.body));
    *response.status_mut() = forwarded.status;
    *response.headers_mut() = forwarded.headers;

    Ok(response)
}
