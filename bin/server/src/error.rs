//! Gateway error responses.
//!
//! One enum carries every failure a handler can produce, and its
//! `IntoResponse` impl is the single place the error taxonomy maps to
//! HTTP statuses: upstream provider failures are 500 (the user restarts
//! login), token problems are 401, unroutable paths are 404, backend
//! transport failures are 500. Detail stays in the logs; response bodies
//! are deliberately generic.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rootcause::Report;
use serde_json::json;
use std::fmt;
use wicket_auth::{TokenError, UpstreamAuthError};
use wicket_proxy::ProxyError;

/// Failures surfaced by gateway handlers.
#[derive(Debug)]
pub enum GatewayError {
    /// The path named a provider the gateway does not serve.
    UnknownProvider { name: String },
    /// A state-requiring provider callback arrived without a stored or
    /// presented state value.
    MissingState,
    /// The presented state value does not match the stored one.
    StateMismatch,
    /// Provider exchange or identity fetch failed; the flow is aborted.
    Upstream(Report<UpstreamAuthError>),
    /// The request carried no token cookie.
    MissingToken { cookie: &'static str },
    /// The presented token failed validation.
    Token(Report<TokenError>),
    /// No route matches the requested path.
    RouteNotFound { path: String },
    /// The matched backend could not be reached.
    Forward(Report<ProxyError>),
    /// Unexpected internal failure.
    Internal { reason: String },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownProvider { name } => write!(f, "unknown provider: '{name}'"),
            Self::MissingState => write!(f, "missing anti-CSRF state"),
            Self::StateMismatch => write!(f, "anti-CSRF state mismatch"),
            Self::Upstream(report) => write!(f, "upstream auth failure: {report}"),
            Self::MissingToken { cookie } => write!(f, "missing '{cookie}' cookie"),
            Self::Token(report) => write!(f, "token rejected: {report}"),
            Self::RouteNotFound { path } => write!(f, "no route for '{path}'"),
            Self::Forward(report) => write!(f, "forwarding failed: {report}"),
            Self::Internal { reason } => write!(f, "internal error: {reason}"),
        }
    }
}

impl From<Report<UpstreamAuthError>> for GatewayError {
    fn from(report: Report<UpstreamAuthError>) -> Self {
        Self::Upstream(report)
    }
}

impl From<Report<TokenError>> for GatewayError {
    fn from(report: Report<TokenError>) -> Self {
        Self::Token(report)
    }
}

impl From<Report<ProxyError>> for GatewayError {
    fn from(report: Report<ProxyError>) -> Self {
        Self::Forward(report)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        match self {
            Self::UnknownProvider { name } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Unknown provider",
                    "provider": name,
                })),
            )
                .into_response(),
            Self::MissingState => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Bad Request",
                    "message": "missing login state",
                })),
            )
                .into_response(),
            Self::StateMismatch => (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "Bad Request",
                    "message": "state parameter mismatch",
                })),
            )
                .into_response(),
            Self::Upstream(report) => {
                tracing::error!(error = %report, "provider authentication failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "authentication with provider failed",
                    })),
                )
                    .into_response()
            }
            Self::MissingToken { .. } | Self::Token(_) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "error": "Unauthorized",
                    "message": "authentication required",
                })),
            )
                .into_response(),
            Self::RouteNotFound { path } => (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "Route not found",
                    "path": path,
                })),
            )
                .into_response(),
            Self::Forward(report) => {
                tracing::error!(error = %report, "backend forwarding failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Gateway error",
                        "message": "failed to reach backend service",
                    })),
                )
                    .into_response()
            }
            Self::Internal { reason } => {
                tracing::error!(reason, "internal gateway error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "error": "Internal Server Error",
                    })),
                )
                    .into_response()
            }
        }
    }
}
