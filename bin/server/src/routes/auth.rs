//! Authentication flow handlers: login, callback, me, refresh, logout.
//!
//! One provider-parameterized handler set serves every configured
//! provider; the differences live in [`wicket_auth::ProviderSettings`].
//! A login attempt either reaches the final redirect with both session
//! cookies attached, or fails at some step and returns an error response
//! with no cookies set.

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cookies::{ACCESS_COOKIE, REFRESH_COOKIE, STATE_COOKIE, read_token};
use crate::error::GatewayError;
use crate::state::AppState;
use wicket_session::{LoginEvent, SessionRecord};

/// Response body for `GET /auth/{provider}/login`.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "authUrl")]
    pub auth_url: String,
}

/// Response body for `GET /auth/me`.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
}

/// Response body for refresh and logout.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: &'static str,
}

/// Query parameters for the provider callback.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: String,
    state: Option<String>,
}

/// Returns the provider's consent-screen URL for the frontend to
/// redirect to. For state-using providers the generated state is also
/// persisted in a short-lived cookie for the callback to check.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<LoginResponse>), GatewayError> {
    let (_, client) = state.lookup_provider(&provider)?;

    let (auth_url, login_state) = client.authorization_url()?;

    let jar = match &login_state {
        Some(value) => state.cookies.state_cookie(jar, value),
        None => jar,
    };

    Ok((
        jar,
        Json(LoginResponse {
            auth_url: auth_url.to_string(),
        }),
    ))
}

/// Completes a login: state check, code exchange, identity fetch, token
/// issue, best-effort side effects, cookies, and the final redirect to
/// the frontend callback page.
pub async fn callback(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    Query(query): Query<CallbackQuery>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<(CookieJar, Response), GatewayError> {
    let (provider, client) = state.lookup_provider(&provider)?;

    if client.settings().uses_state {
        let stored = read_token(&jar, STATE_COOKIE).ok_or(GatewayError::MissingState)?;
        let presented = query.state.as_deref().ok_or(GatewayError::MissingState)?;
        if presented != stored {
            return Err(GatewayError::StateMismatch);
        }
    }

    let provider_token = client
        .exchange_code(&query.code, query.state.as_deref())
        .await?;
    let identity = client.fetch_identity(&provider_token).await?;
    let principal = identity.into_principal(provider);

    let pair = state
        .tokens
        .issue(principal.subject())
        .map_err(|e| GatewayError::Internal {
            reason: e.to_string(),
        })?;

    // Cache write and audit insert are fire-and-forget: their failures
    // are logged and must never fail the login.
    let record = SessionRecord::new(principal.subject(), provider);
    let ttl = state
        .tokens
        .refresh_ttl()
        .to_std()
        .unwrap_or(Duration::ZERO);
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        if let Err(e) = sessions.put(&record, ttl).await {
            tracing::warn!(error = %e, "failed to cache session");
        }
    });

    if let Some(ledger) = state.ledger.clone() {
        let event = LoginEvent::new(
            principal.subject(),
            provider,
            client_ip(&headers),
            user_agent(&headers),
        );
        tokio::spawn(async move {
            if let Err(e) = ledger.record(&event).await {
                tracing::warn!(error = %e, "failed to record login event");
            }
        });
    }

    tracing::info!(subject = principal.subject(), %provider, "login completed");

    let jar = if client.settings().uses_state {
        state.cookies.clear_state_cookie(jar)
    } else {
        jar
    };
    let jar = state.cookies.login_cookies(jar, &pair);

    Ok((jar, found(&state.frontend_callback_url(provider))))
}

/// Returns the authenticated subject, or 401.
pub async fn me(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<Json<MeResponse>, GatewayError> {
    let token = read_token(&jar, ACCESS_COOKIE).ok_or(GatewayError::MissingToken {
        cookie: ACCESS_COOKIE,
    })?;

    let subject = state.tokens.validate(&token)?;

    Ok(Json(MeResponse { id: subject }))
}

/// Mints a new access token from the refresh cookie. Only the access
/// cookie is re-attached; the refresh token is not rotated.
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<SuccessResponse>), GatewayError> {
    let token = read_token(&jar, REFRESH_COOKIE).ok_or(GatewayError::MissingToken {
        cookie: REFRESH_COOKIE,
    })?;

    let refreshed = state.tokens.refresh(&token)?;

    let jar = state
        .cookies
        .access_cookie(jar, &refreshed.access_token, refreshed.access_expires_at);

    Ok((
        jar,
        Json(SuccessResponse {
            success: true,
            message: "token refreshed",
        }),
    ))
}

/// Logs out unconditionally: both cookies are expired whether or not a
/// session existed, and the cached session is deleted opportunistically.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<SuccessResponse>) {
    if let Some(token) = read_token(&jar, ACCESS_COOKIE)
        && let Ok(subject) = state.tokens.validate(&token)
    {
        let sessions = state.sessions.clone();
        tokio::spawn(async move {
            if let Err(e) = sessions.delete(&subject).await {
                tracing::warn!(error = %e, "failed to delete cached session");
            }
        });
    }

    let jar = state.cookies.logout_cookies(jar);

    (
        jar,
        Json(SuccessResponse {
            success: true,
            message: "logged out",
        }),
    )
}

/// Builds a 302 Found redirect.
///
/// The frontend callback page expects the historical 302, not axum's
/// default 303.
fn found(location: &str) -> Response {
    (
        StatusCode::FOUND,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}

/// Resolves the client IP from forwarding headers.
///
/// `X-Forwarded-For` wins (first entry), then `X-Real-IP`. Without
/// either, the client is behind no proxy we know about and is recorded
/// as unknown.
fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Reads the User-Agent header, defaulting when absent.
fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}
