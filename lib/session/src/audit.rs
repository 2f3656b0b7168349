//! Insert-only ledger of login events.
//!
//! The ledger is an external collaborator: the gateway writes one row per
//! completed login, fire-and-forget, and never reads it back. Failures
//! are logged by the caller and do not affect the login response.

use crate::error::AuditError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use wicket_core::{LoginEventId, Provider, Result};

/// User-Agent values longer than this are truncated before storage.
const MAX_USER_AGENT_LEN: usize = 500;

/// One completed login, as recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginEvent {
    /// Ledger row id.
    pub id: LoginEventId,
    /// Provider-assigned subject.
    pub subject: String,
    /// Provider that performed the login.
    pub provider: Provider,
    /// When the login completed.
    pub login_time: DateTime<Utc>,
    /// Client IP as resolved from forwarding headers or the peer address.
    pub client_ip: String,
    /// Client User-Agent, truncated to 500 bytes.
    pub user_agent: String,
}

impl LoginEvent {
    /// Creates an event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        provider: Provider,
        client_ip: impl Into<String>,
        user_agent: impl Into<String>,
    ) -> Self {
        let mut user_agent = user_agent.into();
        if user_agent.len() > MAX_USER_AGENT_LEN {
            let mut cut = MAX_USER_AGENT_LEN;
            while !user_agent.is_char_boundary(cut) {
                cut -= 1;
            }
            user_agent.truncate(cut);
        }

        Self {
            id: LoginEventId::new(),
            subject: subject.into(),
            provider,
            login_time: Utc::now(),
            client_ip: client_ip.into(),
            user_agent,
        }
    }
}

/// Sink accepting login events, insert-only.
#[async_trait]
pub trait LoginSink: Send + Sync {
    /// Records one login event.
    async fn record(&self, event: &LoginEvent) -> Result<(), AuditError>;
}

/// PostgreSQL-backed login ledger.
pub struct PgLoginLedger {
    pool: PgPool,
}

impl PgLoginLedger {
    /// Creates a ledger over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoginSink for PgLoginLedger {
    async fn record(&self, event: &LoginEvent) -> Result<(), AuditError> {
        sqlx::query(
            r#"
            INSERT INTO login_events (id, subject, provider, login_time, client_ip, user_agent)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(event.id.to_string())
        .bind(&event.subject)
        .bind(event.provider.as_str())
        .bind(event.login_time)
        .bind(&event.client_ip)
        .bind(&event.user_agent)
        .execute(&self.pool)
        .await
        .map_err(|e| AuditError::Database {
            details: e.to_string(),
        })?;

        Ok(())
    }
}
