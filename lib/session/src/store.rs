//! The session cache seam and its in-process implementation.
//!
//! [`SessionStore`] is the interface boundary at which an external
//! key/value cache service plugs in: get/set/delete by key with a TTL.
//! The gateway ships [`MemorySessionStore`], an in-process TTL map.
//! Writes to the same subject are last-write-wins with no cross-request
//! ordering guarantee; the cache is advisory, so that is acceptable.

use crate::error::SessionStoreError;
use crate::record::{SessionRecord, session_key};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use wicket_core::Result;

/// Key/value store for session records, keyed `"session:" + subject`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Writes (or overwrites) the record under the subject's key with the
    /// given time-to-live.
    async fn put(&self, record: &SessionRecord, ttl: Duration) -> Result<(), SessionStoreError>;

    /// Reads the record for a subject, if present and unexpired.
    async fn get(&self, subject: &str) -> Result<Option<SessionRecord>, SessionStoreError>;

    /// Removes a subject's record. Absence of the key is not an error.
    async fn delete(&self, subject: &str) -> Result<(), SessionStoreError>;
}

struct Entry {
    record: SessionRecord,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process TTL map implementing [`SessionStore`].
///
/// Expired entries are dropped lazily: reads skip them, and each write
/// sweeps whatever has lapsed.
#[derive(Default)]
pub struct MemorySessionStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn put(&self, record: &SessionRecord, ttl: Duration) -> Result<(), SessionStoreError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| !entry.is_expired(now));
        entries.insert(
            record.key(),
            Entry {
                record: record.clone(),
                expires_at: now + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, subject: &str) -> Result<Option<SessionRecord>, SessionStoreError> {
        let key = session_key(subject);
        let entries = self.entries.read().await;
        Ok(entries
            .get(&key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.record.clone()))
    }

    async fn delete(&self, subject: &str) -> Result<(), SessionStoreError> {
        let mut entries = self.entries.write().await;
        entries.remove(&session_key(subject));
        Ok(())
    }
}
