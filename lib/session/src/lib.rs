//! Session cache and login audit ledger for the wicket gateway.
//!
//! Both halves of this crate are advisory: authentication truth is always
//! the cryptographic token. The [`SessionStore`] is a best-effort TTL
//! key/value cache of who logged in; the [`LoginSink`] is an insert-only
//! record of login events. Callers invoke both fire-and-forget, and a
//! failure in either never fails a login.

pub mod audit;
pub mod error;
pub mod record;
pub mod store;

pub use audit::{LoginEvent, LoginSink, PgLoginLedger};
pub use error::{AuditError, SessionStoreError};
pub use record::{SessionRecord, session_key};
pub use store::{MemorySessionStore, SessionStore};
