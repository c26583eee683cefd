//! Session storage for the broker

pub mod memory;
pub mod models;

pub use memory::InMemorySessionRepository;
pub use models::*;

use chrono::{DateTime, Utc};

use crate::error::BrokerError;

/// Result type for store operations
pub type StoreResult<T> = Result<T, BrokerError>;

/// Keyed access to per-browser session state.
///
/// Every write to an identity's tokens goes through [`SessionRepository::mutate`].
/// A single call is atomic, but a handler that reads a session, awaits a
/// provider call and then mutates it gets last-write-wins semantics against
/// concurrent requests on the same session.
pub trait SessionRepository: Send + Sync {
    /// Get a snapshot of a session
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>>;

    /// Insert or replace a session
    fn put(&self, record: SessionRecord) -> StoreResult<()>;

    /// Modify a session in place. Returns false if it does not exist.
    fn mutate(&self, id: &SessionId, f: &mut dyn FnMut(&mut SessionRecord)) -> StoreResult<bool>;

    /// Remove a session and everything it holds
    fn destroy(&self, id: &SessionId) -> StoreResult<()>;

    /// Remove sessions still waiting on consent that were created before
    /// `cutoff`. Returns how many were removed.
    fn prune_pending(&self, cutoff: DateTime<Utc>) -> StoreResult<usize>;
}
