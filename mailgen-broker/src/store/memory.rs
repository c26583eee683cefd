//! In-memory session storage

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use super::{AuthState, SessionId, SessionRecord, SessionRepository, StoreResult};

/// Process-local session repository; contents are lost on restart
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn get(&self, id: &SessionId) -> StoreResult<Option<SessionRecord>> {
        Ok(self.sessions.read().unwrap().get(id).cloned())
    }

    fn put(&self, record: SessionRecord) -> StoreResult<()> {
        self.sessions
            .write()
            .unwrap()
            .insert(record.id.clone(), record);
        Ok(())
    }

    fn mutate(&self, id: &SessionId, f: &mut dyn FnMut(&mut SessionRecord)) -> StoreResult<bool> {
        let mut sessions = self.sessions.write().unwrap();
        match sessions.get_mut(id) {
            Some(record) => {
                f(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn destroy(&self, id: &SessionId) -> StoreResult<()> {
        self.sessions.write().unwrap().remove(id);
        Ok(())
    }

    fn prune_pending(&self, cutoff: DateTime<Utc>) -> StoreResult<usize> {
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();
        sessions.retain(|_, record| {
            !(matches!(record.auth, AuthState::PendingConsent { .. }) && record.created_at < cutoff)
        });
        Ok(before - sessions.len())
    }
}
