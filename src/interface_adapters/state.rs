use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::domain::{CatalogStore, Clock, Session, SessionStore, StoreError, UserStore};
use crate::interface_adapters::classifier::ErrorClassifier;
use crate::interface_adapters::envelope::EnvelopeBuilder;

// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
    pub envelopes: EnvelopeBuilder,
    pub classifier: ErrorClassifier,
    pub session_ttl_seconds: u64,
}

// In-memory session store adapter.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, session: Session) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token, session);
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<Session>, StoreError> {
        let sessions = self.sessions.lock().await;
        Ok(sessions.get(token).cloned())
    }

    async fn remove(&self, token: &str) -> Result<bool, StoreError> {
        let mut sessions = self.sessions.lock().await;
        Ok(sessions.remove(token).is_some())
    }

    async fn remove_expired(&self, now: u64) -> Result<usize, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| session.expires_at > now);
        Ok(before - sessions.len())
    }
}

// System clock adapter used by the use cases.
#[derive(Clone)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs()
    }
}
