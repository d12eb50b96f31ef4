use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::controller::EditorSession;

#[derive(Debug, Error, PartialEq)]
pub enum StoreError {
    #[error("Session {0} not found")]
    NotFound(Uuid),

    #[error("Session {0} belongs to another user")]
    Forbidden(Uuid),
}

pub type SessionHandle = Arc<Mutex<EditorSession>>;

struct Entry {
    owner: Uuid,
    document_id: Uuid,
    last_touched: Instant,
    session: SessionHandle,
}

/// Open editor sessions, keyed by session id. Each session sits behind its
/// own mutex so edits to it apply one at a time, in arrival order.
///
/// A session nobody has looked up for `idle_ttl` is dropped on the next
/// insert or lookup. Handles already held by a request stay usable.
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Entry>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::default(),
            idle_ttl,
        }
    }

    pub async fn insert(&self, session: EditorSession) -> SessionHandle {
        let id = session.id();
        let entry = Entry {
            owner: session.owner(),
            document_id: session.document_id(),
            last_touched: Instant::now(),
            session: Arc::new(Mutex::new(session)),
        };
        let handle = entry.session.clone();
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions);
        sessions.insert(id, entry);
        handle
    }

    /// Looks up a session and marks it as used.
    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<SessionHandle, StoreError> {
        let mut sessions = self.sessions.write().await;
        self.sweep(&mut sessions);
        let entry = sessions.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        if entry.owner != owner {
            return Err(StoreError::Forbidden(id));
        }
        entry.last_touched = Instant::now();
        Ok(entry.session.clone())
    }

    pub async fn remove(&self, owner: Uuid, id: Uuid) -> Result<(), StoreError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&id) {
            None => return Err(StoreError::NotFound(id)),
            Some(entry) if entry.owner != owner => return Err(StoreError::Forbidden(id)),
            Some(_) => {}
        }
        sessions.remove(&id);
        info!("Closed editor session {id}");
        Ok(())
    }

    /// Drops every session over `document_id`, e.g. after the row is deleted.
    pub async fn close_document(&self, document_id: Uuid) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| entry.document_id != document_id);
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, Entry>) {
        let before = sessions.len();
        sessions.retain(|_, entry| entry.last_touched.elapsed() < self.idle_ttl);
        let expired = before - sessions.len();
        if expired > 0 {
            debug!("Expired {expired} idle editor session(s)");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::document::DocumentRow;
    use chrono::Utc;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(60);

    fn open(owner: Uuid, document_id: Uuid) -> EditorSession {
        let row = DocumentRow {
            id: document_id,
            user_id: owner,
            title: "CV".into(),
            template: "default".into(),
            data: json!({"basics": {"name": "A"}}),
            preview: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        EditorSession::open(Uuid::new_v4(), row).unwrap()
    }

    #[tokio::test]
    async fn test_sessions_are_owner_scoped() {
        let store = SessionStore::new(TTL);
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let handle = store.insert(open(alice, Uuid::new_v4())).await;
        let id = handle.lock().await.id();

        assert!(store.get(alice, id).await.is_ok());
        assert_eq!(store.get(bob, id).await.err(), Some(StoreError::Forbidden(id)));
        assert_eq!(store.remove(bob, id).await, Err(StoreError::Forbidden(id)));

        store.remove(alice, id).await.unwrap();
        assert_eq!(store.get(alice, id).await.err(), Some(StoreError::NotFound(id)));
    }

    #[tokio::test]
    async fn test_close_document_drops_its_sessions() {
        let store = SessionStore::new(TTL);
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        store.insert(open(owner, doc)).await;
        store.insert(open(owner, doc)).await;
        store.insert(open(owner, Uuid::new_v4())).await;

        assert_eq!(store.close_document(doc).await, 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_close_document_does_not_wait_on_busy_sessions() {
        let store = SessionStore::new(TTL);
        let owner = Uuid::new_v4();
        let doc = Uuid::new_v4();
        let handle = store.insert(open(owner, doc)).await;

        // a request mid-save still holds the session mutex
        let _busy = handle.lock().await;
        let closed = tokio::time::timeout(Duration::from_secs(1), store.close_document(doc))
            .await
            .expect("close_document must not wait on session locks");
        assert_eq!(closed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sessions_expire() {
        let store = SessionStore::new(TTL);
        let owner = Uuid::new_v4();
        let idle = store.insert(open(owner, Uuid::new_v4())).await.lock().await.id();
        let active = store.insert(open(owner, Uuid::new_v4())).await.lock().await.id();

        tokio::time::advance(Duration::from_secs(45)).await;
        assert!(store.get(owner, active).await.is_ok());

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(store.get(owner, idle).await.err(), Some(StoreError::NotFound(idle)));
        assert!(store.get(owner, active).await.is_ok());
        assert_eq!(store.len().await, 1);
    }
}
