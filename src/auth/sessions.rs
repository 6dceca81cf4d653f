use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone)]
struct SessionEntry {
    email: String,
    expires_at: DateTime<Utc>,
}

impl SessionEntry {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Live sessions: session id -> account email and expiry. Expired entries
/// are dropped on lookup and swept whenever a session is opened.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_ttl(Duration::hours(SESSION_TTL_HOURS))
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Register a session for `email`. Returns its id and expiry.
    pub async fn open(&self, email: &str) -> (Uuid, DateTime<Utc>) {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let expires_at = now + self.ttl;
        let mut sessions = self.inner.write().await;
        sessions.retain(|_, entry| entry.is_live(now));
        sessions.insert(
            id,
            SessionEntry {
                email: email.to_string(),
                expires_at,
            },
        );
        (id, expires_at)
    }

    pub async fn close(&self, id: Uuid) {
        self.inner.write().await.remove(&id);
    }

    /// Email for a live session. An expired entry is removed.
    pub async fn email_for(&self, id: Uuid) -> Option<String> {
        let now = Utc::now();
        {
            let sessions = self.inner.read().await;
            match sessions.get(&id) {
                None => return None,
                Some(entry) if entry.is_live(now) => return Some(entry.email.clone()),
                Some(_) => {}
            }
        }
        self.inner.write().await.remove(&id);
        None
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
