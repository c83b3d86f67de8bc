//! In-memory session store.
//!
//! Each session sits behind its own `Mutex`, so one session's actions run one
//! at a time (a scoring pass holds the lock until it is done) while other
//! sessions proceed independently. The map lock is only held for lookups.
//!
//! Sessions nobody has looked up for `idle_ttl` are evicted by
//! [`SessionStore::evict_idle`], which [`SessionStore::spawn_eviction`] runs on
//! a fixed period.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::info;
use uuid::Uuid;

use crate::interview::session::ScreeningSession;

pub type SessionHandle = Arc<Mutex<ScreeningSession>>;

struct StoredSession {
    handle: SessionHandle,
    last_touched: Instant,
}

impl StoredSession {
    /// A handle cloned out of the map means a request is still working on it.
    fn in_use(&self) -> bool {
        Arc::strong_count(&self.handle) > 1
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, StoredSession>>>,
    idle_ttl: Duration,
}

impl SessionStore {
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
        }
    }

    /// Creates an empty session and returns its id.
    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(ScreeningSession::new()));
        self.sessions.write().await.insert(
            id,
            StoredSession {
                handle: handle.clone(),
                last_touched: Instant::now(),
            },
        );
        (id, handle)
    }

    /// Looks a session up and marks it as active.
    pub async fn get(&self, id: Uuid) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id)?;
        entry.last_touched = Instant::now();
        Some(entry.handle.clone())
    }

    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle for longer than the TTL and returns how many
    /// went. Sessions a request still holds are kept regardless of age.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| {
            entry.in_use() || now.duration_since(entry.last_touched) <= self.idle_ttl
        });
        before - sessions.len()
    }

    /// Runs [`Self::evict_idle`] every `period` until the task is aborted.
    pub fn spawn_eviction(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                let evicted = store.evict_idle().await;
                if evicted > 0 {
                    info!("Evicted {evicted} idle screening session(s)");
                }
            }
        })
    }
}
