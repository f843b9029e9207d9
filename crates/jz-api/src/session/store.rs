//! In-process session storage with an idle TTL.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Values of one session, keyed by name
pub type SessionValues = HashMap<String, Value>;

#[derive(Debug, Clone)]
struct Record {
    values: SessionValues,
    expires_at: DateTime<Utc>,
}

/// Shared store of all sessions, cheap to clone
#[derive(Debug, Clone)]
pub struct SessionStore {
    records: Arc<RwLock<HashMap<Uuid, Record>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Values of a live session; an expired session is dropped on the way
    pub async fn load(&self, id: Uuid) -> Option<SessionValues> {
        self.load_at(id, Utc::now()).await
    }

    pub async fn load_at(&self, id: Uuid, now: DateTime<Utc>) -> Option<SessionValues> {
        {
            let records = self.records.read().await;
            match records.get(&id) {
                Some(record) if record.expires_at > now => return Some(record.values.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // A save may have refreshed the session since the read lock was released
        live_or_evict(&mut *self.records.write().await, id, now)
    }

    /// Store the values of a session and extend its lifetime.
    ///
    /// An empty session is removed instead.
    pub async fn save(&self, id: Uuid, values: SessionValues) {
        let mut records = self.records.write().await;
        if values.is_empty() {
            records.remove(&id);
            return;
        }

        records.insert(
            id,
            Record {
                values,
                expires_at: Utc::now() + self.ttl,
            },
        );
    }

    pub async fn remove(&self, id: Uuid) {
        self.records.write().await.remove(&id);
    }

    /// Drop every expired session, returning how many were removed
    pub async fn sweep(&self) -> usize {
        self.sweep_at(Utc::now()).await
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, record| record.expires_at > now);
        before - records.len()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

/// Values of a live session, removing it instead if it expired
fn live_or_evict(
    records: &mut HashMap<Uuid, Record>,
    id: Uuid,
    now: DateTime<Utc>,
) -> Option<SessionValues> {
    match records.get(&id) {
        Some(record) if record.expires_at > now => Some(record.values.clone()),
        Some(_) => {
            records.remove(&id);
            None
        }
        None => None,
    }
}
