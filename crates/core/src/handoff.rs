//! Short-lived handoff of generated quizzes between requests.
//!
//! After generation the server parks the quiz here and returns an opaque
//! id; the quiz-taking client claims it with that id. Entries expire after
//! a TTL and are purged lazily on access.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio::time::Instant;
use uuid::Uuid;

use crate::Error;
use crate::quiz::GeneratedQuiz;
use crate::store::QuizId;

/// Opaque handoff identifier (UUID v4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct HandoffId(Uuid);

impl HandoffId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HandoffId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HandoffId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for HandoffId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| Error::InvalidInput(format!("`{s}` is not a handoff id")))
    }
}

/// A parked quiz plus the stored quiz id, when it was persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Handoff {
    pub quiz_id: Option<QuizId>,
    #[serde(flatten)]
    pub generated: GeneratedQuiz,
}

#[derive(Debug)]
struct Entry {
    stored_at: Instant,
    handoff: Handoff,
}

/// In-memory TTL map of handoffs; clones share the same entries.
#[derive(Debug, Clone)]
pub struct HandoffCache {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<HandoffId, Entry>>>,
}

impl HandoffCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Arc::new(Mutex::new(HashMap::new())) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Park a handoff and return its id.
    pub async fn put(&self, handoff: Handoff) -> HandoffId {
        let id = HandoffId::new();
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries);
        entries.insert(id, Entry { stored_at: Instant::now(), handoff });
        tracing::debug!(handoff_id = %id, live = entries.len(), "handoff stored");
        id
    }

    /// Read a live handoff without consuming it.
    pub async fn get(&self, id: &HandoffId) -> Option<Handoff> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries);
        entries.get(id).map(|entry| entry.handoff.clone())
    }

    /// Remove and return a live handoff.
    pub async fn take(&self, id: &HandoffId) -> Option<Handoff> {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries);
        entries.remove(id).map(|entry| entry.handoff)
    }

    pub async fn len(&self) -> usize {
        let mut entries = self.entries.lock().await;
        self.purge_expired(&mut entries);
        entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn purge_expired(&self, entries: &mut HashMap<HandoffId, Entry>) {
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        let purged = before - entries.len();
        if purged > 0 {
            tracing::debug!(purged, "expired handoffs purged");
        }
    }
}
