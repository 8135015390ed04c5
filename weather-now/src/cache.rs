use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

struct CacheEntry {
    value: String,
    expires_at: Instant,
}

/// A valid entry returned by [`ExpiringCache::get`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHit {
    pub value: String,
    pub ttl_remaining: Duration,
}

/// String-to-string map where every entry carries its own absolute expiry.
///
/// Expiry is checked on read only; stale entries stay in the map until they
/// are overwritten or removed by [`ExpiringCache::purge_expired`]. A single
/// mutex serializes both reads and writes, so "present and not expired" is
/// always evaluated against the latest write.
#[derive(Default)]
pub struct ExpiringCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ExpiringCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &str) -> Option<CacheHit> {
        let entries = self.entries.lock().await;
        let now = Instant::now();
        match entries.get(key) {
            Some(entry) if now < entry.expires_at => Some(CacheHit {
                value: entry.value.clone(),
                ttl_remaining: entry.expires_at - now,
            }),
            _ => None,
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: impl Into<String>, ttl: Duration) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            key.into(),
            CacheEntry {
                value: value.into(),
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop every entry whose expiry has passed, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();
        let before = entries.len();
        entries.retain(|_, entry| now < entry.expires_at);
        before - entries.len()
    }

    /// Number of stored entries, stale ones included
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
