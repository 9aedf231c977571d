use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use super::TranscriptCache;

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// In-process expiring map. Entries are evicted lazily on lookup.
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    default_ttl: Option<Duration>,
}

impl MemoryCache {
    /// Cache whose entries never expire unless a per-write TTL says so.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: None,
        }
    }

    /// Cache with a default TTL applied to writes that carry none.
    pub fn with_default_ttl(ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            default_ttl: Some(ttl),
        }
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptCache for MemoryCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) => {
                if entry.expires_at.is_some_and(|at| at <= Instant::now()) {
                    entries.remove(key);
                    Ok(None)
                } else {
                    Ok(Some(entry.value.clone()))
                }
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()> {
        let expires_at = ttl
            .or(self.default_ttl)
            .map(|ttl| Instant::now() + ttl);
        self.entries.lock().await.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at,
            },
        );
        Ok(())
    }
}
