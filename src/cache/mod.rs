//! Optional transcript caching.
//!
//! The pipeline consults a cache before a full fetch and populates it after.
//! Cache failures can never fail a fetch: a broken read is a miss and a
//! broken write is dropped.

use async_trait::async_trait;
use std::time::Duration;

pub mod fs;
pub mod memory;

pub use fs::FsCache;
pub use memory::MemoryCache;

/// Key/value store for serialized transcripts.
///
/// Values are opaque to implementations; the pipeline stores the JSON
/// serialization of the segment sequence. Implementations own their expiry
/// semantics: an expired entry is simply reported as absent.
#[async_trait]
pub trait TranscriptCache: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()>;
}

/// Deterministic cache key for a `(video id, requested language)` pair.
pub fn cache_key(video_id: &str, lang: Option<&str>) -> String {
    format!("{}:{}", video_id, lang.unwrap_or(""))
}
