use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::TranscriptCache;

/// On-disk envelope: the stored value plus its expiry, so staleness survives
/// process restarts.
#[derive(Serialize, Deserialize)]
struct StoredEntry {
    expires_at: Option<DateTime<Utc>>,
    value: String,
}

/// Filesystem-backed store, one JSON file per key.
pub struct FsCache {
    dir: PathBuf,
    default_ttl: Option<Duration>,
}

impl FsCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            default_ttl: None,
        }
    }

    pub fn with_default_ttl(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            dir: dir.into(),
            default_ttl: Some(ttl),
        }
    }

    /// Per-user cache directory, e.g. `~/.cache/yt-transcript` on Linux.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join("yt-transcript")
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Keys become filenames; anything outside a safe set is replaced.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == '-' || c == '_' => c,
            _ => '_',
        })
        .collect()
}

fn read_entry(path: &Path) -> anyhow::Result<Option<StoredEntry>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs_err::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&raw)?))
}

#[async_trait]
impl TranscriptCache for FsCache {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let path = self.entry_path(key);
        let Some(entry) = read_entry(&path)? else {
            return Ok(None);
        };

        if entry.expires_at.is_some_and(|at| at <= Utc::now()) {
            // Stale; best-effort removal.
            if let Err(err) = fs_err::remove_file(&path) {
                tracing::debug!(path = %path.display(), %err, "failed to remove stale cache file");
            }
            return Ok(None);
        }

        Ok(Some(entry.value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> anyhow::Result<()> {
        fs_err::create_dir_all(&self.dir)?;

        let expires_at = match ttl.or(self.default_ttl) {
            Some(ttl) => Some(Utc::now() + chrono::Duration::from_std(ttl)?),
            None => None,
        };
        let entry = StoredEntry {
            expires_at,
            value: value.to_string(),
        };

        fs_err::write(self.entry_path(key), serde_json::to_vec(&entry)?)?;
        Ok(())
    }
}
