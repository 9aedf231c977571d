use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::TranscriptCache;
use crate::fetch::Fetcher;

/// Configuration for the transcript pipeline.
///
/// Immutable once handed to a client; there is no hidden cross-call state.
/// Every field defaults to off, so `TranscriptConfig::default()` gives the
/// plain HTTPS, uncached, default-language behavior.
#[derive(Clone, Default)]
pub struct TranscriptConfig {
    /// Caption language to select; the platform's first track when unset.
    pub lang: Option<String>,

    /// Overrides the default browser User-Agent on every request.
    pub user_agent: Option<String>,

    /// Force plain HTTP for the watch-page and transcript fetches.
    pub disable_https: bool,

    /// Transport override for the watch-page fetch.
    pub video_fetcher: Option<Arc<dyn Fetcher>>,

    /// Transport override for the player-endpoint call.
    pub player_fetcher: Option<Arc<dyn Fetcher>>,

    /// Transport override for the transcript-payload fetch.
    pub transcript_fetcher: Option<Arc<dyn Fetcher>>,

    /// Cache consulted before and populated after a full fetch.
    pub cache: Option<Arc<dyn TranscriptCache>>,

    /// Time-to-live for cache writes; the adapter's default when unset.
    pub cache_ttl: Option<Duration>,
}

impl TranscriptConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn with_disable_https(mut self, disable: bool) -> Self {
        self.disable_https = disable;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn TranscriptCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = Some(ttl);
        self
    }

    /// URL scheme for the watch-page and transcript fetches.
    pub(crate) fn scheme(&self) -> &'static str {
        if self.disable_https {
            "http"
        } else {
            "https"
        }
    }
}

impl fmt::Debug for TranscriptConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranscriptConfig")
            .field("lang", &self.lang)
            .field("user_agent", &self.user_agent)
            .field("disable_https", &self.disable_https)
            .field("video_fetcher", &self.video_fetcher.is_some())
            .field("player_fetcher", &self.player_fetcher.is_some())
            .field("transcript_fetcher", &self.transcript_fetcher.is_some())
            .field("cache", &self.cache.is_some())
            .field("cache_ttl", &self.cache_ttl)
            .finish()
    }
}
