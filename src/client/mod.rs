//! Public operation surface: a configured client plus free-function
//! convenience forms.

use serde::Serialize;
use std::sync::Arc;

use crate::cache::{self, TranscriptCache};
use crate::config::TranscriptConfig;
use crate::discovery::{self, CaptionMetadata};
use crate::fetch::{Fetcher, HttpFetcher};
use crate::language;
use crate::resolver;
use crate::transcript::{self, TranscriptSegment};
use crate::Result;

/// Result of an availability check. Only ever constructed on success; every
/// failure mode surfaces as a [`crate::TranscriptError`] instead.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptAvailability {
    pub video_id: String,
    pub available: bool,
    pub transcript_url: Option<String>,
    pub selected_language: Option<String>,
    pub available_languages: Vec<String>,
}

/// Client holding one immutable configuration.
///
/// Calls are independent and may run concurrently; the injected fetchers and
/// cache are the only shared resources.
pub struct TranscriptClient {
    config: TranscriptConfig,
    http: Arc<HttpFetcher>,
}

impl TranscriptClient {
    pub fn new(config: TranscriptConfig) -> Self {
        Self {
            config,
            http: Arc::new(HttpFetcher::new()),
        }
    }

    fn video_fetcher(&self) -> &dyn Fetcher {
        self.config
            .video_fetcher
            .as_deref()
            .unwrap_or(self.http.as_ref())
    }

    fn player_fetcher(&self) -> &dyn Fetcher {
        self.config
            .player_fetcher
            .as_deref()
            .unwrap_or(self.http.as_ref())
    }

    fn transcript_fetcher(&self) -> &dyn Fetcher {
        self.config
            .transcript_fetcher
            .as_deref()
            .unwrap_or(self.http.as_ref())
    }

    /// Shared discovery routine: resolve, extract the API key, enumerate
    /// tracks, select a language, build the retrieval URL. Both public
    /// operations go through here so they classify failures identically.
    async fn discover(&self, raw: &str) -> Result<CaptionMetadata> {
        let video_id = resolver::resolve_video_id(raw)?;
        let api_key =
            discovery::fetch_api_key(self.video_fetcher(), &video_id, &self.config).await?;
        let tracks =
            discovery::fetch_caption_tracks(self.player_fetcher(), &video_id, &api_key, &self.config)
                .await?;

        let available_languages = language::available_languages(&tracks);
        let track = language::select_track(&tracks, self.config.lang.as_deref(), &video_id)?;
        let transcript_url =
            transcript::build_transcript_url(&track.base_url, self.config.disable_https);

        Ok(CaptionMetadata {
            video_id,
            transcript_url,
            selected_language: track.language_code.clone().unwrap_or_default(),
            available_languages,
        })
    }

    /// Report whether a transcript exists without downloading its payload.
    pub async fn check_transcript_availability(&self, video: &str) -> Result<TranscriptAvailability> {
        let meta = self.discover(video).await?;
        Ok(TranscriptAvailability {
            video_id: meta.video_id,
            available: true,
            transcript_url: Some(meta.transcript_url),
            selected_language: Some(meta.selected_language),
            available_languages: meta.available_languages,
        })
    }

    /// Fetch and parse the transcript, going through the configured cache
    /// when one is present.
    pub async fn fetch_transcript(&self, video: &str) -> Result<Vec<TranscriptSegment>> {
        // Resolve up front so the cache key uses the canonical id. Resolution
        // is a pure pattern match, so discover() repeating it costs nothing.
        let video_id = resolver::resolve_video_id(video)?;
        let key = cache::cache_key(&video_id, self.config.lang.as_deref());

        if let Some(cache) = &self.config.cache {
            if let Some(segments) = self.cache_lookup(cache.as_ref(), &key).await {
                return Ok(segments);
            }
        }

        let meta = self.discover(video).await?;
        let payload = transcript::fetch_transcript_payload(
            self.transcript_fetcher(),
            &meta.transcript_url,
            &meta.video_id,
            &self.config,
        )
        .await?;

        let lang = self
            .config
            .lang
            .clone()
            .unwrap_or_else(|| meta.selected_language.clone());
        let segments = transcript::parse_transcript(&payload, &lang, &meta.video_id)?;

        if let Some(cache) = &self.config.cache {
            self.cache_store(cache.as_ref(), &key, &segments).await;
        }

        Ok(segments)
    }

    /// A cache failure or unreadable entry is a miss, never an error.
    async fn cache_lookup(
        &self,
        cache: &dyn TranscriptCache,
        key: &str,
    ) -> Option<Vec<TranscriptSegment>> {
        let raw = match cache.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(err) => {
                tracing::debug!(key, %err, "cache read failed; treating as miss");
                return None;
            }
        };
        match serde_json::from_str::<Vec<TranscriptSegment>>(&raw) {
            Ok(segments) if !segments.is_empty() => {
                tracing::debug!(key, "transcript cache hit");
                Some(segments)
            }
            Ok(_) => None,
            Err(err) => {
                tracing::debug!(key, %err, "cache entry unreadable; treating as miss");
                None
            }
        }
    }

    /// Write failures are logged and swallowed.
    async fn cache_store(&self, cache: &dyn TranscriptCache, key: &str, segments: &[TranscriptSegment]) {
        let raw = match serde_json::to_string(segments) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(key, %err, "failed to serialize transcript for cache");
                return;
            }
        };
        if let Err(err) = cache.set(key, &raw, self.config.cache_ttl).await {
            tracing::warn!(key, %err, "failed to store transcript in cache");
        }
    }
}

/// One-shot form of [`TranscriptClient::fetch_transcript`].
pub async fn fetch_transcript(
    video: &str,
    config: TranscriptConfig,
) -> Result<Vec<TranscriptSegment>> {
    TranscriptClient::new(config).fetch_transcript(video).await
}

/// One-shot form of [`TranscriptClient::check_transcript_availability`].
pub async fn check_transcript_availability(
    video: &str,
    config: TranscriptConfig,
) -> Result<TranscriptAvailability> {
    TranscriptClient::new(config)
        .check_transcript_availability(video)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::error::TranscriptError;
    use crate::fetch::{FetchError, FetchRequest, FetchResponse};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const VIDEO_ID: &str = "dQw4w9WgXcQ";

    const WATCH_PAGE: &str =
        r#"<html><script>ytcfg.set({"INNERTUBE_API_KEY":"test-api-key"});</script></html>"#;

    const TRANSCRIPT_XML: &str = concat!(
        "<transcript>",
        r#"<text start="0.21" dur="2.34">Hello world</text>"#,
        r#"<text start="2.55" dur="1.5">Second cue</text>"#,
        "</transcript>",
    );

    fn player_json() -> String {
        serde_json::json!({
            "playabilityStatus": {"status": "OK"},
            "captions": {
                "playerCaptionsTracklistRenderer": {
                    "captionTracks": [
                        {"baseUrl": "https://yt/api/timedtext?urlA&fmt=srv3", "languageCode": "en"},
                        {"baseUrl": "https://yt/api/timedtext?urlB", "languageCode": "es"},
                    ]
                }
            }
        })
        .to_string()
    }

    /// Transport double that always answers the same response and counts how
    /// often it was asked.
    struct StubFetcher {
        status: u16,
        body: String,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn ok(body: impl Into<String>) -> Arc<Self> {
            Arc::new(Self {
                status: 200,
                body: body.into(),
                calls: AtomicUsize::new(0),
            })
        }

        fn status(status: u16) -> Arc<Self> {
            Arc::new(Self {
                status,
                body: String::new(),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Fetcher for StubFetcher {
        async fn fetch(&self, _request: FetchRequest) -> std::result::Result<FetchResponse, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(FetchResponse {
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    struct Stages {
        video: Arc<StubFetcher>,
        player: Arc<StubFetcher>,
        transcript: Arc<StubFetcher>,
    }

    fn stub_config(stages: &Stages) -> TranscriptConfig {
        let mut config = TranscriptConfig::new();
        config.video_fetcher = Some(stages.video.clone() as Arc<dyn Fetcher>);
        config.player_fetcher = Some(stages.player.clone() as Arc<dyn Fetcher>);
        config.transcript_fetcher = Some(stages.transcript.clone() as Arc<dyn Fetcher>);
        config
    }

    fn happy_stages() -> Stages {
        Stages {
            video: StubFetcher::ok(WATCH_PAGE),
            player: StubFetcher::ok(player_json()),
            transcript: StubFetcher::ok(TRANSCRIPT_XML),
        }
    }

    #[tokio::test]
    async fn full_fetch_runs_all_three_stages() {
        let stages = happy_stages();
        let client = TranscriptClient::new(stub_config(&stages));

        let segments = client.fetch_transcript(VIDEO_ID).await.unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "Hello world");
        assert_eq!(segments[0].offset, 0.21);
        assert_eq!(segments[0].duration, 2.34);
        // No language requested, so segments carry the selected track's code.
        assert_eq!(segments[0].lang, "en");
        assert_eq!(stages.video.calls(), 1);
        assert_eq!(stages.player.calls(), 1);
        assert_eq!(stages.transcript.calls(), 1);
    }

    #[tokio::test]
    async fn availability_check_never_fetches_payload() {
        let stages = happy_stages();
        let client = TranscriptClient::new(stub_config(&stages));

        let availability = client.check_transcript_availability(VIDEO_ID).await.unwrap();

        assert!(availability.available);
        assert_eq!(availability.video_id, VIDEO_ID);
        assert_eq!(availability.selected_language.as_deref(), Some("en"));
        assert_eq!(availability.available_languages, vec!["en", "es"]);
        // The fmt override is stripped from the advertised URL.
        assert_eq!(
            availability.transcript_url.as_deref(),
            Some("https://yt/api/timedtext?urlA")
        );
        assert_eq!(stages.transcript.calls(), 0);
    }

    #[tokio::test]
    async fn requested_language_selects_matching_track() {
        let stages = happy_stages();
        let config = stub_config(&stages).with_lang("es");
        let client = TranscriptClient::new(config);

        let availability = client.check_transcript_availability(VIDEO_ID).await.unwrap();
        assert_eq!(availability.selected_language.as_deref(), Some("es"));
        assert_eq!(
            availability.transcript_url.as_deref(),
            Some("https://yt/api/timedtext?urlB")
        );
    }

    #[tokio::test]
    async fn missing_language_reports_alternatives() {
        let stages = happy_stages();
        let config = stub_config(&stages).with_lang("fr");
        let client = TranscriptClient::new(config);

        let err = client.fetch_transcript(VIDEO_ID).await.unwrap_err();
        match err {
            TranscriptError::LanguageNotAvailable {
                requested,
                available,
                video_id,
            } => {
                assert_eq!(requested, "fr");
                assert_eq!(available, vec!["en".to_string(), "es".to_string()]);
                assert_eq!(video_id, VIDEO_ID);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stages.transcript.calls(), 0);
    }

    #[tokio::test]
    async fn segments_carry_requested_language() {
        let stages = happy_stages();
        let config = stub_config(&stages).with_lang("es");
        let client = TranscriptClient::new(config);

        let segments = client.fetch_transcript(VIDEO_ID).await.unwrap();
        assert!(segments.iter().all(|s| s.lang == "es"));
    }

    #[tokio::test]
    async fn bot_challenge_page_is_too_many_requests() {
        let stages = Stages {
            video: StubFetcher::ok(r#"<html><div class="g-recaptcha"></div></html>"#),
            player: StubFetcher::ok(player_json()),
            transcript: StubFetcher::ok(TRANSCRIPT_XML),
        };
        let client = TranscriptClient::new(stub_config(&stages));

        let err = client.fetch_transcript(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, TranscriptError::TooManyRequests(id) if id == VIDEO_ID));
        assert_eq!(stages.player.calls(), 0);
    }

    #[tokio::test]
    async fn failed_watch_page_is_video_unavailable() {
        let stages = Stages {
            video: StubFetcher::status(404),
            player: StubFetcher::ok(player_json()),
            transcript: StubFetcher::ok(TRANSCRIPT_XML),
        };
        let client = TranscriptClient::new(stub_config(&stages));

        let err = client.fetch_transcript(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, TranscriptError::VideoUnavailable(_)));
    }

    #[tokio::test]
    async fn playable_video_without_captions_is_disabled() {
        let stages = Stages {
            video: StubFetcher::ok(WATCH_PAGE),
            player: StubFetcher::ok(
                serde_json::json!({"playabilityStatus": {"status": "OK"}}).to_string(),
            ),
            transcript: StubFetcher::ok(TRANSCRIPT_XML),
        };
        let client = TranscriptClient::new(stub_config(&stages));

        let err = client.fetch_transcript(VIDEO_ID).await.unwrap_err();
        assert!(matches!(err, TranscriptError::TranscriptsDisabled(_)));
    }

    #[tokio::test]
    async fn invalid_input_fails_before_any_network() {
        let stages = happy_stages();
        let client = TranscriptClient::new(stub_config(&stages));

        let err = client.fetch_transcript("definitely not a video").await.unwrap_err();
        assert!(matches!(err, TranscriptError::InvalidVideoIdentifier(_)));
        assert_eq!(stages.video.calls(), 0);
    }

    #[tokio::test]
    async fn url_input_resolves_before_discovery() {
        let stages = happy_stages();
        let client = TranscriptClient::new(stub_config(&stages));

        let availability = client
            .check_transcript_availability("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            .await
            .unwrap();
        assert_eq!(availability.video_id, VIDEO_ID);
    }

    #[tokio::test]
    async fn second_fetch_is_served_from_cache() {
        let stages = happy_stages();
        let mut config = stub_config(&stages);
        config.cache = Some(Arc::new(MemoryCache::new()) as Arc<dyn TranscriptCache>);
        let client = TranscriptClient::new(config);

        let first = client.fetch_transcript(VIDEO_ID).await.unwrap();
        let second = client.fetch_transcript(VIDEO_ID).await.unwrap();

        assert_eq!(first, second);
        // Exactly one underlying transcript download across both calls.
        assert_eq!(stages.transcript.calls(), 1);
        assert_eq!(stages.video.calls(), 1);
    }

    #[tokio::test]
    async fn cache_keys_separate_languages() {
        let stages = happy_stages();
        let cache = Arc::new(MemoryCache::new());

        let mut config_en = stub_config(&stages).with_lang("en");
        config_en.cache = Some(cache.clone() as Arc<dyn TranscriptCache>);
        TranscriptClient::new(config_en)
            .fetch_transcript(VIDEO_ID)
            .await
            .unwrap();

        let mut config_es = stub_config(&stages).with_lang("es");
        config_es.cache = Some(cache.clone() as Arc<dyn TranscriptCache>);
        TranscriptClient::new(config_es)
            .fetch_transcript(VIDEO_ID)
            .await
            .unwrap();

        // Different language, different key, so a second download happened.
        assert_eq!(stages.transcript.calls(), 2);
    }

    /// Cache double whose reads and writes always fail.
    struct BrokenCache;

    #[async_trait]
    impl TranscriptCache for BrokenCache {
        async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
            anyhow::bail!("cache read exploded")
        }

        async fn set(
            &self,
            _key: &str,
            _value: &str,
            _ttl: Option<std::time::Duration>,
        ) -> anyhow::Result<()> {
            anyhow::bail!("cache write exploded")
        }
    }

    #[tokio::test]
    async fn broken_cache_never_fails_a_fetch() {
        let stages = happy_stages();
        let mut config = stub_config(&stages);
        config.cache = Some(Arc::new(BrokenCache) as Arc<dyn TranscriptCache>);
        let client = TranscriptClient::new(config);

        let segments = client.fetch_transcript(VIDEO_ID).await.unwrap();
        assert_eq!(segments.len(), 2);
    }

    #[tokio::test]
    async fn one_shot_functions_mirror_the_client() {
        let stages = happy_stages();
        let segments = fetch_transcript(VIDEO_ID, stub_config(&stages)).await.unwrap();
        assert_eq!(segments.len(), 2);

        let stages = happy_stages();
        let availability = check_transcript_availability(VIDEO_ID, stub_config(&stages))
            .await
            .unwrap();
        assert!(availability.available);
        assert_eq!(stages.transcript.calls(), 0);
    }
}
