//! Transcript retrieval and cue parsing.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::TranscriptConfig;
use crate::error::TranscriptError;
use crate::fetch::{FetchRequest, Fetcher};
use crate::Result;

/// Cue pattern of the default timed-text payload: start offset, duration and
/// text content, captured in that order.
const CUE_PATTERN: &str = r#"(?s)<text start="([^"]*)" dur="([^"]*)"[^>]*>(.*?)</text>"#;

/// One timed caption cue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start offset in seconds.
    pub offset: f64,
    /// Duration in seconds.
    pub duration: f64,
    pub lang: String,
}

/// Build the retrieval URL from a selected track's base URL.
///
/// Any `fmt=` override is stripped so the default time-coded payload format
/// is always requested, and the scheme is downgraded when HTTPS is disabled.
pub fn build_transcript_url(base_url: &str, disable_https: bool) -> String {
    let re = Regex::new(r"&fmt=[^&]*").expect("fmt pattern is valid");
    let url = re.replace_all(base_url, "").into_owned();
    if disable_https {
        url.replacen("https://", "http://", 1)
    } else {
        url
    }
}

/// Download the raw caption payload for an already-built transcript URL.
pub(crate) async fn fetch_transcript_payload(
    fetcher: &dyn Fetcher,
    url: &str,
    video_id: &str,
    config: &TranscriptConfig,
) -> Result<String> {
    tracing::debug!(video_id, "fetching transcript payload");

    let request = FetchRequest::get(url)
        .with_lang(config.lang.as_deref())
        .with_user_agent(config.user_agent.as_deref());
    let response = fetcher.fetch(request).await?;

    if response.status == 429 {
        return Err(TranscriptError::TooManyRequests(video_id.to_string()));
    }
    if !response.ok() {
        tracing::debug!(video_id, status = response.status, "transcript fetch failed");
        return Err(TranscriptError::TranscriptNotAvailable(video_id.to_string()));
    }

    Ok(response.body)
}

/// Decode the caption payload into ordered segments, one per cue.
///
/// A payload that yields zero cues is indistinguishable from "no transcript"
/// and is reported as such rather than as an empty success.
pub fn parse_transcript(payload: &str, lang: &str, video_id: &str) -> Result<Vec<TranscriptSegment>> {
    let re = Regex::new(CUE_PATTERN).expect("cue pattern is valid");

    let mut segments = Vec::new();
    for caps in re.captures_iter(payload) {
        let (Ok(offset), Ok(duration)) = (caps[1].parse::<f64>(), caps[2].parse::<f64>()) else {
            continue;
        };
        segments.push(TranscriptSegment {
            text: html_escape::decode_html_entities(&caps[3]).into_owned(),
            offset,
            duration,
            lang: lang.to_string(),
        });
    }

    if segments.is_empty() {
        return Err(TranscriptError::TranscriptNotAvailable(video_id.to_string()));
    }

    tracing::debug!(video_id, cues = segments.len(), "parsed transcript");
    Ok(segments)
}
