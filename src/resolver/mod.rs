use regex::Regex;

use crate::error::TranscriptError;
use crate::Result;

/// YouTube video ids are always exactly 11 characters.
const VIDEO_ID_LEN: usize = 11;

/// URL shapes an id can be extracted from: watch-page query parameter,
/// youtu.be short links, and embed/shorts/v/live path forms.
const URL_PATTERNS: [&str; 3] = [
    r"[?&]v=([0-9A-Za-z_-]{11})",
    r"youtu\.be/([0-9A-Za-z_-]{11})",
    r"/(?:embed|shorts|v|live)/([0-9A-Za-z_-]{11})",
];

/// Normalize a raw user-supplied string into a canonical video id.
///
/// An input of exactly 11 characters is trusted as a bare id with no further
/// format validation; anything else must match a known URL shape. This stage
/// never touches the network and never confirms the id names a real video.
pub fn resolve_video_id(input: &str) -> Result<String> {
    if input.chars().count() == VIDEO_ID_LEN {
        return Ok(input.to_string());
    }

    for pattern in URL_PATTERNS {
        let re = Regex::new(pattern).expect("video id pattern is valid");
        if let Some(caps) = re.captures(input) {
            return Ok(caps[1].to_string());
        }
    }

    Err(TranscriptError::InvalidVideoIdentifier(input.to_string()))
}
