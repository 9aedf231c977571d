use crate::fetch::FetchError;

/// Classified failures of the transcript pipeline.
///
/// Every stage maps what it observes into this fixed set; callers rely on the
/// variants to decide whether to back off, offer another language, or treat
/// the video as permanently void.
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    /// The input string is neither an 11-character video id nor a recognized
    /// YouTube URL shape.
    #[error("invalid YouTube video id or URL: {0}")]
    InvalidVideoIdentifier(String),

    /// The watch page or player endpoint answered with a non-success status.
    #[error("video {0} is unavailable")]
    VideoUnavailable(String),

    /// YouTube served a bot-challenge page instead of content, or rate-limited
    /// the transcript download with HTTP 429.
    #[error("YouTube is receiving too many requests from this IP (video {0})")]
    TooManyRequests(String),

    /// The video is confirmed playable but its owner disabled captions.
    #[error("transcripts are disabled for video {0}")]
    TranscriptsDisabled(String),

    /// No transcript could be located: the API key was missing from the watch
    /// page, the captions structure was absent without playability
    /// confirmation, or the payload parsed to zero cues.
    #[error("no transcript available for video {0}")]
    TranscriptNotAvailable(String),

    /// The requested language is not among the discovered caption tracks.
    /// Carries the full available-language sequence so the caller can present
    /// alternatives.
    #[error("no {requested:?} transcript for video {video_id}; available languages: [{}]", .available.join(", "))]
    LanguageNotAvailable {
        requested: String,
        available: Vec<String>,
        video_id: String,
    },

    /// The transport itself failed before any HTTP status was observed
    /// (connection refused, DNS, malformed JSON body).
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
