//! Fetch YouTube caption transcripts without official API access.
//!
//! The pipeline resolves a video id or URL, scrapes the InnerTube API key
//! from the watch page, queries the internal player endpoint for the caption
//! track list, selects a language, then downloads and parses the timed-text
//! payload into ordered [`TranscriptSegment`]s. Every failure along the way
//! is classified into [`TranscriptError`].
//!
//! ```no_run
//! use yt_transcript::{fetch_transcript, TranscriptConfig};
//!
//! # async fn run() -> yt_transcript::Result<()> {
//! let segments = fetch_transcript("dQw4w9WgXcQ", TranscriptConfig::new()).await?;
//! for segment in segments {
//!     println!("[{:.2}s] {}", segment.offset, segment.text);
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod discovery;
pub mod error;
pub mod fetch;
pub mod language;
pub mod resolver;
pub mod transcript;

pub use cache::{FsCache, MemoryCache, TranscriptCache};
pub use client::{
    check_transcript_availability, fetch_transcript, TranscriptAvailability, TranscriptClient,
};
pub use config::TranscriptConfig;
pub use discovery::{CaptionMetadata, CaptionTrack};
pub use error::TranscriptError;
pub use fetch::{FetchError, FetchRequest, FetchResponse, Fetcher, HttpFetcher, SharedFetcher};
pub use resolver::resolve_video_id;
pub use transcript::TranscriptSegment;

/// Result type used throughout the library.
pub type Result<T> = std::result::Result<T, TranscriptError>;
