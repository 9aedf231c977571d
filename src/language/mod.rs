use crate::discovery::CaptionTrack;
use crate::error::TranscriptError;
use crate::Result;

/// Language codes of the discovered tracks, in platform order. Tracks without
/// a code are dropped from the list (but stay selectable positionally).
pub fn available_languages(tracks: &[CaptionTrack]) -> Vec<String> {
    tracks
        .iter()
        .filter_map(|track| track.language_code.clone())
        .collect()
}

/// Pick one caption track from the discovered set.
///
/// A requested language must match a track's code exactly; no locale
/// fuzzy-matching. With no request, the first track in platform order wins —
/// that is the platform's own default, not a popularity heuristic.
pub fn select_track<'a>(
    tracks: &'a [CaptionTrack],
    requested: Option<&str>,
    video_id: &str,
) -> Result<&'a CaptionTrack> {
    match requested {
        Some(lang) => tracks
            .iter()
            .find(|track| track.language_code.as_deref() == Some(lang))
            .ok_or_else(|| TranscriptError::LanguageNotAvailable {
                requested: lang.to_string(),
                available: available_languages(tracks),
                video_id: video_id.to_string(),
            }),
        None => tracks
            .first()
            .ok_or_else(|| TranscriptError::TranscriptsDisabled(video_id.to_string())),
    }
}
