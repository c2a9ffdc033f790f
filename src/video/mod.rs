//! Video-facing collaborators: URL parsing, metadata and transcripts.

mod metadata;
mod transcript;
pub mod youtube;

pub use metadata::OEmbedMetadata;
pub use transcript::YtDlpTranscriptSource;
pub use youtube::{extract_video_id, is_valid_youtube_url};

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Descriptive data shown alongside a video summary.
///
/// Every field is optional; lookups that fail leave them empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoMetadata {
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub channel_name: Option<String>,
}

/// One caption line of a fetched transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Start of the line, in milliseconds from the beginning of the video.
    pub offset_ms: u64,
}

/// Source of published video transcripts.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// Fetch the transcript for a video.
    ///
    /// Fails with `TranscriptUnavailable` when the video has no transcript,
    /// and with another error for any other failure.
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>>;
}

/// Source of video metadata. Never fails.
#[async_trait]
pub trait MetadataSource: Send + Sync {
    async fn video_metadata(&self, video_url: &str) -> VideoMetadata;
}
