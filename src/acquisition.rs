//! Ways of turning a video reference into source text.
//!
//! Two strategies exist:
//!
//! - [`TranscriptFetch`]: download the published transcript (fast mode).
//! - [`AudioTranscription`]: download the audio track and run speech-to-text
//!   (slow mode, and any URL without a recognisable video ID).
//!
//! [`plan`] picks between them. Fast-mode failures are never retried as slow
//! mode; the orchestrator reports them instead.

use crate::audio::AudioDownloader;
use crate::error::Result;
use crate::options::SummarizationSpeed;
use crate::transcription::Transcriber;
use crate::video::{extract_video_id, TranscriptSource, VideoMetadata};
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A video the caller wants summarized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub url: String,
    pub video_id: Option<String>,
}

impl VideoRef {
    pub fn parse(url: &str) -> Self {
        Self {
            url: url.trim().to_string(),
            video_id: extract_video_id(url),
        }
    }
}

/// Text obtained for a video plus its best-effort metadata.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionResult {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_metadata: Option<VideoMetadata>,
}

/// Which strategy a request will use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionPlan {
    TranscriptFetch { video_id: String },
    AudioTranscription,
}

/// Choose the acquisition strategy for a video.
///
/// Transcript fetch happens only in fast mode and only when a video ID can be
/// parsed; everything else goes straight to audio transcription.
pub fn plan(video: &VideoRef, speed: SummarizationSpeed) -> AcquisitionPlan {
    match (speed, &video.video_id) {
        (SummarizationSpeed::Fast, Some(id)) => AcquisitionPlan::TranscriptFetch {
            video_id: id.clone(),
        },
        (SummarizationSpeed::Fast, None) => {
            debug!("No video ID in {}, using audio transcription", video.url);
            AcquisitionPlan::AudioTranscription
        }
        (SummarizationSpeed::Slow, _) => AcquisitionPlan::AudioTranscription,
    }
}

/// Keep at most `max_words` whitespace-separated words.
pub fn truncate_words(text: &str, max_words: usize) -> String {
    text.split_whitespace()
        .take(max_words)
        .collect::<Vec<_>>()
        .join(" ")
}

/// A way to obtain source text for a video.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    async fn acquire(&self, video: &VideoRef) -> Result<String>;
}

/// Fetches the published transcript and bounds its length.
pub struct TranscriptFetch {
    source: Arc<dyn TranscriptSource>,
    max_words: usize,
}

impl TranscriptFetch {
    pub fn new(source: Arc<dyn TranscriptSource>, max_words: usize) -> Self {
        Self { source, max_words }
    }
}

#[async_trait]
impl AcquisitionStrategy for TranscriptFetch {
    async fn acquire(&self, video: &VideoRef) -> Result<String> {
        let video_id = video.video_id.as_deref().unwrap_or_default();
        let segments = self.source.fetch_transcript(video_id).await?;

        let joined = segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let text = truncate_words(&joined, self.max_words);
        info!(
            segments = segments.len(),
            words = text.split_whitespace().count(),
            "Transcript acquired"
        );
        Ok(text)
    }
}

/// Downloads audio and transcribes it. The audio file is removed afterwards.
pub struct AudioTranscription {
    downloader: Arc<dyn AudioDownloader>,
    transcriber: Arc<dyn Transcriber>,
    api_key: Option<String>,
}

impl AudioTranscription {
    pub fn new(
        downloader: Arc<dyn AudioDownloader>,
        transcriber: Arc<dyn Transcriber>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            downloader,
            transcriber,
            api_key,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for AudioTranscription {
    async fn acquire(&self, video: &VideoRef) -> Result<String> {
        let audio_path = self.downloader.download(&video.url).await?;

        let transcript = self
            .transcriber
            .transcribe(&audio_path, self.api_key.as_deref())
            .await;

        if let Err(e) = tokio::fs::remove_file(&audio_path).await {
            warn!("Failed to remove {}: {}", audio_path.display(), e);
        }

        transcript
    }
}
