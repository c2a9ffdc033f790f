//! Speech-to-text for slow-mode video acquisition.
//!
//! # Backends
//!
//! - **OpenAI Whisper** (default): hosted `whisper-1`, needs an OpenAI key.
//! - **Fast-Whisper**: a self-hosted HTTP service that takes a multipart
//!   upload and answers with `{"text": ...}`.

mod fast_whisper;
mod whisper;

pub use fast_whisper::FastWhisperTranscriber;
pub use whisper::WhisperTranscriber;

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::options::SttModel;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Trait for transcription services.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// The option value that selects this backend.
    fn model(&self) -> SttModel;

    /// Whether the caller must resolve an OpenAI key before transcribing.
    fn requires_api_key(&self) -> bool;

    /// Transcribe an audio file to plain text.
    async fn transcribe(&self, audio_path: &Path, api_key: Option<&str>) -> Result<String>;
}

/// Lookup table from speech-to-text option to backend.
#[derive(Clone, Default)]
pub struct TranscriberRegistry {
    transcribers: HashMap<SttModel, Arc<dyn Transcriber>>,
}

impl TranscriberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let timeout = Duration::from_secs(settings.http.timeout_seconds);
        Self::new()
            .with(Arc::new(WhisperTranscriber::new(
                &settings.transcription.whisper_model,
                settings.transcription.language.as_deref(),
                timeout,
            )))
            .with(Arc::new(FastWhisperTranscriber::new(
                settings.transcription.fast_whisper_url.as_deref(),
                timeout,
            )))
    }

    pub fn with(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcribers.insert(transcriber.model(), transcriber);
        self
    }

    pub fn get(&self, model: SttModel) -> Result<Arc<dyn Transcriber>> {
        self.transcribers.get(&model).cloned().ok_or_else(|| {
            RecapError::Config(format!("No transcription backend registered for {}", model))
        })
    }
}
