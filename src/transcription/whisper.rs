//! OpenAI Whisper transcription implementation.

use super::Transcriber;
use crate::error::{RecapError, Result};
use crate::openai::{create_client, translate_error};
use crate::options::SttModel;
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// OpenAI Whisper-based transcriber.
pub struct WhisperTranscriber {
    model: String,
    language: Option<String>,
    timeout: Duration,
}

impl WhisperTranscriber {
    pub fn new(model: &str, language: Option<&str>, timeout: Duration) -> Self {
        Self {
            model: model.to_string(),
            language: language.map(str::to_string),
            timeout,
        }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    fn model(&self) -> SttModel {
        SttModel::OpenAiWhisper
    }

    fn requires_api_key(&self) -> bool {
        true
    }

    #[instrument(skip(self, api_key), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path, api_key: Option<&str>) -> Result<String> {
        let api_key = api_key.ok_or_else(|| RecapError::MissingApiKey("openai".to_string()))?;
        let client = create_client(api_key, None, self.timeout)?;

        debug!("Reading audio file");
        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder
            .build()
            .map_err(|e| RecapError::Transcription(format!("Failed to build request: {}", e)))?;

        info!("Transcribing audio with {}", self.model);
        let started = Instant::now();

        let response = client.audio().transcribe(request).await.map_err(|e| {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Whisper transcription failed: {}", e
            );
            match translate_error(e) {
                RecapError::Provider(message) => RecapError::Transcription(message),
                other => other,
            }
        })?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Transcription finished"
        );

        Ok(response.text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_requires_key() {
        let transcriber = WhisperTranscriber::new("whisper-1", Some("en"), Duration::from_secs(1));
        let err = transcriber
            .transcribe(Path::new("/nonexistent/audio.mp3"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::MissingApiKey(_)));
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let transcriber = WhisperTranscriber::new("whisper-1", None, Duration::from_secs(1));
        let err = transcriber
            .transcribe(Path::new("/nonexistent/audio.mp3"), Some("sk-test"))
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::Io(_)));
    }
}
