//! Self-hosted Fast-Whisper transcription over HTTP.

use super::Transcriber;
use crate::error::{RecapError, Result};
use crate::options::SttModel;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Client for a Fast-Whisper service accepting `POST <url>` with a `file` part.
pub struct FastWhisperTranscriber {
    url: Option<String>,
    timeout: Duration,
}

/// Service answer: either the transcript or an error message.
#[derive(Debug, Deserialize)]
struct FastWhisperResponse {
    text: Option<String>,
    error: Option<String>,
}

impl FastWhisperTranscriber {
    pub fn new(url: Option<&str>, timeout: Duration) -> Self {
        Self {
            url: url.map(str::to_string),
            timeout,
        }
    }
}

fn transcript_from(response: FastWhisperResponse) -> Result<String> {
    match response {
        FastWhisperResponse {
            text: Some(text), ..
        } => Ok(text.trim().to_string()),
        FastWhisperResponse {
            error: Some(error), ..
        } => Err(RecapError::Transcription(error)),
        _ => Err(RecapError::Transcription(
            "Fast-Whisper returned no transcript".to_string(),
        )),
    }
}

#[async_trait]
impl Transcriber for FastWhisperTranscriber {
    fn model(&self) -> SttModel {
        SttModel::FastWhisper
    }

    fn requires_api_key(&self) -> bool {
        false
    }

    #[instrument(skip(self, _api_key), fields(audio_path = %audio_path.display()))]
    async fn transcribe(&self, audio_path: &Path, _api_key: Option<&str>) -> Result<String> {
        let url = self.url.as_deref().ok_or_else(|| {
            RecapError::Config("Fast-Whisper endpoint is not configured".to_string())
        })?;

        let bytes = tokio::fs::read(audio_path).await?;
        let part = Part::bytes(bytes)
            .file_name("audio.mp3")
            .mime_str("audio/mpeg")
            .map_err(|e| RecapError::Transcription(e.to_string()))?;
        let form = Form::new().part("file", part);

        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Sending audio to Fast-Whisper at {}", url);
        let started = Instant::now();

        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecapError::Transcription(format!("Fast-Whisper request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Fast-Whisper transcription failed: {}", body);
            return Err(RecapError::Transcription(format!(
                "Fast-Whisper returned {}: {}",
                status, body
            )));
        }

        let body: FastWhisperResponse = response
            .json()
            .await
            .map_err(|e| RecapError::Transcription(format!("Invalid Fast-Whisper response: {}", e)))?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Fast-Whisper transcription finished"
        );

        transcript_from(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_parsing() {
        let ok: FastWhisperResponse =
            serde_json::from_str(r#"{"text":" hello there ","language":"en","probability":0.98}"#)
                .unwrap();
        assert_eq!(transcript_from(ok).unwrap(), "hello there");

        let failed: FastWhisperResponse =
            serde_json::from_str(r#"{"error":"Model failed to load. Check logs."}"#).unwrap();
        assert!(matches!(
            transcript_from(failed),
            Err(RecapError::Transcription(m)) if m.contains("Model failed")
        ));
    }

    #[tokio::test]
    async fn test_unconfigured_endpoint() {
        let transcriber = FastWhisperTranscriber::new(None, Duration::from_secs(1));
        let err = transcriber
            .transcribe(Path::new("audio.mp3"), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::Config(_)));
    }
}
