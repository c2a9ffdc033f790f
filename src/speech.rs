//! Text-to-speech for summaries (OpenAI only).

use crate::config::SpeechSettings;
use crate::error::{RecapError, Result};
use crate::openai::{create_client, translate_error};
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, Voice};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Trait for speech synthesis backends.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` and return encoded (mp3) audio.
    async fn synthesize(&self, api_key: &str, text: &str) -> Result<Vec<u8>>;
}

/// OpenAI TTS synthesizer.
pub struct OpenAiSpeech {
    model: String,
    voice: String,
    timeout: Duration,
}

impl OpenAiSpeech {
    pub fn new(settings: &SpeechSettings, timeout: Duration) -> Self {
        Self {
            model: settings.model.clone(),
            voice: settings.voice.clone(),
            timeout,
        }
    }
}

fn speech_model(name: &str) -> SpeechModel {
    match name {
        "tts-1" => SpeechModel::Tts1,
        "tts-1-hd" => SpeechModel::Tts1Hd,
        other => SpeechModel::Other(other.to_string()),
    }
}

fn voice(name: &str) -> Voice {
    match name.to_lowercase().as_str() {
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        _ => Voice::Alloy,
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    #[instrument(skip(self, api_key, text), fields(model = %self.model, chars = text.len()))]
    async fn synthesize(&self, api_key: &str, text: &str) -> Result<Vec<u8>> {
        let client = create_client(api_key, None, self.timeout)?;

        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(speech_model(&self.model))
            .voice(voice(&self.voice))
            .build()
            .map_err(|e| RecapError::SpeechSynthesis(e.to_string()))?;

        info!("Generating audio for the summary");
        let started = Instant::now();

        let response = client.audio().speech(request).await.map_err(|e| {
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Speech synthesis failed: {}", e
            );
            match translate_error(e) {
                RecapError::Provider(message) => RecapError::SpeechSynthesis(message),
                other => other,
            }
        })?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            bytes = response.bytes.len(),
            "Speech synthesis finished"
        );

        Ok(response.bytes.to_vec())
    }
}
