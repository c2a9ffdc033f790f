//! Google Gemini summarizer (REST `generateContent`).

use super::{text_or_fallback, Summarizer};
use crate::config::ProviderConfig;
use crate::error::{RecapError, Result};
use crate::options::SummarizationModel;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// Default Gemini API base URL.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Summarizer backed by the Gemini API.
pub struct GeminiSummarizer {
    model_id: String,
    max_tokens: u32,
    base_url: String,
    default_key: Option<String>,
    system: String,
    timeout: Duration,
}

impl GeminiSummarizer {
    pub fn new(config: &ProviderConfig, system: &str, timeout: Duration) -> Self {
        Self {
            model_id: config.model.clone(),
            max_tokens: config.max_tokens,
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| GEMINI_API_BASE.to_string()),
            default_key: config.api_key.clone(),
            system: system.to_string(),
            timeout,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model_id
        )
    }

    fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            system_instruction: Some(Content {
                role: None,
                parts: vec![Part {
                    text: self.system.clone(),
                }],
            }),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
            },
        }
    }
}

#[async_trait]
impl Summarizer for GeminiSummarizer {
    fn model(&self) -> SummarizationModel {
        SummarizationModel::Gemini
    }

    fn default_api_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    #[instrument(skip(self, api_key, prompt), fields(model = %self.model_id))]
    async fn summarize(&self, api_key: &str, prompt: &str) -> Result<String> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

        info!("Summarizing with {}", self.model_id);
        let started = Instant::now();

        let response = client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| RecapError::Provider(format!("Gemini request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                status = status.as_u16(),
                "Gemini summarization failed"
            );
            return Err(translate_status(status.as_u16(), &body));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| RecapError::Provider(format!("Invalid Gemini response: {}", e)))?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Summarization finished"
        );

        Ok(text_or_fallback(candidate_text(body)))
    }
}

/// Map a failed Gemini response to an error.
fn translate_status(status: u16, body: &str) -> RecapError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());

    if status == 401 || status == 403 {
        return RecapError::InvalidApiKey;
    }
    RecapError::from_provider_message(format!("Gemini API error ({}): {}", status, message))
}

/// Concatenated text of the first candidate, if any.
fn candidate_text(response: GenerateContentResponse) -> Option<String> {
    let content = response.candidates?.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().map(|p| p.text).collect();
    Some(text)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
}
