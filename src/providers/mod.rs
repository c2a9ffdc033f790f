//! Summarization provider adapters.
//!
//! Every backend sits behind the [`Summarizer`] trait and is looked up by
//! [`SummarizationModel`] in a [`ProviderRegistry`], so adding a provider means
//! registering one more adapter rather than touching the orchestrator.

mod chat;
mod gemini;

pub use chat::ChatSummarizer;
pub use gemini::GeminiSummarizer;

use crate::config::Settings;
use crate::error::{RecapError, Result};
use crate::options::SummarizationModel;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Returned when a provider answers successfully but with no text.
pub const FALLBACK_SUMMARY: &str = "Could not generate a summary.";

/// Trait for summarization backends.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// The option value that selects this backend.
    fn model(&self) -> SummarizationModel;

    /// Key used when the caller does not bring one.
    fn default_api_key(&self) -> Option<&str>;

    /// Summarize a fully rendered prompt with one provider call.
    async fn summarize(&self, api_key: &str, prompt: &str) -> Result<String>;
}

/// Use the provider's text, or the fallback when it came back empty.
pub fn text_or_fallback(text: Option<String>) -> String {
    match text {
        Some(t) if !t.trim().is_empty() => t,
        _ => FALLBACK_SUMMARY.to_string(),
    }
}

/// Lookup table from model option to adapter.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<SummarizationModel, Arc<dyn Summarizer>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the registry with every configured backend.
    pub fn from_settings(settings: &Settings, system_instruction: &str) -> Self {
        let timeout = Duration::from_secs(settings.http.timeout_seconds);
        Self::new()
            .with(Arc::new(ChatSummarizer::openai(
                &settings.providers.openai,
                system_instruction,
                timeout,
            )))
            .with(Arc::new(ChatSummarizer::deepseek(
                &settings.providers.deepseek,
                system_instruction,
                timeout,
            )))
            .with(Arc::new(GeminiSummarizer::new(
                &settings.providers.gemini,
                system_instruction,
                timeout,
            )))
    }

    /// Register an adapter, replacing any previous one for the same model.
    pub fn with(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.providers.insert(summarizer.model(), summarizer);
        self
    }

    pub fn get(&self, model: SummarizationModel) -> Result<Arc<dyn Summarizer>> {
        self.providers.get(&model).cloned().ok_or_else(|| {
            RecapError::Config(format!("No summarization provider registered for {}", model))
        })
    }
}
