//! Chat-completion summarizers: OpenAI and the OpenAI-compatible DeepSeek API.

use super::{text_or_fallback, Summarizer};
use crate::config::ProviderConfig;
use crate::error::{RecapError, Result};
use crate::openai::{create_client, translate_error};
use crate::options::SummarizationModel;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

/// DeepSeek's OpenAI-compatible endpoint.
pub const DEEPSEEK_API_BASE: &str = "https://api.deepseek.com";

/// Summarizer backed by a chat-completions endpoint.
pub struct ChatSummarizer {
    model: SummarizationModel,
    model_id: String,
    max_tokens: u32,
    base_url: Option<String>,
    default_key: Option<String>,
    system: String,
    timeout: Duration,
}

impl ChatSummarizer {
    /// OpenAI chat completions.
    pub fn openai(config: &ProviderConfig, system: &str, timeout: Duration) -> Self {
        Self::build(SummarizationModel::OpenAi, config, None, system, timeout)
    }

    /// DeepSeek chat completions (distinct base endpoint).
    pub fn deepseek(config: &ProviderConfig, system: &str, timeout: Duration) -> Self {
        Self::build(
            SummarizationModel::DeepSeek,
            config,
            Some(DEEPSEEK_API_BASE),
            system,
            timeout,
        )
    }

    fn build(
        model: SummarizationModel,
        config: &ProviderConfig,
        default_base: Option<&str>,
        system: &str,
        timeout: Duration,
    ) -> Self {
        Self {
            model,
            model_id: config.model.clone(),
            max_tokens: config.max_tokens,
            base_url: config
                .base_url
                .clone()
                .or_else(|| default_base.map(str::to_string)),
            default_key: config.api_key.clone(),
            system: system.to_string(),
            timeout,
        }
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn max_tokens(&self) -> u32 {
        self.max_tokens
    }
}

#[async_trait]
impl Summarizer for ChatSummarizer {
    fn model(&self) -> SummarizationModel {
        self.model
    }

    fn default_api_key(&self) -> Option<&str> {
        self.default_key.as_deref()
    }

    #[instrument(skip(self, api_key, prompt), fields(provider = %self.model, model = %self.model_id))]
    async fn summarize(&self, api_key: &str, prompt: &str) -> Result<String> {
        let client = create_client(api_key, self.base_url.as_deref(), self.timeout)?;

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(self.system.as_str())
                .build()
                .map_err(|e| RecapError::Provider(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| RecapError::Provider(e.to_string()))?
                .into(),
        ];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_id)
            .messages(messages)
            .max_tokens(self.max_tokens)
            .build()
            .map_err(|e| RecapError::Provider(e.to_string()))?;

        info!("Summarizing with {}", self.model_id);
        let started = Instant::now();

        let response = match client.chat().create(request).await {
            Ok(r) => r,
            Err(e) => {
                warn!(
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Summarization failed: {}", e
                );
                return Err(translate_error(e));
            }
        };

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Summarization finished"
        );

        let text = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        Ok(text_or_fallback(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    #[test]
    fn test_deepseek_uses_its_own_endpoint() {
        let settings = Settings::default();
        let openai = ChatSummarizer::openai(&settings.providers.openai, "sys", Duration::from_secs(1));
        let mut deepseek_config = settings.providers.deepseek.clone();
        deepseek_config.base_url = None;
        let deepseek = ChatSummarizer::deepseek(&deepseek_config, "sys", Duration::from_secs(1));

        assert_eq!(openai.base_url(), None);
        assert_eq!(deepseek.base_url(), Some(DEEPSEEK_API_BASE));
        assert_eq!(openai.max_tokens(), 300);
        assert_eq!(deepseek.max_tokens(), 1000);
        assert_eq!(deepseek.model(), SummarizationModel::DeepSeek);
    }

    #[test]
    fn test_default_key_comes_from_config() {
        let mut config = Settings::default().providers.openai;
        config.api_key = Some("sk-configured".into());
        let summarizer = ChatSummarizer::openai(&config, "sys", Duration::from_secs(1));
        assert_eq!(summarizer.default_api_key(), Some("sk-configured"));
    }
}
