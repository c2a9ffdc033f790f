//! OpenAI client configuration with sensible defaults.
//!
//! Clients are cheap to build and carry the caller's key, so one is created
//! per provider call rather than shared across requests.

use crate::error::{RecapError, Result};
use async_openai::error::OpenAIError;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for OpenAI API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create an OpenAI (or OpenAI-compatible) client for a single call.
pub fn create_client(
    api_key: &str,
    base_url: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| RecapError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = base_url {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}

/// Translate an OpenAI SDK error, recognising rejected API keys.
pub fn translate_error(err: OpenAIError) -> RecapError {
    RecapError::from_provider_message(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(create_client("sk-test", None, Duration::from_secs(5)).is_ok());
        assert!(create_client(
            "sk-test",
            Some("https://api.deepseek.com/"),
            Duration::from_secs(DEFAULT_TIMEOUT_SECS)
        )
        .is_ok());
    }

    #[test]
    fn test_translate_invalid_argument() {
        let err = translate_error(OpenAIError::InvalidArgument("bad prompt".into()));
        assert!(matches!(err, RecapError::Provider(m) if m.contains("bad prompt")));
    }
}
