//! Error types for Recap.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// Library-level error type for Recap operations.
#[derive(Error, Debug)]
pub enum RecapError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFileFormat(String),

    #[error("{0}")]
    PolicyViolation(String),

    #[error("API key is required for {0}")]
    MissingApiKey(String),

    #[error("The api key you provided is invalid")]
    InvalidApiKey,

    #[error("No transcript available for video {0}")]
    TranscriptUnavailable(String),

    #[error("Could not fetch transcript from YouTube: {0}")]
    TranscriptFetch(String),

    #[error("{0}")]
    Acquisition(String),

    #[error("Audio download failed: {0}")]
    AudioDownload(String),

    #[error("Failed to transcribe audio: {0}")]
    Transcription(String),

    #[error("Failed to summarize text: {0}")]
    Provider(String),

    #[error("Failed to generate audio: {0}")]
    SpeechSynthesis(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External tool not found: {0}. Please install it and ensure it's in your PATH.")]
    ToolNotFound(String),

    #[error("External tool failed: {0}")]
    ToolFailed(String),
}

/// Coarse classification of failures, as seen by callers of the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    InvalidInput,
    PolicyViolation,
    MissingApiKey,
    ProviderAuth,
    AcquisitionFailure,
    ProviderFailure,
    Internal,
}

impl RecapError {
    /// Classify this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            RecapError::InvalidInput(_) | RecapError::UnsupportedFileFormat(_) => {
                ErrorClass::InvalidInput
            }
            RecapError::PolicyViolation(_) => ErrorClass::PolicyViolation,
            RecapError::MissingApiKey(_) => ErrorClass::MissingApiKey,
            RecapError::InvalidApiKey => ErrorClass::ProviderAuth,
            RecapError::TranscriptUnavailable(_)
            | RecapError::TranscriptFetch(_)
            | RecapError::Acquisition(_)
            | RecapError::AudioDownload(_) => ErrorClass::AcquisitionFailure,
            RecapError::Transcription(_)
            | RecapError::Provider(_)
            | RecapError::SpeechSynthesis(_)
            | RecapError::Http(_) => ErrorClass::ProviderFailure,
            RecapError::Config(_)
            | RecapError::Storage(_)
            | RecapError::Io(_)
            | RecapError::Json(_)
            | RecapError::TomlParse(_)
            | RecapError::ToolNotFound(_)
            | RecapError::ToolFailed(_) => ErrorClass::Internal,
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_user_correctable(&self) -> bool {
        matches!(
            self.class(),
            ErrorClass::InvalidInput
                | ErrorClass::PolicyViolation
                | ErrorClass::MissingApiKey
                | ErrorClass::ProviderAuth
                | ErrorClass::AcquisitionFailure
        )
    }

    /// Translate a provider failure message, recognising rejected credentials.
    pub fn from_provider_message(message: impl Into<String>) -> Self {
        let message = message.into();
        if is_auth_failure(&message) {
            RecapError::InvalidApiKey
        } else {
            RecapError::Provider(message)
        }
    }
}

/// Markers providers use when they reject an API key.
const AUTH_FAILURE_MARKERS: &[&str] = &[
    "invalid_api_key",
    "incorrect api key",
    "api key not valid",
    "api_key_invalid",
    "unauthorized",
];

/// Whether a provider error message describes an authentication failure.
pub fn is_auth_failure(message: &str) -> bool {
    let lower = message.to_lowercase();
    AUTH_FAILURE_MARKERS.iter().any(|m| lower.contains(m)) || status_401_regex().is_match(&lower)
}

/// A bare `401` status token, not part of a longer number.
fn status_401_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?:^|[^0-9.])401(?:$|[^0-9.]|\.(?:$|[^0-9]))").expect("valid regex"))
}

/// Result type alias for Recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;
