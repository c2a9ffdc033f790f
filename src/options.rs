//! Summarization options and their resolution against defaults.
//!
//! Requests carry loosely-typed options (JSON values from the HTTP layer or
//! strings from the CLI). [`SummarizationOptions::resolve`] turns them into a
//! complete, validated record: every field that is missing or unrecognised
//! falls back to its default, so resolution never fails.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;

/// Upper bound on custom instructions, in characters.
pub const MAX_CUSTOM_INSTRUCTIONS_CHARS: usize = 200;

/// Requested summary length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryLength {
    Short,
    #[default]
    Standard,
    Detailed,
}

impl SummaryLength {
    /// Wording used inside prompts.
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            SummaryLength::Short => "brief",
            SummaryLength::Standard => "standard",
            SummaryLength::Detailed => "comprehensive",
        }
    }
}

impl FromStr for SummaryLength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" | "brief" => Ok(SummaryLength::Short),
            "standard" => Ok(SummaryLength::Standard),
            "detailed" | "comprehensive" => Ok(SummaryLength::Detailed),
            _ => Err(format!("Unknown summary length: {}", s)),
        }
    }
}

/// Requested summary layout. `Default` lets the model choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryFormat {
    BulletPoints,
    Narrative,
    #[default]
    Default,
}

impl SummaryFormat {
    pub fn is_default(&self) -> bool {
        *self == SummaryFormat::Default
    }

    /// Wording used inside prompts.
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            SummaryFormat::BulletPoints => "bullet points",
            SummaryFormat::Narrative => "narrative",
            SummaryFormat::Default => "default",
        }
    }
}

impl FromStr for SummaryFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bulletpoints" | "bullet-points" | "bullet_points" | "bullets" => {
                Ok(SummaryFormat::BulletPoints)
            }
            "narrative" => Ok(SummaryFormat::Narrative),
            "default" => Ok(SummaryFormat::Default),
            _ => Err(format!("Unknown summary format: {}", s)),
        }
    }
}

/// Output language. `Default` means whatever the source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummaryLanguage {
    English,
    Arabic,
    #[default]
    Default,
}

impl SummaryLanguage {
    pub fn is_default(&self) -> bool {
        *self == SummaryLanguage::Default
    }

    /// Wording used inside prompts.
    pub fn prompt_phrase(&self) -> &'static str {
        match self {
            SummaryLanguage::English => "English",
            SummaryLanguage::Arabic => "Arabic",
            SummaryLanguage::Default => "default",
        }
    }
}

impl FromStr for SummaryLanguage {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "english" | "en" => Ok(SummaryLanguage::English),
            "arabic" | "ar" => Ok(SummaryLanguage::Arabic),
            "default" => Ok(SummaryLanguage::Default),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}

/// Summarization backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SummarizationModel {
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "gemini")]
    Gemini,
}

impl FromStr for SummarizationModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(SummarizationModel::OpenAi),
            "deepseek" => Ok(SummarizationModel::DeepSeek),
            "gemini" => Ok(SummarizationModel::Gemini),
            _ => Err(format!("Unknown summarization model: {}", s)),
        }
    }
}

impl std::fmt::Display for SummarizationModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SummarizationModel::OpenAi => write!(f, "openai"),
            SummarizationModel::DeepSeek => write!(f, "deepseek"),
            SummarizationModel::Gemini => write!(f, "gemini"),
        }
    }
}

/// Video acquisition speed: transcript fetch (fast) or audio transcription (slow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SummarizationSpeed {
    #[default]
    Fast,
    Slow,
}

impl FromStr for SummarizationSpeed {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(SummarizationSpeed::Fast),
            "slow" => Ok(SummarizationSpeed::Slow),
            _ => Err(format!("Unknown speed: {}", s)),
        }
    }
}

/// Speech-to-text backend used in slow mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum SttModel {
    #[serde(rename = "fastWhisper")]
    FastWhisper,
    #[default]
    #[serde(rename = "openaiWhisper")]
    OpenAiWhisper,
}

impl FromStr for SttModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fastwhisper" | "fast-whisper" | "fast_whisper" => Ok(SttModel::FastWhisper),
            "openaiwhisper" | "openai-whisper" | "openai_whisper" | "whisper" => {
                Ok(SttModel::OpenAiWhisper)
            }
            _ => Err(format!("Unknown speech-to-text model: {}", s)),
        }
    }
}

impl std::fmt::Display for SttModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SttModel::FastWhisper => write!(f, "fastWhisper"),
            SttModel::OpenAiWhisper => write!(f, "openaiWhisper"),
        }
    }
}

/// Options as supplied by a caller. Any field may be absent or hold garbage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,
    #[serde(default, alias = "lang", skip_serializing_if = "Option::is_none")]
    pub language: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<Value>,
    #[serde(default, alias = "stt_model", skip_serializing_if = "Option::is_none")]
    pub stt_model: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<Value>,
    #[serde(default, alias = "custom_instructions", skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<Value>,
}

/// Fully resolved options. Every field holds a valid value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizationOptions {
    pub length: SummaryLength,
    pub format: SummaryFormat,
    pub language: SummaryLanguage,
    pub model: SummarizationModel,
    pub speed: SummarizationSpeed,
    pub stt_model: SttModel,
    pub listen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_instructions: Option<String>,
}

impl Default for SummarizationOptions {
    fn default() -> Self {
        Self::resolve(None)
    }
}

impl SummarizationOptions {
    /// Merge caller options with defaults. Never fails.
    pub fn resolve(partial: Option<&PartialOptions>) -> Self {
        let Some(p) = partial else {
            return Self {
                length: SummaryLength::default(),
                format: SummaryFormat::default(),
                language: SummaryLanguage::default(),
                model: SummarizationModel::default(),
                speed: SummarizationSpeed::default(),
                stt_model: SttModel::default(),
                listen: false,
                custom_instructions: None,
            };
        };

        Self {
            length: enum_or_default(p.length.as_ref()),
            format: enum_or_default(p.format.as_ref()),
            language: enum_or_default(p.language.as_ref()),
            model: enum_or_default(p.model.as_ref()),
            speed: enum_or_default(p.speed.as_ref()),
            stt_model: enum_or_default(p.stt_model.as_ref()),
            listen: matches!(p.listen, Some(Value::Bool(true))),
            custom_instructions: bounded_instructions(p.custom_instructions.as_ref()),
        }
    }
}

impl From<&SummarizationOptions> for PartialOptions {
    fn from(options: &SummarizationOptions) -> Self {
        Self {
            length: to_json(&options.length),
            format: to_json(&options.format),
            language: to_json(&options.language),
            model: to_json(&options.model),
            speed: to_json(&options.speed),
            stt_model: to_json(&options.stt_model),
            listen: Some(Value::Bool(options.listen)),
            custom_instructions: options.custom_instructions.clone().map(Value::String),
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    serde_json::to_value(value).ok()
}

/// Parse a string value into an enum, falling back to the enum's default.
fn enum_or_default<T: FromStr + Default>(value: Option<&Value>) -> T {
    value
        .and_then(Value::as_str)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or_default()
}

fn bounded_instructions(value: Option<&Value>) -> Option<String> {
    let text = value.and_then(Value::as_str)?.trim();
    let bounded: String = text.chars().take(MAX_CUSTOM_INSTRUCTIONS_CHARS).collect();
    let bounded = bounded.trim_end();
    if bounded.is_empty() {
        None
    } else {
        Some(bounded.to_string())
    }
}
