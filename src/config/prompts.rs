//! Prompt templates for Recap.
//!
//! Prompts can be customized by placing a `summarization.toml` file in the
//! custom prompts directory.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::OnceLock;

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub summarization: SummarizationPrompts,
}

/// Prompts for summary generation.
///
/// Available variables: `{{length}}`, `{{format}}`, `{{language}}`, `{{instructions}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizationPrompts {
    /// System instruction sent with every summarization request.
    pub system: String,
    /// Custom instructions, default language.
    pub custom: String,
    /// Custom instructions, explicit language.
    pub custom_in_language: String,
    /// Default format, default language.
    pub plain: String,
    /// Default format, explicit language.
    pub in_language: String,
    /// Explicit format, default language.
    pub styled: String,
    /// Explicit format, explicit language.
    pub styled_in_language: String,
    /// Placed between the instruction and the source text.
    pub separator: String,
}

impl Default for SummarizationPrompts {
    fn default() -> Self {
        Self {
            system: "You are a summarization expert who extracts key details from long texts. \
                     Provide well-structured summaries that capture the essence of the content \
                     while maintaining readability and coherence."
                .to_string(),
            custom: "Summarize the following text based on these special requirements: {{instructions}}"
                .to_string(),
            custom_in_language: "Summarize the following text in {{language}} based on these special requirements: {{instructions}}"
                .to_string(),
            plain: "Summarize the following text in a {{length}} length. Focus on the key points, main arguments, and important details. Ensure the summary is coherent and complete"
                .to_string(),
            in_language: "Summarize the following text in a {{length}} length, in {{language}}. Focus on the key points, main arguments, and important details. Ensure the summary is coherent and complete"
                .to_string(),
            styled: "Summarize the following text in a {{length}} length, in {{format}} style. Focus on the key points, main arguments, and important details. Ensure the summary is coherent and complete"
                .to_string(),
            styled_in_language: "Summarize the following text in a {{length}} length, in {{format}} style in {{language}}. Focus on the key points, main arguments, and important details. Ensure the summary is coherent and complete"
                .to_string(),
            separator: "\n\nText to summarize:\n".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts, with an optional custom directory overriding the defaults.
    pub fn load(custom_dir: Option<&str>) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let summarization_path = custom_path.join("summarization.toml");
            if summarization_path.exists() {
                let content = std::fs::read_to_string(&summarization_path)?;
                prompts.summarization = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Substitution is a single pass, so values are never re-expanded.
    /// Unknown placeholders are left as they are.
    pub fn render(template: &str, vars: &HashMap<&str, &str>) -> String {
        placeholder_regex()
            .replace_all(template, |caps: &regex::Captures| {
                vars.get(&caps[1])
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}
