//! Configuration module for Recap.
//!
//! Handles loading application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummarizationPrompts};
pub use settings::{
    CleanupSettings, GeneralSettings, HttpSettings, PromptSettings, ProviderConfig,
    ProviderSettings, ServerSettings, Settings, SpeechSettings, StorageProvider,
    StorageSettings, TranscriptSettings, TranscriptionSettings,
};
