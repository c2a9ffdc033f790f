//! Recap - summarization of text, documents and YouTube videos
//!
//! Takes raw text, an uploaded `.txt`/`.docx`/`.pdf` document, or a YouTube
//! URL, obtains the text to summarize, and sends it to one of several LLM
//! providers with a prompt built from the caller's options. The summary can
//! optionally be turned into speech and published as an audio file.
//!
//! # Architecture
//!
//! - `options` - Summarization options and their defaults
//! - `prompt` - System and user prompt construction
//! - `providers` - Summarization provider abstraction (OpenAI, DeepSeek, Gemini)
//! - `acquisition` - Transcript-first or audio-transcription text acquisition
//! - `video` - YouTube URL handling, transcripts and metadata
//! - `audio` - Audio download and download-directory cleanup
//! - `transcription` - Speech-to-text (Whisper, Fast-Whisper)
//! - `speech` - Text-to-speech
//! - `storage` - Publishing synthesized audio (local or S3)
//! - `files` - Text extraction from uploaded documents
//! - `orchestrator` - Request coordination and policy
//!
//! # Example
//!
//! ```rust,no_run
//! use recap::config::Settings;
//! use recap::orchestrator::Orchestrator;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?.apply_env();
//!     let orchestrator = Orchestrator::new(settings)?;
//!
//!     let result = orchestrator
//!         .summarize_text("Rust is a systems programming language...", None, None)
//!         .await?;
//!     println!("{}", result.summary);
//!
//!     Ok(())
//! }
//! ```

pub mod acquisition;
pub mod api_key;
pub mod audio;
pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod openai;
pub mod options;
pub mod orchestrator;
pub mod prompt;
pub mod providers;
pub mod speech;
pub mod storage;
pub mod transcription;
pub mod video;

pub use error::{RecapError, Result};
