//! CLI module for Recap.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use crate::options::PartialOptions;
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Recap - summarize text, documents and YouTube videos
///
/// Sends content to OpenAI, DeepSeek or Gemini and prints the summary,
/// optionally with a spoken version of it.
#[derive(Parser, Debug)]
#[command(name = "recap")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize text given on the command line ("-" reads stdin)
    Text {
        text: String,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Summarize a .txt, .docx or .pdf file
    File {
        path: PathBuf,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Summarize a YouTube video
    Video {
        url: String,

        #[command(flatten)]
        args: SummarizeArgs,
    },

    /// Check system requirements and configuration
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Delete old audio files from the download directory
    Cleanup {
        /// Maximum file age in seconds (defaults to cleanup.max_file_age_seconds)
        #[arg(long)]
        max_age: Option<u64>,
    },
}

/// Summarization options shared by the text, file and video commands.
///
/// Unrecognised values fall back to their defaults, as they do over HTTP.
#[derive(Args, Debug, Default, Clone)]
pub struct SummarizeArgs {
    /// short, standard or detailed
    #[arg(long)]
    pub length: Option<String>,

    /// bulletPoints, narrative or default
    #[arg(long)]
    pub format: Option<String>,

    /// english, arabic or default
    #[arg(long)]
    pub language: Option<String>,

    /// openai, deepseek or gemini
    #[arg(short, long)]
    pub model: Option<String>,

    /// fast (published transcript) or slow (audio transcription)
    #[arg(long)]
    pub speed: Option<String>,

    /// openaiWhisper or fastWhisper
    #[arg(long)]
    pub stt_model: Option<String>,

    /// Also synthesize the summary as speech
    #[arg(long)]
    pub listen: bool,

    /// Custom instructions (up to 200 characters)
    #[arg(short, long)]
    pub instructions: Option<String>,

    /// API key to use instead of the configured one
    #[arg(long, env = "RECAP_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Load `env_file` (or `.env` from the working directory) and then parse `args`,
    /// so `env`-backed flags see values defined there.
    ///
    /// Variables already set in the environment win over the file.
    pub fn try_parse_with_env_file<I, T>(env_file: Option<&Path>, args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let _ = match env_file {
            Some(path) => dotenvy::from_path(path),
            None => dotenvy::dotenv().map(|_| ()),
        };
        Self::try_parse_from(args)
    }
}

impl SummarizeArgs {
    pub fn to_partial_options(&self) -> PartialOptions {
        let string = |v: &Option<String>| v.clone().map(Value::String);
        PartialOptions {
            length: string(&self.length),
            format: string(&self.format),
            language: string(&self.language),
            model: string(&self.model),
            speed: string(&self.speed),
            stt_model: string(&self.stt_model),
            listen: Some(Value::Bool(self.listen)),
            custom_instructions: string(&self.instructions),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration file if none exists
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{SummarizationModel, SummarizationOptions, SummaryLength};

    #[test]
    fn test_parse_video_command() {
        let cli = Cli::try_parse_from([
            "recap", "-vv", "video", "https://youtu.be/dQw4w9WgXcQ", "--model", "gemini",
            "--length", "short", "--listen",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Video { url, args } = cli.command else {
            panic!("expected video command");
        };
        assert_eq!(url, "https://youtu.be/dQw4w9WgXcQ");

        let options = SummarizationOptions::resolve(Some(&args.to_partial_options()));
        assert_eq!(options.model, SummarizationModel::Gemini);
        assert_eq!(options.length, SummaryLength::Short);
        assert!(options.listen);
    }

    #[test]
    fn test_api_key_from_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        std::fs::write(&env_file, "RECAP_API_KEY=sk-from-dotenv\n").unwrap();

        let cli = Cli::try_parse_with_env_file(Some(&env_file), ["recap", "text", "hello"]).unwrap();

        let Commands::Text { args, .. } = cli.command else {
            panic!("expected text command");
        };
        assert_eq!(args.api_key.as_deref(), Some("sk-from-dotenv"));
    }

    #[test]
    fn test_defaults_without_flags() {
        let args = SummarizeArgs::default();
        let options = SummarizationOptions::resolve(Some(&args.to_partial_options()));
        assert_eq!(options, SummarizationOptions::default());
    }
}
