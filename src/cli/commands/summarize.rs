//! One-shot summarization commands: text, file and video.

use crate::cli::preflight::{self, Operation};
use crate::cli::{Output, SummarizeArgs};
use crate::config::Settings;
use crate::options::{SummarizationOptions, SummarizationSpeed};
use crate::orchestrator::{Orchestrator, SummaryResult};
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;

/// Run the text command.
pub async fn run_text(text: &str, args: &SummarizeArgs, settings: Settings) -> Result<()> {
    let text = if text == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read text from stdin")?;
        buf
    } else {
        text.to_string()
    };

    let orchestrator = Orchestrator::new(settings)?;
    let options = args.to_partial_options();

    let spinner = Output::spinner("Summarizing text...");
    let result = orchestrator
        .summarize_text(&text, Some(&options), args.api_key.as_deref())
        .await;
    spinner.finish_and_clear();

    print_result(&result?, args.json)
}

/// Run the file command.
pub async fn run_file(path: &Path, args: &SummarizeArgs, settings: Settings) -> Result<()> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    if file_name.to_lowercase().ends_with(".pdf") {
        if let Err(e) = preflight::check(Operation::PdfExtraction) {
            Output::error(&format!("{}", e));
            Output::info("Run 'recap doctor' for detailed diagnostics.");
            return Err(e.into());
        }
    }

    let orchestrator = Orchestrator::new(settings)?;
    let options = args.to_partial_options();

    let spinner = Output::spinner(&format!("Summarizing {}...", file_name));
    let result = orchestrator
        .summarize_file(&file_name, &bytes, Some(&options), args.api_key.as_deref())
        .await;
    spinner.finish_and_clear();

    print_result(&result?, args.json)
}

/// Run the video command.
pub async fn run_video(url: &str, args: &SummarizeArgs, settings: Settings) -> Result<()> {
    let options = args.to_partial_options();
    let operation = match SummarizationOptions::resolve(Some(&options)).speed {
        SummarizationSpeed::Fast => Operation::VideoTranscript,
        SummarizationSpeed::Slow => Operation::VideoAudio,
    };
    if let Err(e) = preflight::check(operation) {
        Output::error(&format!("{}", e));
        Output::info("Run 'recap doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Summarizing video...");
    let result = orchestrator
        .summarize_video(url, Some(&options), args.api_key.as_deref())
        .await;
    spinner.finish_and_clear();

    print_result(&result?, args.json)
}

fn print_result(result: &SummaryResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    if let Some(metadata) = &result.video_metadata {
        Output::video_info(metadata.title.as_deref(), metadata.channel_name.as_deref());
    }
    Output::summary(&result.summary, &result.source_text);
    if let Some(url) = &result.audio_url {
        Output::kv("Audio", url);
    }
    if let Some(err) = &result.audio_error {
        Output::warning(&format!("No audio: {}", err));
    }

    Ok(())
}
