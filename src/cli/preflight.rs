//! Pre-flight checks before expensive operations.
//!
//! Validates that the external tools an operation shells out to are
//! installed before any provider is called.

use crate::error::{RecapError, Result};
use std::process::Command;

/// Operations with external tool requirements.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Fast-mode video summaries fetch captions with yt-dlp.
    VideoTranscript,
    /// Slow-mode video summaries download audio with yt-dlp and ffmpeg.
    VideoAudio,
    /// PDF uploads are read with pdftotext.
    PdfExtraction,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation) -> Result<()> {
    match operation {
        Operation::VideoTranscript => check_tool("yt-dlp"),
        Operation::VideoAudio => {
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")
        }
        Operation::PdfExtraction => check_tool("pdftotext"),
    }
}

/// Command-line flag that prints a tool's version.
pub(crate) fn version_arg(name: &str) -> &'static str {
    match name {
        "ffmpeg" | "ffprobe" => "-version",
        "pdftotext" => "-v",
        _ => "--version",
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg(version_arg(name)).output() {
        // Some poppler builds exit non-zero after printing the version.
        Ok(output) if output.status.success() || name == "pdftotext" => Ok(()),
        Ok(_) => Err(RecapError::ToolFailed(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(RecapError::ToolFailed(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_args() {
        assert_eq!(version_arg("ffmpeg"), "-version");
        assert_eq!(version_arg("pdftotext"), "-v");
        assert_eq!(version_arg("yt-dlp"), "--version");
    }

    #[test]
    fn test_missing_tool() {
        let err = check_tool("recap-definitely-not-installed").unwrap_err();
        assert!(matches!(err, RecapError::ToolNotFound(_)));
    }
}
