//! Direct transcript fetch using yt-dlp subtitle downloads.

use super::youtube::watch_url;
use super::{TranscriptSegment, TranscriptSource};
use crate::error::{RecapError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Fetches YouTube captions (manual or automatic) as json3 via yt-dlp.
pub struct YtDlpTranscriptSource {
    languages: String,
}

impl YtDlpTranscriptSource {
    /// `languages` is a yt-dlp `--sub-langs` pattern such as `en.*,en`.
    pub fn new(languages: &str) -> Self {
        Self {
            languages: languages.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Json3Event {
    #[serde(default)]
    t_start_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a json3 subtitle document into transcript segments.
fn parse_json3(content: &str) -> Result<Vec<TranscriptSegment>> {
    let doc: Json3 = serde_json::from_str(content)?;
    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.into_iter().map(|s| s.utf8).collect();
            let text = text.replace('\n', " ");
            if text.trim().is_empty() {
                None
            } else {
                Some(TranscriptSegment {
                    text,
                    offset_ms: event.t_start_ms,
                })
            }
        })
        .collect())
}

/// First `.json3` file in `dir`, if yt-dlp wrote one.
fn find_subtitle_file(dir: &Path) -> Result<Option<PathBuf>> {
    let mut found: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json3"))
        .collect();
    found.sort();
    Ok(found.into_iter().next())
}

#[async_trait]
impl TranscriptSource for YtDlpTranscriptSource {
    #[instrument(skip(self))]
    async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let work_dir = tempfile::tempdir()?;
        let template = work_dir.path().join("%(id)s.%(ext)s");

        info!("Fetching transcript for {}", video_id);
        let started = Instant::now();

        let result = Command::new("yt-dlp")
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(&self.languages)
            .arg("--sub-format").arg("json3")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(watch_url(video_id))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await;

        let output = match result {
            Ok(o) => o,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RecapError::ToolNotFound("yt-dlp".into()));
            }
            Err(e) => {
                return Err(RecapError::TranscriptFetch(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Transcript fetch failed"
            );
            return Err(RecapError::TranscriptFetch(stderr.trim().to_string()));
        }

        let Some(path) = find_subtitle_file(work_dir.path())? else {
            info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "No captions published for {}", video_id
            );
            return Err(RecapError::TranscriptUnavailable(video_id.to_string()));
        };

        debug!("Parsing {}", path.display());
        let content = tokio::fs::read_to_string(&path).await?;
        let segments = parse_json3(&content)
            .map_err(|e| RecapError::TranscriptFetch(format!("Invalid subtitle file: {e}")))?;

        if segments.is_empty() {
            return Err(RecapError::TranscriptUnavailable(video_id.to_string()));
        }

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            segments = segments.len(),
            "Transcript fetched"
        );
        Ok(segments)
    }
}
