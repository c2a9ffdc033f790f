//! Audio download for slow-mode transcription.
//!
//! yt-dlp extracts the audio track into a private temp dir inside the
//! download dir; ffmpeg normalises it to mp3 if yt-dlp produced another
//! container. Only the finished file is renamed into the download dir, so
//! the cleanup sweep never sees a partial download.

use crate::error::{RecapError, Result};
use async_trait::async_trait;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Downloads the audio track of a video to a local file.
#[async_trait]
pub trait AudioDownloader: Send + Sync {
    /// Download audio for `url` and return the path of the mp3 file.
    async fn download(&self, url: &str) -> Result<PathBuf>;
}

/// `YYYYMMDD_<8 random chars>`, the stem used for every audio file we write.
pub fn generate_audio_stem() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", Utc::now().format("%Y%m%d"), &random[..8])
}

/// yt-dlp based downloader.
pub struct YtDlpDownloader {
    download_dir: PathBuf,
}

impl YtDlpDownloader {
    pub fn new(download_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
        }
    }
}

#[async_trait]
impl AudioDownloader for YtDlpDownloader {
    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.download_dir)?;

        // Hidden so the sweep skips it while in flight.
        let work_dir = tempfile::Builder::new()
            .prefix(".download-")
            .tempdir_in(&self.download_dir)?;

        let stem = generate_audio_stem();
        let template = work_dir.path().join(format!("{}.%(ext)s", stem));

        info!("Downloading audio from {}", url);
        let started = Instant::now();

        let result = Command::new("yt-dlp")
            .arg("--extract-audio")
            .arg("--audio-format").arg("mp3")
            .arg("--audio-quality").arg("0")
            .arg("--output").arg(&template)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg(url)
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
                return Err(RecapError::AudioDownload(format!("yt-dlp execution failed: {e}")));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Audio download failed"
            );
            return Err(RecapError::AudioDownload(format!("yt-dlp failed: {}", stderr.trim())));
        }

        let downloaded = find_audio_file(work_dir.path(), &stem)?;
        let mp3 = work_dir.path().join(format!("{}.mp3", stem));
        if downloaded != mp3 {
            normalize_to_mp3(&downloaded, &mp3).await?;
        }

        let target = self.download_dir.join(format!("{}.mp3", stem));
        std::fs::rename(&mp3, &target)?;

        info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            path = %target.display(),
            "Audio downloaded"
        );
        Ok(target)
    }
}

/// Locates the file yt-dlp produced for `stem`.
fn find_audio_file(dir: &Path, stem: &str) -> Result<PathBuf> {
    for ext in &["mp3", "opus", "m4a", "webm", "ogg"] {
        let candidate = dir.join(format!("{}.{}", stem, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(RecapError::AudioDownload(
        "Downloaded audio file not found".into(),
    ))
}

/// Re-encodes an audio file to MP3.
async fn normalize_to_mp3(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {} to mp3", source.display());

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(RecapError::AudioDownload(format!("ffmpeg conversion failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(RecapError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(RecapError::AudioDownload(format!("ffmpeg error: {e}"))),
    }
}
