//! Periodic removal of old files from the download directory.

use crate::error::Result;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Delete regular, non-hidden files in `dir` older than `max_age`.
///
/// Returns the number of files deleted. A missing directory counts as empty.
pub fn sweep_old_files(dir: &Path, max_age: Duration) -> Result<usize> {
    if !dir.exists() {
        return Ok(0);
    }

    let now = SystemTime::now();
    let mut deleted = 0;

    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        // Entries can vanish between listing and stat.
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }

        let age = metadata
            .modified()
            .ok()
            .and_then(|m| now.duration_since(m).ok())
            .unwrap_or_default();

        if age > max_age {
            match std::fs::remove_file(&path) {
                Ok(()) => {
                    debug!("Deleted old file {}", path.display());
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete {}: {}", path.display(), e),
            }
        }
    }

    Ok(deleted)
}

/// Shortest period accepted between sweeps.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_secs(1);

/// Run [`sweep_old_files`] every `interval` until the runtime shuts down.
pub fn spawn_cleanup_task(dir: PathBuf, max_age: Duration, interval: Duration) -> JoinHandle<()> {
    let interval = if interval < MIN_CLEANUP_INTERVAL {
        warn!(
            "Cleanup interval {:?} is too short, using {:?}",
            interval, MIN_CLEANUP_INTERVAL
        );
        MIN_CLEANUP_INTERVAL
    } else {
        interval
    };
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match sweep_old_files(&dir, max_age) {
                Ok(0) => debug!("Cleanup found nothing to delete"),
                Ok(n) => info!("Cleanup deleted {} old files", n),
                Err(e) => error!("Cleanup of {} failed: {}", dir.display(), e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sweep_respects_age_and_hidden_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("20250101_abcdefgh.mp3"), b"old").unwrap();
        std::fs::write(dir.path().join(".in-flight.mp3"), b"partial").unwrap();
        std::fs::create_dir(dir.path().join(".download-xyz")).unwrap();

        // Nothing is older than an hour.
        assert_eq!(sweep_old_files(dir.path(), Duration::from_secs(3600)).unwrap(), 0);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(sweep_old_files(dir.path(), Duration::from_millis(1)).unwrap(), 1);
        assert!(!dir.path().join("20250101_abcdefgh.mp3").exists());
        assert!(dir.path().join(".in-flight.mp3").exists());
        assert!(dir.path().join(".download-xyz").exists());
    }

    #[tokio::test]
    async fn test_zero_interval_keeps_sweeping() {
        let dir = tempfile::tempdir().unwrap();
        let old = dir.path().join("20250101_abcdefgh.mp3");
        std::fs::write(&old, b"old").unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;

        let handle = spawn_cleanup_task(dir.path().to_path_buf(), Duration::ZERO, Duration::ZERO);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert!(!handle.is_finished());
        assert!(!old.exists());
        handle.abort();
    }

    #[test]
    fn test_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(sweep_old_files(&missing, Duration::ZERO).unwrap(), 0);
    }
}
