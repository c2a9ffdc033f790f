//! Cleanup command - one immediate sweep of the download directory.

use crate::audio::sweep_old_files;
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;
use std::time::Duration;

/// Run the cleanup command.
pub fn run_cleanup(max_age: Option<u64>, settings: &Settings) -> Result<()> {
    let dir = settings.download_dir();
    let max_age = Duration::from_secs(max_age.unwrap_or(settings.cleanup.max_file_age_seconds));

    let deleted = sweep_old_files(&dir, max_age)?;
    if deleted == 0 {
        Output::info(&format!("Nothing to delete in {}", dir.display()));
    } else {
        Output::success(&format!("Deleted {} file(s) from {}", deleted, dir.display()));
    }

    Ok(())
}
