//! Audio files on local disk: downloads and their cleanup.

mod cleanup;
mod downloader;

pub use cleanup::{spawn_cleanup_task, sweep_old_files};
pub use downloader::{generate_audio_stem, AudioDownloader, YtDlpDownloader};
