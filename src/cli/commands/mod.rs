//! CLI command implementations.

mod cleanup;
mod config;
mod doctor;
mod serve;
mod summarize;

pub use cleanup::run_cleanup;
pub use config::run_config;
pub use doctor::run_doctor;
pub use serve::{router, run_serve, AppState};
pub use summarize::{run_file, run_text, run_video};
