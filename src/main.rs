//! Recap CLI entry point.

use anyhow::Result;
use recap::cli::{commands, Cli, Commands};
use recap::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::try_parse_with_env_file(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?.apply_env();

    // -v flags win over the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("recap={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    std::fs::create_dir_all(settings.download_dir())?;

    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.as_deref(), *port, settings).await?;
        }

        Commands::Text { text, args } => {
            commands::run_text(text, args, settings).await?;
        }

        Commands::File { path, args } => {
            commands::run_file(path, args, settings).await?;
        }

        Commands::Video { url, args } => {
            commands::run_video(url, args, settings).await?;
        }

        Commands::Doctor => {
            commands::run_doctor(&settings)?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path, settings)?;
        }

        Commands::Cleanup { max_age } => {
            commands::run_cleanup(*max_age, &settings)?;
        }
    }

    Ok(())
}
