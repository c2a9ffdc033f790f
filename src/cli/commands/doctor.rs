//! Doctor command - verify system requirements and configuration.

use crate::cli::preflight::version_arg;
use crate::cli::Output;
use crate::config::{ProviderConfig, Settings, StorageProvider};
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Recap Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let tools = vec![
        check_tool("yt-dlp", install_hint_ytdlp()),
        check_tool("ffmpeg", install_hint_ffmpeg()),
        check_tool("pdftotext", install_hint_poppler()),
    ];
    print_section("External Tools", &tools);

    let providers = check_providers(settings);
    print_section("Providers", &providers);

    let storage = vec![check_storage(settings), check_download_dir(settings)];
    print_section("Storage", &storage);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);

    let checks: Vec<&CheckResult> = tools
        .iter()
        .chain(&providers)
        .chain(&storage)
        .chain(&config)
        .collect();
    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Recap.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Recap is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, hint: &str) -> CheckResult {
    match Command::new(name).arg(version_arg(name)).output() {
        Ok(output) => {
            // pdftotext prints its version on stderr.
            let text = if output.stdout.is_empty() {
                output.stderr
            } else {
                output.stdout
            };
            let version = String::from_utf8_lossy(&text)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Show `sk-abcd...wxyz` instead of the full key.
fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

fn check_provider_key(name: &str, env_var: &str, config: &ProviderConfig) -> CheckResult {
    match config.api_key.as_deref() {
        Some(key) if !key.trim().is_empty() => CheckResult::ok(
            name,
            &format!("{} ({})", config.model, mask_key(key)),
        ),
        _ => CheckResult::warning(
            name,
            "no default key",
            &format!("Requests must bring their own key, or set {}", env_var),
        ),
    }
}

fn check_providers(settings: &Settings) -> Vec<CheckResult> {
    let p = &settings.providers;
    let mut results = vec![
        check_provider_key("OpenAI", "OPENAI_API_KEY", &p.openai),
        check_provider_key("DeepSeek", "DEEPSEEK_API_KEY", &p.deepseek),
        check_provider_key("Gemini", "GEMINI_API_KEY", &p.gemini),
    ];

    results.push(match &settings.transcription.fast_whisper_url {
        Some(url) => CheckResult::ok("Fast-Whisper", url),
        None => CheckResult::warning(
            "Fast-Whisper",
            "not configured",
            "Set FASTAPI_URL to enable the fastWhisper speech-to-text model",
        ),
    });

    results
}

fn check_storage(settings: &Settings) -> CheckResult {
    match (settings.storage.provider, &settings.storage.bucket) {
        (StorageProvider::Local, _) => {
            CheckResult::ok("Audio storage", &format!("local ({})", settings.general.public_dir))
        }
        (StorageProvider::S3, Some(bucket)) => CheckResult::ok(
            "Audio storage",
            &format!("s3://{}/{} ({})", bucket, settings.storage.folder, settings.storage.region),
        ),
        (StorageProvider::S3, None) => CheckResult::error(
            "Audio storage",
            "S3 selected but no bucket configured",
            "Set AWS_S3_BUCKET or storage.bucket",
        ),
    }
}

fn check_download_dir(settings: &Settings) -> CheckResult {
    let dir = settings.download_dir();
    if dir.exists() {
        CheckResult::ok("Download directory", &format!("{}", dir.display()))
    } else {
        CheckResult::warning(
            "Download directory",
            &format!("{} (will be created)", dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: recap config init",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}

fn install_hint_poppler() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install poppler"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install poppler-utils (or your package manager)"
    } else {
        "Install from: https://poppler.freedesktop.org"
    }
}
