//! Configuration settings for Recap.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub providers: ProviderSettings,
    pub transcript: TranscriptSettings,
    pub transcription: TranscriptionSettings,
    pub speech: SpeechSettings,
    pub storage: StorageSettings,
    pub server: ServerSettings,
    pub cleanup: CleanupSettings,
    pub http: HttpSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for downloaded and synthesized audio.
    pub download_dir: String,
    /// Public URL path under which synthesized audio is served.
    pub public_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            download_dir: "~/.recap/downloads".to_string(),
            public_dir: "/public/audio".to_string(),
            log_level: "warn".to_string(),
        }
    }
}

/// Settings for a single summarization backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Default API key, used when the caller does not supply one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens in the generated summary.
    pub max_tokens: u32,
    /// API base URL (None = provider default).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl ProviderConfig {
    fn new(model: &str, max_tokens: u32, base_url: Option<&str>) -> Self {
        Self {
            api_key: None,
            model: model.to_string(),
            max_tokens,
            base_url: base_url.map(str::to_string),
        }
    }
}

/// Summarization provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub openai: ProviderConfig,
    pub deepseek: ProviderConfig,
    pub gemini: ProviderConfig,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            openai: ProviderConfig::new("gpt-4o", 300, None),
            deepseek: ProviderConfig::new("deepseek-chat", 1000, Some("https://api.deepseek.com")),
            gemini: ProviderConfig::new(
                "gemini-2.0-flash",
                1000,
                Some("https://generativelanguage.googleapis.com/v1beta"),
            ),
        }
    }
}

/// Direct transcript fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptSettings {
    /// Token budget for a fetched transcript; the word limit is a quarter of this.
    pub max_tokens: usize,
    /// Subtitle language pattern passed to yt-dlp.
    pub language: String,
}

impl Default for TranscriptSettings {
    fn default() -> Self {
        Self {
            max_tokens: 15000,
            language: "en.*,en".to_string(),
        }
    }
}

impl TranscriptSettings {
    /// Word limit derived from the token budget (roughly four tokens per word).
    pub fn max_words(&self) -> usize {
        self.max_tokens / 4
    }
}

/// Speech-to-text settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// OpenAI Whisper model.
    pub whisper_model: String,
    /// Language hint for Whisper (None = auto-detect).
    pub language: Option<String>,
    /// Self-hosted Fast-Whisper endpoint (e.g. http://localhost:5566/transcribe/).
    pub fast_whisper_url: Option<String>,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            whisper_model: "whisper-1".to_string(),
            language: Some("en".to_string()),
            fast_whisper_url: None,
        }
    }
}

/// Text-to-speech settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    /// TTS model.
    pub model: String,
    /// Voice name.
    pub voice: String,
    /// Fail the whole request when speech synthesis fails.
    pub strict: bool,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            strict: false,
        }
    }
}

/// Where synthesized audio is published.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    #[default]
    Local,
    S3,
}

impl std::str::FromStr for StorageProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(StorageProvider::Local),
            "s3" => Ok(StorageProvider::S3),
            _ => Err(format!("Unknown storage provider: {}", s)),
        }
    }
}

impl std::fmt::Display for StorageProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageProvider::Local => write!(f, "local"),
            StorageProvider::S3 => write!(f, "s3"),
        }
    }
}

/// Audio storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub provider: StorageProvider,
    /// S3 bucket name.
    pub bucket: Option<String>,
    /// S3 region.
    pub region: String,
    /// Key prefix for synthesized audio.
    pub folder: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: StorageProvider::Local,
            bucket: None,
            region: "us-east-1".to_string(),
            folder: "audios".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Requests from this origin skip the API key check.
    pub allowed_origin: String,
    /// Origins allowed by CORS.
    pub cors_origins: Vec<String>,
    /// Maximum accepted upload size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origin: "http://localhost:3000".to_string(),
            cors_origins: vec![
                "http://localhost:3001".to_string(),
                "https://letssummarize.vercel.app".to_string(),
            ],
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

/// Download directory cleanup settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupSettings {
    /// Files older than this are deleted.
    pub max_file_age_seconds: u64,
    /// How often the sweep runs.
    pub interval_seconds: u64,
}

impl Default for CleanupSettings {
    fn default() -> Self {
        Self {
            max_file_age_seconds: 24 * 60 * 60,
            interval_seconds: 24 * 60 * 60,
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Timeout applied to every provider request.
    pub timeout_seconds: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self { timeout_seconds: 300 }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Apply overrides from the process environment.
    ///
    /// Called once at startup; the resulting settings are not modified afterwards.
    pub fn apply_env(mut self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok());
        self
    }

    fn apply_vars(&mut self, get: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| get(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = get("OPENAI_API_KEY") {
            self.providers.openai.api_key = Some(key);
        }
        if let Some(key) = get("DEEPSEEK_API_KEY") {
            self.providers.deepseek.api_key = Some(key);
        }
        if let Some(key) = get("GEMINI_API_KEY") {
            self.providers.gemini.api_key = Some(key);
        }
        if let Some(n) = get("OPENAI_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.providers.openai.max_tokens = n;
        }
        if let Some(n) = get("DEEPSEEK_MAX_TOKENS").and_then(|v| v.parse().ok()) {
            self.providers.deepseek.max_tokens = n;
        }
        if let Some(n) = get("MAX_TRANSCRIPT_TOKENS").and_then(|v| v.parse().ok()) {
            self.transcript.max_tokens = n;
        }
        if let Some(flag) = get("USE_S3") {
            self.storage.provider = if flag == "true" {
                StorageProvider::S3
            } else {
                StorageProvider::Local
            };
        }
        if let Some(bucket) = get("AWS_S3_BUCKET") {
            self.storage.bucket = Some(bucket);
        }
        if let Some(region) = get("AWS_REGION") {
            self.storage.region = region;
        }
        if let Some(url) = get("FASTAPI_URL") {
            self.transcription.fast_whisper_url = Some(url);
        }
        if let Some(origin) = get("ALLOWED_ORIGIN") {
            self.server.allowed_origin = origin;
        }
        if let Some(origins) = get("CORS") {
            self.server.cors_origins = origins
                .split(',')
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::RecapError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("recap")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded download directory path.
    pub fn download_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.download_dir)
    }

    /// Public URL for a synthesized audio file served from the download directory.
    pub fn public_audio_url(&self, file_name: &str) -> String {
        format!("{}/{}", self.general.public_dir.trim_end_matches('/'), file_name)
    }
}
