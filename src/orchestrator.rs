//! Request orchestration for Recap.
//!
//! Each entry point runs one linear pipeline: resolve options, enforce
//! provider policy, acquire text, summarize, optionally synthesize speech,
//! and assemble a [`SummaryResult`]. Nothing is shared between requests
//! except the immutable settings and the collaborator handles.

use crate::acquisition::{
    plan, AcquisitionPlan, AcquisitionResult, AcquisitionStrategy, AudioTranscription,
    TranscriptFetch, VideoRef,
};
use crate::api_key::ApiKeyContext;
use crate::audio::{generate_audio_stem, AudioDownloader, YtDlpDownloader};
use crate::config::{Prompts, Settings};
use crate::error::{RecapError, Result};
use crate::files::extract_text_from_file;
use crate::options::{PartialOptions, SummarizationModel, SummarizationOptions, SummarizationSpeed};
use crate::prompt::PromptBuilder;
use crate::providers::ProviderRegistry;
use crate::speech::{OpenAiSpeech, SpeechSynthesizer};
use crate::storage::{self, AudioStore};
use crate::transcription::TranscriberRegistry;
use crate::video::{
    is_valid_youtube_url, MetadataSource, OEmbedMetadata, TranscriptSource, VideoMetadata,
    YtDlpTranscriptSource,
};
use serde::Serialize;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument, warn};

pub const INVALID_VIDEO_URL: &str = "Invalid YouTube URL";
pub const NO_TRANSCRIPT: &str =
    "This video does not have a YouTube transcript. Please use SLOW mode instead.";
pub const NETWORK_PROBLEM: &str = "There is a problem with network connection";
pub const EMPTY_VIDEO_TEXT: &str = "No text could be extracted from this video";
pub const SLOW_MODE_REQUIRES_OPENAI: &str =
    "Slow mode is only supported with OpenAI. Please select OpenAI as the summarization model.";
pub const SPEECH_REQUIRES_OPENAI: &str =
    "Text-to-speech is only supported with OpenAI. Please select OpenAI as the summarization model.";

/// Terminal output of every entry point.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub summary: String,
    pub source_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_metadata: Option<VideoMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Set when speech was requested but could not be produced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_error: Option<String>,
}

/// External services the orchestrator talks to.
#[derive(Clone)]
pub struct Collaborators {
    pub providers: ProviderRegistry,
    pub transcribers: TranscriberRegistry,
    pub speech: Arc<dyn SpeechSynthesizer>,
    pub transcripts: Arc<dyn TranscriptSource>,
    pub downloader: Arc<dyn AudioDownloader>,
    pub metadata: Arc<dyn MetadataSource>,
    pub storage: Arc<dyn AudioStore>,
}

impl Collaborators {
    /// Production collaborators for the given settings.
    pub fn from_settings(settings: &Settings, system_instruction: &str) -> Self {
        let timeout = Duration::from_secs(settings.http.timeout_seconds);
        Self {
            providers: ProviderRegistry::from_settings(settings, system_instruction),
            transcribers: TranscriberRegistry::from_settings(settings),
            speech: Arc::new(OpenAiSpeech::new(&settings.speech, timeout)),
            transcripts: Arc::new(YtDlpTranscriptSource::new(&settings.transcript.language)),
            downloader: Arc::new(YtDlpDownloader::new(settings.download_dir())),
            metadata: Arc::new(OEmbedMetadata::new(timeout)),
            storage: storage::from_settings(settings),
        }
    }
}

/// The main orchestrator for summarization requests.
pub struct Orchestrator {
    settings: Settings,
    prompt_builder: PromptBuilder,
    collaborators: Collaborators,
}

fn has_user_key(user_key: Option<&str>) -> bool {
    user_key.is_some_and(|k| !k.trim().is_empty())
}

/// Reject provider combinations that only work with OpenAI.
///
/// The slow-mode rule applies to video requests only.
fn check_policy(
    options: &SummarizationOptions,
    user_key: Option<&str>,
    is_video: bool,
) -> Result<()> {
    if !has_user_key(user_key) || options.model == SummarizationModel::OpenAi {
        return Ok(());
    }
    if is_video && options.speed == SummarizationSpeed::Slow {
        return Err(RecapError::PolicyViolation(SLOW_MODE_REQUIRES_OPENAI.into()));
    }
    if options.listen {
        return Err(RecapError::PolicyViolation(SPEECH_REQUIRES_OPENAI.into()));
    }
    Ok(())
}

impl Orchestrator {
    /// Create an orchestrator with production collaborators.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(settings.prompts.custom_dir.as_deref())?;
        let prompt_builder = PromptBuilder::new(&prompts);
        let collaborators =
            Collaborators::from_settings(&settings, prompt_builder.system_instruction());
        Ok(Self::with_components(settings, prompt_builder, collaborators))
    }

    /// Create an orchestrator with custom components.
    pub fn with_components(
        settings: Settings,
        prompt_builder: PromptBuilder,
        collaborators: Collaborators,
    ) -> Self {
        Self {
            settings,
            prompt_builder,
            collaborators,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Summarize caller-supplied text.
    #[instrument(skip_all, fields(chars = text.len()))]
    pub async fn summarize_text(
        &self,
        text: &str,
        options: Option<&PartialOptions>,
        user_key: Option<&str>,
    ) -> Result<SummaryResult> {
        if text.trim().is_empty() {
            return Err(RecapError::InvalidInput("Text to summarize is empty".into()));
        }
        let options = SummarizationOptions::resolve(options);
        check_policy(&options, user_key, false)?;

        self.complete(text.to_string(), None, &options, user_key).await
    }

    /// Summarize the text of an uploaded document.
    #[instrument(skip(self, bytes, options, user_key))]
    pub async fn summarize_file(
        &self,
        file_name: &str,
        bytes: &[u8],
        options: Option<&PartialOptions>,
        user_key: Option<&str>,
    ) -> Result<SummaryResult> {
        let options = SummarizationOptions::resolve(options);
        check_policy(&options, user_key, false)?;

        let text = extract_text_from_file(file_name, bytes).await?;
        self.complete(text, None, &options, user_key).await
    }

    /// Summarize a YouTube video.
    #[instrument(skip(self, options, user_key))]
    pub async fn summarize_video(
        &self,
        video_url: &str,
        options: Option<&PartialOptions>,
        user_key: Option<&str>,
    ) -> Result<SummaryResult> {
        if !is_valid_youtube_url(video_url) {
            return Err(RecapError::InvalidInput(INVALID_VIDEO_URL.into()));
        }
        let options = SummarizationOptions::resolve(options);
        check_policy(&options, user_key, true)?;

        let video = VideoRef::parse(video_url);
        let acquired = self.acquire(&video, &options, user_key).await?;
        self.complete(acquired.text, acquired.video_metadata, &options, user_key)
            .await
    }

    /// Obtain source text for a video using the planned strategy.
    async fn acquire(
        &self,
        video: &VideoRef,
        options: &SummarizationOptions,
        user_key: Option<&str>,
    ) -> Result<AcquisitionResult> {
        let text = match plan(video, options.speed) {
            AcquisitionPlan::TranscriptFetch { video_id } => {
                info!("Fetching transcript for {}", video_id);
                let strategy = TranscriptFetch::new(
                    self.collaborators.transcripts.clone(),
                    self.settings.transcript.max_words(),
                );
                strategy.acquire(video).await.map_err(|e| match e {
                    RecapError::TranscriptUnavailable(_) => {
                        RecapError::Acquisition(NO_TRANSCRIPT.into())
                    }
                    RecapError::ToolNotFound(_) => e,
                    other => {
                        warn!("Transcript fetch failed: {}", other);
                        RecapError::Acquisition(NETWORK_PROBLEM.into())
                    }
                })?
            }
            AcquisitionPlan::AudioTranscription => {
                info!("Transcribing audio for {}", video.url);
                let transcriber = self.collaborators.transcribers.get(options.stt_model)?;
                let api_key = if transcriber.requires_api_key() {
                    Some(self.openai_key(user_key)?)
                } else {
                    None
                };
                let strategy = AudioTranscription::new(
                    self.collaborators.downloader.clone(),
                    transcriber,
                    api_key,
                );
                strategy.acquire(video).await?
            }
        };

        if text.trim().is_empty() {
            return Err(RecapError::InvalidInput(EMPTY_VIDEO_TEXT.into()));
        }

        let video_metadata = self.collaborators.metadata.video_metadata(&video.url).await;

        Ok(AcquisitionResult {
            text,
            video_metadata: Some(video_metadata),
        })
    }

    /// Summarize, optionally synthesize speech, and assemble the result.
    async fn complete(
        &self,
        source_text: String,
        video_metadata: Option<VideoMetadata>,
        options: &SummarizationOptions,
        user_key: Option<&str>,
    ) -> Result<SummaryResult> {
        let summary = self.summarize(&source_text, options, user_key).await?;

        let (audio_url, audio_error) = if options.listen {
            match self.synthesize(&summary, user_key).await {
                Ok(url) => (Some(url), None),
                Err(e) if self.settings.speech.strict => return Err(e),
                Err(e) => {
                    warn!("Returning summary without audio: {}", e);
                    (None, Some(e.to_string()))
                }
            }
        } else {
            (None, None)
        };

        Ok(SummaryResult {
            summary,
            source_text,
            video_metadata,
            audio_url,
            audio_error,
        })
    }

    async fn summarize(
        &self,
        text: &str,
        options: &SummarizationOptions,
        user_key: Option<&str>,
    ) -> Result<String> {
        let prompt = self.prompt_builder.build(options, text);
        let summarizer = self.collaborators.providers.get(options.model)?;
        let api_key = ApiKeyContext::new(user_key, summarizer.default_api_key())
            .resolve(&options.model.to_string())?;

        summarizer.summarize(&api_key, &prompt).await
    }

    /// Synthesize the summary, persist it, and return its public URL.
    async fn synthesize(&self, summary: &str, user_key: Option<&str>) -> Result<String> {
        let api_key = self.openai_key(user_key)?;
        let audio = self.collaborators.speech.synthesize(&api_key, summary).await?;

        let file_name = format!("{}.mp3", generate_audio_stem());
        let local_path = self.write_audio(&file_name, &audio)?;

        match self.collaborators.storage.store(&local_path, &file_name).await {
            Ok(url) => Ok(url),
            Err(e) => {
                warn!("Audio upload failed, serving local file: {}", e);
                Ok(self.settings.public_audio_url(&file_name))
            }
        }
    }

    /// Write audio to a hidden temp file, then rename it into the download dir.
    fn write_audio(&self, file_name: &str, audio: &[u8]) -> Result<PathBuf> {
        let dir = self.settings.download_dir();
        std::fs::create_dir_all(&dir)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".tts-")
            .suffix(".mp3")
            .tempfile_in(&dir)?;
        tmp.write_all(audio)?;

        let path = dir.join(file_name);
        tmp.persist(&path).map_err(|e| e.error)?;
        Ok(path)
    }

    fn openai_key(&self, user_key: Option<&str>) -> Result<String> {
        ApiKeyContext::new(user_key, self.settings.providers.openai.api_key.as_deref())
            .resolve("openai")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::options::SttModel;
    use crate::providers::{Summarizer, FALLBACK_SUMMARY};
    use crate::transcription::Transcriber;
    use crate::video::TranscriptSegment;
    use async_trait::async_trait;
    use std::path::Path;
    use std::sync::Mutex;
    use tempfile::TempDir;

    const VIDEO_URL: &str = "https://www.youtube.com/watch?v=dQw4w9WgXcQ";

    type CallLog = Arc<Mutex<Vec<String>>>;

    fn record(log: &CallLog, call: impl Into<String>) {
        log.lock().unwrap().push(call.into());
    }

    struct FakeSummarizer {
        model: SummarizationModel,
        reply: &'static str,
        default_key: Option<String>,
        log: CallLog,
    }

    #[async_trait]
    impl Summarizer for FakeSummarizer {
        fn model(&self) -> SummarizationModel {
            self.model
        }
        fn default_api_key(&self) -> Option<&str> {
            self.default_key.as_deref()
        }
        async fn summarize(&self, api_key: &str, prompt: &str) -> Result<String> {
            record(&self.log, format!("summarize:{}:{}", self.model, api_key));
            record(&self.log, format!("prompt:{}", prompt));
            Ok(crate::providers::text_or_fallback(Some(self.reply.to_string())))
        }
    }

    enum TranscriptBehaviour {
        Segments(Vec<&'static str>),
        Unavailable,
        Network,
    }

    struct FakeTranscripts {
        behaviour: TranscriptBehaviour,
        log: CallLog,
    }

    #[async_trait]
    impl TranscriptSource for FakeTranscripts {
        async fn fetch_transcript(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
            record(&self.log, format!("transcript:{}", video_id));
            match &self.behaviour {
                TranscriptBehaviour::Segments(s) => Ok(s
                    .iter()
                    .map(|t| TranscriptSegment {
                        text: t.to_string(),
                        offset_ms: 0,
                    })
                    .collect()),
                TranscriptBehaviour::Unavailable => {
                    Err(RecapError::TranscriptUnavailable(video_id.to_string()))
                }
                TranscriptBehaviour::Network => {
                    Err(RecapError::TranscriptFetch("connection reset".into()))
                }
            }
        }
    }

    struct FakeDownloader {
        dir: PathBuf,
        log: CallLog,
    }

    #[async_trait]
    impl AudioDownloader for FakeDownloader {
        async fn download(&self, url: &str) -> Result<PathBuf> {
            record(&self.log, format!("download:{}", url));
            let path = self.dir.join("20250101_download.mp3");
            std::fs::write(&path, b"mp3")?;
            Ok(path)
        }
    }

    struct FakeTranscriber {
        model: SttModel,
        text: &'static str,
        log: CallLog,
    }

    #[async_trait]
    impl Transcriber for FakeTranscriber {
        fn model(&self) -> SttModel {
            self.model
        }
        fn requires_api_key(&self) -> bool {
            self.model == SttModel::OpenAiWhisper
        }
        async fn transcribe(&self, _audio_path: &Path, api_key: Option<&str>) -> Result<String> {
            record(
                &self.log,
                format!("transcribe:{}:{}", self.model, api_key.unwrap_or("-")),
            );
            Ok(self.text.into())
        }
    }

    struct FakeMetadata {
        log: CallLog,
    }

    #[async_trait]
    impl MetadataSource for FakeMetadata {
        async fn video_metadata(&self, _video_url: &str) -> VideoMetadata {
            record(&self.log, "metadata");
            VideoMetadata {
                thumbnail: None,
                title: Some("A talk".into()),
                channel_name: None,
            }
        }
    }

    struct FakeSpeech {
        fail: bool,
        log: CallLog,
    }

    #[async_trait]
    impl SpeechSynthesizer for FakeSpeech {
        async fn synthesize(&self, api_key: &str, _text: &str) -> Result<Vec<u8>> {
            record(&self.log, format!("speech:{}", api_key));
            if self.fail {
                Err(RecapError::SpeechSynthesis("quota exceeded".into()))
            } else {
                Ok(b"ID3audio".to_vec())
            }
        }
    }

    struct FakeStore {
        fail: bool,
        log: CallLog,
    }

    #[async_trait]
    impl AudioStore for FakeStore {
        async fn store(&self, local_path: &Path, file_name: &str) -> Result<String> {
            assert!(local_path.exists());
            record(&self.log, "store");
            if self.fail {
                Err(RecapError::Storage("bucket missing".into()))
            } else {
                Ok(format!("https://cdn.test/{}", file_name))
            }
        }
    }

    struct Harness {
        orchestrator: Orchestrator,
        log: CallLog,
        _dir: TempDir,
    }

    struct HarnessOptions {
        transcripts: TranscriptBehaviour,
        summary: &'static str,
        speech_fails: bool,
        store_fails: bool,
        strict_speech: bool,
        default_keys: bool,
        transcription: &'static str,
    }

    impl Default for HarnessOptions {
        fn default() -> Self {
            Self {
                transcripts: TranscriptBehaviour::Segments(vec!["hello", "world"]),
                summary: "A short summary.",
                speech_fails: false,
                store_fails: false,
                strict_speech: false,
                default_keys: true,
                transcription: "transcribed words",
            }
        }
    }

    fn harness(opts: HarnessOptions) -> Harness {
        let dir = tempfile::tempdir().unwrap();
        let log: CallLog = Arc::default();

        let mut settings = Settings::default();
        settings.general.download_dir = dir.path().to_string_lossy().into_owned();
        settings.speech.strict = opts.strict_speech;
        if opts.default_keys {
            settings.providers.openai.api_key = Some("sk-default".into());
        }

        let default_key = opts.default_keys.then(|| "sk-default".to_string());
        let mut providers = ProviderRegistry::new();
        for model in [
            SummarizationModel::OpenAi,
            SummarizationModel::DeepSeek,
            SummarizationModel::Gemini,
        ] {
            providers = providers.with(Arc::new(FakeSummarizer {
                model,
                reply: opts.summary,
                default_key: default_key.clone(),
                log: log.clone(),
            }));
        }

        let transcribers = TranscriberRegistry::new()
            .with(Arc::new(FakeTranscriber {
                model: SttModel::OpenAiWhisper,
                text: opts.transcription,
                log: log.clone(),
            }))
            .with(Arc::new(FakeTranscriber {
                model: SttModel::FastWhisper,
                text: opts.transcription,
                log: log.clone(),
            }));

        let collaborators = Collaborators {
            providers,
            transcribers,
            speech: Arc::new(FakeSpeech {
                fail: opts.speech_fails,
                log: log.clone(),
            }),
            transcripts: Arc::new(FakeTranscripts {
                behaviour: opts.transcripts,
                log: log.clone(),
            }),
            downloader: Arc::new(FakeDownloader {
                dir: dir.path().to_path_buf(),
                log: log.clone(),
            }),
            metadata: Arc::new(FakeMetadata { log: log.clone() }),
            storage: Arc::new(FakeStore {
                fail: opts.store_fails,
                log: log.clone(),
            }),
        };

        Harness {
            orchestrator: Orchestrator::with_components(
                settings,
                PromptBuilder::default(),
                collaborators,
            ),
            log,
            _dir: dir,
        }
    }

    fn options(json: serde_json::Value) -> PartialOptions {
        serde_json::from_value(json).unwrap()
    }

    fn calls(log: &CallLog) -> Vec<String> {
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| !c.starts_with("prompt:"))
            .cloned()
            .collect()
    }

    #[tokio::test]
    async fn test_slow_mode_policy_fails_before_any_call() {
        let h = harness(HarnessOptions::default());
        let opts = options(serde_json::json!({"model": "deepseek", "speed": "slow"}));

        let err = h
            .orchestrator
            .summarize_video(VIDEO_URL, Some(&opts), Some("sk-user"))
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::PolicyViolation);
        assert_eq!(err.to_string(), SLOW_MODE_REQUIRES_OPENAI);
        assert!(calls(&h.log).is_empty());
    }

    #[tokio::test]
    async fn test_slow_mode_without_user_key_is_allowed() {
        let h = harness(HarnessOptions::default());
        let opts = options(serde_json::json!({"model": "deepseek", "speed": "slow"}));

        let result = h
            .orchestrator
            .summarize_video(VIDEO_URL, Some(&opts), None)
            .await
            .unwrap();

        assert_eq!(result.source_text, "transcribed words");
        assert_eq!(
            calls(&h.log),
            vec![
                format!("download:{}", VIDEO_URL),
                "transcribe:openaiWhisper:sk-default".to_string(),
                "metadata".to_string(),
                "summarize:deepseek:sk-default".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_speech_policy_applies_to_text() {
        let h = harness(HarnessOptions::default());
        let opts = options(serde_json::json!({"model": "gemini", "listen": true}));

        let err = h
            .orchestrator
            .summarize_text("some text", Some(&opts), Some("user-key"))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), SPEECH_REQUIRES_OPENAI);
        assert!(calls(&h.log).is_empty());
    }

    #[tokio::test]
    async fn test_fast_mode_uses_transcript() {
        let h = harness(HarnessOptions::default());

        let result = h.orchestrator.summarize_video(VIDEO_URL, None, None).await.unwrap();

        assert_eq!(result.summary, "A short summary.");
        assert_eq!(result.source_text, "hello world");
        assert_eq!(
            result.video_metadata.and_then(|m| m.title).as_deref(),
            Some("A talk")
        );
        assert_eq!(
            calls(&h.log),
            vec![
                "transcript:dQw4w9WgXcQ".to_string(),
                "metadata".to_string(),
                "summarize:openai:sk-default".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_transcript_is_not_masked() {
        let h = harness(HarnessOptions {
            transcripts: TranscriptBehaviour::Unavailable,
            ..Default::default()
        });

        let err = h.orchestrator.summarize_video(VIDEO_URL, None, None).await.unwrap_err();

        assert_eq!(err.class(), ErrorClass::AcquisitionFailure);
        assert_eq!(err.to_string(), NO_TRANSCRIPT);
        assert_eq!(calls(&h.log), vec!["transcript:dQw4w9WgXcQ".to_string()]);
    }

    #[tokio::test]
    async fn test_transcript_network_failure() {
        let h = harness(HarnessOptions {
            transcripts: TranscriptBehaviour::Network,
            ..Default::default()
        });

        let err = h.orchestrator.summarize_video(VIDEO_URL, None, None).await.unwrap_err();

        assert_eq!(err.class(), ErrorClass::AcquisitionFailure);
        assert_eq!(err.to_string(), NETWORK_PROBLEM);
        assert!(!calls(&h.log).iter().any(|c| c.starts_with("download")));
    }

    #[tokio::test]
    async fn test_url_without_video_id_goes_to_audio() {
        let h = harness(HarnessOptions::default());
        let url = "https://www.youtube.com/@channel/live";
        let opts = options(serde_json::json!({"sttModel": "fastWhisper"}));

        let result = h
            .orchestrator
            .summarize_video(url, Some(&opts), None)
            .await
            .unwrap();

        assert_eq!(result.source_text, "transcribed words");
        let log = calls(&h.log);
        assert!(!log.iter().any(|c| c.starts_with("transcript:")));
        assert_eq!(log[0], format!("download:{}", url));
        assert_eq!(log[1], "transcribe:fastWhisper:-");
    }

    #[tokio::test]
    async fn test_non_youtube_url_is_invalid_input() {
        let h = harness(HarnessOptions::default());

        let err = h
            .orchestrator
            .summarize_video("not-a-video-url", None, None)
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidInput);
        assert_eq!(err.to_string(), INVALID_VIDEO_URL);
        assert!(calls(&h.log).is_empty());
    }

    #[tokio::test]
    async fn test_empty_summary_falls_back() {
        let h = harness(HarnessOptions {
            summary: "",
            ..Default::default()
        });

        let result = h.orchestrator.summarize_text("text", None, None).await.unwrap();
        assert_eq!(result.summary, FALLBACK_SUMMARY);
    }

    #[tokio::test]
    async fn test_standard_prompt_reaches_provider() {
        let h = harness(HarnessOptions::default());
        let text = "Lorem ipsum ".repeat(500);
        let opts = options(serde_json::json!({
            "length": "standard", "format": "default", "language": "default"
        }));

        h.orchestrator
            .summarize_text(&text, Some(&opts), None)
            .await
            .unwrap();

        let log = h.log.lock().unwrap();
        let prompt = log.iter().find(|c| c.starts_with("prompt:")).unwrap();
        assert!(prompt.contains(
            "in a standard length. Focus on the key points, main arguments, and important details."
        ));
        assert!(!prompt.contains("bullet points"));
        assert!(prompt.ends_with(&text));
    }

    #[tokio::test]
    async fn test_user_key_wins() {
        let h = harness(HarnessOptions::default());
        h.orchestrator
            .summarize_text("text", None, Some("sk-user"))
            .await
            .unwrap();
        assert_eq!(calls(&h.log), vec!["summarize:openai:sk-user".to_string()]);
    }

    #[tokio::test]
    async fn test_silent_video_is_not_summarized() {
        let h = harness(HarnessOptions {
            transcription: "  \n",
            ..Default::default()
        });
        let opts = options(serde_json::json!({"speed": "slow"}));

        let err = h
            .orchestrator
            .summarize_video(VIDEO_URL, Some(&opts), None)
            .await
            .unwrap_err();

        assert_eq!(err.class(), ErrorClass::InvalidInput);
        assert_eq!(err.to_string(), EMPTY_VIDEO_TEXT);
        let log = calls(&h.log);
        assert!(!log.iter().any(|c| c.starts_with("summarize:")));
        assert!(!log.iter().any(|c| c == "metadata"));
    }

    #[tokio::test]
    async fn test_user_key_used_for_speech() {
        let h = harness(HarnessOptions::default());
        let opts = options(serde_json::json!({"listen": true}));

        let result = h
            .orchestrator
            .summarize_text("text", Some(&opts), Some("sk-user"))
            .await
            .unwrap();

        assert!(result.audio_url.is_some());
        let log = calls(&h.log);
        assert!(log.contains(&"summarize:openai:sk-user".to_string()));
        assert!(log.contains(&"speech:sk-user".to_string()));
        assert!(!log.iter().any(|c| c.ends_with("sk-default")));
    }

    #[tokio::test]
    async fn test_missing_key() {
        let h = harness(HarnessOptions {
            default_keys: false,
            ..Default::default()
        });

        let err = h.orchestrator.summarize_text("text", None, None).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::MissingApiKey);
    }

    #[tokio::test]
    async fn test_empty_text_rejected() {
        let h = harness(HarnessOptions::default());
        let err = h.orchestrator.summarize_text("   ", None, None).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidInput);
    }

    #[tokio::test]
    async fn test_speech_is_stored() {
        let h = harness(HarnessOptions::default());
        let opts = options(serde_json::json!({"listen": true}));

        let result = h
            .orchestrator
            .summarize_text("text", Some(&opts), None)
            .await
            .unwrap();

        let url = result.audio_url.unwrap();
        assert!(url.starts_with("https://cdn.test/"));
        assert!(url.ends_with(".mp3"));
        assert_eq!(result.audio_error, None);

        let file_name = url.trim_start_matches("https://cdn.test/");
        let local = h.orchestrator.settings().download_dir().join(file_name);
        assert_eq!(std::fs::read(local).unwrap(), b"ID3audio");
    }

    #[tokio::test]
    async fn test_storage_failure_falls_back_to_local_url() {
        let h = harness(HarnessOptions {
            store_fails: true,
            ..Default::default()
        });
        let opts = options(serde_json::json!({"listen": true}));

        let result = h
            .orchestrator
            .summarize_text("text", Some(&opts), None)
            .await
            .unwrap();

        assert!(result.audio_url.unwrap().starts_with("/public/audio/"));
    }

    #[tokio::test]
    async fn test_speech_failure_keeps_summary() {
        let h = harness(HarnessOptions {
            speech_fails: true,
            ..Default::default()
        });
        let opts = options(serde_json::json!({"listen": true}));

        let result = h
            .orchestrator
            .summarize_text("text", Some(&opts), None)
            .await
            .unwrap();

        assert_eq!(result.summary, "A short summary.");
        assert_eq!(result.audio_url, None);
        assert!(result.audio_error.unwrap().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_strict_speech_failure() {
        let h = harness(HarnessOptions {
            speech_fails: true,
            strict_speech: true,
            ..Default::default()
        });
        let opts = options(serde_json::json!({"listen": true}));

        let err = h
            .orchestrator
            .summarize_text("text", Some(&opts), None)
            .await
            .unwrap_err();
        assert!(matches!(err, RecapError::SpeechSynthesis(_)));
    }

    #[tokio::test]
    async fn test_file_entry_point() {
        let h = harness(HarnessOptions::default());

        let result = h
            .orchestrator
            .summarize_file("notes.txt", b"meeting notes", None, None)
            .await
            .unwrap();
        assert_eq!(result.source_text, "meeting notes");

        let err = h
            .orchestrator
            .summarize_file("image.png", b"\x89PNG", None, None)
            .await
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::InvalidInput);
    }

    #[test]
    fn test_result_serialization() {
        let result = SummaryResult {
            summary: "s".into(),
            source_text: "t".into(),
            video_metadata: None,
            audio_url: Some("/public/audio/a.mp3".into()),
            audio_error: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"summary": "s", "sourceText": "t", "audioUrl": "/public/audio/a.mp3"})
        );
    }
}
