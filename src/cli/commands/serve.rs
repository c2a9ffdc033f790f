//! HTTP API server.
//!
//! Exposes the three summarization entry points under `/summarize`, guarded
//! by a trusted-origin-or-bearer-key check, and serves synthesized audio from
//! the download directory.

use crate::audio::spawn_cleanup_task;
use crate::cli::Output;
use crate::config::{ServerSettings, Settings};
use crate::error::RecapError;
use crate::files::DocumentKind;
use crate::options::PartialOptions;
use crate::orchestrator::{Orchestrator, SummaryResult};
use axum::{
    extract::{DefaultBodyLimit, Multipart, Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Room for multipart boundaries and option fields on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Key taken from the `Authorization` header; `None` for the trusted origin.
#[derive(Debug, Clone)]
struct UserApiKey(Option<String>);

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let settings = state.orchestrator.settings();
    let upload_limit = settings.server.max_upload_bytes + MULTIPART_OVERHEAD;

    let summarize = Router::new()
        .route("/summarize", get(hello))
        .route("/summarize/text", post(summarize_text))
        .route("/summarize/video", post(summarize_video))
        .route(
            "/summarize/file",
            post(summarize_file).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    let public_dir = format!("/{}", settings.general.public_dir.trim_matches('/'));

    Router::new()
        .route("/health", get(health))
        .merge(summarize)
        .nest_service(&public_dir, ServeDir::new(settings.download_dir()))
        .layer(cors_layer(&settings.server))
        .with_state(state)
}

fn cors_layer(server: &ServerSettings) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins
        .iter()
        .chain(std::iter::once(&server.allowed_origin))
        .filter_map(|o| o.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Run the HTTP API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> anyhow::Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    let download_dir = settings.download_dir();
    std::fs::create_dir_all(&download_dir)?;
    spawn_cleanup_task(
        download_dir,
        Duration::from_secs(settings.cleanup.max_file_age_seconds),
        Duration::from_secs(settings.cleanup.interval_seconds),
    );

    let public_dir = settings.general.public_dir.clone();
    let state = Arc::new(AppState {
        orchestrator: Orchestrator::new(settings)?,
    });
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    Output::header("Recap API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Text", "POST /summarize/text");
    Output::kv("Video", "POST /summarize/video");
    Output::kv("File", "POST /summarize/file");
    Output::kv("Audio", &format!("GET  {}/<file>", public_dir.trim_end_matches('/')));
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct TextContent {
    text: String,
}

#[derive(Deserialize)]
struct TextRequest {
    content: TextContent,
    #[serde(default)]
    options: Option<PartialOptions>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoContent {
    video_url: String,
}

#[derive(Deserialize)]
struct VideoRequest {
    content: VideoContent,
    #[serde(default)]
    options: Option<PartialOptions>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// An error answer with its HTTP status.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }
}

impl From<RecapError> for ApiError {
    fn from(err: RecapError) -> Self {
        if err.is_user_correctable() {
            Self::new(StatusCode::BAD_REQUEST, err.to_string())
        } else {
            warn!("Request failed: {}", err);
            Self::new(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// === Guard ===

/// Trusted origin passes; everyone else needs `Authorization: Bearer <key>`.
fn authorize(headers: &HeaderMap, allowed_origin: &str) -> Result<Option<String>, &'static str> {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    if origin == Some(allowed_origin) {
        return Ok(None);
    }

    let auth = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| v.starts_with("Bearer "))
        .ok_or("Missing API key")?;

    match auth.split(' ').nth(1).map(str::trim) {
        Some(key) if !key.is_empty() => Ok(Some(key.to_string())),
        _ => Err("Invalid API key"),
    }
}

async fn require_api_key(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    match authorize(request.headers(), &state.orchestrator.settings().server.allowed_origin) {
        Ok(key) => {
            request.extensions_mut().insert(UserApiKey(key));
            next.run(request).await
        }
        Err(message) => ApiError::new(StatusCode::UNAUTHORIZED, message).into_response(),
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn hello() -> &'static str {
    "Hello there."
}

async fn summarize_text(
    State(state): State<Arc<AppState>>,
    Extension(UserApiKey(key)): Extension<UserApiKey>,
    Json(req): Json<TextRequest>,
) -> Result<Json<SummaryResult>, ApiError> {
    let result = state
        .orchestrator
        .summarize_text(&req.content.text, req.options.as_ref(), key.as_deref())
        .await?;
    Ok(Json(result))
}

async fn summarize_video(
    State(state): State<Arc<AppState>>,
    Extension(UserApiKey(key)): Extension<UserApiKey>,
    Json(req): Json<VideoRequest>,
) -> Result<Json<SummaryResult>, ApiError> {
    let result = state
        .orchestrator
        .summarize_video(&req.content.video_url, req.options.as_ref(), key.as_deref())
        .await?;
    Ok(Json(result))
}

/// An uploaded document with the option fields sent beside it.
struct Upload {
    file_name: String,
    bytes: Vec<u8>,
    options: PartialOptions,
}

/// Multipart text fields arrive as strings; booleans are restored for `listen`.
fn options_from_fields(fields: Map<String, Value>) -> PartialOptions {
    let fields = fields
        .into_iter()
        .map(|(k, v)| match v.as_str() {
            Some("true") => (k, Value::Bool(true)),
            Some("false") => (k, Value::Bool(false)),
            _ => (k, v),
        })
        .collect();
    serde_json::from_value(Value::Object(fields)).unwrap_or_default()
}

fn validate_upload(content_type: Option<&str>, size: usize, max: usize) -> Result<(), ApiError> {
    if content_type.and_then(DocumentKind::from_mime).is_none() {
        return Err(ApiError::unprocessable(
            "Validation failed (expected type is pdf, docx or txt)",
        ));
    }
    if size > max {
        return Err(ApiError::unprocessable(format!(
            "Validation failed (expected size is less than {} bytes)",
            max
        )));
    }
    Ok(())
}

async fn read_upload(mut multipart: Multipart, max: usize) -> Result<Upload, ApiError> {
    let multipart_error = |e: axum::extract::multipart::MultipartError| {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::unprocessable(format!(
                "Validation failed (expected size is less than {} bytes)",
                max
            ))
        } else {
            ApiError::new(e.status(), e.body_text())
        }
    };

    let mut file = None;
    let mut fields = Map::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(multipart_error)?;
            validate_upload(content_type.as_deref(), bytes.len(), max)?;
            file = Some((file_name, bytes.to_vec()));
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            fields.insert(name, Value::String(value));
        }
    }

    let (file_name, bytes) = file.ok_or_else(|| ApiError::unprocessable("File is required"))?;
    Ok(Upload {
        file_name,
        bytes,
        options: options_from_fields(fields),
    })
}

async fn summarize_file(
    State(state): State<Arc<AppState>>,
    Extension(UserApiKey(key)): Extension<UserApiKey>,
    multipart: Multipart,
) -> Result<Json<SummaryResult>, ApiError> {
    let upload = read_upload(multipart, state.orchestrator.settings().server.max_upload_bytes).await?;
    let result = state
        .orchestrator
        .summarize_file(
            &upload.file_name,
            &upload.bytes,
            Some(&upload.options),
            key.as_deref(),
        )
        .await?;
    Ok(Json(result))
}
