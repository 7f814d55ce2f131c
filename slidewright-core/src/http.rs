use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{self, TraceLayer};
use tracing::{info, Level};

use crate::config::SlidewrightConfig;
use crate::error::{SlidewrightError, SlidewrightResult};
use crate::export::{
    export_chat, export_json, export_pptx, ExportArtifact, ExportDocument, ExportSettings,
};
use crate::generation::{ContentGenerator, GenerateSlidesRequest, SlideGenerator};
use crate::models::{ChatMessage, PresentationUpdate, Slide};
use crate::repo::{open_store, PresentationStore};

const GENERATE_FAILED: &str = "Failed to generate slides";
const PPT_FAILED: &str = "Failed to generate PPT";
const JSON_FAILED: &str = "Failed to export JSON";
const CHAT_FAILED: &str = "Failed to export chat";
const STORAGE_FAILED: &str = "Presentation storage failed";

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<SlideGenerator>,
    pub store: Arc<dyn PresentationStore>,
    pub export: Arc<ExportSettings>,
}

impl AppState {
    pub fn new(
        generator: SlideGenerator,
        store: Arc<dyn PresentationStore>,
        export: ExportSettings,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            store,
            export: Arc::new(export),
        }
    }

    pub async fn from_config(
        config: &SlidewrightConfig,
        content: Arc<dyn ContentGenerator>,
    ) -> SlidewrightResult<Self> {
        let store = open_store(config).await?;
        Ok(Self::new(
            SlideGenerator::from_config(content, config),
            store,
            ExportSettings::from(&config.export),
        ))
    }
}

/// Body of a failed request: a short summary plus the detailed cause.
fn failure(status: StatusCode, summary: &str, err: &SlidewrightError) -> Response {
    err.log();
    let message = match err {
        SlidewrightError::GenerationFailed { message, .. } => message.clone(),
        other => other.detail(),
    };
    (status, Json(json!({ "error": summary, "message": message }))).into_response()
}

fn internal_failure(summary: &str, err: &SlidewrightError) -> Response {
    failure(StatusCode::INTERNAL_SERVER_ERROR, summary, err)
}

fn not_found(id: &str) -> Response {
    failure(
        StatusCode::NOT_FOUND,
        "Presentation not found",
        &SlidewrightError::PresentationNotFound(id.to_string()),
    )
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> SlidewrightResult<T> {
    serde_json::from_slice(body).map_err(|e| SlidewrightError::InvalidRequest(e.to_string()))
}

fn attachment(artifact: ExportArtifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.bytes,
    )
        .into_response()
}

#[derive(Debug, Deserialize)]
struct DownloadPptBody {
    slides: Vec<Slide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportJsonBody {
    #[serde(default)]
    presentation_name: Option<String>,
    messages: Vec<ChatMessage>,
    #[serde(default)]
    slides: Vec<Slide>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportChatBody {
    #[serde(default)]
    presentation_name: Option<String>,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize)]
struct CreatePresentationBody {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    messages: Vec<ChatMessage>,
    #[serde(default)]
    slides: Vec<Slide>,
}

async fn api_generate_slides(State(state): State<AppState>, body: Bytes) -> Response {
    let request: GenerateSlidesRequest = match parse_body(&body) {
        Ok(r) => r,
        Err(e) => return internal_failure(GENERATE_FAILED, &e),
    };

    match state.generator.generate(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => internal_failure(GENERATE_FAILED, &e),
    }
}

async fn api_download_ppt(State(state): State<AppState>, body: Bytes) -> Response {
    let result = parse_body::<DownloadPptBody>(&body)
        .and_then(|b| export_pptx(&b.slides, &state.export));

    match result {
        Ok(artifact) => attachment(artifact),
        Err(e) => internal_failure(PPT_FAILED, &e),
    }
}

async fn api_export_json(State(state): State<AppState>, body: Bytes) -> Response {
    let result = parse_body::<ExportJsonBody>(&body).and_then(|b| {
        let document = ExportDocument::new(b.presentation_name, b.messages, b.slides);
        export_json(&document, &state.export)
    });

    match result {
        Ok(artifact) => attachment(artifact),
        Err(e) => internal_failure(JSON_FAILED, &e),
    }
}

async fn api_export_chat(State(state): State<AppState>, body: Bytes) -> Response {
    match parse_body::<ExportChatBody>(&body) {
        Ok(b) => {
            let document = ExportDocument::new(b.presentation_name, b.messages, Vec::new());
            attachment(export_chat(&document, &state.export))
        }
        Err(e) => internal_failure(CHAT_FAILED, &e),
    }
}

async fn api_presentations_list(State(state): State<AppState>) -> Response {
    match state.store.list().await {
        Ok(list) => Json(list).into_response(),
        Err(e) => internal_failure(STORAGE_FAILED, &e),
    }
}

async fn api_presentations_create(State(state): State<AppState>, body: Bytes) -> Response {
    let body: CreatePresentationBody = match parse_body(&body) {
        Ok(b) => b,
        Err(e) => return failure(StatusCode::BAD_REQUEST, "Invalid request", &e),
    };
    let name = ExportDocument::new(body.name, Vec::new(), Vec::new()).name;

    match state.store.save(&name, body.messages, body.slides).await {
        Ok(p) => (StatusCode::CREATED, Json(p)).into_response(),
        Err(e) => internal_failure(STORAGE_FAILED, &e),
    }
}

async fn api_presentations_get(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.store.get(&id).await {
        Ok(Some(p)) => Json(p).into_response(),
        Ok(None) => not_found(&id),
        Err(e) => internal_failure(STORAGE_FAILED, &e),
    }
}

async fn api_presentations_update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    let update: PresentationUpdate = match parse_body(&body) {
        Ok(u) => u,
        Err(e) => return failure(StatusCode::BAD_REQUEST, "Invalid request", &e),
    };

    match state.store.update(&id, update).await {
        Ok(Some(p)) => Json(p).into_response(),
        Ok(None) => not_found(&id),
        Err(e) => internal_failure(STORAGE_FAILED, &e),
    }
}

async fn api_presentations_delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Response {
    match state.store.delete(&id).await {
        Ok(true) => Json(json!({ "deleted": true })).into_response(),
        Ok(false) => not_found(&id),
        Err(e) => internal_failure(STORAGE_FAILED, &e),
    }
}

async fn api_health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

pub fn router(state: AppState, cors_permissive: bool) -> Router {
    let router = Router::new()
        .route("/api/generate-slides", post(api_generate_slides))
        .route("/api/download-ppt", post(api_download_ppt))
        .route("/api/export-json", post(api_export_json))
        .route("/api/export-chat", post(api_export_chat))
        .route(
            "/api/presentations",
            get(api_presentations_list).post(api_presentations_create),
        )
        .route(
            "/api/presentations/{id}",
            get(api_presentations_get)
                .put(api_presentations_update)
                .delete(api_presentations_delete),
        )
        .route("/api/health", get(api_health))
        // decks carry inline base64 images, well past axum's 2 MB default
        .layer(DefaultBodyLimit::disable())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        );

    let router = if cors_permissive {
        router.layer(CorsLayer::permissive())
    } else {
        router
    };

    router.with_state(state)
}

pub async fn serve(config: &SlidewrightConfig, state: AppState) -> SlidewrightResult<()> {
    let listener = TcpListener::bind(config.bind_address()).await?;
    serve_with_listener(listener, router(state, config.server.cors_permissive)).await
}

pub async fn serve_with_listener(listener: TcpListener, app: Router) -> SlidewrightResult<()> {
    info!("HTTP API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
