use axum::extract::multipart::MultipartRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::{HeaderValue, Method, header};
use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use super::assets;
use super::error::ApiError;
use super::upload::{UploadError, read_rtf_upload};
use crate::config::RtfmarkConfig;
use crate::convert::{Conversion, convert_rtf};
use crate::engine::{self, ConversionEngine};
use crate::preview::{Previewer, Rendered};

/// Headroom above the upload ceiling for multipart framing, so oversize files
/// reach the upload reader and get the friendly 413.
const MULTIPART_OVERHEAD: u64 = 64 * 1024;

pub struct AppState {
    pub config: RtfmarkConfig,
    pub engine: Arc<dyn ConversionEngine>,
    pub previewer: Previewer,
    cors_origins: Vec<HeaderValue>,
}

impl AppState {
    pub fn new(config: RtfmarkConfig, engine: Arc<dyn ConversionEngine>) -> anyhow::Result<Self> {
        let previewer = config
            .preview
            .previewer()
            .map_err(|e| anyhow::anyhow!("preview.allow: {e}"))?;
        let cors_origins = config
            .server
            .cors_origins
            .iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|e| anyhow::anyhow!("invalid CORS origin '{origin}': {e}"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        Ok(Self {
            config,
            engine,
            previewer,
            cors_origins,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub markdown: String,
    #[serde(default)]
    pub enable_gfm_extras: Option<bool>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state
        .config
        .server
        .max_upload_bytes
        .saturating_add(MULTIPART_OVERHEAD);
    let body_limit = usize::try_from(body_limit).unwrap_or(usize::MAX);

    let cors = (!state.cors_origins.is_empty()).then(|| {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(state.cors_origins.clone()))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    });

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/convert", post(convert_handler))
        .route("/api/preview", post(preview_handler))
        .fallback(assets::serve)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match cors {
        Some(cors) => app.layer(cors),
        None => app,
    }
}

/// Start the server with the engine named in configuration.
pub async fn run(config: RtfmarkConfig) -> anyhow::Result<()> {
    let engine = engine::from_config(&config.engine);
    serve(config, engine).await
}

pub async fn serve(config: RtfmarkConfig, engine: Arc<dyn ConversionEngine>) -> anyhow::Result<()> {
    let is_loopback = config.server.bind == "127.0.0.1" || config.server.bind == "::1";
    let addr = format!("{}:{}", config.server.bind, config.server.port);

    info!(
        engine = engine.name(),
        max_upload_bytes = config.server.max_upload_bytes,
        "conversion engine configured"
    );
    let state = Arc::new(AppState::new(config, engine)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("rtfmark listening on {addr}");
    if is_loopback {
        info!("bound to loopback, local access only");
    } else {
        warn!("bound to {addr}: uploads are accepted from any reachable client");
    }

    axum::serve(listener, app).await?;
    Ok(())
}

async fn health() -> &'static str {
    "ok"
}

async fn convert_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Conversion>, ApiError> {
    let mut multipart = multipart.map_err(|e| UploadError::Malformed(e.body_text()))?;
    let upload = read_rtf_upload(&mut multipart, state.config.server.max_upload_bytes).await?;
    let request_id = Uuid::new_v4();
    info!(%request_id, file = %upload.file_name, bytes = upload.text.len(), "converting upload");

    let conversion = convert_rtf(
        state.engine.as_ref(),
        &state.config.engine.args,
        &upload.text,
    )
    .await
    .inspect_err(|e| warn!(%request_id, "conversion failed: {e}"))?;
    info!(%request_id, ms = conversion.meta.ms, warnings = conversion.warnings.len(), "conversion done");
    Ok(Json(conversion))
}

async fn preview_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PreviewRequest>,
) -> Result<Json<Rendered>, ApiError> {
    let options = state.config.preview.options(request.enable_gfm_extras);

    let rendered =
        tokio::task::spawn_blocking(move || state.previewer.render(&request.markdown, options))
            .await
            .map_err(|e| ApiError::Internal(format!("preview render failed: {e}")))?;
    Ok(Json(rendered))
}
