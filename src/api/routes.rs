//! Axum router for the classifier service.

use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, Request, State};
use axum::http::HeaderValue;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{Instrument, info_span, warn};
use uuid::Uuid;

use super::error::ApiError;
use super::form::read_submission;
use crate::analysis::{AnalysisResult, EmailClassifier};
use crate::config::ServerConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<EmailClassifier>,
}

impl AppState {
    pub fn new(classifier: EmailClassifier) -> Self {
        Self {
            classifier: Arc::new(classifier),
        }
    }
}

/// Build the full router: API routes, index, static assets and middleware.
pub fn build_router(state: AppState, config: &ServerConfig) -> Router {
    Router::new()
        .route("/analise", post(analyze_email))
        .route("/health", get(health))
        .route_service("/", ServeFile::new(&config.index_file))
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if config.cors_allow_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(origins))
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "message": "API funcionando corretamente"
    }))
}

// ── Analysis ────────────────────────────────────────────────────────────

/// POST /analise
///
/// Form fields `email_content` and/or `email_file`. Returns the category,
/// the suggested reply and the confidence label.
async fn analyze_email(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<AnalysisResult>, ApiError> {
    let request_id = Uuid::new_v4();
    let span = info_span!("analysis", %request_id, model = %state.classifier.model_name());

    async move {
        let submission = read_submission(request).await?;
        let result = state.classifier.analyze(submission).await?;
        Ok::<_, ApiError>(Json(result))
    }
    .instrument(span)
    .await
}
