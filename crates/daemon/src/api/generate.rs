use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::post,
    Router,
};
use engine::{GenerationConfig, GenerationMode, SeedImage};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::warn;

use crate::orchestrator::{GenerateOutcome, Orchestrator};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    mode: GenerationMode,
    #[serde(default)]
    prompt: String,
    #[serde(default)]
    config: GenerationConfig,
    /// Data URI (or bare base64) of the frame to animate.
    #[serde(default)]
    seed_image: Option<String>,
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/generate", post(generate))
        .route("/generate/cancel", post(cancel))
        .with_state(orchestrator)
}

async fn generate(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<GenerateRequest>,
) -> Response {
    // the seed only matters when animating an image; an undecodable one counts as absent
    let seed = match (req.mode, req.seed_image.as_deref()) {
        (GenerationMode::ImageToVideo, Some(uri)) => match SeedImage::from_data_uri(uri) {
            Ok(seed) => Some(seed),
            Err(e) => {
                warn!("[API] Ignoring seed image: {}", e);
                None
            }
        },
        _ => None,
    };

    match orchestrator.start(req.mode, &req.prompt, req.config, seed) {
        GenerateOutcome::Started(_) => {
            (StatusCode::ACCEPTED, Json(orchestrator.snapshot())).into_response()
        }
        GenerateOutcome::Skipped => StatusCode::NO_CONTENT.into_response(),
        GenerateOutcome::Busy(phase) => (
            StatusCode::CONFLICT,
            Json(json!({ "error": "an attempt is already in flight", "phase": phase })),
        )
            .into_response(),
        GenerateOutcome::CredentialRequired(state) => (
            StatusCode::PRECONDITION_REQUIRED,
            Json(json!({ "error": "select an API key first", "credential": state })),
        )
            .into_response(),
    }
}

async fn cancel(State(orchestrator): State<Arc<Orchestrator>>) -> Json<serde_json::Value> {
    Json(json!({ "cancelled": orchestrator.cancel() }))
}
