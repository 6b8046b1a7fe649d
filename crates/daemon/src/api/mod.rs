use axum::{response::Json, routing::get, Router};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::orchestrator::Orchestrator;

pub mod credential;
pub mod generate;
pub mod media;
pub mod state;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    let media = Arc::clone(orchestrator.media());
    Router::new()
        .merge(generate::router(orchestrator.clone()))
        .merge(state::router(orchestrator.clone()))
        .merge(credential::router(orchestrator))
        .merge(media::router(media))
}

/// The whole HTTP surface: health, `/api`, and optionally the static panel.
pub fn app(orchestrator: Arc<Orchestrator>, panel_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_credentials(false);

    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", router(orchestrator));

    let app = match panel_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    };
    app.layer(cors)
}
