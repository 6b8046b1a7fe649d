use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
    routing::{get, post},
    Router,
};
use engine::{ControlSnapshot, GenerationResult};
use futures::Stream;
use std::sync::Arc;
use tokio_stream::{wrappers::WatchStream, StreamExt};

use crate::orchestrator::Orchestrator;

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/state", get(get_state))
        .route("/state/stream", get(stream_state))
        .route("/history/:index/recall", post(recall))
        .with_state(orchestrator)
}

async fn get_state(State(orchestrator): State<Arc<Orchestrator>>) -> Json<ControlSnapshot> {
    Json(orchestrator.snapshot())
}

/// Emits the current snapshot immediately, then one event per change.
async fn stream_state(
    State(orchestrator): State<Arc<Orchestrator>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let stream = WatchStream::new(orchestrator.subscribe())
        .map(|snapshot| Event::default().event("snapshot").json_data(snapshot));
    Sse::new(stream).keep_alive(KeepAlive::default())
}

async fn recall(
    State(orchestrator): State<Arc<Orchestrator>>,
    Path(index): Path<usize>,
) -> Result<Json<GenerationResult>, StatusCode> {
    orchestrator
        .recall(index)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}
