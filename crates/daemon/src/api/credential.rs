use axum::{extract::State, response::Json, routing::get, Router};
use engine::CredentialState;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::orchestrator::Orchestrator;

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectCredentialRequest {
    api_key: Option<String>,
}

#[derive(Serialize)]
pub struct CredentialResponse {
    state: CredentialState,
}

pub fn router(orchestrator: Arc<Orchestrator>) -> Router {
    Router::new()
        .route("/credential", get(get_credential).post(select_credential))
        .with_state(orchestrator)
}

async fn get_credential(State(orchestrator): State<Arc<Orchestrator>>) -> Json<CredentialResponse> {
    Json(CredentialResponse {
        state: orchestrator.gate().state(),
    })
}

/// A missing or blank key is a cancelled selection and leaves the state as it was.
async fn select_credential(
    State(orchestrator): State<Arc<Orchestrator>>,
    Json(req): Json<SelectCredentialRequest>,
) -> Json<CredentialResponse> {
    Json(CredentialResponse {
        state: orchestrator.select_credential(req.api_key.as_deref()),
    })
}
