use axum::extract::State;
use axum::Json;

use chatbridge_llm::ModelListing;

use crate::{AppState, ServerError};

pub async fn ollama_models(State(state): State<AppState>) -> Result<Json<ModelListing>, ServerError> {
    if state.registry.ollama().is_none() {
        return Err(ServerError::BadRequest("Ollama not configured".to_string()));
    }
    Ok(Json(state.registry.available_models().await))
}

/// Models for the active provider: live or fallback Ollama models, or the
/// static catalog.
pub async fn models(State(state): State<AppState>) -> Json<ModelListing> {
    Json(state.registry.available_models().await)
}
