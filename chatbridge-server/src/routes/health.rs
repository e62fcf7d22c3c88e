use axum::extract::State;
use axum::Json;
use serde::Serialize;

use chatbridge_llm::ProviderKind;

use crate::AppState;

pub async fn ping() -> &'static str {
    "pong"
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResponse {
    pub provider: ProviderKind,
    pub is_ollama: bool,
}

pub async fn provider(State(state): State<AppState>) -> Json<ProviderResponse> {
    let provider = state.registry.active_provider();
    Json(ProviderResponse {
        provider,
        is_ollama: provider == ProviderKind::Ollama,
    })
}
