mod chat;
mod health;
mod models;
mod tools;
mod two_factor;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Json, Router};
use serde_json::json;
use tower_http::limit::RequestBodyLimitLayer;

use crate::gate::route_gate;
use crate::AppState;

pub use chat::{ChatRequest, TitleRequest};

/// Upper bound for request bodies, chat transcripts included.
pub const MAX_BODY_BYTES: usize = 4 * 1024 * 1024;

async fn not_found() -> (StatusCode, Json<serde_json::Value>) {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" })))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ping", get(health::ping))
        .route("/api/health", get(health::health))
        .route("/api/provider", get(health::provider))
        .route("/api/models", get(models::models))
        .route("/api/ollama/models", get(models::ollama_models))
        .route("/api/chat", post(chat::chat))
        .route("/api/chat/title", post(chat::title))
        .route(
            "/api/tools/validate-typescript",
            post(tools::validate_typescript),
        )
        .route("/api/2fa/setup", post(two_factor::setup))
        .route("/api/2fa/verify", post(two_factor::verify))
        .route("/api/2fa/verify-login", post(two_factor::verify_login))
        .route(
            "/api/2fa/backup-codes",
            get(two_factor::backup_code_status).post(two_factor::regenerate_backup_codes),
        )
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), route_gate))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
