use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use chatbridge_prompt::{validate_code, CodeLanguage};

use crate::identity::Identity;
use crate::{AppState, ServerError};

#[derive(Debug, Deserialize)]
pub struct ValidateCodeRequest {
    pub code: String,
    #[serde(default)]
    pub language: CodeLanguage,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateCodeResponse {
    pub content: String,
    pub is_valid: bool,
    pub error_count: usize,
    pub warning_count: usize,
}

/// Teacher-mode check of a TypeScript or JavaScript snippet.
pub async fn validate_typescript(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Json(request): Json<ValidateCodeRequest>,
) -> Result<Json<ValidateCodeResponse>, ServerError> {
    Identity::require_member(identity, state.config.guest_accounts_enabled)?;
    let validation = validate_code(&request.code, request.language)?;
    Ok(Json(ValidateCodeResponse {
        content: validation.report(),
        is_valid: validation.is_valid,
        error_count: validation.errors.len(),
        warning_count: validation.warnings.len(),
    }))
}
