use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use chatbridge_auth::{BackupCodeStatus, LoginVerification, TwoFactorSetup, VerifyOutcome};

use crate::identity::Identity;
use crate::{AppState, ServerError};

const FEATURE_DISABLED: &str = "Two-factor authentication is not enabled";

/// `{ "success": true, ...body }`
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub success: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T> Success<T> {
    fn new(body: T) -> Json<Self> {
        Json(Self {
            success: true,
            body,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenBody {
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub is_backup_code: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupCodes {
    pub backup_codes: Vec<String>,
}

fn ensure_enabled(state: &AppState) -> Result<(), ServerError> {
    if state.config.two_factor_enabled {
        Ok(())
    } else {
        Err(ServerError::NotFound(FEATURE_DISABLED.to_string()))
    }
}

/// Parsed after the feature and session checks so those answer first.
fn parse_body<T: DeserializeOwned + Default>(body: &Bytes) -> Result<T, ServerError> {
    if body.is_empty() {
        return Ok(T::default());
    }
    serde_json::from_slice(body)
        .map_err(|_| ServerError::BadRequest("Invalid request body".to_string()))
}

fn required(value: Option<String>, message: &str) -> Result<String, ServerError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| ServerError::BadRequest(message.to_string()))
}

pub async fn setup(
    State(state): State<AppState>,
    identity: Option<Identity>,
) -> Result<Json<TwoFactorSetup>, ServerError> {
    ensure_enabled(&state)?;
    let identity = identity.ok_or(ServerError::Unauthorized)?;
    let setup = state.two_factor.setup(&identity.session_user()).await?;
    Ok(Json(setup))
}

pub async fn verify(
    State(state): State<AppState>,
    identity: Option<Identity>,
    body: Bytes,
) -> Result<Json<Success<VerifyOutcome>>, ServerError> {
    ensure_enabled(&state)?;
    let identity = identity.ok_or(ServerError::Unauthorized)?;
    let body: TokenBody = parse_body(&body)?;
    let token = required(body.token, "Token is required")?;

    let outcome = state.two_factor.verify(&identity.id, &token).await?;
    Ok(Success::new(outcome))
}

pub async fn verify_login(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Success<LoginVerification>>, ServerError> {
    ensure_enabled(&state)?;
    let body: LoginBody = parse_body(&body)?;
    let (email, token) = match (body.email, body.token) {
        (Some(email), Some(token)) if !email.is_empty() && !token.is_empty() => (email, token),
        _ => {
            return Err(ServerError::BadRequest(
                "Email and token are required".to_string(),
            ))
        }
    };

    let verification = state
        .two_factor
        .verify_login(&email, &token, body.is_backup_code)
        .await?;
    Ok(Success::new(verification))
}

pub async fn regenerate_backup_codes(
    State(state): State<AppState>,
    identity: Option<Identity>,
    body: Bytes,
) -> Result<Json<Success<BackupCodes>>, ServerError> {
    ensure_enabled(&state)?;
    let identity = identity.ok_or(ServerError::Unauthorized)?;
    let body: TokenBody = parse_body(&body)?;
    let token = required(body.token, "Token is required to regenerate backup codes")?;

    let backup_codes = state
        .two_factor
        .regenerate_backup_codes(&identity.id, &token)
        .await?;
    Ok(Success::new(BackupCodes { backup_codes }))
}

pub async fn backup_code_status(
    State(state): State<AppState>,
    identity: Option<Identity>,
) -> Result<Json<BackupCodeStatus>, ServerError> {
    ensure_enabled(&state)?;
    let identity = identity.ok_or(ServerError::Unauthorized)?;
    let status = state.two_factor.backup_code_status(&identity.id).await?;
    Ok(Json(status))
}
