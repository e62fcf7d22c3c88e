use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::Json;
use futures::stream::{self, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use chatbridge_core::{spawn_part_channel, CallOptions, Message, StreamPart};
use chatbridge_llm::DEFAULT_CHAT_MODEL;
use chatbridge_prompt::{
    parse_message, parse_messages, system_prompt, system_prompt_for_level, RequestHints,
    UserLevel,
};

use crate::identity::Identity;
use crate::title::{generate_title, DEFAULT_TITLE_MODEL};
use crate::{AppState, ServerError};

const CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub messages: Value,
    #[serde(default)]
    pub teacher_mode: bool,
    #[serde(default)]
    pub user_level: Option<UserLevel>,
    #[serde(default)]
    pub request_hints: RequestHints,
    #[serde(default)]
    pub temperature: Option<f32>,
}

fn sse_event(part: &StreamPart) -> Event {
    Event::default()
        .json_data(part)
        .unwrap_or_else(|_| Event::default().data(r#"{"type":"error","message":"unserializable part"}"#))
}

/// Streams the reply as SSE `data:` frames holding stream parts, closed by
/// `data: [DONE]`.
pub async fn chat(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Json(request): Json<ChatRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServerError> {
    let identity = Identity::require_member(identity, state.config.guest_accounts_enabled)?;
    let model_id = request
        .model
        .clone()
        .unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string());

    let history = parse_messages(&request.messages)
        .map_err(|_| ServerError::BadRequest("Invalid messages".to_string()))?;
    if history.is_empty() {
        return Err(ServerError::BadRequest("Messages are required".to_string()));
    }

    let system = match (request.teacher_mode, request.user_level) {
        (true, Some(level)) => system_prompt_for_level(&model_id, &request.request_hints, level),
        (teacher_mode, _) => system_prompt(&model_id, &request.request_hints, teacher_mode),
    };
    let mut prompt = Vec::with_capacity(history.len() + 1);
    prompt.push(Message::system(system));
    prompt.extend(history);

    let model = state.registry.language_model(&model_id)?;
    tracing::info!(
        user_id = %identity.id,
        model_id = %model_id,
        provider = model.provider(),
        provider_model = model.model_id(),
        messages = prompt.len() - 1,
        "starting chat stream"
    );

    let mut options = CallOptions::new(prompt);
    options.temperature = request.temperature;
    let parts = spawn_part_channel(
        model.stream(options),
        CHANNEL_CAPACITY,
        state.shutdown.child_token(),
    );

    let events = parts
        .map(|item| {
            let part = item.unwrap_or_else(|err| {
                tracing::warn!(error = %err, "chat stream failed");
                StreamPart::Error {
                    message: err.to_string(),
                }
            });
            Ok(sse_event(&part))
        })
        .chain(stream::once(async { Ok(Event::default().data("[DONE]")) }));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[derive(Debug, Deserialize)]
pub struct TitleRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub message: Value,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: String,
}

pub async fn title(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Json(request): Json<TitleRequest>,
) -> Result<Json<TitleResponse>, ServerError> {
    Identity::require_member(identity, state.config.guest_accounts_enabled)?;
    let message = parse_message(&request.message)
        .map_err(|_| ServerError::BadRequest("Invalid message".to_string()))?;
    let model_id = request.model.as_deref().unwrap_or(DEFAULT_TITLE_MODEL);

    let title = generate_title(&state.registry, model_id, &message).await;
    Ok(Json(TitleResponse { title }))
}
