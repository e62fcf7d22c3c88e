//! Wire types of the OpenAI-compatible chat completions API spoken by the
//! model gateway.

use serde::{Deserialize, Serialize};

use chatbridge_core::{CallOptions, Message, Role, Usage};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct GatewayMessage {
    pub role: String,
    pub content: String,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Request body for the chat completions endpoint
#[derive(Serialize, Debug, Clone)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<GatewayMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, options: &CallOptions, stream: bool) -> Self {
        Self {
            model: model.into(),
            messages: to_gateway_messages(&options.prompt),
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_output_tokens,
            stream,
            stream_options: stream.then_some(StreamOptions {
                include_usage: true,
            }),
        }
    }
}

/// Text parts only; messages left without text are dropped, and so are tool
/// results, which the endpoint rejects without a matching tool call.
pub fn to_gateway_messages(prompt: &[Message]) -> Vec<GatewayMessage> {
    prompt
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => return None,
            };
            Some(GatewayMessage {
                role: role.to_string(),
                content: message.text()?,
            })
        })
        .collect()
}

/// Non-streaming response from chat completions
#[derive(Deserialize, Debug, Clone)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<UsageBody>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct Choice {
    #[serde(default)]
    pub index: u32,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageBody {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

impl From<UsageBody> for Usage {
    fn from(usage: UsageBody) -> Self {
        Usage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

/// Streaming chunk (server-sent events)
#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<UsageBody>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Delta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// OpenAI-style error response
#[derive(Deserialize, Debug, Clone)]
pub struct GatewayError {
    pub error: ErrorDetail,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}
