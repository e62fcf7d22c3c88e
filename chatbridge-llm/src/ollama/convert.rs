use serde::{Deserialize, Serialize};

use chatbridge_core::{CallOptions, Message, Role};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct OllamaMessage {
    pub role: String,
    pub content: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<u32>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none()
            && self.top_p.is_none()
            && self.top_k.is_none()
            && self.num_predict.is_none()
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct OllamaChatRequest {
    pub model: String,
    pub messages: Vec<OllamaMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OllamaOptions>,
}

impl OllamaChatRequest {
    pub fn new(model: impl Into<String>, options: &CallOptions, stream: bool) -> Self {
        let sampling = OllamaOptions {
            temperature: options.temperature,
            top_p: options.top_p,
            top_k: options.top_k,
            num_predict: options.max_output_tokens,
        };
        Self {
            model: model.into(),
            messages: to_ollama_messages(&options.prompt),
            stream,
            options: if sampling.is_empty() {
                None
            } else {
                Some(sampling)
            },
        }
    }
}

/// System messages pass through as-is. User and assistant messages keep only
/// their text parts and are dropped when none remain. Tool messages have no
/// Ollama counterpart here and are dropped.
pub fn to_ollama_messages(prompt: &[Message]) -> Vec<OllamaMessage> {
    prompt
        .iter()
        .filter_map(|message| {
            let role = match message.role {
                Role::System => "system",
                Role::User => "user",
                Role::Assistant => "assistant",
                Role::Tool => return None,
            };
            let content = match message.role {
                Role::System => message
                    .content
                    .iter()
                    .filter_map(|part| part.as_text())
                    .collect::<Vec<_>>()
                    .join("\n"),
                _ => message.text()?,
            };
            Some(OllamaMessage {
                role: role.to_string(),
                content,
            })
        })
        .collect()
}
