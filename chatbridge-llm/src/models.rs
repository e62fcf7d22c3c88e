//! The chat model catalog shown to clients.

use serde::{Deserialize, Serialize};

use crate::ollama::OllamaModel;
use crate::provider::ProviderKind;

pub const DEFAULT_CHAT_MODEL: &str = "chat-model";
pub const REASONING_CHAT_MODEL: &str = "chat-model-reasoning";

pub const OLLAMA_UNREACHABLE: &str = "Ollama unreachable, using fallback models";

const FALLBACK_OLLAMA_MODEL: &str = "llama3.2";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatModel {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Name to send to Ollama, for models discovered from a live server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama_name: Option<String>,
}

impl ChatModel {
    fn fixed(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            ollama_name: None,
        }
    }

    pub fn from_ollama(model: &OllamaModel) -> Self {
        let gigabytes = (model.size as f64 / 1e9).round();
        Self {
            id: format!("ollama-{}", model.name),
            name: model.name.clone(),
            description: format!("Local model: {} ({}GB)", model.name, gigabytes),
            ollama_name: Some(model.name.clone()),
        }
    }

    pub fn is_reasoning(&self) -> bool {
        self.id == REASONING_CHAT_MODEL
    }
}

pub fn claude_models() -> Vec<ChatModel> {
    vec![
        ChatModel::fixed(
            DEFAULT_CHAT_MODEL,
            "Claude 4 - Sonnet",
            "Advanced multimodal model with vision and text capabilities",
        ),
        ChatModel::fixed(
            REASONING_CHAT_MODEL,
            "Claude 4 - Sonnet (Reasoning)",
            "Uses advanced chain-of-thought reasoning for complex problems",
        ),
    ]
}

pub fn ollama_models() -> Vec<ChatModel> {
    vec![
        ChatModel::fixed(
            DEFAULT_CHAT_MODEL,
            "Llama 3.2 (Ollama)",
            "Local Llama 3.2 model running on Ollama",
        ),
        ChatModel::fixed(
            REASONING_CHAT_MODEL,
            "Llama 3.2 (Ollama)",
            "Local Llama 3.2 model for reasoning tasks",
        ),
    ]
}

pub fn chat_models_for_provider(provider: ProviderKind) -> Vec<ChatModel> {
    match provider {
        ProviderKind::Ollama => ollama_models(),
        ProviderKind::Claude => claude_models(),
    }
}

/// Served in place of the live list when the Ollama server cannot be reached.
pub fn fallback_models() -> Vec<ChatModel> {
    vec![ChatModel {
        id: format!("ollama-{FALLBACK_OLLAMA_MODEL}"),
        name: FALLBACK_OLLAMA_MODEL.to_string(),
        description: format!("Local model: {FALLBACK_OLLAMA_MODEL} (fallback)"),
        ollama_name: Some(FALLBACK_OLLAMA_MODEL.to_string()),
    }]
}

/// Body of the model listing endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelListing {
    pub models: Vec<ChatModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub fallback: bool,
}

impl ModelListing {
    pub fn live(models: Vec<ChatModel>) -> Self {
        Self {
            models,
            error: None,
            fallback: false,
        }
    }

    pub fn fallback() -> Self {
        Self {
            models: fallback_models(),
            error: Some(OLLAMA_UNREACHABLE.to_string()),
            fallback: true,
        }
    }
}
