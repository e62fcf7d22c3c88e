use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::{ChatbridgeError, FinishReason, Message, StreamPart, Usage};

pub type PartStream = BoxStream<'static, Result<StreamPart, ChatbridgeError>>;

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct CallOptions {
    pub prompt: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

impl CallOptions {
    pub fn new(prompt: Vec<Message>) -> Self {
        Self {
            prompt,
            ..Self::default()
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct GenerateResult {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub finish_reason: FinishReason,
    pub usage: Usage,
}

/// A chat model behind some provider. `stream` must not borrow `self`: the
/// returned stream outlives the call so it can be handed to a response body.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider(&self) -> &str;

    fn model_id(&self) -> &str;

    async fn generate(&self, options: CallOptions) -> Result<GenerateResult, ChatbridgeError>;

    fn stream(&self, options: CallOptions) -> PartStream;
}
