//! OpenAI-compatible model gateway client.

mod sse;
mod types;

use std::fmt;
use std::time::Duration;

use futures::stream::{self as fstream, StreamExt};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use chatbridge_core::{
    CallOptions, ChatbridgeError, FinishReason, GenerateResult, LanguageModel, PartStream, Usage,
};

pub use sse::GatewaySseAdapter;
pub use types::{
    to_gateway_messages, ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse,
    Choice, ChunkChoice, Delta, ErrorDetail, GatewayError, GatewayMessage, ResponseMessage,
    StreamOptions, UsageBody,
};

pub const PROVIDER_NAME: &str = "gateway";
pub const DEFAULT_BASE_URL: &str = "https://ai-gateway.vercel.sh/v1";
pub const DEFAULT_MODEL: &str = "anthropic/claude-sonnet-4";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const ERROR_LABEL: &str = "Gateway";

#[derive(Clone)]
pub struct GatewayClient {
    base_url: String,
    api_key: SecretString,
    http: Client,
    timeout: Duration,
}

impl fmt::Debug for GatewayClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GatewayClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ChatbridgeError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ChatbridgeError::InvalidConfig(
                "gateway api_key cannot be empty".to_string(),
            ));
        }
        let http = Client::builder()
            .build()
            .map_err(|err| ChatbridgeError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: SecretString::new(api_key),
            http,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Result<Self, ChatbridgeError> {
        let base_url = base_url.into();
        Url::parse(&base_url).map_err(|err| {
            ChatbridgeError::InvalidConfig(format!("invalid gateway base_url '{base_url}': {err}"))
        })?;
        self.base_url = base_url.trim_end_matches('/').to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn language_model(&self, model: impl Into<String>) -> GatewayLanguageModel {
        GatewayLanguageModel {
            client: self.clone(),
            model: model.into(),
        }
    }

    async fn post(&self, request: &ChatCompletionRequest) -> Result<Response, ChatbridgeError> {
        let url = format!("{}/chat/completions", self.base_url);
        let timeout = self.timeout;
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .timeout(timeout)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ChatbridgeError::connection(
                        ERROR_LABEL,
                        format!("request timed out after {timeout:?}"),
                    )
                } else {
                    ChatbridgeError::connection(ERROR_LABEL, err)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            // Prefer the structured message when the body carries one.
            let body = serde_json::from_str::<GatewayError>(&text)
                .map(|err| err.error.message)
                .unwrap_or(text);
            tracing::warn!(status = status.as_u16(), body = %body, "gateway request failed");
            return Err(ChatbridgeError::Http {
                provider: ERROR_LABEL.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    pub async fn chat(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, ChatbridgeError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "gateway chat");
        let response = self.post(request).await?;
        let body = response
            .text()
            .await
            .map_err(|err| ChatbridgeError::connection(ERROR_LABEL, err))?;
        serde_json::from_str(&body).map_err(|err| ChatbridgeError::ParseFailed {
            output: body,
            reason: err.to_string(),
        })
    }

    /// Streams `request` as stream parts, forcing `stream` and usage reporting on.
    pub fn chat_stream(&self, mut request: ChatCompletionRequest) -> PartStream {
        request.stream = true;
        request.stream_options = Some(StreamOptions {
            include_usage: true,
        });
        let client = self.clone();

        fstream::once(async move { client.open_stream(&request).await })
            .flat_map(|result| match result {
                Ok(parts) => parts,
                Err(err) => fstream::once(async move { Err(err) }).boxed(),
            })
            .boxed()
    }

    async fn open_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<PartStream, ChatbridgeError> {
        tracing::debug!(model = %request.model, "gateway chat stream");
        let response = self.post(request).await?;
        if response.content_length() == Some(0) {
            return Err(ChatbridgeError::MissingBody(ERROR_LABEL.to_string()));
        }
        Ok(crate::decode::part_stream(
            response.bytes_stream().boxed(),
            GatewaySseAdapter::new(),
            ERROR_LABEL,
        ))
    }
}

#[derive(Clone, Debug)]
pub struct GatewayLanguageModel {
    client: GatewayClient,
    model: String,
}

#[async_trait::async_trait]
impl LanguageModel for GatewayLanguageModel {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, options: CallOptions) -> Result<GenerateResult, ChatbridgeError> {
        let request = ChatCompletionRequest::new(self.model.clone(), &options, false);
        let response = self.client.chat(&request).await?;

        let usage = response.usage.map(Usage::from).unwrap_or_default();
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatbridgeError::Provider("gateway returned no choices".to_string()))?;

        Ok(GenerateResult {
            text: choice.message.content.unwrap_or_default(),
            reasoning: choice.message.reasoning.filter(|text| !text.is_empty()),
            finish_reason: choice
                .finish_reason
                .as_deref()
                .map(FinishReason::from_openai)
                .unwrap_or_default(),
            usage,
        })
    }

    fn stream(&self, options: CallOptions) -> PartStream {
        let request = ChatCompletionRequest::new(self.model.clone(), &options, true);
        self.client.chat_stream(request)
    }
}
