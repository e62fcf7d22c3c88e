//! Client for a local (or proxied) Ollama server.

mod adapter;
mod convert;

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::{self as fstream, BoxStream, StreamExt};
use reqwest::{Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use chatbridge_core::{
    CallOptions, ChatbridgeError, GenerateResult, LanguageModel, PartStream, Usage,
};

pub use adapter::{
    OllamaChatResponse, OllamaResponseMessage, OllamaStreamAdapter, DEFAULT_MAX_LINE_BYTES,
};
pub use convert::{to_ollama_messages, OllamaChatRequest, OllamaMessage, OllamaOptions};

pub const PROVIDER_NAME: &str = "ollama";
pub const DEFAULT_LIST_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_CHAT_TIMEOUT: Duration = Duration::from_secs(60);

const ERROR_LABEL: &str = "Ollama";

/// Runs `adapter` over an arbitrary NDJSON body.
pub fn ndjson_part_stream<E>(
    body: BoxStream<'static, Result<Bytes, E>>,
    adapter: OllamaStreamAdapter,
) -> PartStream
where
    E: fmt::Display + Send + 'static,
{
    crate::decode::part_stream(body, adapter, ERROR_LABEL)
}

/// One entry of `GET /api/tags`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OllamaModel {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    base_url: String,
    api_key: Option<SecretString>,
    http: Client,
    list_timeout: Duration,
    chat_timeout: Duration,
    max_line_bytes: usize,
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let api_key = if self.api_key.is_some() {
            "<redacted>"
        } else {
            "<none>"
        };

        f.debug_struct("OllamaClient")
            .field("base_url", &self.base_url)
            .field("api_key", &api_key)
            .field("list_timeout", &self.list_timeout)
            .field("chat_timeout", &self.chat_timeout)
            .finish()
    }
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ChatbridgeError> {
        let base_url = base_url.into();
        if base_url.trim().is_empty() {
            return Err(ChatbridgeError::InvalidConfig(
                "ollama base_url cannot be empty".to_string(),
            ));
        }
        Url::parse(&base_url).map_err(|err| {
            ChatbridgeError::InvalidConfig(format!("invalid ollama base_url '{base_url}': {err}"))
        })?;
        let http = Client::builder()
            .build()
            .map_err(|err| ChatbridgeError::InvalidConfig(err.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: None,
            http,
            list_timeout: DEFAULT_LIST_TIMEOUT,
            chat_timeout: DEFAULT_CHAT_TIMEOUT,
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
        })
    }

    /// Sent as a bearer token. Blank keys are treated as absent.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        let api_key = api_key.into();
        self.api_key = if api_key.trim().is_empty() {
            None
        } else {
            Some(SecretString::new(api_key))
        };
        self
    }

    pub fn with_timeouts(mut self, list_timeout: Duration, chat_timeout: Duration) -> Self {
        self.list_timeout = list_timeout;
        self.chat_timeout = chat_timeout;
        self
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.max_line_bytes = max_line_bytes;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn language_model(&self, model: impl Into<String>) -> OllamaLanguageModel {
        OllamaLanguageModel {
            client: self.clone(),
            model: model.into(),
        }
    }

    fn request(&self, method: Method, path: &str, timeout: Duration) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let request = self
            .http
            .request(method, url)
            .header("Content-Type", "application/json")
            .timeout(timeout);

        match &self.api_key {
            Some(api_key) => request.bearer_auth(api_key.expose_secret()),
            None => request,
        }
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, ChatbridgeError> {
        let response = request.send().await.map_err(|err| {
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
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %body, "ollama request failed");
            return Err(ChatbridgeError::Http {
                provider: ERROR_LABEL.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    pub async fn list_models(&self) -> Result<Vec<OllamaModel>, ChatbridgeError> {
        let request = self.request(Method::GET, "/api/tags", self.list_timeout);
        let response = self.send(request, self.list_timeout).await?;
        let tags = response
            .json::<TagsResponse>()
            .await
            .map_err(|err| ChatbridgeError::connection(ERROR_LABEL, err))?;
        tracing::debug!(count = tags.models.len(), "listed ollama models");
        Ok(tags.models)
    }

    pub async fn chat(
        &self,
        request: &OllamaChatRequest,
    ) -> Result<OllamaChatResponse, ChatbridgeError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "ollama chat");
        let builder = self
            .request(Method::POST, "/api/chat", self.chat_timeout)
            .json(request);
        let response = self.send(builder, self.chat_timeout).await?;
        let body = response
            .text()
            .await
            .map_err(|err| ChatbridgeError::connection(ERROR_LABEL, err))?;
        serde_json::from_str(&body).map_err(|err| ChatbridgeError::ParseFailed {
            output: body,
            reason: err.to_string(),
        })
    }

    /// Streams `request` (its `stream` flag is forced on) as stream parts.
    pub fn chat_stream(&self, mut request: OllamaChatRequest) -> PartStream {
        request.stream = true;
        let client = self.clone();

        fstream::once(async move { client.open_stream(&request).await })
            .flat_map(|result| match result {
                Ok(parts) => parts,
                Err(err) => fstream::once(async move { Err(err) }).boxed(),
            })
            .boxed()
    }

    async fn open_stream(&self, request: &OllamaChatRequest) -> Result<PartStream, ChatbridgeError> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "ollama chat stream");
        let builder = self
            .request(Method::POST, "/api/chat", self.chat_timeout)
            .json(request);
        let response = self.send(builder, self.chat_timeout).await?;
        if response.content_length() == Some(0) {
            return Err(ChatbridgeError::MissingBody(ERROR_LABEL.to_string()));
        }

        let adapter = OllamaStreamAdapter::new().with_max_line_bytes(self.max_line_bytes);
        Ok(ndjson_part_stream(response.bytes_stream().boxed(), adapter))
    }
}

/// [`LanguageModel`] over one Ollama model name.
#[derive(Clone, Debug)]
pub struct OllamaLanguageModel {
    client: OllamaClient,
    model: String,
}

#[async_trait::async_trait]
impl LanguageModel for OllamaLanguageModel {
    fn provider(&self) -> &str {
        PROVIDER_NAME
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate(&self, options: CallOptions) -> Result<GenerateResult, ChatbridgeError> {
        let request = OllamaChatRequest::new(self.model.clone(), &options, false);
        let response = self.client.chat(&request).await?;

        let message = response.message.unwrap_or_default();
        Ok(GenerateResult {
            text: message.content.unwrap_or_default(),
            reasoning: message.thinking.filter(|thinking| !thinking.is_empty()),
            finish_reason: adapter::finish_reason(response.done_reason.as_deref()),
            usage: Usage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        })
    }

    fn stream(&self, options: CallOptions) -> PartStream {
        let request = OllamaChatRequest::new(self.model.clone(), &options, true);
        self.client.chat_stream(request)
    }
}
