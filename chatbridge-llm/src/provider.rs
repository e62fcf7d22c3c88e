//! Model id resolution across the configured providers.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use chatbridge_core::{ChatbridgeError, LanguageModel};

use crate::gateway::{self, GatewayClient};
use crate::models::{chat_models_for_provider, ChatModel, ModelListing};
use crate::ollama::OllamaClient;

pub const OLLAMA_MODEL_PREFIX: &str = "ollama-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Ollama,
    Claude,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Ollama => "ollama",
            ProviderKind::Claude => "claude",
        }
    }
}

/// Holds the configured clients and hands out a [`LanguageModel`] per request.
#[derive(Clone, Debug, Default)]
pub struct ProviderRegistry {
    ollama: Option<OllamaClient>,
    gateway: Option<GatewayClient>,
    gateway_model: Option<String>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    pub fn ollama(&self) -> Option<&OllamaClient> {
        self.ollama.as_ref()
    }

    pub fn gateway(&self) -> Option<&GatewayClient> {
        self.gateway.as_ref()
    }

    /// Ollama whenever it is configured, whether or not it is reachable.
    pub fn active_provider(&self) -> ProviderKind {
        if self.ollama.is_some() {
            ProviderKind::Ollama
        } else {
            ProviderKind::Claude
        }
    }

    pub fn language_model(&self, model_id: &str) -> Result<Arc<dyn LanguageModel>, ChatbridgeError> {
        if let (Some(name), Some(ollama)) =
            (model_id.strip_prefix(OLLAMA_MODEL_PREFIX), self.ollama.as_ref())
        {
            if !name.is_empty() {
                tracing::debug!(model_id, ollama_model = name, "resolved ollama model");
                return Ok(Arc::new(ollama.language_model(name)));
            }
        }

        let gateway = self.gateway.as_ref().ok_or_else(|| {
            ChatbridgeError::InvalidConfig(format!(
                "no provider configured for model '{model_id}'"
            ))
        })?;
        let model = self.gateway_model.as_deref().unwrap_or(gateway::DEFAULT_MODEL);
        tracing::debug!(model_id, gateway_model = model, "resolved gateway model");
        Ok(Arc::new(gateway.language_model(model)))
    }

    /// Live Ollama models, the fallback list when Ollama is unreachable, or
    /// the static catalog when Ollama is not configured.
    pub async fn available_models(&self) -> ModelListing {
        let Some(ollama) = self.ollama.as_ref() else {
            return ModelListing::live(chat_models_for_provider(ProviderKind::Claude));
        };

        match ollama.list_models().await {
            Ok(models) => ModelListing::live(models.iter().map(ChatModel::from_ollama).collect()),
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch ollama models");
                ModelListing::fallback()
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct ProviderRegistryBuilder {
    ollama: Option<OllamaClient>,
    gateway: Option<GatewayClient>,
    gateway_model: Option<String>,
}

impl ProviderRegistryBuilder {
    pub fn ollama(mut self, client: OllamaClient) -> Self {
        self.ollama = Some(client);
        self
    }

    pub fn gateway(mut self, client: GatewayClient) -> Self {
        self.gateway = Some(client);
        self
    }

    /// Overrides the gateway model used for non-Ollama ids.
    pub fn gateway_model(mut self, model: impl Into<String>) -> Self {
        self.gateway_model = Some(model.into());
        self
    }

    pub fn build(self) -> ProviderRegistry {
        ProviderRegistry {
            ollama: self.ollama,
            gateway: self.gateway,
            gateway_model: self.gateway_model,
        }
    }
}
