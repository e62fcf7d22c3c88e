//! Language model providers for chatbridge: a streaming Ollama client, an
//! OpenAI-compatible gateway client and the registry that picks between them.

mod decode;
mod lines;

pub mod gateway;
pub mod models;
pub mod ollama;
pub mod provider;

pub use decode::{part_stream, PartDecoder};
pub use gateway::{GatewayClient, GatewayLanguageModel, GatewaySseAdapter};
pub use models::{
    chat_models_for_provider, fallback_models, ChatModel, ModelListing, DEFAULT_CHAT_MODEL,
};
pub use ollama::{
    ndjson_part_stream, OllamaChatRequest, OllamaChatResponse, OllamaClient, OllamaLanguageModel,
    OllamaModel, OllamaStreamAdapter,
};
pub use provider::{ProviderKind, ProviderRegistry, ProviderRegistryBuilder};
