use httpmock::prelude::*;
use serde_json::json;

use chatbridge_core::ChatbridgeError;
use chatbridge_llm::{GatewayClient, OllamaClient, ProviderKind, ProviderRegistry};

fn gateway() -> GatewayClient {
    GatewayClient::new("gw-key").expect("gateway")
}

#[test]
fn ollama_prefixed_ids_resolve_to_ollama_when_configured() {
    let registry = ProviderRegistry::builder()
        .ollama(OllamaClient::new("http://localhost:11434").expect("ollama"))
        .gateway(gateway())
        .build();

    let model = registry.language_model("ollama-qwen3:8b").expect("model");
    assert_eq!(model.provider(), "ollama");
    assert_eq!(model.model_id(), "qwen3:8b");

    let model = registry.language_model("chat-model").expect("model");
    assert_eq!(model.provider(), "gateway");
    assert_eq!(model.model_id(), "anthropic/claude-sonnet-4");
    assert_eq!(registry.active_provider(), ProviderKind::Ollama);
}

#[test]
fn ollama_ids_fall_back_to_gateway_without_ollama() {
    let registry = ProviderRegistry::builder().gateway(gateway()).build();
    let model = registry.language_model("ollama-llama3.2").expect("model");
    assert_eq!(model.provider(), "gateway");
    assert_eq!(registry.active_provider(), ProviderKind::Claude);
}

#[test]
fn unresolvable_ids_are_config_errors() {
    let registry = ProviderRegistry::default();
    let err = registry.language_model("chat-model").err().expect("err");
    assert!(matches!(err, ChatbridgeError::InvalidConfig(_)));
}

#[test]
fn provider_kind_serializes_lowercase() {
    assert_eq!(
        serde_json::to_value(ProviderKind::Claude).unwrap(),
        json!("claude")
    );
    assert_eq!(ProviderKind::Ollama.as_str(), "ollama");
}

#[tokio::test]
async fn available_models_lists_live_ollama_models() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(200)
            .json_body(json!({"models": [{"name": "llama3.2", "size": 2019393189u64}]}));
    });

    let registry = ProviderRegistry::builder()
        .ollama(OllamaClient::new(server.url("")).expect("ollama"))
        .build();
    let listing = registry.available_models().await;
    assert!(!listing.fallback);
    assert_eq!(listing.models[0].id, "ollama-llama3.2");
    assert_eq!(listing.models[0].description, "Local model: llama3.2 (2GB)");
}

#[tokio::test]
async fn available_models_falls_back_when_ollama_fails() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/api/tags");
        then.status(500);
    });

    let registry = ProviderRegistry::builder()
        .ollama(OllamaClient::new(server.url("")).expect("ollama"))
        .build();
    let listing = registry.available_models().await;
    assert!(listing.fallback);
    assert_eq!(
        listing.error.as_deref(),
        Some("Ollama unreachable, using fallback models")
    );
    assert_eq!(listing.models[0].id, "ollama-llama3.2");
}

#[tokio::test]
async fn available_models_uses_static_catalog_without_ollama() {
    let listing = ProviderRegistry::builder()
        .gateway(gateway())
        .build()
        .available_models()
        .await;
    let ids: Vec<_> = listing.models.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, ["chat-model", "chat-model-reasoning"]);
}
