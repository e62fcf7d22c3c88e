//! Conversation titles from the first user message.

use chatbridge_core::{CallOptions, ChatbridgeError, Message};
use chatbridge_llm::provider::OLLAMA_MODEL_PREFIX;
use chatbridge_llm::ProviderRegistry;
use chatbridge_prompt::{plain_text, TITLE_PROMPT};

pub const DEFAULT_TITLE: &str = "New Chat";
pub const DEFAULT_TITLE_MODEL: &str = "title-model";

const TITLE_WORDS: usize = 5;
const MAX_TITLE_CHARS: usize = 50;

/// The first five space-separated words, shortened to 47 characters plus
/// `...` when longer than 50.
pub fn title_from_text(text: &str) -> String {
    if text.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    let words = text.split(' ').take(TITLE_WORDS).collect::<Vec<_>>().join(" ");
    if words.chars().count() > MAX_TITLE_CHARS {
        let head: String = words.chars().take(MAX_TITLE_CHARS - 3).collect();
        format!("{head}...")
    } else {
        words
    }
}

/// Ollama models get the word-based title; other models are asked for a
/// summary, falling back to the word-based title when that fails.
pub async fn generate_title(registry: &ProviderRegistry, model_id: &str, message: &Message) -> String {
    if model_id.starts_with(OLLAMA_MODEL_PREFIX) {
        return title_from_text(&plain_text(message));
    }

    match summarize(registry, model_id, message).await {
        Ok(title) if !title.is_empty() => title,
        Ok(_) => title_from_text(&plain_text(message)),
        Err(err) => {
            tracing::warn!(error = %err, model_id, "title generation failed");
            title_from_text(&plain_text(message))
        }
    }
}

async fn summarize(
    registry: &ProviderRegistry,
    model_id: &str,
    message: &Message,
) -> Result<String, ChatbridgeError> {
    let model = registry.language_model(model_id)?;
    let prompt = vec![
        Message::system(TITLE_PROMPT),
        Message::user(serde_json::to_string(message)?),
    ];
    let result = model.generate(CallOptions::new(prompt)).await?;
    Ok(result.text.trim().to_string())
}
