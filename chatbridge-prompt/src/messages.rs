//! Conversation messages as clients send them.

use serde::Deserialize;
use serde_json::Value;

use chatbridge_core::{ChatbridgeError, ContentPart, Message, Role};

/// One message in any of the accepted shapes: `content` as a string or as
/// typed parts, or UI-style `parts`.
#[derive(Deserialize)]
struct WireMessage {
    role: Role,
    #[serde(default)]
    content: Option<WireContent>,
    #[serde(default)]
    parts: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum WireContent {
    Text(String),
    Parts(Vec<Value>),
}

fn content_parts(values: Vec<Value>) -> Vec<ContentPart> {
    // Reasoning, step markers and tool parts carry nothing the models take back.
    values
        .into_iter()
        .filter_map(|value| serde_json::from_value::<ContentPart>(value).ok())
        .collect()
}

impl From<WireMessage> for Message {
    fn from(wire: WireMessage) -> Self {
        let mut content = match wire.content {
            Some(WireContent::Text(text)) => vec![ContentPart::text(text)],
            Some(WireContent::Parts(parts)) => content_parts(parts),
            None => Vec::new(),
        };
        content.extend(content_parts(wire.parts));
        Message::new(wire.role, content)
    }
}

/// Parses one message.
pub fn parse_message(value: &Value) -> Result<Message, ChatbridgeError> {
    WireMessage::deserialize(value)
        .map(Message::from)
        .map_err(|err| ChatbridgeError::InvalidConfig(format!("invalid message: {err}")))
}

/// Parses a conversation: an array of messages, a single message, or `null`
/// for none.
pub fn parse_messages(value: &Value) -> Result<Vec<Message>, ChatbridgeError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.iter().map(parse_message).collect(),
        Value::Object(_) => Ok(vec![parse_message(value)?]),
        other => Err(ChatbridgeError::InvalidConfig(format!(
            "expected messages, got {other}"
        ))),
    }
}

/// Text parts joined with single spaces, as shown in titles and previews.
pub fn plain_text(message: &Message) -> String {
    message
        .content
        .iter()
        .filter_map(ContentPart::as_text)
        .collect::<Vec<_>>()
        .join(" ")
}
