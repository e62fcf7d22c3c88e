use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChatbridgeError {
    #[error("LLM provider failed: {0}")]
    Provider(String),
    #[error("{provider} connection failed: {reason}")]
    Connection { provider: String, reason: String },
    #[error("{provider} API error: {status} - {body}")]
    Http {
        provider: String,
        status: u16,
        body: String,
    },
    #[error("No response body from {0}")]
    MissingBody(String),
    #[error("Stream line exceeded {limit} bytes")]
    LineTooLong { limit: usize },
    #[error("Parsing failed on output '{output}': {reason}")]
    ParseFailed { output: String, reason: String },
    #[error("Operation was cancelled")]
    Cancelled,
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Serialization/deserialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("{0}")]
    Custom(String),
}

impl ChatbridgeError {
    pub fn connection(provider: impl Into<String>, reason: impl ToString) -> Self {
        ChatbridgeError::Connection {
            provider: provider.into(),
            reason: reason.to_string(),
        }
    }

    /// True for failures that happened before or while talking to the remote
    /// endpoint, as opposed to bad input or bad configuration.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ChatbridgeError::Connection { .. }
                | ChatbridgeError::Http { .. }
                | ChatbridgeError::MissingBody(_)
        )
    }
}
