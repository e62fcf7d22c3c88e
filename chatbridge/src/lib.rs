//! Umbrella crate re-exporting the chatbridge workspace behind features.
//!
//! ```toml
//! chatbridge = { version = "0.1", features = ["full"] }
//! ```

pub use chatbridge_core as core;
pub use chatbridge_core::{
    CallOptions, ChatbridgeError, FinishReason, GenerateResult, LanguageModel, Message,
    PartStream, Role, StreamPart, Usage,
};

#[cfg(feature = "llm")]
pub use chatbridge_llm as llm;

#[cfg(feature = "prompt")]
pub use chatbridge_prompt as prompt;

#[cfg(feature = "auth")]
pub use chatbridge_auth as auth;

#[cfg(feature = "server")]
pub use chatbridge_server as server;

pub mod prelude {
    pub use chatbridge_core::{
        CallOptions, ChatbridgeError, LanguageModel, Message, StreamAccumulator, StreamPart,
    };

    #[cfg(feature = "llm")]
    pub use chatbridge_llm::{GatewayClient, OllamaClient, ProviderRegistry};

    #[cfg(feature = "prompt")]
    pub use chatbridge_prompt::{parse_messages, system_prompt, validate_code, RequestHints};

    #[cfg(feature = "auth")]
    pub use chatbridge_auth::{TwoFactorService, UserStore};
}
