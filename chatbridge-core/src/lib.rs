mod accumulator;
mod blocks;
mod channel;
mod error;
mod message;
mod model;
mod stream_part;

pub use accumulator::StreamAccumulator;
pub use blocks::{BlockEmitter, IdGenerator};
pub use channel::{spawn_part_channel, PartReceiver};
pub use error::ChatbridgeError;
pub use message::{ContentPart, Message, Role};
pub use model::{CallOptions, GenerateResult, LanguageModel, PartStream};
pub use stream_part::{FinishReason, StreamPart, Usage};
