//! HTTP API for the chatbridge backend.

mod config;
mod error;
pub mod gate;
mod identity;
mod routes;
mod state;
mod title;

pub use config::ServerConfig;
pub use error::ServerError;
pub use identity::{Identity, USER_EMAIL_HEADER, USER_ID_HEADER, USER_TYPE_HEADER};
pub use routes::{router, ChatRequest, TitleRequest};
pub use state::AppState;
pub use title::{generate_title, title_from_text, DEFAULT_TITLE, DEFAULT_TITLE_MODEL};
