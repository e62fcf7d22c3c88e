//! Conversation parsing, system prompts and teacher-mode helpers.

mod messages;
mod system;
mod validate;

pub use messages::{parse_message, parse_messages, plain_text};
pub use system::{
    system_prompt, system_prompt_for_level, teacher_prompt_for_level, update_document_prompt,
    ArtifactKind, RequestHints, UserLevel, ARTIFACTS_PROMPT, CODE_PROMPT, REASONING_MODEL_ID,
    REGULAR_PROMPT, SHEET_PROMPT, TEACHER_PROMPT, TITLE_PROMPT,
};
pub use validate::{validate_code, CodeLanguage, CodeValidation};
