//! Translation of Ollama's NDJSON chat stream into [`StreamPart`]s.

use serde::Deserialize;

use chatbridge_core::{BlockEmitter, ChatbridgeError, FinishReason, StreamPart, Usage};

use crate::decode::PartDecoder;
use crate::lines::LineBuffer;

pub const DEFAULT_MAX_LINE_BYTES: usize = 1024 * 1024;

/// Body of `/api/chat`, or one line of it with `stream: true`. Every field is
/// optional on the wire; unknown fields are ignored.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct OllamaChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub message: Option<OllamaResponseMessage>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub done_reason: Option<String>,
    #[serde(default)]
    pub prompt_eval_count: Option<u64>,
    #[serde(default)]
    pub eval_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct OllamaResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub thinking: Option<String>,
}

pub(crate) fn finish_reason(done_reason: Option<&str>) -> FinishReason {
    match done_reason {
        Some("length") => FinishReason::Length,
        _ => FinishReason::Stop,
    }
}

/// Incremental NDJSON decoder. Feed raw body chunks with [`push`] and call
/// [`finish`] once the body ends.
///
/// Lines that are not valid JSON (or not a chat chunk) are dropped. Token
/// counts keep the last non-zero value seen. Input after the `done` line is
/// ignored.
///
/// [`push`]: OllamaStreamAdapter::push
/// [`finish`]: OllamaStreamAdapter::finish
#[derive(Debug)]
pub struct OllamaStreamAdapter {
    lines: LineBuffer,
    blocks: BlockEmitter,
    input_tokens: u64,
    output_tokens: u64,
}

impl Default for OllamaStreamAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl OllamaStreamAdapter {
    pub fn new() -> Self {
        Self::with_blocks(BlockEmitter::new())
    }

    /// Uses `blocks` for id generation, mainly so tests get stable ids.
    pub fn with_blocks(blocks: BlockEmitter) -> Self {
        Self {
            lines: LineBuffer::new(DEFAULT_MAX_LINE_BYTES),
            blocks,
            input_tokens: 0,
            output_tokens: 0,
        }
    }

    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.lines.set_max_line_bytes(max_line_bytes);
        self
    }

    pub fn is_finished(&self) -> bool {
        self.blocks.is_finished()
    }

    pub fn usage(&self) -> Usage {
        Usage::new(self.input_tokens, self.output_tokens)
    }

    /// Buffers `chunk` and returns the parts produced by every line it
    /// completes. Fails only when a pending line grows past the limit.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamPart>, ChatbridgeError> {
        let mut out = Vec::new();
        if self.is_finished() {
            return Ok(out);
        }

        for line in self.lines.push(chunk)? {
            self.process_line(&line, &mut out);
            if self.is_finished() {
                self.lines.clear();
                break;
            }
        }
        Ok(out)
    }

    /// Flushes a trailing line without newline, then closes open blocks and
    /// emits `finish` if the server never sent `done`.
    pub fn finish(&mut self) -> Vec<StreamPart> {
        let mut out = Vec::new();
        if let Some(line) = self.lines.take_rest() {
            self.process_line(&line, &mut out);
        }
        if !self.is_finished() {
            tracing::debug!("ollama stream ended without a done marker");
            let usage = self.usage();
            self.blocks.finish(FinishReason::Unknown, usage, &mut out);
        }
        out
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<StreamPart>) {
        let line = line.trim();
        if line.is_empty() || self.is_finished() {
            return;
        }

        let chunk = match serde_json::from_str::<OllamaChatResponse>(line) {
            Ok(chunk) => chunk,
            Err(err) => {
                tracing::debug!(error = %err, line = %line, "skipping malformed ollama stream line");
                return;
            }
        };
        self.apply(chunk, out);
    }

    fn apply(&mut self, chunk: OllamaChatResponse, out: &mut Vec<StreamPart>) {
        if let Some(message) = chunk.error {
            out.push(StreamPart::Error { message });
        }

        if let Some(message) = chunk.message {
            if let Some(thinking) = message.thinking.as_deref() {
                self.blocks.reasoning(thinking, out);
            }
            if let Some(content) = message.content.as_deref() {
                self.blocks.text(content, out);
            }
        }

        if let Some(count) = chunk.prompt_eval_count.filter(|count| *count > 0) {
            self.input_tokens = count;
        }
        if let Some(count) = chunk.eval_count.filter(|count| *count > 0) {
            self.output_tokens = count;
        }

        if chunk.done {
            let usage = self.usage();
            self.blocks
                .finish(finish_reason(chunk.done_reason.as_deref()), usage, out);
        }
    }
}

impl PartDecoder for OllamaStreamAdapter {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamPart>, ChatbridgeError> {
        OllamaStreamAdapter::push(self, chunk)
    }

    fn finish(&mut self) -> Result<Vec<StreamPart>, ChatbridgeError> {
        Ok(OllamaStreamAdapter::finish(self))
    }

    fn is_finished(&self) -> bool {
        OllamaStreamAdapter::is_finished(self)
    }
}
