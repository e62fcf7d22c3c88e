use chatbridge_core::{BlockEmitter, ChatbridgeError, FinishReason, StreamPart, Usage};

use super::types::ChatCompletionChunk;
use crate::decode::PartDecoder;
use crate::lines::LineBuffer;

const MAX_EVENT_BYTES: usize = 1024 * 1024;

fn parse_sse_line(line: &str) -> Option<&str> {
    line.trim().strip_prefix("data:").map(str::trim_start)
}

/// Incremental decoder for the gateway's `text/event-stream` body.
///
/// Unlike the Ollama adapter, a `data:` payload that is not valid JSON fails
/// the stream.
#[derive(Debug)]
pub struct GatewaySseAdapter {
    lines: LineBuffer,
    blocks: BlockEmitter,
    finish_reason: Option<FinishReason>,
    usage: Usage,
}

impl Default for GatewaySseAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl GatewaySseAdapter {
    pub fn new() -> Self {
        Self::with_blocks(BlockEmitter::new())
    }

    pub fn with_blocks(blocks: BlockEmitter) -> Self {
        Self {
            lines: LineBuffer::new(MAX_EVENT_BYTES),
            blocks,
            finish_reason: None,
            usage: Usage::default(),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.blocks.is_finished()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamPart>, ChatbridgeError> {
        let mut out = Vec::new();
        if self.is_finished() {
            return Ok(out);
        }
        for line in self.lines.push(chunk)? {
            self.process_line(&line, &mut out)?;
            if self.is_finished() {
                self.lines.clear();
                break;
            }
        }
        Ok(out)
    }

    pub fn finish(&mut self) -> Result<Vec<StreamPart>, ChatbridgeError> {
        let mut out = Vec::new();
        if let Some(line) = self.lines.take_rest() {
            self.process_line(&line, &mut out)?;
        }
        self.close(&mut out);
        Ok(out)
    }

    fn close(&mut self, out: &mut Vec<StreamPart>) {
        let reason = self.finish_reason.unwrap_or(FinishReason::Unknown);
        self.blocks.finish(reason, self.usage, out);
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<StreamPart>) -> Result<(), ChatbridgeError> {
        let Some(data) = parse_sse_line(line) else {
            return Ok(());
        };
        if data.is_empty() {
            return Ok(());
        }
        if data == "[DONE]" {
            self.close(out);
            return Ok(());
        }

        let chunk: ChatCompletionChunk =
            serde_json::from_str(data).map_err(|err| ChatbridgeError::ParseFailed {
                output: data.to_string(),
                reason: err.to_string(),
            })?;

        if let Some(error) = chunk.error {
            return Err(ChatbridgeError::Provider(error.message));
        }

        if let Some(choice) = chunk.choices.into_iter().next() {
            if let Some(reasoning) = choice.delta.reasoning.as_deref() {
                self.blocks.reasoning(reasoning, out);
            }
            if let Some(content) = choice.delta.content.as_deref() {
                self.blocks.text(content, out);
            }
            if let Some(reason) = choice.finish_reason.as_deref() {
                self.finish_reason = Some(FinishReason::from_openai(reason));
            }
        }

        if let Some(usage) = chunk.usage {
            self.usage = usage.into();
        }
        Ok(())
    }
}

impl PartDecoder for GatewaySseAdapter {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamPart>, ChatbridgeError> {
        GatewaySseAdapter::push(self, chunk)
    }

    fn finish(&mut self) -> Result<Vec<StreamPart>, ChatbridgeError> {
        GatewaySseAdapter::finish(self)
    }

    fn is_finished(&self) -> bool {
        GatewaySseAdapter::is_finished(self)
    }
}
