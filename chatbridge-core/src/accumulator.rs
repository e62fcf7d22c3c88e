use futures::{Stream, StreamExt};

use crate::{ChatbridgeError, FinishReason, GenerateResult, StreamPart, Usage};

/// Folds stream parts back into a complete response.
#[derive(Debug, Default, Clone)]
pub struct StreamAccumulator {
    text: String,
    reasoning: String,
    finish: Option<(FinishReason, Usage)>,
    errors: Vec<String>,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, part: &StreamPart) {
        match part {
            StreamPart::TextDelta { delta, .. } => self.text.push_str(delta),
            StreamPart::ReasoningDelta { delta, .. } => self.reasoning.push_str(delta),
            StreamPart::Finish {
                finish_reason,
                usage,
            } => self.finish = Some((*finish_reason, *usage)),
            StreamPart::Error { message } => self.errors.push(message.clone()),
            StreamPart::TextStart { .. }
            | StreamPart::TextEnd { .. }
            | StreamPart::ReasoningStart { .. }
            | StreamPart::ReasoningEnd { .. } => {}
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn is_finished(&self) -> bool {
        self.finish.is_some()
    }

    pub fn into_result(self) -> GenerateResult {
        let (finish_reason, usage) = self.finish.unwrap_or_default();
        GenerateResult {
            text: self.text,
            reasoning: if self.reasoning.is_empty() {
                None
            } else {
                Some(self.reasoning)
            },
            finish_reason,
            usage,
        }
    }

    /// Drains `stream`, stopping at the first error.
    pub async fn collect<S>(stream: S) -> Result<GenerateResult, ChatbridgeError>
    where
        S: Stream<Item = Result<StreamPart, ChatbridgeError>>,
    {
        let mut accumulator = Self::new();
        futures::pin_mut!(stream);
        while let Some(part) = stream.next().await {
            accumulator.push(&part?);
        }
        Ok(accumulator.into_result())
    }
}
