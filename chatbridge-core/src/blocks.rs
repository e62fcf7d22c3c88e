use std::fmt;

use crate::{FinishReason, StreamPart, Usage};

pub type IdGenerator = Box<dyn FnMut() -> String + Send>;

/// Tracks the open text and reasoning blocks of one response and emits the
/// `*-start` / `*-end` parts around deltas.
///
/// Ordering rules:
/// - an open reasoning block is closed before any text delta is emitted;
/// - the text block, once opened, stays open until [`BlockEmitter::finish`];
/// - reasoning that arrives after text has started opens a new block with a
///   fresh id;
/// - after `finish` every further call is a no-op.
pub struct BlockEmitter {
    next_id: IdGenerator,
    text_id: Option<String>,
    reasoning_id: Option<String>,
    finished: bool,
}

impl fmt::Debug for BlockEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockEmitter")
            .field("text_id", &self.text_id)
            .field("reasoning_id", &self.reasoning_id)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Default for BlockEmitter {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockEmitter {
    pub fn new() -> Self {
        Self::with_id_generator(|| uuid::Uuid::new_v4().to_string())
    }

    pub fn with_id_generator(next_id: impl FnMut() -> String + Send + 'static) -> Self {
        Self {
            next_id: Box::new(next_id),
            text_id: None,
            reasoning_id: None,
            finished: false,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn reasoning(&mut self, delta: &str, out: &mut Vec<StreamPart>) {
        if self.finished || delta.is_empty() {
            return;
        }
        let id = match &self.reasoning_id {
            Some(id) => id.clone(),
            None => {
                let id = (self.next_id)();
                out.push(StreamPart::ReasoningStart { id: id.clone() });
                self.reasoning_id = Some(id.clone());
                id
            }
        };
        out.push(StreamPart::ReasoningDelta {
            id,
            delta: delta.to_string(),
        });
    }

    pub fn text(&mut self, delta: &str, out: &mut Vec<StreamPart>) {
        if self.finished || delta.is_empty() {
            return;
        }
        self.close_reasoning(out);
        let id = match &self.text_id {
            Some(id) => id.clone(),
            None => {
                let id = (self.next_id)();
                out.push(StreamPart::TextStart { id: id.clone() });
                self.text_id = Some(id.clone());
                id
            }
        };
        out.push(StreamPart::TextDelta {
            id,
            delta: delta.to_string(),
        });
    }

    pub fn finish(&mut self, finish_reason: FinishReason, usage: Usage, out: &mut Vec<StreamPart>) {
        if self.finished {
            return;
        }
        self.close_reasoning(out);
        if let Some(id) = self.text_id.take() {
            out.push(StreamPart::TextEnd { id });
        }
        out.push(StreamPart::Finish {
            finish_reason,
            usage,
        });
        self.finished = true;
    }

    fn close_reasoning(&mut self, out: &mut Vec<StreamPart>) {
        if let Some(id) = self.reasoning_id.take() {
            out.push(StreamPart::ReasoningEnd { id });
        }
    }
}
