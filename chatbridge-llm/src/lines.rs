use bytes::BytesMut;

use chatbridge_core::ChatbridgeError;

/// Splits a byte stream into `\n`-terminated lines, holding at most
/// `max_line_bytes` of an unfinished line. Lines are decoded lossily after
/// they are complete, so multi-byte characters split across chunks survive.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    buffer: BytesMut,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            buffer: BytesMut::new(),
            max_line_bytes: max_line_bytes.max(1),
        }
    }

    pub fn set_max_line_bytes(&mut self, max_line_bytes: usize) {
        self.max_line_bytes = max_line_bytes.max(1);
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, ChatbridgeError> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            if pos > self.max_line_bytes {
                return Err(self.overflow());
            }
            let line = self.buffer.split_to(pos + 1);
            lines.push(decode(&line));
        }

        if self.buffer.len() > self.max_line_bytes {
            return Err(self.overflow());
        }
        Ok(lines)
    }

    fn overflow(&mut self) -> ChatbridgeError {
        self.buffer.clear();
        ChatbridgeError::LineTooLong {
            limit: self.max_line_bytes,
        }
    }

    /// The unterminated remainder, if any.
    pub fn take_rest(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest = self.buffer.split();
        Some(decode(&rest))
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

fn decode(line: &[u8]) -> String {
    String::from_utf8_lossy(line)
        .trim_end_matches(|c| c == '\r' || c == '\n')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_partial_lines_until_newline() {
        let mut lines = LineBuffer::new(64);
        assert!(lines.push(b"{\"a\":").unwrap().is_empty());
        assert_eq!(lines.push(b"1}\r\n{\"b\"").unwrap(), ["{\"a\":1}"]);
        assert_eq!(lines.take_rest().as_deref(), Some("{\"b\""));
        assert_eq!(lines.take_rest(), None);
    }

    #[test]
    fn multibyte_characters_split_across_chunks_decode_cleanly() {
        let text = "héllo\n".as_bytes();
        let mut lines = LineBuffer::new(64);
        assert!(lines.push(&text[..2]).unwrap().is_empty());
        assert_eq!(lines.push(&text[2..]).unwrap(), ["héllo"]);
    }

    #[test]
    fn oversized_pending_line_is_rejected() {
        let mut lines = LineBuffer::new(4);
        let err = lines.push(b"abcdef").unwrap_err();
        assert!(matches!(err, ChatbridgeError::LineTooLong { limit: 4 }));
        assert_eq!(lines.take_rest(), None);
    }

    #[test]
    fn oversized_complete_line_is_rejected() {
        let mut lines = LineBuffer::new(4);
        let mut chunk = vec![b'y'; 45];
        chunk.push(b'\n');
        let err = lines.push(&chunk).unwrap_err();
        assert!(matches!(err, ChatbridgeError::LineTooLong { limit: 4 }));
        assert_eq!(lines.take_rest(), None);
    }

    #[test]
    fn line_at_the_limit_is_accepted() {
        let mut lines = LineBuffer::new(4);
        assert_eq!(lines.push(b"abcd\n").unwrap(), ["abcd"]);
    }
}
