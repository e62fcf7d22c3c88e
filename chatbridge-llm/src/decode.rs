use std::fmt::Display;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};

use chatbridge_core::{ChatbridgeError, PartStream, StreamPart};

/// An incremental body decoder that turns raw chunks into stream parts.
pub trait PartDecoder: Send + 'static {
    fn push(&mut self, chunk: &[u8]) -> Result<Vec<StreamPart>, ChatbridgeError>;

    /// Called once when the body ends.
    fn finish(&mut self) -> Result<Vec<StreamPart>, ChatbridgeError>;

    fn is_finished(&self) -> bool;
}

struct DecodeState<D, E> {
    body: BoxStream<'static, Result<Bytes, E>>,
    decoder: D,
    provider: &'static str,
}

/// Drives `decoder` over `body`. The body is read only as fast as the returned
/// stream is polled, and dropping the stream drops the body.
///
/// A transport error or a decoder error yields one `Err` and ends the stream.
/// Reading stops as soon as the decoder reports it is finished.
pub fn part_stream<D, E>(
    body: BoxStream<'static, Result<Bytes, E>>,
    decoder: D,
    provider: &'static str,
) -> PartStream
where
    D: PartDecoder,
    E: Display + Send + 'static,
{
    let state = DecodeState {
        body,
        decoder,
        provider,
    };

    stream::unfold(Some(state), |state| async move {
        let mut state = state?;
        let batch = match state.body.next().await {
            Some(Ok(bytes)) => match state.decoder.push(&bytes) {
                Ok(parts) if state.decoder.is_finished() => return Some((ok_all(parts), None)),
                Ok(parts) => ok_all(parts),
                Err(err) => return Some((vec![Err(err)], None)),
            },
            Some(Err(err)) => {
                let err = ChatbridgeError::connection(state.provider, err);
                return Some((vec![Err(err)], None));
            }
            None => {
                let items = match state.decoder.finish() {
                    Ok(parts) => ok_all(parts),
                    Err(err) => vec![Err(err)],
                };
                return Some((items, None));
            }
        };
        Some((batch, Some(state)))
    })
    .flat_map(stream::iter)
    .boxed()
}

fn ok_all(parts: Vec<StreamPart>) -> Vec<Result<StreamPart, ChatbridgeError>> {
    parts.into_iter().map(Ok).collect()
}
