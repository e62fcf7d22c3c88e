use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;

use crate::{ChatbridgeError, PartStream, StreamPart};

pub type PartReceiver = ReceiverStream<Result<StreamPart, ChatbridgeError>>;

/// Drives `stream` on a background task and forwards its items through a
/// bounded channel of `capacity` slots.
///
/// The producer waits while the channel is full. Cancelling `cancel` stops the
/// task and delivers a final `Cancelled` error if the receiver is still
/// listening; dropping the receiver stops the task and drops the upstream
/// stream (and with it any in-flight HTTP request). The first error ends the
/// forwarding.
pub fn spawn_part_channel(
    stream: PartStream,
    capacity: usize,
    cancel: CancellationToken,
) -> PartReceiver {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    tokio::spawn(async move {
        let mut stream = stream;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    let _ = tx.try_send(Err(ChatbridgeError::Cancelled));
                    tracing::debug!("part stream cancelled");
                    break;
                }
                _ = tx.closed() => {
                    tracing::debug!("part receiver dropped");
                    break;
                }
                next = stream.next() => match next {
                    Some(item) => {
                        let failed = item.is_err();
                        if tx.send(item).await.is_err() || failed {
                            break;
                        }
                    }
                    None => break,
                },
            }
        }
    });
    ReceiverStream::new(rx)
}
