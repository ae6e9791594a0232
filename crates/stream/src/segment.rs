//! Adapter from one provider invocation to a multiplexer source plus an
//! eventual terminal status.

use crate::{StreamError, switchable::Source};
use bytes::Bytes;
use futures_util::StreamExt;
use llm::{FinishReason, StreamChunk};
use tokio::sync::oneshot;

/// Terminal status of one segment, resolved exactly once when its source
/// has been fully drained or has failed.
#[derive(Debug)]
pub enum SegmentStatus {
    /// The invocation completed; `reason` tells whether it was truncated.
    Finished {
        /// The provider-reported finish reason.
        reason: FinishReason,
        /// Accumulated assistant text of this segment.
        text: String,
    },
    /// The invocation failed. The source has already delivered the
    /// underlying error downstream; this carries its message.
    Failed(String),
}

/// Wrap a chunk stream into a byte source and a terminal-status receiver.
///
/// The source forwards delta content as bytes while accumulating the
/// segment text. The status resolves only after the source has been
/// drained by the multiplexer, so every byte of the segment precedes any
/// continuation decision. Dropping the source (consumer disconnect)
/// drops the status sender, which the policy observes as cancellation.
pub fn segment<S>(chunks: S) -> (Source, oneshot::Receiver<SegmentStatus>)
where
    S: futures_core::Stream<Item = anyhow::Result<StreamChunk>> + Send + 'static,
{
    let (status_tx, status_rx) = oneshot::channel();

    let source = async_stream::stream! {
        let mut chunks = std::pin::pin!(chunks);
        let mut text = String::new();
        let mut reason = None;
        let mut status_tx = Some(status_tx);

        while let Some(item) = chunks.next().await {
            match item {
                Ok(chunk) => {
                    if let Some(r) = chunk.reason() {
                        reason = Some(*r);
                    }
                    if let Some(content) = chunk.content() {
                        text.push_str(content);
                        yield Ok(Bytes::from(content.to_owned()));
                    }
                }
                Err(err) => {
                    if let Some(tx) = status_tx.take() {
                        let _ = tx.send(SegmentStatus::Failed(err.to_string()));
                    }
                    yield Err(StreamError::Upstream(err));
                    return;
                }
            }
        }

        // An upstream that ends without reporting a finish reason is a
        // normal stop, never continuable.
        let reason = reason.unwrap_or(FinishReason::Stop);
        if let Some(tx) = status_tx.take() {
            let _ = tx.send(SegmentStatus::Finished { reason, text });
        }
    };

    let source: Source = Box::pin(source);
    (source, status_rx)
}
