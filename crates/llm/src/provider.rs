//! Provider abstractions for the unified LLM interfaces

use crate::{General, Message, StreamChunk};
use anyhow::Result;
use futures_util::stream::BoxStream;

/// A trait for LLM providers
///
/// One `stream` call is one model invocation: the returned stream yields
/// delta chunks and ends once the provider reports a terminal status.
/// The returned stream owns everything it needs — it must not borrow from
/// `self` or the message list, so it can outlive the call site.
pub trait LLM: Clone + Send + Sync + 'static {
    /// The chat configuration.
    type ChatConfig: From<General> + Clone + Send + 'static;

    /// Send a message list to the LLM with streaming
    fn stream(
        &self,
        config: Self::ChatConfig,
        messages: &[Message],
    ) -> BoxStream<'static, Result<StreamChunk>>;
}
