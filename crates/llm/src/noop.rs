//! No-op LLM provider for testing.
//!
//! Implements [`LLM`] but panics on `stream`. Intended for unit tests
//! that exercise configuration and routing logic without making real
//! LLM calls.

use crate::{General, LLM, Message, StreamChunk};
use anyhow::Result;
use futures_util::stream::BoxStream;

/// A no-op LLM provider that panics on any actual LLM call.
///
/// # Panics
///
/// `stream` panics if called. Only use this provider in tests that
/// never invoke LLM methods.
#[derive(Clone, Copy)]
pub struct NoopProvider;

impl LLM for NoopProvider {
    type ChatConfig = General;

    fn stream(
        &self,
        _config: General,
        _messages: &[Message],
    ) -> BoxStream<'static, Result<StreamChunk>> {
        panic!("NoopProvider::stream called — not intended for real LLM calls");
    }
}
