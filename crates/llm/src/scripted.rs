//! Scripted LLM provider replaying canned segments.
//!
//! Each `stream` call plays the next scripted segment and records the
//! message list it was invoked with, so tests can assert on the
//! continuation request chain without a network.

use crate::{FinishReason, General, LLM, Message, StreamChunk};
use anyhow::Result;
use futures_util::stream::BoxStream;
use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

/// One scripted provider invocation.
#[derive(Debug, Clone)]
pub enum Script {
    /// Yield the given text pieces, then report the finish reason.
    Segment {
        pieces: Vec<String>,
        finish: FinishReason,
    },
    /// Yield the given text pieces, then fail the invocation.
    Error {
        pieces: Vec<String>,
        message: String,
    },
}

impl Script {
    /// A segment yielding `pieces` and finishing with `finish`.
    pub fn segment(pieces: &[&str], finish: FinishReason) -> Self {
        Self::Segment {
            pieces: pieces.iter().map(|p| (*p).to_owned()).collect(),
            finish,
        }
    }

    /// An invocation that fails immediately with `message`.
    pub fn error(message: &str) -> Self {
        Self::Error {
            pieces: Vec::new(),
            message: message.to_owned(),
        }
    }

    /// An invocation that yields `pieces` and then fails with `message`.
    pub fn error_after(pieces: &[&str], message: &str) -> Self {
        Self::Error {
            pieces: pieces.iter().map(|p| (*p).to_owned()).collect(),
            message: message.to_owned(),
        }
    }
}

/// A provider replaying a queue of scripts, one per invocation.
///
/// # Panics
///
/// `stream` panics when invoked with no script left in the queue.
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    scripts: Arc<Mutex<VecDeque<Script>>>,
    invocations: Arc<Mutex<Vec<Vec<Message>>>>,
}

impl ScriptedProvider {
    /// Create a provider with the given script queue.
    pub fn new(scripts: impl IntoIterator<Item = Script>) -> Self {
        Self {
            scripts: Arc::new(Mutex::new(scripts.into_iter().collect())),
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Message lists of every invocation so far, in order.
    pub fn invocations(&self) -> Vec<Vec<Message>> {
        self.invocations.lock().unwrap().clone()
    }

    /// Number of invocations so far.
    pub fn calls(&self) -> usize {
        self.invocations.lock().unwrap().len()
    }
}

impl LLM for ScriptedProvider {
    type ChatConfig = General;

    fn stream(
        &self,
        _config: General,
        messages: &[Message],
    ) -> BoxStream<'static, Result<StreamChunk>> {
        self.invocations.lock().unwrap().push(messages.to_vec());
        let script = self.scripts.lock().unwrap().pop_front();

        Box::pin(async_stream::stream! {
            match script {
                Some(Script::Segment { pieces, finish }) => {
                    for piece in pieces {
                        yield Ok(StreamChunk::text(piece));
                    }
                    yield Ok(StreamChunk::finish(finish));
                }
                Some(Script::Error { pieces, message }) => {
                    for piece in pieces {
                        yield Ok(StreamChunk::text(piece));
                    }
                    yield Err(anyhow::anyhow!(message));
                }
                None => panic!("ScriptedProvider exhausted: no script for this invocation"),
            }
        })
    }
}
