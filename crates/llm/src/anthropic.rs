//! Anthropic Messages API provider.
//!
//! Anthropic streaming events differ from OpenAI's format:
//! - `message_start` — initial message metadata
//! - `content_block_start` — begin a content block
//! - `content_block_delta` — incremental text content
//! - `content_block_stop` — end of a content block
//! - `message_delta` — final stop_reason
//! - `message_stop` — end of message
//!
//! Events are mapped onto [`StreamChunk`] so the rest of the system only
//! ever sees the unified chunk shape.

use crate::{Choice, CompletionMeta, Delta, FinishReason, General, LLM, Message, Role, SseBuffer, StreamChunk};
use anyhow::Result;
use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::{StreamExt, stream::BoxStream};
use reqwest::{Client, header::HeaderMap};
use serde::{Deserialize, Serialize};

/// Anthropic Messages API endpoint.
pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";

/// Messages API version header value.
const API_VERSION: &str = "2023-06-01";

/// Beta header unlocking the 8192-token output cap on 3.5 Sonnet.
const BETA_MAX_TOKENS: &str = "max-tokens-3-5-sonnet-2024-07-15";

/// Anthropic streaming provider.
#[derive(Clone, Debug)]
pub struct Anthropic {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl Anthropic {
    /// Create a provider against the default Messages API endpoint.
    pub fn new(client: Client, key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json".parse()?);
        headers.insert("accept", "text/event-stream".parse()?);
        headers.insert("x-api-key", key.parse()?);
        headers.insert("anthropic-version", API_VERSION.parse()?);
        headers.insert("anthropic-beta", BETA_MAX_TOKENS.parse()?);
        Ok(Self {
            client,
            headers,
            endpoint: ENDPOINT.to_owned(),
        })
    }

    /// The request headers sent with every call.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Request body for the Messages API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    model: CompactString,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    messages: Vec<Message>,
    stream: bool,
}

impl From<General> for Request {
    fn from(config: General) -> Self {
        Self {
            model: config.model,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            system: None,
            messages: Vec::new(),
            stream: true,
        }
    }
}

impl Request {
    /// Attach messages, lifting system messages into the top-level
    /// `system` field. The Messages API accepts only user and assistant
    /// roles in `messages`.
    pub fn messages(mut self, messages: &[Message]) -> Self {
        let mut system: Option<String> = None;
        let mut rest = Vec::with_capacity(messages.len());
        for message in messages {
            match message.role {
                Role::System => match system.as_mut() {
                    Some(s) => {
                        s.push_str("\n\n");
                        s.push_str(&message.content);
                    }
                    None => system = Some(message.content.clone()),
                },
                _ => rest.push(message.clone()),
            }
        }
        self.system = system;
        self.messages = rest;
        self
    }

    /// The lifted system prompt, if any.
    pub fn system(&self) -> Option<&str> {
        self.system.as_deref()
    }

    /// The user/assistant messages sent in the body.
    pub fn conversation(&self) -> &[Message] {
        &self.messages
    }
}

/// A raw SSE event from the Anthropic streaming API.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// Initial message metadata.
    #[serde(rename = "message_start")]
    MessageStart { message: MessageMeta },
    /// Begin a content block.
    #[serde(rename = "content_block_start")]
    ContentBlockStart { content_block: ContentBlock },
    /// Incremental content within a block.
    #[serde(rename = "content_block_delta")]
    ContentBlockDelta { delta: BlockDelta },
    /// End of a content block.
    #[serde(rename = "content_block_stop")]
    ContentBlockStop {},
    /// Final message delta (stop reason).
    #[serde(rename = "message_delta")]
    MessageDelta { delta: MessageDeltaBody },
    /// End of message.
    #[serde(rename = "message_stop")]
    MessageStop,
    /// Ping (keep-alive).
    #[serde(rename = "ping")]
    Ping,
    /// Catch-all for unknown event types.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct MessageMeta {
    pub id: CompactString,
    pub model: CompactString,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum BlockDelta {
    #[serde(rename = "text_delta")]
    TextDelta { text: String },
}

#[derive(Debug, Deserialize)]
pub struct MessageDeltaBody {
    pub stop_reason: Option<CompactString>,
}

impl Event {
    /// Convert this Anthropic event to a unified `StreamChunk`.
    /// Returns `None` for events that don't produce output.
    pub fn into_chunk(self) -> Option<StreamChunk> {
        match self {
            Self::MessageStart { message } => Some(StreamChunk {
                meta: CompletionMeta {
                    id: message.id,
                    object: "chat.completion.chunk".into(),
                    model: message.model,
                    ..Default::default()
                },
                ..Default::default()
            }),
            Self::ContentBlockStart {
                content_block: ContentBlock::Text { text },
            } => {
                if text.is_empty() {
                    None
                } else {
                    Some(StreamChunk::text(text))
                }
            }
            Self::ContentBlockDelta {
                delta: BlockDelta::TextDelta { text },
            } => Some(StreamChunk::text(text)),
            Self::MessageDelta { delta } => {
                let reason = delta.stop_reason.as_deref().map(|r| match r {
                    "end_turn" | "stop" | "stop_sequence" => FinishReason::Stop,
                    "max_tokens" => FinishReason::Length,
                    _ => FinishReason::Other,
                })?;
                Some(StreamChunk {
                    choices: vec![Choice {
                        delta: Delta::default(),
                        finish_reason: Some(reason),
                        ..Default::default()
                    }],
                    ..Default::default()
                })
            }
            Self::ContentBlockStop {} | Self::MessageStop | Self::Ping | Self::Unknown => None,
        }
    }
}

impl LLM for Anthropic {
    type ChatConfig = Request;

    fn stream(
        &self,
        config: Request,
        messages: &[Message],
    ) -> BoxStream<'static, Result<StreamChunk>> {
        let body = config.messages(messages);
        let request = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(&body);

        Box::pin(try_stream! {
            tracing::debug!("sending messages request");
            let response = request.send().await?.error_for_status()?;
            let mut bytes = response.bytes_stream();
            let mut buffer = SseBuffer::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for data in buffer.feed(&chunk) {
                    match serde_json::from_str::<Event>(&data) {
                        Ok(event) => {
                            if let Some(parsed) = event.into_chunk() {
                                yield parsed;
                            }
                        }
                        Err(e) => tracing::warn!("failed to parse event: {e}, data: {data}"),
                    }
                }
            }
            tracing::debug!("messages stream closed");
        })
    }
}
