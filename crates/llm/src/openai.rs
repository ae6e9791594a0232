//! OpenAI-compatible chat completions provider.
//!
//! Covers the OpenAI API itself plus any endpoint speaking the same
//! protocol (Google's OpenAI-compatible surface, LM Studio, Ollama, ...)
//! via an endpoint override.

use crate::{General, LLM, Message, SseBuffer, StreamChunk};
use anyhow::Result;
use async_stream::try_stream;
use compact_str::CompactString;
use futures_util::{StreamExt, stream::BoxStream};
use reqwest::{
    Client,
    header::{self, HeaderMap},
};
use serde::Serialize;

/// Default OpenAI chat completions endpoint.
pub const ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI-compatible streaming provider.
#[derive(Clone, Debug)]
pub struct OpenAi {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
}

impl OpenAi {
    /// Create a provider against the default OpenAI endpoint.
    pub fn new(client: Client, key: &str) -> Result<Self> {
        Self::with_endpoint(client, key, ENDPOINT)
    }

    /// Create a provider against a custom chat completions endpoint.
    ///
    /// An empty key omits the `Authorization` header, which local
    /// deployments accept.
    pub fn with_endpoint(client: Client, key: &str, endpoint: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "application/json".parse()?);
        headers.insert(header::ACCEPT, "text/event-stream".parse()?);
        if !key.is_empty() {
            headers.insert(header::AUTHORIZATION, format!("Bearer {key}").parse()?);
        }
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.into(),
        })
    }

    /// The resolved chat completions endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The request headers sent with every call.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

/// Request body for the chat completions API.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    model: CompactString,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
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
            messages: Vec::new(),
            stream: true,
        }
    }
}

impl Request {
    /// Attach the message list to the request body.
    pub fn messages(mut self, messages: &[Message]) -> Self {
        self.messages = messages.to_vec();
        self
    }
}

impl LLM for OpenAi {
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
            tracing::debug!("sending chat completions request");
            let response = request.send().await?.error_for_status()?;
            let mut bytes = response.bytes_stream();
            let mut buffer = SseBuffer::new();
            while let Some(chunk) = bytes.next().await {
                let chunk = chunk?;
                for data in buffer.feed(&chunk) {
                    match serde_json::from_str::<StreamChunk>(&data) {
                        Ok(parsed) => yield parsed,
                        Err(e) => tracing::warn!("failed to parse chunk: {e}, data: {data}"),
                    }
                }
            }
            tracing::debug!("chat completions stream closed");
        })
    }
}
