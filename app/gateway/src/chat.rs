//! The `/chat` route — streaming chat with transparent segment
//! continuation.
//!
//! Setup failures (unknown provider, missing credential) are answered
//! with a structured JSON error before any stream opens. Once streaming
//! has started, terminal errors propagate through the response body.

use crate::{
    registry::{ConfigError, CustomEndpoint, parse_provider},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use compact_str::CompactString;
use llm::{General, Message, Role};
use serde::{Deserialize, Serialize};
use stream::Continuation;

/// Chat request payload. Field names match the client wire protocol.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    /// Conversation so far, oldest first.
    pub messages: Vec<Message>,
    /// Per-request model configuration.
    pub model_config: Option<ModelConfig>,
    /// Per-request API key override for the selected provider.
    pub api_key: Option<String>,
    /// Custom OpenAI-compatible endpoint.
    pub custom_endpoint: Option<CustomEndpoint>,
}

/// Per-request model configuration overriding the gateway defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModelConfig {
    /// Provider name (`Anthropic`, `OpenAI`, `Google`,
    /// `OpenAICompatible`).
    pub provider: Option<CompactString>,
    /// Model identifier.
    pub model: Option<CompactString>,
    /// Per-segment token cap.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Nucleus sampling cutoff.
    pub top_p: Option<f32>,
}

/// Structured error payload returned when setup fails before streaming.
#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub error: String,
    /// Underlying detail, when one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Axum handler for `POST /chat`.
pub async fn chat(State(state): State<AppState>, Json(request): Json<ChatRequest>) -> Response {
    match respond(&state, request) {
        Ok(response) => response,
        Err(err) => {
            tracing::error!("chat setup failed: {err}");
            let payload = ErrorPayload {
                error: err.to_string(),
                details: err.details(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

/// Resolve the provider and start the continuation run.
fn respond(state: &AppState, request: ChatRequest) -> Result<Response, ConfigError> {
    let config = &state.config;
    let model_config = request.model_config.unwrap_or_default();

    let kind = match &model_config.provider {
        Some(name) => parse_provider(name)?,
        None => config.llm.provider,
    };
    let provider = state.registry.resolve(
        config,
        kind,
        request.api_key.as_deref(),
        request.custom_endpoint.as_ref(),
    )?;

    let general = General {
        model: model_config
            .model
            .unwrap_or_else(|| config.llm.model.clone()),
        max_tokens: model_config.max_tokens.unwrap_or(config.limits.max_tokens),
        temperature: model_config.temperature,
        top_p: model_config.top_p,
    };

    let messages = build_messages(&config.llm.system_prompt, &request.messages);
    let output = Continuation::new(provider, general, messages)
        .with_max_segments(config.limits.max_segments)
        .stream();

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(output),
    )
        .into_response())
}

/// Prepend the system prompt, unless the client already supplied one or
/// the prompt is empty.
pub fn build_messages(system_prompt: &str, history: &[Message]) -> Vec<Message> {
    let needs_system =
        history.first().map(|m| m.role) != Some(Role::System) && !system_prompt.is_empty();
    let mut messages = Vec::with_capacity(history.len() + usize::from(needs_system));

    if needs_system {
        messages.push(Message::system(system_prompt));
    }
    messages.extend_from_slice(history);

    messages
}
