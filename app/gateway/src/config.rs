//! Gateway configuration loaded from TOML.

use anyhow::Result;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default system prompt prepended to every conversation unless the
/// client supplies its own system message.
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the user's questions accurately and completely.";

/// Top-level gateway configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Server bind configuration.
    pub server: ServerConfig,
    /// Default LLM configuration; per-request `modelConfig` fields
    /// override these.
    pub llm: LlmConfig,
    /// Streaming limits.
    pub limits: LimitsConfig,
}

/// Server configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 3000,
        }
    }
}

/// Default LLM provider configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Which LLM provider to use when the request names none.
    pub provider: ProviderKind,
    /// Model identifier.
    pub model: CompactString,
    /// API key for the default provider (supports `${ENV_VAR}`
    /// expansion).
    pub api_key: String,
    /// Optional base URL for OpenAI-compatible endpoints.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// System prompt prepended to every conversation.
    pub system_prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Anthropic,
            model: "claude-3-5-sonnet-20240620".into(),
            // Empty key falls through to the provider's environment
            // variable at request time.
            api_key: String::new(),
            base_url: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_owned(),
        }
    }
}

/// Streaming limits.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-segment generation cap, in tokens.
    pub max_tokens: u32,
    /// Maximum number of response segments per logical reply.
    pub max_segments: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tokens: llm::MAX_TOKENS,
            max_segments: stream::MAX_RESPONSE_SEGMENTS,
        }
    }
}

/// Supported LLM providers. Wire names match the client protocol.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Anthropic Messages API (default).
    #[default]
    Anthropic,
    /// OpenAI chat completions API.
    OpenAI,
    /// Google Gemini via its OpenAI-compatible endpoint.
    Google,
    /// Any custom OpenAI-compatible endpoint (LM Studio, Ollama, ...).
    OpenAICompatible,
}

impl GatewayConfig {
    /// Parse a TOML string into a `GatewayConfig`, expanding `${ENV_VAR}`
    /// patterns in supported fields.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        let expanded = expand_env_vars(toml_str);
        let config: Self = toml::from_str(&expanded)?;
        Ok(config)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// The socket address to bind the server to.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

/// Expand `${VAR}` patterns in a string with environment variable values.
///
/// Unknown variables expand to the empty string.
pub fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        match rest[start + 2..].find('}') {
            Some(end) => {
                let name = &rest[start + 2..start + 2 + end];
                if let Ok(value) = std::env::var(name) {
                    result.push_str(&value);
                }
                rest = &rest[start + 2 + end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                return result;
            }
        }
    }

    result.push_str(rest);
    result
}
