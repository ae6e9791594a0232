//! Provider construction, credential resolution, and caching.
//!
//! Providers are cached per (kind, key) so repeated requests reuse their
//! HTTP connections. The registry is an explicit value on the app state
//! — not process-global — and can be cleared to pick up rotated
//! credentials. Per-request key overrides and custom endpoints bypass
//! the cache.

use crate::config::{GatewayConfig, ProviderKind};
use anyhow::Result;
use compact_str::CompactString;
use futures_util::stream::BoxStream;
use llm::{Anthropic, Client, General, LLM, Message, OpenAi, StreamChunk};
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Mutex};
use thiserror::Error;

/// Google's OpenAI-compatible chat completions endpoint.
pub const GOOGLE_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai/chat/completions";

/// Default endpoint for OpenAI-compatible local deployments.
pub const COMPATIBLE_DEFAULT_BASE_URL: &str = "http://localhost:1234/v1";

/// Setup-time failure, surfaced as the structured JSON error before any
/// stream opens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The request named a provider the gateway doesn't know.
    #[error("unknown provider: {0}")]
    UnknownProvider(CompactString),

    /// No API key could be resolved for the provider.
    #[error("API key for provider \"{0}\" is not configured")]
    MissingKey(&'static str),

    /// Provider construction failed (malformed key or endpoint).
    #[error("failed to initialize provider")]
    Init(anyhow::Error),
}

impl ConfigError {
    /// Underlying detail message, when one exists.
    pub fn details(&self) -> Option<String> {
        match self {
            Self::Init(source) => Some(source.to_string()),
            _ => None,
        }
    }
}

/// Parse a provider name from the client protocol into a `ProviderKind`.
pub fn parse_provider(name: &str) -> Result<ProviderKind, ConfigError> {
    match name {
        "Anthropic" => Ok(ProviderKind::Anthropic),
        "OpenAI" => Ok(ProviderKind::OpenAI),
        "Google" => Ok(ProviderKind::Google),
        "OpenAICompatible" => Ok(ProviderKind::OpenAICompatible),
        other => Err(ConfigError::UnknownProvider(other.into())),
    }
}

/// Custom endpoint configuration supplied by the client per request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomEndpoint {
    /// Base URL of the OpenAI-compatible endpoint.
    #[serde(rename = "baseURL")]
    pub base_url: Option<String>,
    /// API key for that endpoint.
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
}

/// Unified provider enum for runtime dispatch across LLM backends.
///
/// The registry constructs the appropriate variant from `ProviderKind`;
/// `impl LLM` delegates to the inner provider, converting `General` to
/// the variant's native request format via `From<General>`.
#[derive(Clone, Debug)]
pub enum Provider {
    /// Anthropic Messages API.
    Anthropic(Anthropic),
    /// OpenAI-compatible API (covers OpenAI, Google, custom endpoints).
    OpenAi(OpenAi),
}

impl LLM for Provider {
    type ChatConfig = General;

    fn stream(
        &self,
        config: General,
        messages: &[Message],
    ) -> BoxStream<'static, Result<StreamChunk>> {
        match self {
            Self::Anthropic(p) => p.stream(llm::anthropic::Request::from(config), messages),
            Self::OpenAi(p) => p.stream(llm::openai::Request::from(config), messages),
        }
    }
}

/// Caching provider registry.
pub struct ProviderRegistry {
    client: Client,
    cache: Mutex<BTreeMap<CompactString, Provider>>,
}

impl ProviderRegistry {
    /// Create an empty registry sharing one HTTP client.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            cache: Mutex::new(BTreeMap::new()),
        }
    }

    /// Resolve a provider for a request.
    ///
    /// Resolution order for the API key: per-request override, the
    /// configured default (when the kind matches), then the provider's
    /// environment variable. A custom key or endpoint yields a fresh,
    /// uncached provider so credentials never outlive the request that
    /// supplied them.
    pub fn resolve(
        &self,
        config: &GatewayConfig,
        kind: ProviderKind,
        custom_key: Option<&str>,
        endpoint: Option<&CustomEndpoint>,
    ) -> Result<Provider, ConfigError> {
        if kind == ProviderKind::OpenAICompatible {
            return self.compatible(config, custom_key, endpoint);
        }

        if let Some(key) = custom_key {
            return self.build(kind, key);
        }

        let key = self.api_key(config, kind)?;
        let prefix = key.get(..10).unwrap_or(&key);
        let cache_key: CompactString = format!("{kind:?}:{prefix}").into();

        let mut cache = self.cache.lock().unwrap();
        if let Some(provider) = cache.get(&cache_key) {
            return Ok(provider.clone());
        }

        let provider = self.build(kind, &key)?;
        cache.insert(cache_key, provider.clone());
        Ok(provider)
    }

    /// Drop all cached providers (credential rotation).
    pub fn clear(&self) {
        self.cache.lock().unwrap().clear();
    }

    /// Number of cached providers.
    pub fn len(&self) -> usize {
        self.cache.lock().unwrap().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.lock().unwrap().is_empty()
    }

    /// Build an OpenAI-compatible provider. Never cached: the endpoint
    /// configuration is per-request.
    fn compatible(
        &self,
        config: &GatewayConfig,
        custom_key: Option<&str>,
        endpoint: Option<&CustomEndpoint>,
    ) -> Result<Provider, ConfigError> {
        let base_url = endpoint
            .and_then(|e| e.base_url.clone())
            .or_else(|| std::env::var("OPENAI_COMPATIBLE_BASE_URL").ok())
            .or_else(|| config.llm.base_url.clone())
            .unwrap_or_else(|| COMPATIBLE_DEFAULT_BASE_URL.to_owned());

        // Compatible endpoints may run without a key (local deployments).
        let key = endpoint
            .and_then(|e| e.api_key.clone())
            .or_else(|| custom_key.map(str::to_owned))
            .or_else(|| std::env::var("OPENAI_COMPATIBLE_API_KEY").ok())
            .unwrap_or_default();

        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        OpenAi::with_endpoint(self.client.clone(), &key, endpoint)
            .map(Provider::OpenAi)
            .map_err(ConfigError::Init)
    }

    /// Construct a provider of the given kind with the given key.
    fn build(&self, kind: ProviderKind, key: &str) -> Result<Provider, ConfigError> {
        let provider = match kind {
            ProviderKind::Anthropic => {
                Provider::Anthropic(Anthropic::new(self.client.clone(), key).map_err(ConfigError::Init)?)
            }
            ProviderKind::OpenAI => {
                Provider::OpenAi(OpenAi::new(self.client.clone(), key).map_err(ConfigError::Init)?)
            }
            ProviderKind::Google => Provider::OpenAi(
                OpenAi::with_endpoint(self.client.clone(), key, GOOGLE_ENDPOINT)
                    .map_err(ConfigError::Init)?,
            ),
            ProviderKind::OpenAICompatible => {
                unreachable!("compatible providers are built per-request")
            }
        };
        Ok(provider)
    }

    /// Resolve the API key for a provider: configured default first (when
    /// it matches the kind), then the provider's environment variable.
    fn api_key(&self, config: &GatewayConfig, kind: ProviderKind) -> Result<String, ConfigError> {
        if kind == config.llm.provider && !config.llm.api_key.is_empty() {
            return Ok(config.llm.api_key.clone());
        }

        let (var, name) = match kind {
            ProviderKind::Anthropic => ("ANTHROPIC_API_KEY", "Anthropic"),
            ProviderKind::OpenAI => ("OPENAI_API_KEY", "OpenAI"),
            ProviderKind::Google => ("GOOGLE_GENERATIVE_AI_API_KEY", "Google"),
            ProviderKind::OpenAICompatible => ("OPENAI_COMPATIBLE_API_KEY", "OpenAICompatible"),
        };

        std::env::var(var)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingKey(name))
    }
}
