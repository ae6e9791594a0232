//! Shared application state for the gateway server.

use crate::{config::GatewayConfig, registry::ProviderRegistry};
use std::sync::Arc;

/// Shared state available to all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Gateway configuration (immutable after init).
    pub config: Arc<GatewayConfig>,
    /// Provider registry.
    pub registry: Arc<ProviderRegistry>,
}

impl AppState {
    /// Build app state from a loaded configuration.
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config: Arc::new(config),
            registry: Arc::new(ProviderRegistry::new(llm::Client::new())),
        }
    }
}
