//! Configuration for a chat

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Default per-segment generation cap, in tokens.
pub const MAX_TOKENS: u32 = 8192;

/// Chat configuration shared across providers.
///
/// Each provider converts this into its native request format via
/// `From<General>`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct General {
    /// The model to use
    pub model: CompactString,

    /// Per-segment generation cap, in tokens
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Nucleus sampling cutoff
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl General {
    /// Create a new configuration
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            max_tokens: MAX_TOKENS,
            temperature: None,
            top_p: None,
        }
    }
}

impl Default for General {
    fn default() -> Self {
        Self::new("claude-3-5-sonnet-20240620")
    }
}
