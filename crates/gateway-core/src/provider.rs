//! Provider abstraction.
//!
//! Every upstream LLM service is hidden behind [`ConversionProvider`]. The
//! orchestrator selects one implementation per request through [`ProviderKind`]
//! and never falls back to another.

use crate::error::GatewayResult;
use crate::response::ProviderResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported upstream providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Anthropic Claude (Messages API)
    Claude,
    /// Google Gemini (generateContent API)
    Gemini,
    /// OpenAI (Chat Completions API)
    #[serde(rename = "openai")]
    OpenAi,
}

impl ProviderKind {
    /// All providers, in endpoint order
    pub const ALL: [Self; 3] = [Self::Claude, Self::Gemini, Self::OpenAi];

    /// Stable lowercase identifier used in logs, metrics and config
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::OpenAi => "openai",
        }
    }

    /// Name shown to callers in response metadata
    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Claude => "Claude",
            Self::Gemini => "Gemini",
            Self::OpenAi => "ChatGPT",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capability shared by every provider adapter.
///
/// `invoke` performs exactly one upstream call. Retrying is the caller's job.
#[async_trait]
pub trait ConversionProvider: Send + Sync {
    /// Which provider this adapter talks to
    fn kind(&self) -> ProviderKind;

    /// Configured model identifier
    fn model(&self) -> &str;

    /// Convert `content` into `style`
    async fn invoke(&self, content: &str, style: &str) -> GatewayResult<ProviderResult>;
}
