//! Response types for the gateway.

use serde::{Deserialize, Serialize};

/// Successful output of a single provider invocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderResult {
    /// Converted text, trimmed
    pub text: String,
    /// Model that produced the text
    pub model_identifier: String,
}

impl ProviderResult {
    /// Create a new provider result
    #[must_use]
    pub fn new(text: impl Into<String>, model_identifier: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model_identifier: model_identifier.into(),
        }
    }
}

/// Provider-agnostic conversion result returned to the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResponse {
    /// The converted text
    pub converted_text: String,
    /// Information about how the conversion was performed
    pub meta: ConversionMeta,
    /// Caller quota after this request
    pub usage: UsageInfo,
}

/// Conversion metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMeta {
    /// Normalized style that was applied
    pub style_used: String,
    /// Whether the style came from the preset catalog
    pub style_is_preset: bool,
    /// Code-point length of the sanitized input
    pub original_length: usize,
    /// Code-point length of the converted text
    pub converted_length: usize,
    /// Wall-clock time spent in the pipeline
    pub processing_time_ms: u64,
    /// Model that produced the text
    pub model_identifier: String,
    /// Display name of the provider
    pub provider_name: String,
}

/// Rate-limit usage reported with each success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Requests allowed per window
    pub limit: u32,
    /// Requests left in the current window
    pub remaining: u32,
}
