//! Request types for the gateway.

use crate::types::ClientIdentity;
use serde::{Deserialize, Serialize};

/// Raw conversion request as received from the caller.
///
/// Both fields are optional at this layer so that a missing field is reported
/// as a validation failure rather than a deserialization error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Text to convert
    #[serde(default)]
    pub content: Option<String>,

    /// Natural-language conversion style (`method` is accepted as an alias)
    #[serde(default, alias = "method")]
    pub style: Option<String>,
}

impl ConversionRequest {
    /// Create a request with both fields present
    #[must_use]
    pub fn new(content: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            style: Some(style.into()),
        }
    }
}

/// Request after validation, sanitization and style resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRequest {
    /// HTML-tag-stripped, trimmed content
    pub clean_content: String,
    /// Style resolved against the preset catalog, or the truncated custom style
    pub normalized_style: String,
    /// Whether `normalized_style` is a member of the preset catalog
    pub style_is_preset: bool,
    /// Rate-limit key derived from the caller's address
    pub client_identity: ClientIdentity,
}
