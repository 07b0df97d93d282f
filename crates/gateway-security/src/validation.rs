//! Input validation.
//!
//! Checks run in a fixed order and the first failure wins: presence, length
//! bounds, blank input, dangerous patterns. Only then is markup stripped and
//! the style resolved against the preset catalog.

use gateway_core::{ClassifiedError, GatewayResult, NormalizedRequest, PresetStyleCatalog};
use tracing::warn;

use crate::identity::client_identity;
use crate::sanitize::{strip_html, DangerousPatterns};

/// Size bounds applied by [`InputValidator`], in characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Maximum content length
    pub max_content_chars: usize,
    /// Maximum style length
    pub max_style_chars: usize,
    /// Custom styles are truncated to this length
    pub max_custom_style_chars: usize,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_content_chars: 1000,
            max_style_chars: 100,
            max_custom_style_chars: 50,
        }
    }
}

/// Validates and normalizes untrusted conversion input
#[derive(Debug, Clone)]
pub struct InputValidator {
    config: ValidatorConfig,
    patterns: DangerousPatterns,
    catalog: PresetStyleCatalog,
}

impl InputValidator {
    /// Create a new input validator.
    #[must_use]
    pub fn new(
        config: ValidatorConfig,
        patterns: DangerousPatterns,
        catalog: PresetStyleCatalog,
    ) -> Self {
        Self {
            config,
            patterns,
            catalog,
        }
    }

    /// Validate a request and derive its normalized form.
    ///
    /// # Errors
    /// Returns `ValidationFailed` with a message naming the problem.
    pub fn validate(
        &self,
        content: Option<&str>,
        style: Option<&str>,
        caller_address: &str,
    ) -> GatewayResult<NormalizedRequest> {
        let (Some(content), Some(style)) = (content, style) else {
            return Err(ClassifiedError::validation(
                "Both content and style are required",
            ));
        };

        if content.chars().count() > self.config.max_content_chars {
            return Err(ClassifiedError::validation(format!(
                "Content must be at most {} characters",
                self.config.max_content_chars
            )));
        }

        if style.chars().count() > self.config.max_style_chars {
            return Err(ClassifiedError::validation(format!(
                "Style must be at most {} characters",
                self.config.max_style_chars
            )));
        }

        if content.trim().is_empty() || style.trim().is_empty() {
            return Err(ClassifiedError::validation(
                "Content and style must not be blank",
            ));
        }

        let client_identity = client_identity(caller_address);

        let combined = format!("{content} {style}");
        if let Some(pattern) = self.patterns.find(&combined) {
            warn!(
                client_id = %client_identity,
                pattern = %pattern,
                "Dangerous input pattern detected"
            );
            return Err(ClassifiedError::validation("Inappropriate input detected"));
        }

        let clean_content = strip_html(content);
        let clean_style = strip_html(style);
        if clean_content.is_empty() || clean_style.is_empty() {
            return Err(ClassifiedError::validation(
                "Content and style must contain text outside of markup",
            ));
        }

        let resolved = self
            .catalog
            .resolve(&clean_style, self.config.max_custom_style_chars);

        Ok(NormalizedRequest {
            clean_content,
            normalized_style: resolved.name,
            style_is_preset: resolved.is_preset,
            client_identity,
        })
    }
}
