//! Google Gemini provider (Google AI Studio generateContent API).
//!
//! Authentication uses the `key` query parameter. The system instruction,
//! style instruction and content are sent as a single text part.

use async_trait::async_trait;
use gateway_config::GeminiSettings;
use gateway_core::{ConversionProvider, GatewayResult, ProviderKind, ProviderResult};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, content_filtered, malformed, non_blank, send_json};
use crate::prompt::PromptTemplates;

/// Default API base
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Finish reasons that mean the output was blocked
const BLOCKED_FINISH_REASONS: [&str; 3] = ["SAFETY", "PROHIBITED_CONTENT", "BLOCKLIST"];

/// Google provider configuration
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// API key
    pub api_key: SecretString,
    /// Model identifier
    pub model: String,
    /// API base, without the `/models/...` suffix
    pub base_url: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Sampling temperature
    pub temperature: f32,
    /// Top-k sampling
    pub top_k: u32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Output token ceiling
    pub max_output_tokens: u32,
    /// Harm categories sent with every request
    pub safety_categories: Vec<String>,
    /// Block threshold applied to every category
    pub safety_threshold: String,
}

impl GoogleConfig {
    /// Create a configuration with default endpoint, sampling and safety settings
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_key(SecretString::new(api_key.into()), &GeminiSettings::default())
    }

    /// Build from settings, if a key is configured
    #[must_use]
    pub fn from_settings(settings: &GeminiSettings) -> Option<Self> {
        settings
            .api_key
            .clone()
            .map(|key| Self::from_key(key, settings))
    }

    fn from_key(api_key: SecretString, settings: &GeminiSettings) -> Self {
        Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
            temperature: settings.temperature,
            top_k: settings.top_k,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
            safety_categories: settings.safety_categories.clone(),
            safety_threshold: settings.safety_threshold.clone(),
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the API base
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Google Gemini provider implementation
pub struct GoogleProvider {
    config: GoogleConfig,
    client: Client,
    prompts: Arc<PromptTemplates>,
}

impl GoogleProvider {
    /// Create a new Google provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: GoogleConfig, prompts: Arc<PromptTemplates>) -> GatewayResult<Self> {
        let client = build_client(ProviderKind::Gemini, config.timeout)?;
        Ok(Self {
            config,
            client,
            prompts,
        })
    }

    /// Build the endpoint URL for the configured model (without the key)
    fn endpoint_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn transform_request(&self, content: &str, style: &str) -> GoogleRequest {
        GoogleRequest {
            contents: vec![GoogleContent {
                role: Some("user".to_string()),
                parts: vec![GooglePart {
                    text: Some(self.prompts.single_prompt(content, style)),
                }],
            }],
            generation_config: GoogleGenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: "text/plain",
            },
            safety_settings: self
                .config
                .safety_categories
                .iter()
                .map(|category| GoogleSafetySetting {
                    category: category.clone(),
                    threshold: self.config.safety_threshold.clone(),
                })
                .collect(),
        }
    }

    fn transform_response(&self, response: GoogleResponse) -> GatewayResult<ProviderResult> {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(content_filtered(
                ProviderKind::Gemini,
                format!("promptFeedback.blockReason: {reason}"),
            ));
        }

        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(malformed(ProviderKind::Gemini, "No candidates in response"));
        };

        if let Some(reason) = candidate
            .finish_reason
            .as_deref()
            .filter(|reason| BLOCKED_FINISH_REASONS.contains(reason))
        {
            return Err(content_filtered(
                ProviderKind::Gemini,
                format!("finishReason: {reason}"),
            ));
        }

        let text = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .iter()
            .find_map(|part| non_blank(part.text.as_deref()));

        match text {
            Some(text) => Ok(ProviderResult::new(
                text,
                response
                    .model_version
                    .unwrap_or_else(|| self.config.model.clone()),
            )),
            None => Err(malformed(
                ProviderKind::Gemini,
                format!(
                    "No text in candidate (finishReason: {})",
                    candidate.finish_reason.as_deref().unwrap_or("none")
                ),
            )),
        }
    }
}

#[async_trait]
impl ConversionProvider for GoogleProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, content: &str, style: &str) -> GatewayResult<ProviderResult> {
        let url = self.endpoint_url();
        let request = self.transform_request(content, style);

        debug!(
            provider = "gemini",
            model = %self.config.model,
            url = %url,
            style = %style,
            "Sending conversion request"
        );

        let builder = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.expose_secret().as_str())])
            .json(&request);

        let response: GoogleResponse = send_json(ProviderKind::Gemini, builder).await?;
        self.transform_response(response)
    }
}

// Google API Types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleRequest {
    contents: Vec<GoogleContent>,
    generation_config: GoogleGenerationConfig,
    safety_settings: Vec<GoogleSafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GoogleContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GooglePart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GooglePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GoogleGenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Serialize)]
struct GoogleSafetySetting {
    category: String,
    threshold: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleResponse {
    #[serde(default)]
    candidates: Vec<GoogleCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GooglePromptFeedback>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleCandidate {
    #[serde(default)]
    content: Option<GoogleContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GooglePromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::ErrorKind;
    use serde_json::json;

    fn provider() -> GoogleProvider {
        GoogleProvider::new(
            GoogleConfig::new("g-key"),
            Arc::new(PromptTemplates::default()),
        )
        .unwrap()
    }

    fn response(json: serde_json::Value) -> GoogleResponse {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_endpoint_url_has_no_key() {
        let provider = GoogleProvider::new(
            GoogleConfig::new("g-key").with_base_url("http://localhost:9999/v1beta/"),
            Arc::new(PromptTemplates::default()),
        )
        .unwrap();
        assert_eq!(
            provider.endpoint_url(),
            "http://localhost:9999/v1beta/models/gemma-2-27b-it:generateContent"
        );
        assert!(!provider.endpoint_url().contains("g-key"));
    }

    #[test]
    fn test_transform_request() {
        let json = serde_json::to_value(provider().transform_request("Hi", "formal")).unwrap();
        let text = json["contents"][0]["parts"][0]["text"].as_str().unwrap();
        assert!(text.ends_with("[Text to convert]\nHi"));
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 8192);
        assert_eq!(json["generationConfig"]["responseMimeType"], "text/plain");
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(
            json["safetySettings"][0]["threshold"],
            "BLOCK_MEDIUM_AND_ABOVE"
        );
    }

    #[test]
    fn test_transform_response_text() {
        let result = provider()
            .transform_response(response(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": "Converted.\n"}]},
                    "finishReason": "STOP"
                }],
                "modelVersion": "gemma-2-27b-it"
            })))
            .unwrap();
        assert_eq!(result.text, "Converted.");
        assert_eq!(result.model_identifier, "gemma-2-27b-it");
    }

    #[test]
    fn test_safety_finish_reason_is_filtered() {
        let err = provider()
            .transform_response(response(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamContentFiltered);
    }

    #[test]
    fn test_prompt_block_is_filtered() {
        let err = provider()
            .transform_response(response(json!({
                "promptFeedback": {"blockReason": "PROHIBITED_CONTENT"}
            })))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::UpstreamContentFiltered);
    }

    #[test]
    fn test_missing_text_is_malformed() {
        let err = provider()
            .transform_response(response(json!({
                "candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]
            })))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedUpstreamResponse);

        let err = provider()
            .transform_response(response(json!({"candidates": []})))
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedUpstreamResponse);
    }
}
