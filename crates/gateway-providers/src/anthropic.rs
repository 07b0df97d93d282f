//! Anthropic Claude provider (Messages API).

use async_trait::async_trait;
use gateway_config::ClaudeSettings;
use gateway_core::{ConversionProvider, GatewayResult, ProviderKind, ProviderResult};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, content_filtered, malformed, non_blank, send_json};
use crate::prompt::PromptTemplates;

/// Default Messages endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default `anthropic-version` header value
pub const DEFAULT_API_VERSION: &str = "2023-06-01";

/// Anthropic provider configuration
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// API key
    pub api_key: SecretString,
    /// Model identifier
    pub model: String,
    /// Messages endpoint URL
    pub base_url: String,
    /// `anthropic-version` header value
    pub api_version: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Completion token ceiling
    pub max_tokens: u32,
}

impl AnthropicConfig {
    /// Create a configuration with default endpoint and limits
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_key(SecretString::new(api_key.into()), &ClaudeSettings::default())
    }

    /// Build from settings, if a key is configured
    #[must_use]
    pub fn from_settings(settings: &ClaudeSettings) -> Option<Self> {
        settings
            .api_key
            .clone()
            .map(|key| Self::from_key(key, settings))
    }

    fn from_key(api_key: SecretString, settings: &ClaudeSettings) -> Self {
        Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            api_version: settings.api_version.clone(),
            timeout: settings.timeout,
            max_tokens: settings.max_tokens,
        }
    }

    /// Set the model
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the endpoint URL
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

/// Anthropic Claude provider implementation
pub struct AnthropicProvider {
    config: AnthropicConfig,
    client: Client,
    prompts: Arc<PromptTemplates>,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: AnthropicConfig, prompts: Arc<PromptTemplates>) -> GatewayResult<Self> {
        let client = build_client(ProviderKind::Claude, config.timeout)?;
        Ok(Self {
            config,
            client,
            prompts,
        })
    }

    fn transform_request(&self, content: &str, style: &str) -> AnthropicRequest {
        let prompt = self.prompts.chat_prompt(content, style);
        AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system: prompt.system,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt.user,
            }],
        }
    }

    fn transform_response(&self, response: AnthropicResponse) -> GatewayResult<ProviderResult> {
        let text = response
            .content
            .iter()
            .filter(|block| block.block_type == "text")
            .find_map(|block| non_blank(block.text.as_deref()));

        match text {
            Some(text) => Ok(ProviderResult::new(
                text,
                response.model.unwrap_or_else(|| self.config.model.clone()),
            )),
            None if response.stop_reason.as_deref() == Some("refusal") => Err(content_filtered(
                ProviderKind::Claude,
                "stop_reason: refusal",
            )),
            None => Err(malformed(
                ProviderKind::Claude,
                format!(
                    "No text content (stop_reason: {})",
                    response.stop_reason.as_deref().unwrap_or("none")
                ),
            )),
        }
    }
}

#[async_trait]
impl ConversionProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Claude
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, content: &str, style: &str) -> GatewayResult<ProviderResult> {
        let request = self.transform_request(content, style);

        debug!(
            provider = "claude",
            model = %self.config.model,
            style = %style,
            "Sending conversion request"
        );

        let builder = self
            .client
            .post(&self.config.base_url)
            .header("x-api-key", self.config.api_key.expose_secret())
            .header("anthropic-version", &self.config.api_version)
            .json(&request);

        let response: AnthropicResponse = send_json(ProviderKind::Claude, builder).await?;
        self.transform_response(response)
    }
}

// Anthropic API Types

#[derive(Debug, Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContentBlock>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContentBlock {
    #[serde(rename = "type")]
    block_type: String,
    #[serde(default)]
    text: Option<String>,
}
