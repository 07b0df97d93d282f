//! OpenAI provider (Chat Completions API).

use async_trait::async_trait;
use gateway_config::OpenAiSettings;
use gateway_core::{ConversionProvider, GatewayResult, ProviderKind, ProviderResult};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::http::{build_client, content_filtered, malformed, non_blank, send_json};
use crate::prompt::PromptTemplates;

/// Default chat completions endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI provider configuration
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key (bearer token)
    pub api_key: SecretString,
    /// Model identifier
    pub model: String,
    /// Chat completions endpoint URL
    pub base_url: String,
    /// Per-call timeout
    pub timeout: Duration,
    /// Completion token ceiling
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
    /// Nucleus sampling
    pub top_p: f32,
    /// Frequency penalty
    pub frequency_penalty: f32,
    /// Presence penalty
    pub presence_penalty: f32,
}

impl OpenAIConfig {
    /// Create a configuration with default endpoint and sampling
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::from_key(SecretString::new(api_key.into()), &OpenAiSettings::default())
    }

    /// Build from settings, if a key is configured
    #[must_use]
    pub fn from_settings(settings: &OpenAiSettings) -> Option<Self> {
        settings
            .api_key
            .clone()
            .map(|key| Self::from_key(key, settings))
    }

    fn from_key(api_key: SecretString, settings: &OpenAiSettings) -> Self {
        Self {
            api_key,
            model: settings.model.clone(),
            base_url: settings.base_url.clone(),
            timeout: settings.timeout,
            max_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
            frequency_penalty: settings.frequency_penalty,
            presence_penalty: settings.presence_penalty,
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

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: OpenAIConfig,
    client: Client,
    prompts: Arc<PromptTemplates>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be created
    pub fn new(config: OpenAIConfig, prompts: Arc<PromptTemplates>) -> GatewayResult<Self> {
        let client = build_client(ProviderKind::OpenAi, config.timeout)?;
        Ok(Self {
            config,
            client,
            prompts,
        })
    }

    fn transform_request(&self, content: &str, style: &str) -> OpenAIRequest {
        let prompt = self.prompts.chat_prompt(content, style);
        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: prompt.system,
                },
                OpenAIMessage {
                    role: "user",
                    content: prompt.user,
                },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            top_p: self.config.top_p,
            frequency_penalty: self.config.frequency_penalty,
            presence_penalty: self.config.presence_penalty,
        }
    }

    fn transform_response(&self, response: OpenAIResponse) -> GatewayResult<ProviderResult> {
        let Some(choice) = response.choices.into_iter().next() else {
            return Err(malformed(ProviderKind::OpenAi, "No choices in response"));
        };

        let finish_reason = choice.finish_reason.as_deref().unwrap_or("none");
        if finish_reason == "content_filter" {
            return Err(content_filtered(
                ProviderKind::OpenAi,
                "finish_reason: content_filter",
            ));
        }

        let message = choice.message.unwrap_or_default();
        if let Some(text) = non_blank(message.content.as_deref()) {
            return Ok(ProviderResult::new(
                text,
                response.model.unwrap_or_else(|| self.config.model.clone()),
            ));
        }

        if let Some(refusal) = non_blank(message.refusal.as_deref()) {
            return Err(content_filtered(ProviderKind::OpenAi, refusal));
        }

        Err(malformed(
            ProviderKind::OpenAi,
            format!("No message content (finish_reason: {finish_reason})"),
        ))
    }
}

#[async_trait]
impl ConversionProvider for OpenAIProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn invoke(&self, content: &str, style: &str) -> GatewayResult<ProviderResult> {
        let request = self.transform_request(content, style);

        debug!(
            provider = "openai",
            model = %self.config.model,
            style = %style,
            "Sending conversion request"
        );

        let builder = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&request);

        let response: OpenAIResponse = send_json(ProviderKind::OpenAi, builder).await?;
        self.transform_response(response)
    }
}

// OpenAI API Types

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
    presence_penalty: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    #[serde(default)]
    message: Option<OpenAIResponseMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}
