//! Configuration model.
//!
//! Every field carries a serde default so that a partial file (or no file at
//! all) yields a complete configuration. Durations use humantime strings
//! such as `"15s"` or `"1h"`.

use gateway_core::{PresetStyleCatalog, ProviderKind};
use regex::RegexBuilder;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use validator::Validate;

use crate::error::ConfigError;

/// Root configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream provider settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Rate and size limits
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Preset styles and prompt template overrides
    #[serde(default)]
    pub styles: StylesConfig,

    /// Input screening
    #[serde(default)]
    pub security: SecurityConfig,

    /// Upstream retry policy
    #[serde(default)]
    pub retry: RetrySettings,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl GatewayConfig {
    /// Check the configuration is usable before serving traffic
    pub fn validate(&self) -> Result<(), ConfigError> {
        Validate::validate(&self.server)?;
        Validate::validate(&self.limits)?;
        Validate::validate(&self.styles)?;
        Validate::validate(&self.retry)?;

        if !ProviderKind::ALL
            .iter()
            .any(|kind| self.providers.is_configured(*kind))
        {
            return Err(ConfigError::Invalid(
                "no provider API key configured (set CLAUDE_API_KEY, GEMINI_API_KEY or OPENAI_API_KEY)"
                    .to_string(),
            ));
        }

        for pattern in &self.security.dangerous_patterns {
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| {
                    ConfigError::Invalid(format!("dangerous pattern {pattern:?}: {e}"))
                })?;
        }

        Ok(())
    }

    /// Build the preset style catalog
    #[must_use]
    pub fn preset_catalog(&self) -> PresetStyleCatalog {
        PresetStyleCatalog::new(self.styles.presets.iter().cloned())
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Bind address
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Deployment environment reported by `/health`
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Maximum request body size in bytes
    #[serde(default = "default_body_limit")]
    #[validate(range(min = 1))]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_environment() -> String {
    "production".to_string()
}

fn default_body_limit() -> usize {
    10 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

/// Per-provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Anthropic Claude
    #[serde(default)]
    pub claude: ClaudeSettings,

    /// Google Gemini
    #[serde(default)]
    pub gemini: GeminiSettings,

    /// OpenAI
    #[serde(default)]
    pub openai: OpenAiSettings,
}

impl ProvidersConfig {
    /// Whether a credential is present for `kind`
    #[must_use]
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        match kind {
            ProviderKind::Claude => self.claude.api_key.is_some(),
            ProviderKind::Gemini => self.gemini.api_key.is_some(),
            ProviderKind::OpenAi => self.openai.api_key.is_some(),
        }
    }

    /// Configured model for `kind`
    #[must_use]
    pub fn model(&self, kind: ProviderKind) -> &str {
        match kind {
            ProviderKind::Claude => &self.claude.model,
            ProviderKind::Gemini => &self.gemini.model,
            ProviderKind::OpenAi => &self.openai.model,
        }
    }
}

/// Anthropic Claude settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeSettings {
    /// API key (`x-api-key`)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_claude_model")]
    pub model: String,

    /// `anthropic-version` header value
    #[serde(default = "default_claude_api_version")]
    pub api_version: String,

    /// Messages endpoint
    #[serde(default = "default_claude_url")]
    pub base_url: String,

    /// Per-call timeout
    #[serde(default = "default_claude_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Completion token ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_claude_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_claude_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_claude_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_claude_timeout() -> Duration {
    Duration::from_secs(15)
}

fn default_max_tokens() -> u32 {
    1500
}

impl Default for ClaudeSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_claude_model(),
            api_version: default_claude_api_version(),
            base_url: default_claude_url(),
            timeout: default_claude_timeout(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Google Gemini settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSettings {
    /// API key (`?key=` query parameter)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API base, without the `/models/...` suffix
    #[serde(default = "default_gemini_url")]
    pub base_url: String,

    /// Per-call timeout
    #[serde(default = "default_gemini_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Top-k sampling
    #[serde(default = "default_top_k")]
    pub top_k: u32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Output token ceiling
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// Harm categories sent with every request
    #[serde(default = "default_safety_categories")]
    pub safety_categories: Vec<String>,

    /// Block threshold applied to every category
    #[serde(default = "default_safety_threshold")]
    pub safety_threshold: String,
}

fn default_gemini_model() -> String {
    "gemma-2-27b-it".to_string()
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_timeout() -> Duration {
    Duration::from_secs(25)
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_k() -> u32 {
    40
}

fn default_top_p() -> f32 {
    0.95
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_safety_categories() -> Vec<String> {
    [
        "HARM_CATEGORY_HARASSMENT",
        "HARM_CATEGORY_HATE_SPEECH",
        "HARM_CATEGORY_SEXUALLY_EXPLICIT",
        "HARM_CATEGORY_DANGEROUS_CONTENT",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_safety_threshold() -> String {
    "BLOCK_MEDIUM_AND_ABOVE".to_string()
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            base_url: default_gemini_url(),
            timeout: default_gemini_timeout(),
            temperature: default_temperature(),
            top_k: default_top_k(),
            top_p: default_top_p(),
            max_output_tokens: default_max_output_tokens(),
            safety_categories: default_safety_categories(),
            safety_threshold: default_safety_threshold(),
        }
    }
}

/// OpenAI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiSettings {
    /// API key (bearer token)
    #[serde(default, skip_serializing)]
    pub api_key: Option<SecretString>,

    /// Model identifier
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// Chat completions endpoint
    #[serde(default = "default_openai_url")]
    pub base_url: String,

    /// Per-call timeout
    #[serde(default = "default_openai_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Completion token ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Frequency penalty
    #[serde(default)]
    pub frequency_penalty: f32,

    /// Presence penalty
    #[serde(default)]
    pub presence_penalty: f32,
}

fn default_openai_model() -> String {
    "gpt-4o".to_string()
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_timeout() -> Duration {
    Duration::from_secs(20)
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_openai_model(),
            base_url: default_openai_url(),
            timeout: default_openai_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
        }
    }
}

/// Rate and size limits
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LimitsConfig {
    /// Requests admitted per client per window
    #[serde(default = "default_max_requests")]
    #[validate(range(min = 1))]
    pub max_requests_per_window: u32,

    /// Fixed window length
    #[serde(default = "default_window", with = "humantime_serde")]
    pub window: Duration,

    /// Interval after which the whole rate table is cleared
    #[serde(default = "default_window", with = "humantime_serde")]
    pub cleanup_interval: Duration,

    /// Maximum content length in characters
    #[serde(default = "default_max_content_chars")]
    #[validate(range(min = 1))]
    pub max_content_chars: usize,

    /// Maximum style length in characters
    #[serde(default = "default_max_style_chars")]
    #[validate(range(min = 1))]
    pub max_style_chars: usize,
}

fn default_max_requests() -> u32 {
    20
}

fn default_window() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_max_content_chars() -> usize {
    1000
}

fn default_max_style_chars() -> usize {
    100
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests_per_window: default_max_requests(),
            window: default_window(),
            cleanup_interval: default_window(),
            max_content_chars: default_max_content_chars(),
            max_style_chars: default_max_style_chars(),
        }
    }
}

/// Preset styles and prompt template overrides
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StylesConfig {
    /// Preset catalog, in resolution order
    #[serde(default = "default_presets")]
    pub presets: Vec<String>,

    /// Custom styles are truncated to this many characters
    #[serde(default = "default_max_custom_chars")]
    #[validate(range(min = 1))]
    pub max_custom_chars: usize,

    /// Instruction template overrides keyed by style, `{style}` is substituted
    #[serde(default)]
    pub templates: HashMap<String, String>,
}

fn default_presets() -> Vec<String> {
    [
        "kansai-dialect",
        "hakata-dialect",
        "tsugaru-dialect",
        "okinawa-dialect",
        "keigo",
        "english",
        "summary",
        "bullet-list",
        "casual",
        "formal",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_max_custom_chars() -> usize {
    50
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            max_custom_chars: default_max_custom_chars(),
            templates: HashMap::new(),
        }
    }
}

/// Input screening
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Case-insensitive patterns rejected anywhere in content or style
    #[serde(default = "default_dangerous_patterns")]
    pub dangerous_patterns: Vec<String>,
}

fn default_dangerous_patterns() -> Vec<String> {
    [
        r"<script|javascript:|on\w+=",
        r"\b(eval|function|constructor)\s*\(",
        r"\b(document|window|global)\.",
        r"(union|select|insert|delete|drop|create|alter)\s+",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            dangerous_patterns: default_dangerous_patterns(),
        }
    }
}

/// Upstream retry policy
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetrySettings {
    /// Total attempts including the first
    #[serde(default = "default_max_attempts")]
    #[validate(range(min = 1))]
    pub max_attempts: u32,

    /// Delay unit; the wait after attempt `n` is `base_delay * n`
    #[serde(default = "default_base_delay", with = "humantime_serde")]
    pub base_delay: Duration,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> Duration {
    Duration::from_millis(1000)
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay: default_base_delay(),
        }
    }
}

/// Logging output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.providers.openai.api_key = Some(SecretString::new("sk-test".into()));
        config
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.environment, "production");
        assert_eq!(config.providers.claude.timeout, Duration::from_secs(15));
        assert_eq!(config.providers.gemini.timeout, Duration::from_secs(25));
        assert_eq!(config.providers.openai.timeout, Duration::from_secs(20));
        assert_eq!(config.limits.max_requests_per_window, 20);
        assert_eq!(config.limits.window, Duration::from_secs(3600));
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.styles.presets.len(), 10);
        assert_eq!(config.security.dangerous_patterns.len(), 4);
    }

    #[test]
    fn test_validate_requires_a_provider_key() {
        let err = GatewayConfig::default().validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_limits() {
        let mut config = configured();
        config.limits.max_requests_per_window = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = configured();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_pattern() {
        let mut config = configured();
        config.security.dangerous_patterns.push("(unclosed".into());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unclosed"));
    }

    #[test]
    fn test_api_keys_are_not_serialized() {
        let yaml = serde_yaml::to_string(&configured()).unwrap();
        assert!(!yaml.contains("sk-test"));
        assert!(!yaml.contains("api_key"));
    }

    #[test]
    fn test_preset_catalog_keeps_order() {
        let catalog = GatewayConfig::default().preset_catalog();
        assert_eq!(catalog.iter().next(), Some("kansai-dialect"));
        assert!(catalog.contains("formal"));
    }
}
