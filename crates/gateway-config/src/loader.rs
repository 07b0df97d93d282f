//! Configuration loading from files and environment variables.

use secrecy::SecretString;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::ConfigError;
use crate::model::GatewayConfig;

/// Loads [`GatewayConfig`] from an optional file plus environment overrides
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    file: Option<PathBuf>,
    env_overrides: bool,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader that uses defaults plus environment overrides
    #[must_use]
    pub fn new() -> Self {
        Self {
            file: None,
            env_overrides: true,
        }
    }

    /// Read a YAML (`.yaml`/`.yml`) or TOML (`.toml`) file first
    #[must_use]
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Enable or disable environment overrides
    #[must_use]
    pub fn with_env_overrides(mut self, enabled: bool) -> Self {
        self.env_overrides = enabled;
        self
    }

    /// Load, override and validate the configuration
    pub async fn load(&self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.file {
            Some(path) => Self::load_file(path).await?,
            None => GatewayConfig::default(),
        };

        if self.env_overrides {
            apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
        }

        config.validate()?;
        info!(
            port = config.server.port,
            environment = %config.server.environment,
            "Configuration loaded"
        );
        Ok(config)
    }

    async fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
        debug!(path = %path.display(), "Reading config file");
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => parse_yaml(&contents),
            Some("toml") => parse_toml(&contents),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

/// Parse a YAML document
pub fn parse_yaml(contents: &str) -> Result<GatewayConfig, ConfigError> {
    serde_yaml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Parse a TOML document
pub fn parse_toml(contents: &str) -> Result<GatewayConfig, ConfigError> {
    toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Apply environment overrides using `lookup` to read variables.
///
/// Blank values are ignored.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

    if let Some(host) = get("GATEWAY_HOST") {
        config.server.host = host;
    }
    for var in ["PORT", "GATEWAY_PORT"] {
        if let Some(value) = get(var) {
            config.server.port = parse_env(var, &value)?;
        }
    }
    for var in ["NODE_ENV", "GATEWAY_ENVIRONMENT"] {
        if let Some(value) = get(var) {
            config.server.environment = value;
        }
    }

    let providers = &mut config.providers;
    if let Some(key) = get("CLAUDE_API_KEY") {
        providers.claude.api_key = Some(SecretString::new(key));
    }
    if let Some(model) = get("CLAUDE_MODEL") {
        providers.claude.model = model;
    }
    if let Some(key) = get("GEMINI_API_KEY") {
        providers.gemini.api_key = Some(SecretString::new(key));
    }
    if let Some(model) = get("GEMINI_MODEL") {
        providers.gemini.model = model;
    }
    if let Some(key) = get("OPENAI_API_KEY") {
        providers.openai.api_key = Some(SecretString::new(key));
    }
    if let Some(model) = get("OPENAI_MODEL") {
        providers.openai.model = model;
    }

    if let Some(value) = get("GATEWAY_MAX_REQUESTS_PER_WINDOW") {
        config.limits.max_requests_per_window =
            parse_env("GATEWAY_MAX_REQUESTS_PER_WINDOW", &value)?;
    }

    Ok(())
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}
