//! Provider registry.
//!
//! Holds at most one adapter per [`ProviderKind`]. The orchestrator selects
//! by kind before dispatch and never falls back to another provider.

use gateway_config::ProvidersConfig;
use gateway_core::{ConversionProvider, GatewayResult, ProviderKind};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::anthropic::{AnthropicConfig, AnthropicProvider};
use crate::google::{GoogleConfig, GoogleProvider};
use crate::openai::{OpenAIConfig, OpenAIProvider};
use crate::prompt::PromptTemplates;

/// Registry of configured provider adapters
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    providers: HashMap<ProviderKind, Arc<dyn ConversionProvider>>,
}

impl ProviderRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build adapters for every provider with a configured API key
    ///
    /// # Errors
    /// Returns error if an HTTP client cannot be created
    pub fn from_config(
        config: &ProvidersConfig,
        prompts: Arc<PromptTemplates>,
    ) -> GatewayResult<Self> {
        let mut registry = Self::new();

        if let Some(claude) = AnthropicConfig::from_settings(&config.claude) {
            registry.register(Arc::new(AnthropicProvider::new(claude, prompts.clone())?));
        }
        if let Some(gemini) = GoogleConfig::from_settings(&config.gemini) {
            registry.register(Arc::new(GoogleProvider::new(gemini, prompts.clone())?));
        }
        if let Some(openai) = OpenAIConfig::from_settings(&config.openai) {
            registry.register(Arc::new(OpenAIProvider::new(openai, prompts)?));
        }

        Ok(registry)
    }

    /// Register an adapter, replacing any previous one of the same kind
    pub fn register(&mut self, provider: Arc<dyn ConversionProvider>) {
        let kind = provider.kind();
        info!(provider = %kind, model = %provider.model(), "Registered provider");
        self.providers.insert(kind, provider);
    }

    /// Adapter for `kind`, if configured
    #[must_use]
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ConversionProvider>> {
        self.providers.get(&kind).cloned()
    }

    /// Whether an adapter is registered for `kind`
    #[must_use]
    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.providers.contains_key(&kind)
    }

    /// Registered kinds, in declaration order
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.is_configured(*kind))
            .collect()
    }

    /// Number of registered adapters
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no adapter is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_from_config_registers_configured_only() {
        let mut config = ProvidersConfig::default();
        config.gemini.api_key = Some(SecretString::new("g-key".to_string()));
        config.openai.api_key = Some(SecretString::new("sk-key".to_string()));

        let registry =
            ProviderRegistry::from_config(&config, Arc::new(PromptTemplates::default())).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_configured(ProviderKind::Claude));
        assert_eq!(
            registry.kinds(),
            vec![ProviderKind::Gemini, ProviderKind::OpenAi]
        );
        assert_eq!(
            registry.get(ProviderKind::OpenAi).unwrap().model(),
            "gpt-4o"
        );
        assert!(registry.get(ProviderKind::Claude).is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = ProviderRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.kinds().is_empty());
    }
}
