//! Conversion orchestrator.
//!
//! One request moves through `Received -> Validated -> RateChecked ->
//! Dispatched -> Succeeded | Failed`. The first failing stage ends the
//! request; only the dispatch stage retries, inside the retry policy.
//! Exactly one provider is contacted per request.

use gateway_config::GatewayConfig;
use gateway_core::{
    ClassifiedError, ClientIdentity, ConversionMeta, ConversionProvider, ConversionRequest,
    ConversionResponse, ErrorKind, ProviderKind, UsageInfo,
};
use gateway_providers::{PromptTemplates, ProviderRegistry};
use gateway_resilience::{RetryConfig, RetryPolicy};
use gateway_security::{
    DangerousPatterns, InputValidator, RateLimiter, RateLimiterConfig, ValidatorConfig,
};
use gateway_telemetry::ConversionMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

use crate::error::{ErrorDetails, ServerError};

/// A conversion that ended in the `Failed` state
#[derive(Debug, Clone)]
pub struct ConversionFailure {
    /// The stage error, unchanged
    pub error: ClassifiedError,
    /// Selected provider
    pub provider: ProviderKind,
    /// Selected provider's model, when configured
    pub model: Option<String>,
    /// Time from receipt to failure
    pub elapsed: Duration,
}

impl ConversionFailure {
    /// Provider context for the error body
    #[must_use]
    pub fn details(&self) -> ErrorDetails {
        ErrorDetails {
            provider: self.provider.display_name().to_string(),
            model: self.model.clone().unwrap_or_default(),
            processing_time_ms: self.elapsed.as_millis() as u64,
        }
    }
}

/// Composes validation, rate limiting and provider dispatch
pub struct ConversionGateway {
    validator: InputValidator,
    limiter: RateLimiter,
    retry: RetryPolicy,
    providers: ProviderRegistry,
    metrics: Arc<ConversionMetrics>,
}

impl ConversionGateway {
    /// Create a gateway from its parts
    #[must_use]
    pub fn new(
        validator: InputValidator,
        limiter: RateLimiter,
        retry: RetryPolicy,
        providers: ProviderRegistry,
        metrics: Arc<ConversionMetrics>,
    ) -> Self {
        Self {
            validator,
            limiter,
            retry,
            providers,
            metrics,
        }
    }

    /// Build every component from configuration
    ///
    /// # Errors
    /// Returns error if a dangerous pattern does not compile or a provider
    /// client cannot be created
    pub fn from_config(
        config: &GatewayConfig,
        metrics: Arc<ConversionMetrics>,
    ) -> Result<Self, ServerError> {
        let patterns = DangerousPatterns::compile(&config.security.dangerous_patterns)
            .map_err(|e| ServerError::Config(format!("dangerous pattern: {e}")))?;
        let catalog = config.preset_catalog();

        let validator = InputValidator::new(
            ValidatorConfig {
                max_content_chars: config.limits.max_content_chars,
                max_style_chars: config.limits.max_style_chars,
                max_custom_style_chars: config.styles.max_custom_chars,
            },
            patterns,
            catalog.clone(),
        );

        let limiter = RateLimiter::new(RateLimiterConfig {
            max_requests: config.limits.max_requests_per_window,
            window: config.limits.window,
            cleanup_interval: config.limits.cleanup_interval,
        });

        let retry = RetryPolicy::new(RetryConfig {
            max_attempts: config.retry.max_attempts,
            base_delay: config.retry.base_delay,
        });

        let prompts = PromptTemplates::new(catalog).with_overrides(&config.styles.templates);
        let providers = ProviderRegistry::from_config(&config.providers, Arc::new(prompts))
            .map_err(|e| {
                ServerError::Config(format!(
                    "provider setup failed: {}",
                    e.detail.as_deref().unwrap_or(&e.message)
                ))
            })?;

        Ok(Self::new(validator, limiter, retry, providers, metrics))
    }

    /// Registered providers
    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    /// Requests allowed per client per window
    #[must_use]
    pub fn rate_limit(&self) -> u32 {
        self.limiter.limit()
    }

    /// Current quota for a client, without consuming any
    #[must_use]
    pub fn usage(&self, client: &ClientIdentity) -> UsageInfo {
        UsageInfo {
            limit: self.limiter.limit(),
            remaining: self.limiter.remaining(client),
        }
    }

    /// Run one conversion through every stage.
    ///
    /// # Errors
    /// Returns the error of the first failing stage together with the
    /// provider context
    #[instrument(skip(self, request, caller_address), fields(provider = %kind))]
    pub async fn handle_conversion(
        &self,
        kind: ProviderKind,
        request: &ConversionRequest,
        caller_address: &str,
    ) -> Result<ConversionResponse, ConversionFailure> {
        let started = Instant::now();

        let Some(provider) = self.providers.get(kind) else {
            let error = ClassifiedError::new(ErrorKind::Unknown)
                .with_provider(kind.as_str())
                .with_detail(format!("{} API key is not configured", kind.display_name()));
            return Err(self.fail(kind, None, error, started));
        };
        let model = provider.model().to_string();
        debug!(stage = "received", model = %model, "Conversion received");

        let normalized = match self.validator.validate(
            request.content.as_deref(),
            request.style.as_deref(),
            caller_address,
        ) {
            Ok(normalized) => normalized,
            Err(error) => return Err(self.fail(kind, Some(model), error, started)),
        };
        let client_id = normalized.client_identity.clone();
        debug!(
            stage = "validated",
            client_id = %client_id,
            style = %normalized.normalized_style,
            preset = normalized.style_is_preset,
            "Input validated"
        );

        if let Err(error) = self.limiter.check_and_consume(&client_id) {
            return Err(self.fail(kind, Some(model), error, started));
        }
        debug!(stage = "rate_checked", client_id = %client_id, "Rate limit passed");

        let content = normalized.clean_content.as_str();
        let style = normalized.normalized_style.as_str();
        let result = self
            .retry
            .execute(|| self.dispatch(provider.as_ref(), content, style))
            .await;

        let result = match result {
            Ok(result) => result,
            Err(error) => return Err(self.fail(kind, Some(model), error, started)),
        };

        let elapsed = started.elapsed();
        let response = ConversionResponse {
            meta: ConversionMeta {
                style_used: normalized.normalized_style,
                style_is_preset: normalized.style_is_preset,
                original_length: normalized.clean_content.chars().count(),
                converted_length: result.text.chars().count(),
                processing_time_ms: elapsed.as_millis() as u64,
                model_identifier: result.model_identifier,
                provider_name: kind.display_name().to_string(),
            },
            converted_text: result.text,
            usage: self.usage(&client_id),
        };

        self.metrics.record_success(kind, elapsed);
        info!(
            client_id = %client_id,
            processing_time_ms = response.meta.processing_time_ms,
            converted_length = response.meta.converted_length,
            remaining = response.usage.remaining,
            "Conversion succeeded"
        );

        Ok(response)
    }

    async fn dispatch(
        &self,
        provider: &dyn ConversionProvider,
        content: &str,
        style: &str,
    ) -> Result<gateway_core::ProviderResult, ClassifiedError> {
        debug!(stage = "dispatched", "Invoking provider");
        self.metrics.record_attempt(provider.kind());
        provider.invoke(content, style).await
    }

    fn fail(
        &self,
        kind: ProviderKind,
        model: Option<String>,
        error: ClassifiedError,
        started: Instant,
    ) -> ConversionFailure {
        let elapsed = started.elapsed();
        self.metrics.record_failure(kind, error.kind, elapsed);
        warn!(
            kind = %error.kind,
            status = error.http_status,
            processing_time_ms = elapsed.as_millis() as u64,
            "Conversion failed"
        );
        ConversionFailure {
            error,
            provider: kind,
            model,
            elapsed,
        }
    }
}

impl std::fmt::Debug for ConversionGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionGateway")
            .field("providers", &self.providers)
            .field("rate_limit", &self.limiter.limit())
            .field("retry", self.retry.config())
            .finish_non_exhaustive()
    }
}
