//! Shared application state.

use gateway_config::GatewayConfig;
use gateway_telemetry::ConversionMetrics;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ServerError;
use crate::gateway::ConversionGateway;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    /// Conversion orchestrator
    pub gateway: Arc<ConversionGateway>,
    /// Prometheus metrics
    pub metrics: Arc<ConversionMetrics>,
    /// Deployment environment reported by `/health`
    pub environment: Arc<str>,
    /// Process start, for uptime
    pub started_at: Instant,
    /// Request body limit in bytes
    pub body_limit: usize,
}

impl AppState {
    /// Create a state builder
    #[must_use]
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Build the full state from configuration
    ///
    /// # Errors
    /// Returns error if metrics or the gateway cannot be created
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ServerError> {
        let metrics = Arc::new(ConversionMetrics::new()?);
        let gateway = ConversionGateway::from_config(config, metrics.clone())?;
        Ok(Self {
            gateway: Arc::new(gateway),
            metrics,
            environment: Arc::from(config.server.environment.as_str()),
            started_at: Instant::now(),
            body_limit: config.server.body_limit_bytes,
        })
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("gateway", &self.gateway)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// Builder for [`AppState`]
#[derive(Default)]
pub struct AppStateBuilder {
    gateway: Option<ConversionGateway>,
    metrics: Option<Arc<ConversionMetrics>>,
    environment: Option<String>,
    body_limit: Option<usize>,
}

impl AppStateBuilder {
    /// Set the gateway
    #[must_use]
    pub fn gateway(mut self, gateway: ConversionGateway) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Set the metrics registry; it should be the one the gateway records into
    #[must_use]
    pub fn metrics(mut self, metrics: Arc<ConversionMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Set the reported environment
    #[must_use]
    pub fn environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    /// Set the request body limit
    #[must_use]
    pub fn body_limit(mut self, bytes: usize) -> Self {
        self.body_limit = Some(bytes);
        self
    }

    /// Build the state.
    ///
    /// Without a gateway, one is built from the default configuration, which
    /// has no providers registered.
    ///
    /// # Errors
    /// Returns error if the default metrics or gateway cannot be created
    pub fn build(self) -> Result<AppState, ServerError> {
        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None => Arc::new(ConversionMetrics::new()?),
        };
        let gateway = match self.gateway {
            Some(gateway) => gateway,
            None => ConversionGateway::from_config(&GatewayConfig::default(), metrics.clone())?,
        };

        Ok(AppState {
            gateway: Arc::new(gateway),
            metrics,
            environment: Arc::from(self.environment.unwrap_or_else(|| "production".to_string())),
            started_at: Instant::now(),
            body_limit: self
                .body_limit
                .unwrap_or_else(|| GatewayConfig::default().server.body_limit_bytes),
        })
    }
}
