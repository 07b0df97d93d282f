//! Prometheus metrics for conversions.
//!
//! Metrics live in their own [`Registry`] so several gateways (or tests) can
//! coexist in one process.

use gateway_core::{ErrorKind, ProviderKind};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

use crate::error::TelemetryError;

const DURATION_BUCKETS: [f64; 9] = [0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Conversion metrics
#[derive(Debug, Clone)]
pub struct ConversionMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    errors_total: IntCounterVec,
    duration: HistogramVec,
    upstream_attempts: IntCounterVec,
}

impl ConversionMetrics {
    /// Create and register every metric in a fresh registry
    ///
    /// # Errors
    /// Returns error if a metric cannot be created or registered
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("conversion_requests_total", "Conversion requests by outcome"),
            &["provider", "outcome"],
        )?;
        let errors_total = IntCounterVec::new(
            Opts::new("conversion_errors_total", "Failed conversions by error kind"),
            &["provider", "kind"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "conversion_duration_seconds",
                "End-to-end conversion pipeline duration",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["provider"],
        )?;
        let upstream_attempts = IntCounterVec::new(
            Opts::new(
                "conversion_upstream_attempts_total",
                "Upstream provider calls, including retries",
            ),
            &["provider"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(errors_total.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(upstream_attempts.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            errors_total,
            duration,
            upstream_attempts,
        })
    }

    /// Record a successful conversion
    pub fn record_success(&self, provider: ProviderKind, elapsed: Duration) {
        self.requests_total
            .with_label_values(&[provider.as_str(), "success"])
            .inc();
        self.observe(provider, elapsed);
    }

    /// Record a failed conversion
    pub fn record_failure(&self, provider: ProviderKind, kind: ErrorKind, elapsed: Duration) {
        self.requests_total
            .with_label_values(&[provider.as_str(), "failure"])
            .inc();
        self.errors_total
            .with_label_values(&[provider.as_str(), kind.as_str()])
            .inc();
        self.observe(provider, elapsed);
    }

    /// Record one upstream call
    pub fn record_attempt(&self, provider: ProviderKind) {
        self.upstream_attempts
            .with_label_values(&[provider.as_str()])
            .inc();
    }

    /// Render every metric in the Prometheus text exposition format
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn render(&self) -> Result<String, TelemetryError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| TelemetryError::Encode(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Encode(e.to_string()))
    }

    fn observe(&self, provider: ProviderKind, elapsed: Duration) {
        self.duration
            .with_label_values(&[provider.as_str()])
            .observe(elapsed.as_secs_f64());
    }
}
