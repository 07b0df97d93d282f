//! Telemetry errors.

/// Errors raised while setting up logging or metrics
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The global subscriber could not be installed
    #[error("Failed to initialize logging: {0}")]
    Init(String),

    /// A metric could not be created or registered
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// Gathered metrics could not be encoded
    #[error("Failed to encode metrics: {0}")]
    Encode(String),
}
