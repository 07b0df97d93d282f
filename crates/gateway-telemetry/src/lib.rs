//! # Gateway Telemetry
//!
//! Observability for the Style Conversion Gateway.
//!
//! This crate provides:
//! - Structured logging (human-readable or JSON) via `tracing-subscriber`
//! - Prometheus metrics for conversion outcomes, errors, latency and upstream attempts

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

// Re-export main types
pub use error::TelemetryError;
pub use logging::{init_logging, LoggingConfig};
pub use metrics::ConversionMetrics;
