//! # Gateway Server
//!
//! HTTP server and conversion orchestrator for the Style Conversion Gateway.
//!
//! This crate provides:
//! - The [`ConversionGateway`] request lifecycle: validate, rate-check,
//!   dispatch with retry, respond
//! - Axum routes for the three conversion endpoints, health and metrics
//! - JSON error bodies with correlation identifiers for server errors
//! - Graceful shutdown handling

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod extractors;
pub mod gateway;
pub mod handlers;
pub mod health;
pub mod routes;
pub mod server;
pub mod shutdown;
pub mod state;

// Re-export main types
pub use error::{ApiError, ErrorDetails, ServerError};
pub use gateway::{ConversionFailure, ConversionGateway};
pub use health::{HealthResponse, ProviderStatus};
pub use routes::create_router;
pub use server::{Server, ServerConfig};
pub use shutdown::shutdown_signal;
pub use state::{AppState, AppStateBuilder};
