//! # Gateway Core
//!
//! Core types, traits, and error handling for the Style Conversion Gateway.
//!
//! This crate provides the foundational types used throughout the gateway:
//! - Conversion request and response types
//! - The provider capability trait and provider selector
//! - The error taxonomy and its classifier
//! - The preset style catalog and style resolution
//! - Validated domain types (newtypes)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod classify;
pub mod error;
pub mod provider;
pub mod request;
pub mod response;
pub mod style;
pub mod types;

// Re-export commonly used types
pub use classify::classify;
pub use error::{ClassifiedError, ErrorKind, GatewayResult};
pub use provider::{ConversionProvider, ProviderKind};
pub use request::{ConversionRequest, NormalizedRequest};
pub use response::{ConversionMeta, ConversionResponse, ProviderResult, UsageInfo};
pub use style::{PresetStyleCatalog, ResolvedStyle};
pub use types::{ClientIdentity, CorrelationId};
