//! # Gateway Resilience
//!
//! Resilience patterns for the Style Conversion Gateway:
//! - Retry policy with linear backoff, driven by the error classifier's
//!   retryable flag

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod retry;

// Re-export main types
pub use retry::{RetryConfig, RetryPolicy, RetryPolicyBuilder};
