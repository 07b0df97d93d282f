//! # Gateway Security
//!
//! Request screening for the Style Conversion Gateway.
//!
//! ## Features
//!
//! - **Input Validation**: size bounds, blank checks and style resolution
//! - **Content Security**: dangerous-pattern rejection and HTML tag stripping
//! - **Client Identity**: one-way hashing of the caller address
//! - **Rate Limiting**: fixed-window per-client request budget
//!
//! ## Example
//!
//! ```rust
//! use gateway_core::PresetStyleCatalog;
//! use gateway_security::{DangerousPatterns, InputValidator, ValidatorConfig};
//!
//! let patterns = DangerousPatterns::compile([r"<script"]).unwrap();
//! let catalog = PresetStyleCatalog::new(["formal", "casual"]);
//! let validator = InputValidator::new(ValidatorConfig::default(), patterns, catalog);
//!
//! let request = validator
//!     .validate(Some("<b>Hello</b> team"), Some("Formal"), "203.0.113.7")
//!     .unwrap();
//! assert_eq!(request.clean_content, "Hello team");
//! assert_eq!(request.normalized_style, "formal");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod identity;
pub mod rate_limit;
pub mod sanitize;
pub mod validation;

pub use identity::{client_address, client_identity};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use sanitize::{strip_html, DangerousPatterns};
pub use validation::{InputValidator, ValidatorConfig};
