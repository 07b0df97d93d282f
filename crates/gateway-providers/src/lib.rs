//! # Gateway Providers
//!
//! Upstream provider adapters for the Style Conversion Gateway.
//!
//! Each adapter implements [`gateway_core::ConversionProvider`] for one
//! upstream service:
//! - Anthropic (Claude Messages API)
//! - Google AI (Gemini generateContent API)
//! - OpenAI (Chat Completions API)
//!
//! Adapters share the prompt templates in [`prompt`] and the HTTP error
//! mapping in [`http`]. The [`ProviderRegistry`] holds one adapter per
//! configured provider.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod anthropic;
pub mod google;
pub mod http;
pub mod openai;
pub mod prompt;
pub mod registry;

// Re-export main types
pub use anthropic::{AnthropicConfig, AnthropicProvider};
pub use google::{GoogleConfig, GoogleProvider};
pub use openai::{OpenAIConfig, OpenAIProvider};
pub use prompt::{ChatPrompt, PromptTemplates, SYSTEM_INSTRUCTION};
pub use registry::ProviderRegistry;
