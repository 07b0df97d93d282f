//! # Gateway Config
//!
//! Configuration model and loader for the Style Conversion Gateway.
//!
//! Configuration is read from an optional YAML or TOML file, then overridden
//! from environment variables, then validated once at startup:
//!
//! ```no_run
//! # async fn example() -> Result<(), gateway_config::ConfigError> {
//! let config = gateway_config::ConfigLoader::new()
//!     .with_file("gateway.yaml")
//!     .load()
//!     .await?;
//! println!("listening on {}", config.server.port);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod model;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use model::{
    ClaudeSettings, GatewayConfig, GeminiSettings, LimitsConfig, LoggingSettings,
    OpenAiSettings, ProvidersConfig, RetrySettings, SecurityConfig, ServerConfig, StylesConfig,
};
