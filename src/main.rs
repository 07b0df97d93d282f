//! # Style Conversion Gateway
//!
//! HTTP gateway that rewrites text into a requested style through Claude,
//! Gemini or ChatGPT.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults and provider keys from the environment
//! CLAUDE_API_KEY=... style-conversion-gateway
//!
//! # Start with a config file
//! style-conversion-gateway --config /path/to/config.yaml
//!
//! # Override the port
//! PORT=9000 style-conversion-gateway
//! ```

use anyhow::Context;
use clap::Parser;
use gateway_config::{ConfigLoader, GatewayConfig};
use gateway_server::{AppState, Server, ServerConfig};
use gateway_telemetry::{init_logging, LoggingConfig};
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "style-conversion-gateway", version, about)]
struct Args {
    /// Configuration file (YAML or TOML)
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides the configuration
    #[arg(long)]
    host: Option<String>,

    /// Bind port, overrides the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Log filter when RUST_LOG is unset, overrides the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    json_logs: bool,
}

/// Application entry point
#[tokio::main]
async fn main() {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Failed to read .env file: {e}");
        }
    }

    let args = Args::parse();

    if let Err(e) = run(args).await {
        error!(error = %format!("{e:#}"), "Application failed");
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run(args: Args) -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new().with_env_overrides(true);
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }

    // Logging is configured from the file, so load before initializing it
    let config = loader.load().await;

    let (level, json) = match &config {
        Ok(config) => (config.logging.level.clone(), config.logging.json),
        Err(_) => ("info".to_string(), false),
    };
    init_logging(
        &LoggingConfig::new()
            .with_level(args.log_level.clone().unwrap_or(level))
            .with_json(args.json_logs || json),
    )
    .context("failed to initialize logging")?;

    let mut config = config.context("failed to load configuration")?;
    apply_args(&mut config, &args);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.server.environment,
        "Starting Style Conversion Gateway"
    );

    for kind in gateway_core::ProviderKind::ALL {
        if !config.providers.is_configured(kind) {
            warn!(provider = %kind, "API key not set, provider not available");
        }
    }

    let state = AppState::from_config(&config).context("failed to build gateway")?;

    let server_config = ServerConfig::new()
        .with_host(&config.server.host)
        .with_port(config.server.port);

    Server::new(server_config, state)
        .run()
        .await
        .context("server failed")?;

    Ok(())
}

/// Command line flags take precedence over file and environment
fn apply_args(config: &mut GatewayConfig, args: &Args) {
    if let Some(host) = &args.host {
        config.server.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
}
