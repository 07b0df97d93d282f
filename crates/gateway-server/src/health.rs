//! Health reporting.
//!
//! `/health` reports whether each provider has a credential configured. It
//! never contacts an upstream.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use gateway_core::ProviderKind;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::state::AppState;

/// Per-provider configuration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderStatus {
    /// Whether an API key is configured
    pub configured: bool,
    /// Model used for conversions, when configured
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Health response body
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    /// Always `"OK"` while the process serves requests
    pub status: &'static str,
    /// Report time
    pub timestamp: DateTime<Utc>,
    /// Deployment environment
    pub environment: String,
    /// Gateway version
    pub version: &'static str,
    /// Seconds since start
    pub uptime_seconds: u64,
    /// Provider status keyed by `claude`, `gemini`, `openai`
    pub apis: BTreeMap<&'static str, ProviderStatus>,
}

impl HealthResponse {
    /// Build the report from current state
    #[must_use]
    pub fn from_state(state: &AppState) -> Self {
        let providers = state.gateway.providers();
        let apis = ProviderKind::ALL
            .into_iter()
            .map(|kind| {
                let model = providers.get(kind).map(|p| p.model().to_string());
                (
                    kind.as_str(),
                    ProviderStatus {
                        configured: model.is_some(),
                        model,
                    },
                )
            })
            .collect();

        Self {
            status: "OK",
            timestamp: Utc::now(),
            environment: state.environment.to_string(),
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            apis,
        }
    }
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::from_state(&state))
}
