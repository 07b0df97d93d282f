//! HTTP request handlers for the gateway API.

use axum::{
    extract::State,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use gateway_core::{ConversionRequest, ConversionResponse, ProviderKind, UsageInfo};
use gateway_security::client_identity;
use serde::Serialize;
use serde_json::json;
use tracing::{error, instrument};

use crate::{
    error::ApiError,
    extractors::{ClientAddr, JsonBody},
    state::AppState,
};

/// Per-client request budget
pub const RATE_LIMIT_LIMIT: &str = "x-ratelimit-limit";

/// Requests left in the current window
pub const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// Endpoints listed by `/` and the 404 body
pub const ENDPOINTS: [(&str, &str); 6] = [
    ("POST", "/convertText"),
    ("POST", "/convertTextGemini"),
    ("POST", "/convertTextChatGPT"),
    ("GET", "/health"),
    ("GET", "/metrics"),
    ("GET", "/"),
];

/// Successful conversion body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionBody {
    /// Always `true`
    pub success: bool,
    /// Conversion result
    #[serde(flatten)]
    pub response: ConversionResponse,
    /// Response time
    pub timestamp: DateTime<Utc>,
}

/// Convert with Claude
#[instrument(skip_all)]
pub async fn convert_text(
    State(state): State<AppState>,
    ClientAddr(address): ClientAddr,
    JsonBody(body): JsonBody<ConversionRequest>,
) -> Response {
    convert(&state, ProviderKind::Claude, &address, &body).await
}

/// Convert with Gemini
#[instrument(skip_all)]
pub async fn convert_text_gemini(
    State(state): State<AppState>,
    ClientAddr(address): ClientAddr,
    JsonBody(body): JsonBody<ConversionRequest>,
) -> Response {
    convert(&state, ProviderKind::Gemini, &address, &body).await
}

/// Convert with ChatGPT
#[instrument(skip_all)]
pub async fn convert_text_chatgpt(
    State(state): State<AppState>,
    ClientAddr(address): ClientAddr,
    JsonBody(body): JsonBody<ConversionRequest>,
) -> Response {
    convert(&state, ProviderKind::OpenAi, &address, &body).await
}

async fn convert(
    state: &AppState,
    kind: ProviderKind,
    address: &str,
    request: &ConversionRequest,
) -> Response {
    match state.gateway.handle_conversion(kind, request, address).await {
        Ok(response) => {
            let usage = response.usage;
            let body = ConversionBody {
                success: true,
                response,
                timestamp: Utc::now(),
            };
            with_rate_limit_headers(Json(body).into_response(), usage)
        }
        Err(failure) => {
            let usage = state.gateway.usage(&client_identity(address));
            let details = failure.details();
            let error = ApiError::new(failure.error).with_details(details);
            with_rate_limit_headers(error.into_response(), usage)
        }
    }
}

fn with_rate_limit_headers(mut response: Response, usage: UsageInfo) -> Response {
    let headers = response.headers_mut();
    headers.insert(RATE_LIMIT_LIMIT, HeaderValue::from(usage.limit));
    headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from(usage.remaining));
    response
}

/// Service information
pub async fn service_info() -> impl IntoResponse {
    Json(json!({
        "name": "Style Conversion Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Converts text into a requested style through Claude, Gemini or ChatGPT",
        "endpoints": endpoint_list(),
        "timestamp": Utc::now(),
    }))
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_endpoint(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Unknown route
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "path": uri.path(),
            "method": method.as_str(),
            "timestamp": Utc::now(),
            "availableEndpoints": endpoint_list(),
        })),
    )
}

fn endpoint_list() -> Vec<String> {
    ENDPOINTS
        .iter()
        .map(|(method, path)| format!("{method} {path}"))
        .collect()
}
