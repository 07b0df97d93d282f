//! Shared HTTP plumbing for provider adapters.
//!
//! Maps transport failures and non-success statuses to [`ClassifiedError`]s.
//! Raw upstream text only ever lands in `detail`.

use gateway_core::{ClassifiedError, ErrorKind, GatewayResult, ProviderKind};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{trace, warn};

/// Upper bound on raw upstream body text kept in `detail`
pub const MAX_DETAIL_CHARS: usize = 512;

/// Build an HTTP client with the per-provider timeout
pub fn build_client(provider: ProviderKind, timeout: Duration) -> GatewayResult<Client> {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(100)
        .build()
        .map_err(|e| {
            ClassifiedError::new(ErrorKind::Unknown)
                .with_provider(provider.as_str())
                .with_detail(format!("Failed to create HTTP client: {e}"))
        })
}

/// Send `request` and decode a successful JSON body as `T`
pub async fn send_json<T: DeserializeOwned>(
    provider: ProviderKind,
    request: RequestBuilder,
) -> GatewayResult<T> {
    let response = request
        .send()
        .await
        .map_err(|e| transport_error(provider, e))?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            transport_error(provider, e)
        } else {
            malformed(
                provider,
                format!("Failed to read response: {}", e.without_url()),
            )
        }
    })?;

    trace!(provider = %provider, status = %status, "Received upstream response");

    if !status.is_success() {
        return Err(status_error(provider, status.as_u16(), &body));
    }

    serde_json::from_str(&body)
        .map_err(|e| malformed(provider, format!("Invalid response JSON: {e}")))
}

/// Classify a `reqwest` transport failure.
///
/// The URL is dropped from the error since it may carry a query-string key.
pub fn transport_error(provider: ProviderKind, error: reqwest::Error) -> ClassifiedError {
    let error = error.without_url();
    let kind = if error.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::NetworkUnreachable
    };
    warn!(provider = %provider, kind = %kind, error = %error, "Upstream request failed");
    ClassifiedError::upstream(kind, provider.as_str(), error.to_string())
}

/// Classify a non-success upstream status.
///
/// All three providers wrap failures as `{"error": {"message": ...}}`.
pub fn status_error(provider: ProviderKind, status: u16, body: &str) -> ClassifiedError {
    #[derive(Deserialize)]
    struct ErrorEnvelope {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        #[serde(default)]
        message: Option<String>,
    }

    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|e| e.error.message)
        .map_or_else(
            || format!("HTTP {status}: {}", truncate_chars(body, MAX_DETAIL_CHARS)),
            |message| truncate_chars(&message, MAX_DETAIL_CHARS),
        );

    let error = ClassifiedError::from_status(provider.as_str(), status, detail);
    warn!(
        provider = %provider,
        status,
        kind = %error.kind,
        "Upstream returned error status"
    );
    error
}

/// A success status without usable text
pub fn malformed(provider: ProviderKind, detail: impl Into<String>) -> ClassifiedError {
    ClassifiedError::upstream(
        ErrorKind::MalformedUpstreamResponse,
        provider.as_str(),
        detail,
    )
}

/// The provider refused on content-policy grounds
pub fn content_filtered(provider: ProviderKind, detail: impl Into<String>) -> ClassifiedError {
    ClassifiedError::upstream(
        ErrorKind::UpstreamContentFiltered,
        provider.as_str(),
        detail,
    )
}

/// At most `max` chars of `text`, marked when cut
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// Trimmed text, or `None` when blank
pub(crate) fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}
