//! Error taxonomy for the gateway.
//!
//! Every failure inside the request lifecycle is carried as a [`ClassifiedError`]:
//! a typed [`ErrorKind`] plus the HTTP status and client-facing message assigned by
//! the classifier, and whether the failure may be retried.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::classify;

/// Result type used throughout the gateway request path
pub type GatewayResult<T> = Result<T, ClassifiedError>;

/// The kind of failure that terminated (or interrupted) a conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed validation or sanitization
    ValidationFailed,
    /// The caller exhausted its request budget for the current window
    RateLimitExceeded,
    /// Upstream rejected our credentials (HTTP 401)
    UpstreamUnauthorized,
    /// Upstream refused access (HTTP 403)
    UpstreamForbidden,
    /// Upstream is throttling us (HTTP 429)
    UpstreamRateLimited,
    /// Upstream rejected the request payload (HTTP 400)
    UpstreamBadRequest,
    /// Upstream refused to produce text because of a content/safety policy
    UpstreamContentFiltered,
    /// Upstream failed internally (HTTP 5xx)
    UpstreamServerError,
    /// The client-side deadline for the upstream call elapsed
    Timeout,
    /// Connection or DNS failure reaching upstream
    NetworkUnreachable,
    /// Upstream answered successfully but without usable text
    MalformedUpstreamResponse,
    /// Anything not covered above
    Unknown,
}

impl ErrorKind {
    /// All kinds, in declaration order
    pub const ALL: [Self; 12] = [
        Self::ValidationFailed,
        Self::RateLimitExceeded,
        Self::UpstreamUnauthorized,
        Self::UpstreamForbidden,
        Self::UpstreamRateLimited,
        Self::UpstreamBadRequest,
        Self::UpstreamContentFiltered,
        Self::UpstreamServerError,
        Self::Timeout,
        Self::NetworkUnreachable,
        Self::MalformedUpstreamResponse,
        Self::Unknown,
    ];

    /// Stable snake_case identifier, used as the error `code` and as a metric label
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ValidationFailed => "validation_failed",
            Self::RateLimitExceeded => "rate_limit_exceeded",
            Self::UpstreamUnauthorized => "upstream_unauthorized",
            Self::UpstreamForbidden => "upstream_forbidden",
            Self::UpstreamRateLimited => "upstream_rate_limited",
            Self::UpstreamBadRequest => "upstream_bad_request",
            Self::UpstreamContentFiltered => "upstream_content_filtered",
            Self::UpstreamServerError => "upstream_server_error",
            Self::Timeout => "timeout",
            Self::NetworkUnreachable => "network_unreachable",
            Self::MalformedUpstreamResponse => "malformed_upstream_response",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A typed failure with its HTTP status and retryability already assigned.
///
/// `message` is safe to show to the caller. `detail` and `provider` are for
/// logs only and are never serialized into a response.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ClassifiedError {
    /// Failure kind
    pub kind: ErrorKind,
    /// HTTP status returned to the original caller
    pub http_status: u16,
    /// Client-facing, provider-agnostic message
    pub message: String,
    /// Whether the retry policy may attempt the operation again
    pub retryable: bool,
    /// Internal diagnostic text (raw upstream message, transport error, ...)
    pub detail: Option<String>,
    /// Provider that produced the failure, if any
    pub provider: Option<String>,
}

impl ClassifiedError {
    /// Classify a failure of the given kind using the default client message
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        classify::classify(kind)
    }

    /// Validation failure with a precise, client-correctable message
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationFailed).with_message(message)
    }

    /// The caller's per-window request budget is exhausted
    #[must_use]
    pub fn rate_limit_exceeded(limit: u32) -> Self {
        Self::new(ErrorKind::RateLimitExceeded).with_message(format!(
            "Hourly usage limit ({limit} requests) reached. Please wait a while and try again"
        ))
    }

    /// Upstream failure of a known kind, keeping the raw provider text as detail
    #[must_use]
    pub fn upstream(kind: ErrorKind, provider: &str, detail: impl Into<String>) -> Self {
        Self::new(kind).with_provider(provider).with_detail(detail)
    }

    /// Upstream failure derived from a non-success HTTP status
    #[must_use]
    pub fn from_status(provider: &str, status: u16, detail: impl Into<String>) -> Self {
        Self::upstream(classify::kind_for_status(status), provider, detail)
    }

    /// Replace the client-facing message.
    ///
    /// Ignored for 500-class kinds, whose message stays opaque.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        if self.is_client_error() {
            self.message = message.into();
        }
        self
    }

    /// Attach internal diagnostic detail
    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Attach the provider name
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// 400-class failure the caller can correct
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.http_status)
    }
}
