//! Error responses and server errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use gateway_core::{ClassifiedError, CorrelationId, ErrorKind};
use serde::Serialize;
use std::net::SocketAddr;
use tracing::{error, warn};

/// Failure context reported alongside a conversion error
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDetails {
    /// Provider display name
    pub provider: String,
    /// Configured model
    pub model: String,
    /// Time spent before failing
    pub processing_time_ms: u64,
}

/// API error that renders as the gateway's JSON error body.
///
/// 400-class errors carry the precise message and the error `code`.
/// Everything else carries an opaque message and an `errorId` that is
/// logged together with the internal detail.
#[derive(Debug)]
pub struct ApiError {
    /// Classified failure
    pub error: ClassifiedError,
    /// Correlation identifier, present for 500-class failures only
    pub error_id: Option<CorrelationId>,
    /// Provider context, when the failure happened inside a conversion
    pub details: Option<ErrorDetails>,
}

impl ApiError {
    /// Wrap a classified error
    #[must_use]
    pub fn new(error: ClassifiedError) -> Self {
        let error_id = (!error.is_client_error()).then(CorrelationId::generate);
        Self {
            error,
            error_id,
            details: None,
        }
    }

    /// Validation failure with the given message
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ClassifiedError::validation(message))
    }

    /// Attach provider context
    #[must_use]
    pub fn with_details(mut self, details: ErrorDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// HTTP status for this error
    #[must_use]
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.error.http_status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl From<ClassifiedError> for ApiError {
    fn from(error: ClassifiedError) -> Self {
        Self::new(error)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_id: Option<CorrelationId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a ErrorDetails>,
    timestamp: DateTime<Utc>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let Some(error_id) = self.error_id {
            error!(
                error_id = %error_id,
                kind = %self.error.kind,
                provider = self.error.provider.as_deref().unwrap_or("none"),
                detail = self.error.detail.as_deref().unwrap_or(""),
                "Request failed with server error"
            );
        } else {
            warn!(
                kind = %self.error.kind,
                status = status.as_u16(),
                message = %self.error.message,
                "Request rejected"
            );
        }

        let body = ErrorBody {
            success: false,
            error: &self.error.message,
            code: self.error.is_client_error().then_some(self.error.kind),
            error_id: self.error_id,
            details: self.details.as_ref(),
            timestamp: Utc::now(),
        };

        (status, Json(body)).into_response()
    }
}

/// Errors raised while building or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration could not be turned into a running gateway
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Metrics registry setup failed
    #[error(transparent)]
    Telemetry(#[from] gateway_telemetry::TelemetryError),

    /// Listener could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// Underlying error
        source: std::io::Error,
    },

    /// Server loop failed
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
