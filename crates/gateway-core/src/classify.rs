//! Error classifier.
//!
//! Central mapping from an [`ErrorKind`] to its retryability, the HTTP status
//! surfaced to the caller and the default client-facing message. Provider
//! adapters only decide the kind; everything else is assigned here.

use crate::error::{ClassifiedError, ErrorKind};

/// Message returned for every 500-class failure
pub const SERVER_ERROR_MESSAGE: &str = "A server error occurred";

/// Build a [`ClassifiedError`] for `kind` with its default message
#[must_use]
pub fn classify(kind: ErrorKind) -> ClassifiedError {
    ClassifiedError {
        kind,
        http_status: http_status(kind),
        message: default_message(kind).to_string(),
        retryable: is_retryable(kind),
        detail: None,
        provider: None,
    }
}

/// Whether another attempt could plausibly succeed
#[must_use]
pub fn is_retryable(kind: ErrorKind) -> bool {
    match kind {
        ErrorKind::Timeout
        | ErrorKind::NetworkUnreachable
        | ErrorKind::UpstreamServerError
        | ErrorKind::UpstreamRateLimited
        | ErrorKind::MalformedUpstreamResponse => true,
        ErrorKind::ValidationFailed
        | ErrorKind::RateLimitExceeded
        | ErrorKind::UpstreamUnauthorized
        | ErrorKind::UpstreamForbidden
        | ErrorKind::UpstreamBadRequest
        | ErrorKind::UpstreamContentFiltered
        | ErrorKind::Unknown => false,
    }
}

/// HTTP status returned to the original caller.
///
/// Client-correctable kinds are 400-class, everything else is 500-class.
#[must_use]
pub fn http_status(kind: ErrorKind) -> u16 {
    match kind {
        ErrorKind::ValidationFailed
        | ErrorKind::UpstreamUnauthorized
        | ErrorKind::UpstreamForbidden
        | ErrorKind::UpstreamBadRequest
        | ErrorKind::UpstreamContentFiltered => 400,
        ErrorKind::RateLimitExceeded => 429,
        ErrorKind::UpstreamRateLimited => 503,
        ErrorKind::UpstreamServerError
        | ErrorKind::NetworkUnreachable
        | ErrorKind::MalformedUpstreamResponse => 502,
        ErrorKind::Timeout => 504,
        ErrorKind::Unknown => 500,
    }
}

/// Map an upstream HTTP status to the kind of failure it represents
#[must_use]
pub fn kind_for_status(status: u16) -> ErrorKind {
    match status {
        400 => ErrorKind::UpstreamBadRequest,
        401 => ErrorKind::UpstreamUnauthorized,
        403 => ErrorKind::UpstreamForbidden,
        429 => ErrorKind::UpstreamRateLimited,
        500..=599 => ErrorKind::UpstreamServerError,
        _ => ErrorKind::Unknown,
    }
}

fn default_message(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::ValidationFailed => "Invalid input",
        ErrorKind::RateLimitExceeded => {
            "Usage limit reached. Please wait a while and try again"
        }
        ErrorKind::UpstreamUnauthorized => {
            "The conversion provider rejected the configured API key"
        }
        ErrorKind::UpstreamForbidden => {
            "The configured API key lacks permission or quota for the conversion provider"
        }
        ErrorKind::UpstreamBadRequest => {
            "The conversion provider rejected the input. Please revise the content"
        }
        ErrorKind::UpstreamContentFiltered => {
            "The input could not be processed because it conflicts with the provider content policy"
        }
        _ => SERVER_ERROR_MESSAGE,
    }
}
