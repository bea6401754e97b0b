//! Error types for the student API client.
//!
//! # Design
//! Each failure class callers act on differently gets its own variant:
//! a missing record, a rejected payload, a broken server, and an
//! unreachable server. The status code and the server's own message are
//! kept where the response provided them.

use serde::Deserialize;
use thiserror::Error;

use crate::http::HttpResponse;
use crate::validate::ValidationErrors;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The server returned 404: the requested student does not exist.
    #[error("resource not found")]
    NotFound,

    /// The server rejected the request payload or parameters (400/422).
    #[error("validation failed ({status}): {message}")]
    ValidationFailed { status: u16, message: String },

    /// The server failed while handling the request (5xx).
    #[error("server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Any other unexpected status.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The request never produced a response: connection refused, DNS
    /// failure, timeout. Raised by the host that executes requests.
    #[error("network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    #[error("serialization failed: {0}")]
    SerializationError(String),

    /// The draft failed local checks and was never sent.
    #[error("invalid student: {0}")]
    InvalidDraft(ValidationErrors),
}

impl ApiError {
    /// HTTP status, when the error came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::ValidationFailed { status, .. }
            | ApiError::ServerError { status, .. }
            | ApiError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound)
    }

    /// Classify a non-success response.
    pub fn from_response(response: &HttpResponse) -> Self {
        let status = response.status;
        if status == 404 {
            return ApiError::NotFound;
        }
        let message = server_message(&response.body);
        match status {
            400 | 422 => ApiError::ValidationFailed { status, message },
            500..=599 => ApiError::ServerError { status, message },
            _ => ApiError::HttpError { status, message },
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::InvalidDraft(errors)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// Pull a human-readable message out of an error body: a JSON `message` or
/// `error` field if there is one, otherwise the trimmed raw text.
fn server_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(msg) = parsed.message.or(parsed.error) {
            return msg;
        }
    }
    body.trim().to_string()
}
