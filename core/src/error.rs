//! Error types for the Classeur API client.
//!
//! # Design
//! Every failure a caller can observe is one of two kinds. A `ClientError`
//! means something went wrong on this side of the wire: a timeout, an
//! aborted request, an undecodable body, or a success response that carried
//! nothing usable. A `ServerError` means the API answered with a non-success
//! status. `ApiError` is the tagged union of both, so callers can match on
//! the kind or treat every failure the same way.
//!
//! Both kinds are built from an explicit `FailureCause` plus optional
//! ancillary data (the decoded error body) and response metadata. Fields on
//! the cause win over the same fields found in the data; the message always
//! comes from the cause.

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;

/// Message of the error synthesized when a success response held no entries.
pub const NO_RESULTS_MESSAGE: &str =
    "No results (should be 404, but API did not return an error)";

const CLIENT_PREFIX: &str = "Client error: ";
const SERVER_PREFIX: &str = "Server error: ";

/// Status line and headers of the response that accompanied a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

/// Root cause of a failure, before it is classified as client or server side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailureCause {
    pub message: String,
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub short_reason: Option<String>,
}

impl FailureCause {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_short_reason(mut self, short_reason: impl Into<String>) -> Self {
        self.short_reason = Some(short_reason.into());
        self
    }
}

impl From<&str> for FailureCause {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for FailureCause {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

/// A failure that happened on the client during or after a request.
///
/// Typical messages: `Client error: request timed out (ETIMEDOUT)`,
/// `Client error: request aborted`, `Client error: JSON decoding failed: ...`.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ClientError {
    pub message: String,
    pub status: Option<u16>,
    pub reason: Option<String>,
    pub short_reason: Option<String>,
    /// The timeout threshold that was exceeded. Only set when the cause
    /// describes a timeout.
    pub timeout: Option<Duration>,
    pub data: Option<Value>,
    pub response: Option<ResponseMeta>,
    /// Set only on the error synthesized for an empty success response.
    no_results: bool,
}

impl ClientError {
    pub fn new(
        cause: impl Into<FailureCause>,
        data: Option<Value>,
        response: Option<ResponseMeta>,
        timeout: Option<Duration>,
    ) -> Self {
        let cause = cause.into();
        let message = format!("{CLIENT_PREFIX}{}", strip_error_prefix(&cause.message));
        let timeout = if is_timeout_message(&message) { timeout } else { None };

        Self {
            status: cause.status.or_else(|| data_status(data.as_ref())),
            reason: cause.reason.or_else(|| data_str(data.as_ref(), "reason")),
            short_reason: cause
                .short_reason
                .or_else(|| data_str(data.as_ref(), "error")),
            timeout,
            message,
            data,
            response,
            no_results: false,
        }
    }
}

/// A failure reported by the server through a non-success HTTP status.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ServerError {
    pub message: String,
    pub status: u16,
    /// Detail sent back by the server, e.g. `file_is_not_readable`. Usually
    /// the best source of debugging information.
    pub reason: Option<String>,
    /// HTTP-convention label for `status`, e.g. `Forbidden`.
    pub short_reason: Option<String>,
    pub data: Option<Value>,
    pub response: Option<ResponseMeta>,
}

/// Returned when a server error is built from a cause without a status code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected a numeric status code on server failure: {message}")]
pub struct MissingStatus {
    pub message: String,
}

impl ServerError {
    pub fn new(
        cause: impl Into<FailureCause>,
        data: Option<Value>,
        response: Option<ResponseMeta>,
    ) -> Result<Self, MissingStatus> {
        let cause = cause.into();
        let Some(status) = cause.status else {
            return Err(MissingStatus {
                message: cause.message,
            });
        };
        let message = format!("{SERVER_PREFIX}{}", strip_error_prefix(&cause.message));

        Ok(Self {
            reason: cause.reason.or_else(|| data_str(data.as_ref(), "reason")),
            short_reason: cause
                .short_reason
                .or_else(|| data_str(data.as_ref(), "error")),
            status,
            message,
            data,
            response,
        })
    }
}

/// Any failure delivered to a caller of the client.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

impl ApiError {
    /// The error reported when a call succeeded on the wire but produced no
    /// usable entries.
    pub fn no_results() -> Self {
        ApiError::Client(ClientError {
            no_results: true,
            ..ClientError::new(NO_RESULTS_MESSAGE, None, None, None)
        })
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::Client(e) => &e.message,
            ApiError::Server(e) => &e.message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client(e) => e.status,
            ApiError::Server(e) => Some(e.status),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            ApiError::Client(e) => e.reason.as_deref(),
            ApiError::Server(e) => e.reason.as_deref(),
        }
    }

    pub fn short_reason(&self) -> Option<&str> {
        match self {
            ApiError::Client(e) => e.short_reason.as_deref(),
            ApiError::Server(e) => e.short_reason.as_deref(),
        }
    }

    pub fn is_client(&self) -> bool {
        matches!(self, ApiError::Client(_))
    }

    pub fn is_server(&self) -> bool {
        matches!(self, ApiError::Server(_))
    }

    pub fn is_no_results(&self) -> bool {
        match self {
            ApiError::Client(e) => e.no_results,
            ApiError::Server(_) => false,
        }
    }

    /// Swap the reason for another when it currently equals `from`.
    pub(crate) fn remap_reason(&mut self, from: &str, to: &str) {
        let reason = match self {
            ApiError::Client(e) => &mut e.reason,
            ApiError::Server(e) => &mut e.reason,
        };
        if reason.as_deref() == Some(from) {
            *reason = Some(to.to_string());
        }
    }
}

/// Errors raised while assembling a client from configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("invalid timeout {value:?}: expected milliseconds")]
    InvalidTimeout { value: String },

    #[error("failed to build HTTP transport: {0}")]
    Transport(String),
}

fn strip_error_prefix(message: &str) -> &str {
    let trimmed = message.trim_start();
    trimmed
        .strip_prefix("Error:")
        .map(str::trim_start)
        .unwrap_or(trimmed)
}

fn is_timeout_message(message: &str) -> bool {
    message.contains("ETIMEDOUT") || message.to_ascii_lowercase().contains("timed out")
}

fn data_str(data: Option<&Value>, field: &str) -> Option<String> {
    data?.get(field)?.as_str().map(str::to_string)
}

fn data_status(data: Option<&Value>) -> Option<u16> {
    data?
        .get("status")?
        .as_u64()
        .and_then(|s| u16::try_from(s).ok())
}
