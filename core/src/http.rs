//! HTTP transport boundary.
//!
//! # Design
//! Requests and responses are plain data. The client builds `HttpRequest`
//! values and hands them to an injected `Transport`; whatever the transport
//! observes is reported as one `TransportEvent` from a closed set. Those
//! events are collapsed by `parse_event` into `Result<Value, ApiError>`
//! before they reach any core logic, so nothing past this module knows which
//! HTTP library (or mock) produced them.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{ApiError, ClientError, FailureCause, ResponseMeta, ServerError};

/// HTTP Basic credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A GET request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub auth: Option<BasicAuth>,
    pub query: Vec<(String, String)>,
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    fn meta(&self) -> ResponseMeta {
        ResponseMeta {
            status: self.status,
            headers: self.headers.clone(),
        }
    }
}

/// Everything a transport can report for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// The server answered with a success status.
    Success(HttpResponse),
    /// The server answered with a non-success status.
    Fail(HttpResponse),
    /// The request could not be completed (connection refused, DNS, ...).
    Error(String),
    /// The configured timeout elapsed.
    Timeout,
    /// The request was abandoned before a response arrived.
    Abort,
}

/// Executes GET requests on behalf of the client.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, request: HttpRequest) -> TransportEvent;
}

/// Adapts a synchronous callback into a `Transport`.
///
/// Handy for scripted responses in tests, or for hosts that already own an
/// HTTP stack and only need to hand back an outcome.
pub struct FnTransport<F>(pub F);

#[async_trait]
impl<F> Transport for FnTransport<F>
where
    F: Fn(&HttpRequest) -> TransportEvent + Send + Sync,
{
    async fn get(&self, request: HttpRequest) -> TransportEvent {
        (self.0)(&request)
    }
}

/// Collapse a transport event into a decoded body or a classified error.
///
/// `timeout` is the configured limit, recorded on timeout errors.
pub fn parse_event(
    event: TransportEvent,
    url: &str,
    timeout: Option<Duration>,
) -> Result<Value, ApiError> {
    match event {
        // An empty body decodes to nothing, which the scrubber reports as no results.
        TransportEvent::Success(response) if response.body.trim().is_empty() => Ok(Value::Null),
        TransportEvent::Success(response) => serde_json::from_str(&response.body).map_err(|e| {
            ClientError::new(
                format!("JSON decoding failed: {e}"),
                None,
                Some(response.meta()),
                timeout,
            )
            .into()
        }),
        TransportEvent::Fail(response) => Err(server_failure(&response, url)),
        TransportEvent::Error(message) => Err(ClientError::new(message, None, None, timeout).into()),
        TransportEvent::Timeout => {
            Err(ClientError::new("request timed out (ETIMEDOUT)", None, None, timeout).into())
        }
        TransportEvent::Abort => Err(ClientError::new("request aborted", None, None, timeout).into()),
    }
}

fn server_failure(response: &HttpResponse, url: &str) -> ApiError {
    let body = serde_json::from_str::<Value>(&response.body)
        .ok()
        .or_else(|| (!response.body.is_empty()).then(|| Value::String(response.body.clone())));
    let cause = FailureCause::new(format!(
        "Received HTTP code {} for GET {url}",
        response.status
    ))
    .with_status(response.status);

    match ServerError::new(cause, body, Some(response.meta())) {
        Ok(err) => err.into(),
        // The cause above always carries a status.
        Err(missing) => ClientError::new(missing.message, None, None, None).into(),
    }
}
