//! Production transport built on reqwest.

use async_trait::async_trait;
use reqwest::Client;

use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::http::{HttpRequest, HttpResponse, Transport, TransportEvent};

/// Value of the `user-agent` header sent with every request.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Async HTTPS transport. The request timeout comes from `ClientConfig`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ConfigError::Transport(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> TransportEvent {
        let mut builder = self.client.get(&request.url).query(&request.query);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.user, Some(&auth.password));
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return TransportEvent::Timeout,
            Err(e) => return TransportEvent::Error(e.to_string()),
        };

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) if e.is_timeout() => return TransportEvent::Timeout,
            Err(e) => return TransportEvent::Error(e.to_string()),
        };

        let response = HttpResponse {
            status: status.as_u16(),
            headers,
            body,
        };
        if status.is_success() {
            TransportEvent::Success(response)
        } else {
            TransportEvent::Fail(response)
        }
    }
}
