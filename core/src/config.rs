//! Client configuration.
//!
//! # Design
//! Credentials and connection settings live in one explicit value handed to
//! the client constructor. `from_env` is a convenience for reading that value
//! from the process environment; nothing here is global or mutable.

use std::time::Duration;

use crate::error::ConfigError;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "app.classeur.io";

pub const ENV_USER_ID: &str = "CLASSEUR_USER_ID";
pub const ENV_API_KEY: &str = "CLASSEUR_API_KEY";
pub const ENV_HOST: &str = "CLASSEUR_HOST";
pub const ENV_TIMEOUT_MS: &str = "CLASSEUR_TIMEOUT_MS";

/// Connection settings for `ClasseurClient`.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub user_id: String,
    pub api_key: String,
    pub host: String,
    pub timeout: Option<Duration>,
    /// Replaces `https://{host}/api/` entirely, e.g. to point at a local mock.
    pub api_root: Option<String>,
}

impl ClientConfig {
    pub fn new(user_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            api_key: api_key.into(),
            host: DEFAULT_HOST.to_string(),
            timeout: None,
            api_root: None,
        }
    }

    /// Set the host. Connections always use HTTPS; a leading `http://` or
    /// `https://` and trailing slashes are dropped.
    pub fn with_host(mut self, host: &str) -> Self {
        self.host = normalize_host(host);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_api_root(mut self, root: &str) -> Self {
        self.api_root = Some(format!("{}/", root.trim_end_matches('/')));
        self
    }

    /// Read settings from `CLASSEUR_USER_ID`, `CLASSEUR_API_KEY`, and the
    /// optional `CLASSEUR_HOST` and `CLASSEUR_TIMEOUT_MS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let user_id = lookup(ENV_USER_ID).ok_or(ConfigError::MissingVar(ENV_USER_ID))?;
        let api_key = lookup(ENV_API_KEY).ok_or(ConfigError::MissingVar(ENV_API_KEY))?;
        let mut config = Self::new(user_id, api_key);

        if let Some(host) = lookup(ENV_HOST).filter(|h| !h.trim().is_empty()) {
            config = config.with_host(&host);
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            let millis: u64 = raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
            config = config.with_timeout(Duration::from_millis(millis));
        }
        Ok(config)
    }

    /// Root URL shared by every API version, always ending in `/`.
    pub fn root(&self) -> String {
        match &self.api_root {
            Some(root) => root.clone(),
            None => format!("https://{}/api/", self.host),
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("user_id", &self.user_id)
            .field("api_key", &"<redacted>")
            .field("host", &self.host)
            .field("timeout", &self.timeout)
            .field("api_root", &self.api_root)
            .finish()
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let host = host
        .strip_prefix("https://")
        .or_else(|| host.strip_prefix("http://"))
        .unwrap_or(host);
    host.trim_end_matches('/').to_string()
}
