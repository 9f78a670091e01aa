//! Resource query façade for the Classeur API.
//!
//! # Design
//! `ClasseurClient` holds its configuration and an injected `Transport`, and
//! carries no state between calls. Every public operation follows the same
//! pipeline:
//!
//! 1. normalize the identifier arguments into a `LogicalRequest` (eagerly,
//!    so misuse panics before a future exists),
//! 2. fan out one unary query per identifier, or one batched query for
//!    metadata lookups,
//! 3. scrub the aggregate into a single value or an array.
//!
//! `build_query` produces the `HttpRequest` for a path so the request shape
//! can be inspected without touching the network.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, ConfigError};
use crate::fetch::{aggregate, fetch_each};
use crate::http::{parse_event, BasicAuth, HttpRequest, Transport};
use crate::scrub::{entries, scrub};
use crate::shape::{IdArgs, Identifier, LogicalRequest, MetadataKind, Resource};
use crate::transport::{ReqwestTransport, USER_AGENT};

const CONTENT_NOT_READABLE: &str = "content_is_not_readable";
const FILE_NOT_READABLE: &str = "file_is_not_readable";

/// Version segment of the API root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1/",
            ApiVersion::V2 => "v2/",
        }
    }
}

/// Client for the file, folder, and user endpoints of the Classeur API.
///
/// Plural operations take one id, a collection, or `ids!(a, b, ...)`;
/// scalar operations take exactly one id and panic when handed a collection.
///
/// ```no_run
/// # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
/// use classeur_client::{ids, ClasseurClient, ClientConfig};
///
/// let client = ClasseurClient::new(ClientConfig::new("my user id", "my api key"))?;
/// let file = client.get_file("some file id").await?;
/// let files = client.get_files(ids!("a", "b")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ClasseurClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

impl ClasseurClient {
    /// Build a client that talks HTTPS through reqwest.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client on top of an injected transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Retrieve a single file with its latest content revision merged in
    /// under `content`.
    pub fn get_file(&self, id: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.dispatch(LogicalRequest::single("get_file", Resource::Files, id.into()))
    }

    /// Retrieve one or more files. One request pair is made per id, in
    /// parallel.
    pub fn get_files(&self, ids: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.dispatch(LogicalRequest::many("get_files", Resource::Files, ids.into()))
    }

    pub fn get_folder(&self, id: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.dispatch(LogicalRequest::single("get_folder", Resource::Folders, id.into()))
    }

    /// Retrieve one or more folders. One request is made per id, in parallel.
    pub fn get_folders(&self, ids: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.dispatch(LogicalRequest::many("get_folders", Resource::Folders, ids.into()))
    }

    /// Retrieve every user on the account the client is connected to.
    pub fn get_users(&self) -> BoxFuture<'_, Result<Value, ApiError>> {
        async move {
            let users = self.query(ApiVersion::V1, "users", &[]).await;
            scrub(users.map(entries), true, None)
        }
        .boxed()
    }

    pub fn get_user_metadata(&self, id: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_user_metadata", MetadataKind::Users, false, id.into())
    }

    pub fn get_file_metadata(&self, id: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_file_metadata", MetadataKind::Files, false, id.into())
    }

    pub fn get_folder_metadata(&self, id: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_folder_metadata", MetadataKind::Folders, false, id.into())
    }

    /// Retrieve metadata for one or more users in a single batched request.
    pub fn get_users_metadata(&self, ids: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_users_metadata", MetadataKind::Users, true, ids.into())
    }

    /// Retrieve metadata for one or more files in a single batched request.
    pub fn get_files_metadata(&self, ids: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_files_metadata", MetadataKind::Files, true, ids.into())
    }

    /// Retrieve metadata for one or more folders in a single batched request.
    pub fn get_folders_metadata(&self, ids: impl Into<IdArgs>) -> BoxFuture<'_, Result<Value, ApiError>> {
        self.metadata("get_folders_metadata", MetadataKind::Folders, true, ids.into())
    }

    /// Describe the GET request for `path` under the given API version.
    pub fn build_query(&self, version: ApiVersion, path: &str, params: &[(&str, String)]) -> HttpRequest {
        HttpRequest {
            url: format!("{}{}{path}", self.config.root(), version.as_str()),
            headers: vec![("x-agent-info".to_string(), USER_AGENT.to_string())],
            auth: Some(BasicAuth {
                user: self.config.user_id.clone(),
                password: self.config.api_key.clone(),
            }),
            query: params
                .iter()
                .map(|(name, value)| (name.to_string(), value.clone()))
                .collect(),
        }
    }

    /// Issue one GET and decode its body.
    pub async fn query(
        &self,
        version: ApiVersion,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Value, ApiError> {
        let request = self.build_query(version, path, params);
        let url = request.url.clone();
        tracing::debug!(%url, "GET");

        let event = self.transport.get(request).await;
        let result = parse_event(event, &url, self.config.timeout);
        if let Err(e) = &result {
            tracing::debug!(%url, error = %e, "query failed");
        }
        result
    }

    fn metadata(
        &self,
        op: &str,
        kind: MetadataKind,
        want_array: bool,
        args: IdArgs,
    ) -> BoxFuture<'_, Result<Value, ApiError>> {
        let request = if want_array {
            LogicalRequest::many(op, Resource::Metadata(kind), args)
        } else {
            LogicalRequest::single(op, Resource::Metadata(kind), args)
        };
        self.dispatch(request)
    }

    fn dispatch(&self, request: LogicalRequest) -> BoxFuture<'_, Result<Value, ApiError>> {
        async move {
            let LogicalRequest {
                resource,
                ids,
                want_array,
            } = request;

            match resource {
                Resource::Files => {
                    let outcomes = fetch_each(&ids, |id| self.file(id)).await;
                    scrub(aggregate(outcomes), want_array, Some(ids.len()))
                }
                Resource::Folders => {
                    let outcomes = fetch_each(&ids, |id| self.folder(id)).await;
                    scrub(aggregate(outcomes), want_array, Some(ids.len()))
                }
                Resource::Metadata(kind) => {
                    let joined = ids
                        .iter()
                        .map(Identifier::as_str)
                        .collect::<Vec<_>>()
                        .join(",");
                    let path = format!("metadata/{}", kind.as_str());
                    let batch = self.query(ApiVersion::V1, &path, &[("id", joined)]).await;
                    scrub(batch.map(entries), want_array, None)
                }
            }
        }
        .boxed()
    }

    async fn folder(&self, id: &Identifier) -> Result<Value, ApiError> {
        self.query(ApiVersion::V1, &format!("folders/{id}"), &[]).await
    }

    /// Fetch a file's metadata and latest content revision together and merge
    /// them into one payload.
    async fn file(&self, id: &Identifier) -> Result<Value, ApiError> {
        let metadata_path = format!("files/{id}");
        let content_path = format!("files/{id}/contentRevs/last");
        let (metadata, content) = futures::join!(
            self.query(ApiVersion::V2, &metadata_path, &[]),
            self.query(ApiVersion::V2, &content_path, &[]),
        );

        match scrub(aggregate(vec![metadata, content]), true, Some(2)) {
            Ok(parts) => merge_file(entries(parts)),
            Err(mut e) => {
                // Whichever half fails first, report it the same way.
                e.remap_reason(CONTENT_NOT_READABLE, FILE_NOT_READABLE);
                Err(e)
            }
        }
    }
}

impl std::fmt::Debug for ClasseurClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClasseurClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Merge `[metadata, content]` in either order: the content half is the one
/// carrying `text`.
fn merge_file(mut parts: Vec<Value>) -> Result<Value, ApiError> {
    if parts.len() != 2 {
        return Err(ApiError::no_results());
    }
    if parts[0].get("text").is_some() && parts[1].get("text").is_none() {
        parts.swap(0, 1);
    }
    let content = parts.pop();
    match (parts.pop(), content) {
        (Some(Value::Object(mut metadata)), Some(content)) => {
            metadata.insert("content".to_string(), content);
            Ok(Value::Object(metadata))
        }
        (metadata, _) => Err(ClientError::new(
            "unexpected file metadata payload",
            metadata,
            None,
            None,
        )
        .into()),
    }
}
