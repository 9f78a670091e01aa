//! Async client for the Classeur REST API.
//!
//! # Overview
//! Retrieves files, folders, users, and their metadata. Plural operations
//! accept one identifier, a collection, or a variadic list built with
//! [`ids!`]; the identifiers are fetched in parallel and the results
//! collapsed back into a single value or an array.
//!
//! # Design
//! - Every call resolves to `Result<Value, ApiError>`: a full result or an
//!   error, never partial data. A success response with nothing usable in it
//!   is reported as a "no results" `ClientError`.
//! - `ApiError` separates client-side failures (timeouts, aborts, bad JSON)
//!   from server-reported ones (non-success HTTP status).
//! - Misusing the call shape (a collection passed to a scalar operation, no
//!   identifiers at all) panics before any request is issued.
//! - HTTP is behind the `Transport` trait. `ReqwestTransport` is the default;
//!   tests inject scripted transports instead of toggling global flags.
//! - Payloads stay opaque JSON; `types` documents their shape for callers who
//!   want to `decode` them.

pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod scrub;
pub mod shape;
pub mod transport;
pub mod types;

pub use client::{ApiVersion, ClasseurClient};
pub use config::ClientConfig;
pub use error::{ApiError, ClientError, ConfigError, FailureCause, MissingStatus, ResponseMeta, ServerError};
pub use http::{BasicAuth, FnTransport, HttpRequest, HttpResponse, Transport, TransportEvent};
pub use shape::{IdArgs, Identifier, LogicalRequest, MetadataKind, Resource};
pub use transport::ReqwestTransport;
pub use types::decode;
