//! Documented payload shapes returned by the Classeur API.
//!
//! # Design
//! The client itself passes payloads through as opaque `serde_json::Value`s.
//! These types are an opt-in view for callers who want named fields: only
//! `id` is required, everything else is optional, and unknown fields are
//! ignored so server-side additions do not break decoding.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ClientError};

/// Content of a file at its latest revision.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileContent {
    pub text: Option<String>,
    pub rev: Option<u64>,
    pub properties: Option<Value>,
    #[serde(default)]
    pub discussions: Vec<Value>,
}

/// A file together with its content, as returned by `get_file`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    pub id: String,
    pub name: Option<String>,
    pub permission: Option<Value>,
    pub user_id: Option<String>,
    /// Milliseconds since the epoch.
    pub updated: Option<u64>,
    pub content: Option<FileContent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: Option<String>,
    pub permission: Option<Value>,
    pub user_id: Option<String>,
    pub updated: Option<u64>,
}

/// A file as listed inside a folder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderFileEntry {
    pub id: String,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub updated: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub updated: Option<u64>,
    #[serde(default)]
    pub files: Vec<FolderFileEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderMetadata {
    pub id: String,
    pub name: Option<String>,
    pub user_id: Option<String>,
    pub updated: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub id: String,
    pub name: Option<String>,
}

/// Decode an opaque payload into one of the documented shapes.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| {
        ClientError::new(format!("JSON decoding failed: {e}"), None, None, None).into()
    })
}
