use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::net::TcpListener;

pub const USER_ID: &str = "user-1";
pub const FILE_ID: &str = "file-1";
pub const OTHER_FILE_ID: &str = "file-2";
pub const LOCKED_FILE_ID: &str = "file-locked";
pub const FOLDER_ID: &str = "folder-1";
/// A folder that answers 200 with a `null` body instead of an error.
pub const VANISHED_FOLDER_ID: &str = "folder-vanished";

#[derive(Clone, Debug)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub updated: u64,
    pub text: String,
    pub rev: u64,
}

#[derive(Clone, Debug)]
pub struct FolderRecord {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub updated: u64,
    pub files: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub id: String,
    pub name: String,
    pub permission: String,
    pub user_id: String,
    pub updated: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub text: String,
    pub rev: u64,
    pub properties: Value,
    pub discussions: Vec<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FolderEntry {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub updated: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: String,
    pub name: String,
    pub user_id: String,
    pub updated: u64,
    pub files: Vec<FolderEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub error: String,
    pub reason: String,
}

/// Everything the mock API knows about.
#[derive(Clone, Debug, Default)]
pub struct Fixtures {
    pub users: Vec<User>,
    pub files: HashMap<String, FileRecord>,
    pub folders: HashMap<String, FolderRecord>,
    /// Files whose metadata is visible but whose content is not.
    pub locked: HashSet<String>,
    pub vanished: HashSet<String>,
}

impl Fixtures {
    pub fn sample() -> Self {
        let file = |id: &str, name: &str, text: &str, rev: u64| FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            user_id: USER_ID.to_string(),
            updated: 1_458_000_000_000 + rev,
            text: text.to_string(),
            rev,
        };
        let files = [
            file(FILE_ID, "Notes", "# Notes\nhello", 3),
            file(OTHER_FILE_ID, "Groceries", "- [ ] milk", 1),
            file(LOCKED_FILE_ID, "Private", "secret", 7),
        ];
        let folder = FolderRecord {
            id: FOLDER_ID.to_string(),
            name: "Inbox".to_string(),
            user_id: USER_ID.to_string(),
            updated: 1_458_000_000_100,
            files: vec![FILE_ID.to_string(), OTHER_FILE_ID.to_string()],
        };

        Self {
            users: vec![User {
                id: USER_ID.to_string(),
                name: "Demo User".to_string(),
            }],
            files: files.into_iter().map(|f| (f.id.clone(), f)).collect(),
            folders: HashMap::from([(folder.id.clone(), folder)]),
            locked: HashSet::from([LOCKED_FILE_ID.to_string()]),
            vanished: HashSet::from([VANISHED_FOLDER_ID.to_string()]),
        }
    }

    fn file_metadata(&self, id: &str) -> Option<FileMetadata> {
        self.files.get(id).map(|f| FileMetadata {
            id: f.id.clone(),
            name: f.name.clone(),
            permission: "private".to_string(),
            user_id: f.user_id.clone(),
            updated: f.updated,
        })
    }

    fn folder_metadata(&self, id: &str) -> Option<FolderEntry> {
        self.folders.get(id).map(|f| FolderEntry {
            id: f.id.clone(),
            name: f.name.clone(),
            user_id: f.user_id.clone(),
            updated: f.updated,
        })
    }
}

pub type Db = Arc<Fixtures>;

pub fn app() -> Router {
    app_with(Fixtures::sample())
}

pub fn app_with(fixtures: Fixtures) -> Router {
    let db: Db = Arc::new(fixtures);
    Router::new()
        .route("/api/v1/files/{id}", get(get_file))
        .route("/api/v2/files/{id}", get(get_file))
        .route("/api/v2/files/{id}/contentRevs/last", get(get_content))
        .route("/api/v1/folders/{id}", get(get_folder))
        .route("/api/v1/users", get(list_users))
        .route("/api/v1/metadata/{kind}", get(get_metadata))
        .layer(middleware::from_fn(require_basic_auth))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// An error answer in the API's `{error, reason}` shape.
pub struct ApiFailure {
    status: StatusCode,
    reason: &'static str,
}

impl ApiFailure {
    fn forbidden(reason: &'static str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            reason,
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self
                .status
                .canonical_reason()
                .unwrap_or("Error")
                .to_string(),
            reason: self.reason.to_string(),
        };
        (self.status, Json(body)).into_response()
    }
}

async fn require_basic_auth(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Basic "));
    if !authorized {
        return ApiFailure {
            status: StatusCode::UNAUTHORIZED,
            reason: "authorization_required",
        }
        .into_response();
    }
    next.run(request).await
}

async fn get_file(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<FileMetadata>, ApiFailure> {
    db.file_metadata(&id)
        .map(Json)
        .ok_or(ApiFailure::forbidden("file_is_not_readable"))
}

async fn get_content(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Content>, ApiFailure> {
    if db.locked.contains(&id) {
        return Err(ApiFailure::forbidden("content_is_not_readable"));
    }
    let file = db
        .files
        .get(&id)
        .ok_or(ApiFailure::forbidden("content_is_not_readable"))?;
    Ok(Json(Content {
        text: file.text.clone(),
        rev: file.rev,
        properties: Value::Object(Default::default()),
        discussions: Vec::new(),
    }))
}

async fn get_folder(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Option<Folder>>, ApiFailure> {
    if db.vanished.contains(&id) {
        return Ok(Json(None));
    }
    let folder = db
        .folders
        .get(&id)
        .ok_or(ApiFailure::forbidden("folder_is_not_readable"))?;
    let files = folder
        .files
        .iter()
        .filter_map(|file_id| db.files.get(file_id))
        .map(|f| FolderEntry {
            id: f.id.clone(),
            name: f.name.clone(),
            user_id: f.user_id.clone(),
            updated: f.updated,
        })
        .collect();
    Ok(Json(Some(Folder {
        id: folder.id.clone(),
        name: folder.name.clone(),
        user_id: folder.user_id.clone(),
        updated: folder.updated,
        files,
    })))
}

async fn list_users(State(db): State<Db>) -> Json<Vec<User>> {
    Json(db.users.clone())
}

#[derive(Deserialize)]
pub struct MetadataQuery {
    #[serde(default)]
    pub id: String,
}

/// Batched metadata lookup. Unknown ids are silently left out of the answer.
async fn get_metadata(
    State(db): State<Db>,
    Path(kind): Path<String>,
    Query(query): Query<MetadataQuery>,
) -> Result<Json<Vec<Value>>, StatusCode> {
    let ids = query.id.split(',').filter(|id| !id.is_empty());
    let found: Vec<Value> = match kind.as_str() {
        "users" => ids
            .filter_map(|id| db.users.iter().find(|u| u.id == id))
            .filter_map(|u| serde_json::to_value(u).ok())
            .collect(),
        "files" => ids
            .filter_map(|id| db.file_metadata(id))
            .filter_map(|f| serde_json::to_value(f).ok())
            .collect(),
        "folders" => ids
            .filter_map(|id| db.folder_metadata(id))
            .filter_map(|f| serde_json::to_value(f).ok())
            .collect(),
        _ => return Err(StatusCode::NOT_FOUND),
    };
    Ok(Json(found))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_metadata_serializes_camel_case() {
        let meta = Fixtures::sample().file_metadata(FILE_ID).unwrap();
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["id"], FILE_ID);
        assert_eq!(json["userId"], USER_ID);
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn sample_fixtures_are_consistent() {
        let fixtures = Fixtures::sample();
        let folder = &fixtures.folders[FOLDER_ID];
        assert!(folder.files.iter().all(|id| fixtures.files.contains_key(id)));
        assert!(fixtures.files.contains_key(LOCKED_FILE_ID));
        assert!(!fixtures.folders.contains_key(VANISHED_FOLDER_ID));
    }

    #[test]
    fn error_body_uses_canonical_reason() {
        let failure = ApiFailure::forbidden("file_is_not_readable");
        assert_eq!(failure.status.canonical_reason(), Some("Forbidden"));
    }

    #[test]
    fn metadata_query_defaults_to_empty_id_list() {
        let query: MetadataQuery = serde_json::from_str("{}").unwrap();
        assert!(query.id.is_empty());
    }
}
