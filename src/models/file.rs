use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

pub const MAX_FILE_TYPE_LEN: usize = 50;
pub const MAX_FILE_NAME_LEN: usize = 200;

/// Uploaded parts without a declared content type are stored as this.
pub const DEFAULT_FILE_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = crate::schema::files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct NewFileRecord {
    pub id: Uuid,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
}

impl NewFileRecord {
    /// Builds the row for an upload. Only metadata is kept; the url is derived
    /// from the file name and points at nothing stored by this service.
    pub fn from_upload(caption: String, file_name: String, file_type: String) -> Self {
        Self {
            id: Uuid::now_v7(),
            caption: Some(caption),
            url: format!("/files/{file_name}"),
            file_type,
            file_name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::files)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct FileRecord {
    pub id: Uuid,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResponse {
    pub id: Uuid,
    pub caption: Option<String>,
    pub url: String,
}

impl From<FileRecord> for UploadResponse {
    fn from(f: FileRecord) -> Self {
        Self {
            id: f.id,
            caption: f.caption,
            url: f.url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileView {
    /// UUID rendered as a string.
    pub id: String,
    pub caption: Option<String>,
    pub url: String,
    pub file_type: String,
    pub file_name: String,
    /// RFC 3339 timestamp.
    pub created_at: String,
}

impl From<FileRecord> for FileView {
    fn from(f: FileRecord) -> Self {
        Self {
            id: f.id.to_string(),
            caption: f.caption,
            url: f.url,
            file_type: f.file_type,
            file_name: f.file_name,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileListResponse {
    #[serde(rename = "posts")]
    pub files: Vec<FileView>,
}
