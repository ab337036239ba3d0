use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Container {
    pub id: i64,
    pub name: String,
    pub password_hash: String,
    pub source_repo: Option<String>,
    pub source_branch: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewContainer {
    pub name: String,
    pub password_hash: String,
    pub source_repo: Option<String>,
    pub source_branch: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StoredFile {
    pub id: i64,
    pub container_id: i64,
    pub storage_key: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: i64,
    pub relative_path: String,
    pub content_url: String,
    pub created_at: DateTime<Utc>,
}
