use serde::{Deserialize, Serialize};

/// Import request body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportRequest {
    pub repo_url: String,
    #[serde(default)]
    pub branch: Option<String>,
}

/// Import response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub container_id: i64,
    pub container_name: String,
    pub password: String,
    pub sandbox_url: String,
    pub file_count: usize,
    pub skipped_count: usize,
    pub total_size: u64,
    pub repo_info: RepoSummary,
}

/// Repository summary embedded in the import response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoSummary {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub description: Option<String>,
    pub stars: u64,
    pub language: Option<String>,
}

/// Info request parameters
#[derive(Debug, Clone, Deserialize)]
pub struct InfoParams {
    pub url: String,
}

/// Info response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub language: Option<String>,
    pub size: u64,
    pub size_human: String,
    pub is_too_big: bool,
    pub default_branch: String,
}

/// Container detail response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerResponse {
    pub name: String,
    pub source_repo: Option<String>,
    pub source_branch: Option<String>,
    pub created_at: String,
    pub files: Vec<FileView>,
}

/// One file inside a container
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileView {
    pub name: String,
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub url: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
