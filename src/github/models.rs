use serde::{Deserialize, Serialize};

/// Repository information as returned by `GET /repos/{owner}/{repo}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub forks_count: u64,
    pub language: Option<String>,
    /// Repository size in kilobytes
    pub size: u64,
    pub default_branch: String,
}

/// Read-only metadata snapshot held for the duration of one import or info call
#[derive(Debug, Clone, Serialize)]
pub struct RepoMetadata {
    pub description: Option<String>,
    pub star_count: u64,
    pub fork_count: u64,
    pub language: Option<String>,
    pub size_kb: u64,
    pub default_branch: String,
}

impl From<Repository> for RepoMetadata {
    fn from(repo: Repository) -> Self {
        Self {
            description: repo.description,
            star_count: repo.stargazers_count,
            fork_count: repo.forks_count,
            language: repo.language,
            size_kb: repo.size,
            default_branch: repo.default_branch,
        }
    }
}

impl RepoMetadata {
    /// Repository size in bytes as reported by the metadata service
    pub fn size_bytes(&self) -> u64 {
        self.size_kb * 1024
    }
}
