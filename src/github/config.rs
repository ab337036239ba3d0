use std::env;

/// GitHub access configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// Optional GitHub personal access token for increased rate limits
    pub token: Option<String>,

    /// Base URL of the repository metadata API
    pub api_base_url: String,

    /// Base URL of the archive download host
    pub archive_base_url: String,

    /// Maximum redirect hops to follow when downloading archives
    pub max_redirects: u32,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GitHubConfig {
    /// Create a new GitHubConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            token: env::var("GITHUB_TOKEN").ok(),
            api_base_url: env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            archive_base_url: env::var("GITHUB_ARCHIVE_URL")
                .unwrap_or_else(|_| "https://github.com".to_string()),
            max_redirects: env::var("GITHUB_MAX_REDIRECTS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
            timeout_secs: env::var("GITHUB_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(30),
        }
    }
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base_url: "https://api.github.com".to_string(),
            archive_base_url: "https://github.com".to_string(),
            max_redirects: 5,
            timeout_secs: 30,
        }
    }
}
