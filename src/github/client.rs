use crate::github::{config::GitHubConfig, models::Repository};
use crate::{Error, Result};
use reqwest::{header, Client, StatusCode};
use tracing::{debug, error};
use url::Url;

/// Upper bound for metadata JSON bodies
const METADATA_MAX_BYTES: u64 = 1024 * 1024;

/// GitHub API client
///
/// Redirects are followed manually so the hop count stays bounded and the
/// body size cap applies to the final target as well.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Repodrop/0.1"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github.v3+json"),
        );

        // Add authentication if token is provided
        if let Some(token) = &config.token {
            let auth_value = format!("Bearer {token}");
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Internal(format!("Invalid GitHub token: {e}")))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Get repository information
    pub async fn get_repository(&self, owner: &str, repo: &str) -> Result<Repository> {
        let url = format!("{}/repos/{owner}/{repo}", self.config.api_base_url);
        self.fetch_json(&url).await
    }

    /// Download the branch snapshot archive, capped at `max_bytes`
    pub async fn download_archive(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        max_bytes: u64,
    ) -> Result<Vec<u8>> {
        let url = format!(
            "{}/{owner}/{repo}/archive/refs/heads/{branch}.zip",
            self.config.archive_base_url
        );
        self.fetch_bytes(&url, max_bytes).await
    }

    /// GET a URL following redirects up to the configured hop limit, streaming
    /// the body and failing the moment the accumulated size passes `max_bytes`
    async fn fetch_bytes(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>> {
        let mut target = url.to_string();

        for _hop in 0..=self.config.max_redirects {
            debug!("GET {}", target);

            let response = self.client.get(&target).send().await?;
            let status = response.status();

            if status.is_redirection() {
                let location = response
                    .headers()
                    .get(header::LOCATION)
                    .and_then(|v| v.to_str().ok())
                    .ok_or_else(|| {
                        Error::Internal(format!("Redirect without Location from {target}"))
                    })?;

                // Location may be relative; resolve against the current URL
                target = Url::parse(&target)?.join(location)?.to_string();
                continue;
            }

            if !status.is_success() {
                error!("Upstream error: {} from {}", status, target);
                return Err(match status {
                    StatusCode::NOT_FOUND => {
                        Error::NotFound("Upstream resource not found".to_string())
                    }
                    other => Error::UpstreamStatus(other.as_u16()),
                });
            }

            return read_capped(response, max_bytes).await;
        }

        Err(Error::TooManyRedirects(self.config.max_redirects))
    }

    /// GET a URL and deserialize the JSON body
    async fn fetch_json<T>(&self, url: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        let bytes = self.fetch_bytes(url, METADATA_MAX_BYTES).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::Internal(format!("Failed to parse upstream response: {e}")))
    }
}

/// Accumulate a response body, aborting the transfer once `max_bytes` is passed
async fn read_capped(mut response: reqwest::Response, max_bytes: u64) -> Result<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    while let Some(chunk) = response.chunk().await? {
        if (buf.len() + chunk.len()) as u64 > max_bytes {
            // Dropping the response closes the connection mid-transfer
            return Err(Error::SizeExceeded(max_bytes));
        }
        buf.extend_from_slice(&chunk);
    }

    Ok(buf)
}
