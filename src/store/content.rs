use crate::config::ContentStoreConfig;
use crate::{Error, Result};
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

/// Maximum length of the sanitized file-name component of a storage key
const KEY_STEM_MAX_LEN: usize = 100;

/// Reference returned by the content store for a stored object
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredObject {
    pub public_id: String,
    pub secure_url: String,
    pub resource_type: String,
}

/// Client for the external object-storage service.
///
/// The store accepts raw bytes under a caller-chosen public id plus a
/// resource-type hint and returns a durable, publicly addressable reference.
/// Uploads are fire-and-forget-with-result; there is no rollback.
#[derive(Clone)]
pub struct ContentStore {
    client: Client,
    base_url: String,
}

impl ContentStore {
    pub fn new(config: &ContentStoreConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static("Repodrop/0.1"),
        );

        if let Some(api_key) = &config.api_key {
            let auth_value = format!("Bearer {api_key}");
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&auth_value)
                    .map_err(|e| Error::Internal(format!("Invalid content store key: {e}")))?,
            );
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Store one object; the store rejects empty payloads
    pub async fn put_object(
        &self,
        public_id: &str,
        bytes: Vec<u8>,
        resource_type: &str,
    ) -> Result<StoredObject> {
        let url = format!(
            "{}/objects/{public_id}?resource_type={resource_type}",
            self.base_url
        );
        debug!("Uploading {} bytes to {}", bytes.len(), url);

        let response = self.client.put(&url).body(bytes).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::UpstreamStatus(status.as_u16()));
        }

        response
            .json::<StoredObject>()
            .await
            .map_err(|e| Error::Internal(format!("Failed to parse store response: {e}")))
    }
}

/// Sanitize a file name into a storage-key stem: extension stripped,
/// non-alphanumerics replaced with `_`, truncated to a fixed length.
pub fn storage_key_stem(file_name: &str) -> String {
    let stem = match file_name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => file_name,
    };

    let mut sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    sanitized.truncate(KEY_STEM_MAX_LEN);
    sanitized
}

/// Build a collision-resistant storage key for an entry's relative path
pub fn unique_storage_key(relative_path: &str) -> String {
    let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
    let token = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", storage_key_stem(file_name), &token[..8])
}
