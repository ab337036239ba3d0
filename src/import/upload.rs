use crate::import::extract::ExtractedFile;
use crate::store::{content, ContentStore};
use crate::utils::names;
use futures::future::join_all;
use tracing::{debug, warn};

/// Uploads per batch; batches run strictly one after another
pub const UPLOAD_BATCH_SIZE: usize = 10;

/// A file that made it into the content store
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub storage_key: String,
    pub original_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub relative_path: String,
    pub content_url: String,
}

/// Pushes extracted files to the content store in fixed-size batches.
///
/// Within a batch all uploads run concurrently; a failed upload is logged
/// and dropped from the result without aborting the batch or the ones after
/// it. Completion order inside a batch is not defined, so results correlate
/// to inputs by relative path, not by index.
pub struct BulkUploader<'a> {
    store: &'a ContentStore,
}

impl<'a> BulkUploader<'a> {
    pub fn new(store: &'a ContentStore) -> Self {
        Self { store }
    }

    /// Upload every file, returning the successes and the failure count
    pub async fn upload_all(&self, mut files: Vec<ExtractedFile>) -> (Vec<UploadedFile>, usize) {
        let total = files.len();
        let mut uploaded = Vec::with_capacity(total);
        let mut failures = 0usize;

        while !files.is_empty() {
            let take = files.len().min(UPLOAD_BATCH_SIZE);
            let batch: Vec<ExtractedFile> = files.drain(..take).collect();

            let results = join_all(batch.into_iter().map(|file| self.upload_one(file))).await;

            for result in results {
                match result {
                    Ok(file) => uploaded.push(file),
                    Err((path, e)) => {
                        warn!("Upload failed for {}: {}", path, e.log_safe());
                        failures += 1;
                    }
                }
            }
        }

        debug!(
            "Bulk upload finished: {}/{} succeeded, {} failed",
            uploaded.len(),
            total,
            failures
        );

        (uploaded, failures)
    }

    async fn upload_one(
        &self,
        file: ExtractedFile,
    ) -> std::result::Result<UploadedFile, (String, crate::Error)> {
        let relative_path = file.relative_path;
        let size_bytes = file.bytes.len() as u64;

        let original_name = relative_path
            .rsplit('/')
            .next()
            .unwrap_or(relative_path.as_str())
            .to_string();
        let mime_type = names::mime_for_path(&relative_path).to_string();
        let resource_type = if mime_type.starts_with("image/") {
            "image"
        } else {
            "raw"
        };

        let key = content::unique_storage_key(&relative_path);

        let stored = self
            .store
            .put_object(&key, file.bytes, resource_type)
            .await
            .map_err(|e| (relative_path.clone(), e))?;

        Ok(UploadedFile {
            storage_key: stored.public_id,
            original_name,
            mime_type,
            size_bytes,
            relative_path,
            content_url: stored.secure_url,
        })
    }
}
