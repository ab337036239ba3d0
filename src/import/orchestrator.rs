use crate::config::Settings;
use crate::db::{self, models::NewContainer, DbPool};
use crate::github::{parse_reference, GitHubClient, GitHubConfig, RepoMetadata, RepoReference};
use crate::import::extract::extract_archive;
use crate::import::rate_limit::ImportRateLimiter;
use crate::import::upload::{BulkUploader, UploadedFile};
use crate::store::ContentStore;
use crate::utils::names;
use crate::{Error, Result};
use tracing::{info, warn};

/// Branch tried once when the default-derived branch has no archive
pub const FALLBACK_BRANCH: &str = "master";

/// Terminal result of a successful import
#[derive(Debug)]
pub struct ImportOutcome {
    pub container_id: i64,
    pub container_name: String,
    pub password: String,
    pub file_count: usize,
    pub skipped_count: usize,
    pub total_size_bytes: u64,
    pub reference: RepoReference,
    pub metadata: RepoMetadata,
}

/// Metadata snapshot backing the info endpoint
#[derive(Debug)]
pub struct RepoInfo {
    pub reference: RepoReference,
    pub metadata: RepoMetadata,
    pub is_too_big: bool,
}

/// Sequences one repository import: rate gate, locator parse, metadata
/// fetch, size gate, archive fetch (with the single branch fallback),
/// extraction, bulk upload, container commit. Nothing is retried beyond
/// the fallback; each failure is terminal for the invocation.
#[derive(Clone)]
pub struct Importer {
    github: GitHubClient,
    store: ContentStore,
    pool: DbPool,
    limiter: ImportRateLimiter,
    settings: Settings,
}

impl Importer {
    pub fn new(settings: Settings, github_config: GitHubConfig, pool: DbPool) -> Result<Self> {
        let github = GitHubClient::new(github_config)?;
        let store = ContentStore::new(&settings.content_store)?;
        let limiter = ImportRateLimiter::new(
            settings.import.rate_limit_per_window,
            settings.import.rate_window_seconds,
        );

        Ok(Self {
            github,
            store,
            pool,
            limiter,
            settings,
        })
    }

    /// Handle to the shared rate limiter, for starting the sweeper task
    pub fn rate_limiter(&self) -> ImportRateLimiter {
        self.limiter.clone()
    }

    /// Run a full import for `raw_url` on behalf of `client_key`
    pub async fn import(
        &self,
        raw_url: &str,
        branch_override: Option<String>,
        client_key: &str,
    ) -> Result<ImportOutcome> {
        if !self.limiter.check(client_key).await {
            return Err(Error::RateLimited);
        }

        let mut reference = parse_reference(raw_url)?;
        if let Some(branch) = branch_override {
            if branch.trim().is_empty() {
                return Err(Error::Validation("Branch name cannot be empty".to_string()));
            }
            reference.branch = branch;
            reference.branch_explicit = true;
        }

        info!(
            "Importing {} (branch {})",
            reference.slug(),
            reference.branch
        );

        let metadata: RepoMetadata = self
            .github
            .get_repository(&reference.owner, &reference.repo)
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound(format!(
                    "Repository {} not found or not accessible",
                    reference.slug()
                )),
                other => other,
            })?
            .into();

        let max_bytes = self.settings.import.max_repo_size_mb * 1024 * 1024;
        if metadata.size_bytes() > max_bytes {
            return Err(Error::TooLarge(format!(
                "Repository is {} (limit {})",
                names::human_size(metadata.size_bytes()),
                names::human_size(max_bytes)
            )));
        }

        let archive = self.fetch_archive(&mut reference, max_bytes).await?;

        let extraction = extract_archive(&archive)?;
        if extraction.files.is_empty() {
            return Err(Error::NoAdmissibleFiles);
        }

        let skipped_count = extraction.skipped;
        let uploader = BulkUploader::new(&self.store);
        let (uploaded, failed) = uploader.upload_all(extraction.files).await;
        if uploaded.is_empty() {
            return Err(Error::UploadFailed);
        }
        if failed > 0 {
            warn!(
                "{} of {} uploads failed for {}",
                failed,
                uploaded.len() + failed,
                reference.slug()
            );
        }

        let total_size_bytes: u64 = uploaded.iter().map(|f| f.size_bytes).sum();
        let (container_id, container_name, password) =
            self.commit(&reference, &uploaded).await?;

        info!(
            "Imported {} into container {} ({} files, {} skipped, {})",
            reference.slug(),
            container_name,
            uploaded.len(),
            skipped_count,
            names::human_size(total_size_bytes)
        );

        Ok(ImportOutcome {
            container_id,
            container_name,
            password,
            file_count: uploaded.len(),
            skipped_count,
            total_size_bytes,
            reference,
            metadata,
        })
    }

    /// Fetch repository metadata for the info endpoint
    pub async fn repo_info(&self, raw_url: &str) -> Result<RepoInfo> {
        let reference = parse_reference(raw_url)?;

        let metadata: RepoMetadata = self
            .github
            .get_repository(&reference.owner, &reference.repo)
            .await
            .map_err(|e| match e {
                Error::NotFound(_) => Error::NotFound(format!(
                    "Repository {} not found or not accessible",
                    reference.slug()
                )),
                other => other,
            })?
            .into();

        let max_bytes = self.settings.import.max_repo_size_mb * 1024 * 1024;
        let is_too_big = metadata.size_bytes() > max_bytes;

        Ok(RepoInfo {
            reference,
            metadata,
            is_too_big,
        })
    }

    /// Download the branch archive, trying `master` once when the derived
    /// default branch has none
    async fn fetch_archive(
        &self,
        reference: &mut RepoReference,
        max_bytes: u64,
    ) -> Result<Vec<u8>> {
        let first = self
            .github
            .download_archive(
                &reference.owner,
                &reference.repo,
                &reference.branch,
                max_bytes,
            )
            .await;

        match first {
            Ok(bytes) => Ok(bytes),
            Err(Error::NotFound(_)) | Err(Error::UpstreamStatus(_))
                if !reference.branch_explicit =>
            {
                warn!(
                    "No archive for {} branch {}, retrying {}",
                    reference.slug(),
                    reference.branch,
                    FALLBACK_BRANCH
                );

                let bytes = self
                    .github
                    .download_archive(&reference.owner, &reference.repo, FALLBACK_BRANCH, max_bytes)
                    .await
                    .map_err(|e| match e {
                        Error::NotFound(_) | Error::UpstreamStatus(_) => Error::NotFound(format!(
                            "No downloadable archive for {} on branch {} or {}",
                            reference.slug(),
                            reference.branch,
                            FALLBACK_BRANCH
                        )),
                        other => other,
                    })?;

                reference.branch = FALLBACK_BRANCH.to_string();
                Ok(bytes)
            }
            Err(Error::NotFound(_)) => Err(Error::NotFound(format!(
                "Branch {} not found for {}",
                reference.branch,
                reference.slug()
            ))),
            Err(e) => Err(e),
        }
    }

    /// Persist the container and its file list, derives a collision-safe name
    /// and returns the plaintext password exactly once.
    ///
    /// The exists-check is best-effort; two concurrent imports of the same
    /// repository can both pass it, and the UNIQUE constraint decides the race.
    async fn commit(
        &self,
        reference: &RepoReference,
        uploaded: &[UploadedFile],
    ) -> Result<(i64, String, String)> {
        let base_name = names::derive_container_name(&reference.owner, &reference.repo);

        let name = if db::containers::find_by_name(&self.pool, &base_name)
            .await?
            .is_some()
        {
            format!("{}-{}", base_name, names::collision_suffix())
        } else {
            base_name
        };

        let password = names::generate_password();
        let container = db::containers::create_container(
            &self.pool,
            &NewContainer {
                name,
                password_hash: names::hash_password(&password),
                source_repo: Some(reference.slug()),
                source_branch: Some(reference.branch.clone()),
            },
        )
        .await?;

        db::files::insert_files(&self.pool, container.id, uploaded).await?;

        Ok((container.id, container.name, password))
    }
}
