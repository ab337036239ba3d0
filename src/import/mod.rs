pub mod extract;
pub mod orchestrator;
pub mod policy;
pub mod rate_limit;
pub mod upload;

pub use extract::{extract_archive, ExtractedFile, Extraction};
pub use orchestrator::{ImportOutcome, Importer};
pub use policy::{AdmissionPolicy, AdmissionReason};
pub use rate_limit::ImportRateLimiter;
pub use upload::{BulkUploader, UploadedFile};
