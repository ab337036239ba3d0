pub mod client;
pub mod config;
pub mod models;
pub mod reference;

pub use client::GitHubClient;
pub use config::GitHubConfig;
pub use models::{RepoMetadata, Repository};
pub use reference::{parse_reference, RepoReference};
