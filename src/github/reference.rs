use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

const HOST_PREFIX: &str = "github.com/";

/// Default branch assumed when the locator does not name one
pub const DEFAULT_BRANCH: &str = "main";

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9._-]+$").expect("valid identifier pattern"))
}

/// Parsed repository locator, immutable once constructed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Whether the locator named a branch explicitly (`/tree/<branch>`)
    pub branch_explicit: bool,
}

impl RepoReference {
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// Parse a GitHub repository locator
/// Accepts formats:
/// - https://github.com/owner/repo
/// - http://github.com/owner/repo
/// - github.com/owner/repo
/// - github.com/owner/repo.git
/// - github.com/owner/repo/tree/branch (branch may contain slashes)
pub fn parse_reference(raw: &str) -> Result<RepoReference> {
    let url = raw.trim();

    // Remove protocol if present
    let url = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);

    let path = url.strip_prefix(HOST_PREFIX).ok_or_else(|| {
        Error::Validation(format!(
            "Not a GitHub repository URL, expected {HOST_PREFIX}owner/repo"
        ))
    })?;

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    if segments.len() < 2 {
        return Err(Error::Validation(
            "Repository URL is missing the owner or repository segment".to_string(),
        ));
    }

    let owner = segments[0].to_string();
    let repo = segments[1].trim_end_matches(".git").to_string();

    // `/tree/<branch>` selects a branch; branch names may themselves contain slashes
    let (branch, branch_explicit) = if segments.len() > 3 && segments[2] == "tree" {
        (segments[3..].join("/"), true)
    } else {
        (DEFAULT_BRANCH.to_string(), false)
    };

    if !identifier_pattern().is_match(&owner) || !identifier_pattern().is_match(&repo) {
        return Err(Error::Validation(format!(
            "Invalid repository identifier: {owner}/{repo}"
        )));
    }

    Ok(RepoReference {
        owner,
        repo,
        branch,
        branch_explicit,
    })
}
