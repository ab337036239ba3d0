use sha2::{Digest, Sha256};

/// Maximum length of a derived container name
const CONTAINER_NAME_MAX_LEN: usize = 60;

/// Derive a container name from a repository owner and name.
/// Lowercased, non-alphanumerics collapsed to single dashes.
pub fn derive_container_name(owner: &str, repo: &str) -> String {
    let mut name = String::with_capacity(owner.len() + repo.len() + 1);

    for c in format!("{owner}-{repo}").chars() {
        if c.is_ascii_alphanumeric() {
            name.push(c.to_ascii_lowercase());
        } else if !name.ends_with('-') {
            name.push('-');
        }
    }

    let trimmed = name.trim_matches('-').to_string();
    let mut result = if trimmed.is_empty() {
        "container".to_string()
    } else {
        trimmed
    };
    result.truncate(CONTAINER_NAME_MAX_LEN);
    result
}

/// Short random suffix appended when a derived name collides
pub fn collision_suffix() -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    token[..6].to_string()
}

/// Generate a fresh container password, returned to the caller exactly once
pub fn generate_password() -> String {
    let token = uuid::Uuid::new_v4().simple().to_string();
    token[..16].to_string()
}

/// SHA-256 hex digest of a password; only the digest is persisted
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Render a byte count in human-readable form
pub fn human_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

/// Best-effort MIME type from the file extension
pub fn mime_for_path(path: &str) -> &'static str {
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "txt" | "text" | "log" => "text/plain",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "js" | "mjs" => "text/javascript",
        "json" => "application/json",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_container_name() {
        assert_eq!(derive_container_name("Acme", "Widgets"), "acme-widgets");
        assert_eq!(derive_container_name("rust-lang", "cargo"), "rust-lang-cargo");
        assert_eq!(derive_container_name("a.b", "c_d"), "a-b-c-d");
    }

    #[test]
    fn test_derive_container_name_collapses_runs() {
        assert_eq!(derive_container_name("a--b", "__c"), "a-b-c");
    }

    #[test]
    fn test_password_hash_is_stable() {
        let hash = hash_password("hunter2");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_password("hunter2"));
        assert_ne!(hash, hash_password("hunter3"));
    }

    #[test]
    fn test_generated_passwords_differ() {
        assert_ne!(generate_password(), generate_password());
        assert_eq!(generate_password().len(), 16);
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(2048), "2.0 KB");
        assert_eq!(human_size(5 * 1024 * 1024), "5.0 MB");
        assert_eq!(human_size(3 * 1024 * 1024 * 1024), "3.0 GB");
    }

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path("README.md"), "text/markdown");
        assert_eq!(mime_for_path("src/app.js"), "text/javascript");
        assert_eq!(mime_for_path("logo.PNG"), "image/png");
        assert_eq!(mime_for_path("Makefile"), "application/octet-stream");
    }
}
