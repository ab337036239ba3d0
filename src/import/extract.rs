use crate::import::policy::AdmissionPolicy;
use crate::{Error, Result};
use std::io::{Cursor, Read};
use tracing::{debug, trace};
use zip::ZipArchive;

/// One admitted archive member, decoded to bytes
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub relative_path: String,
    pub bytes: Vec<u8>,
}

/// Result of walking an archive: admitted files plus the policy skip count
#[derive(Debug)]
pub struct Extraction {
    pub files: Vec<ExtractedFile>,
    pub skipped: usize,
}

/// Walk a zip archive buffer and collect admissible entries.
///
/// Entries are visited in archive order. The top-level segment of the first
/// entry is captured as the root prefix (snapshot archives wrap everything in
/// a single `{repo}-{branch}/` folder) and stripped from subsequent paths.
/// Directory entries and entries whose path becomes empty after stripping are
/// skipped silently; policy rejections increment the skip counter.
pub fn extract_archive(archive_bytes: &[u8]) -> Result<Extraction> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))
        .map_err(|e| Error::CorruptArchive(e.to_string()))?;

    let mut policy = AdmissionPolicy::new();
    let mut root_prefix: Option<String> = None;
    let mut files = Vec::new();
    let mut skipped = 0usize;

    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| Error::CorruptArchive(e.to_string()))?;

        let raw_path = entry.name().to_string();

        if root_prefix.is_none() {
            let top = raw_path
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string();
            trace!("Archive root prefix: {:?}", top);
            root_prefix = Some(top);
        }

        if entry.is_dir() {
            continue;
        }

        let relative = strip_root_prefix(&raw_path, root_prefix.as_deref().unwrap_or_default());
        if relative.is_empty() {
            continue;
        }

        let size = entry.size();
        let decision = policy.evaluate(relative, size);
        let normalized = match decision.normalized_path {
            Some(p) => p,
            None => {
                debug!("Skipping {}: {:?}", relative, decision.reason);
                skipped += 1;
                continue;
            }
        };

        let mut bytes = Vec::with_capacity(size as usize);
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| Error::CorruptArchive(format!("failed to decode {normalized}: {e}")))?;

        files.push(ExtractedFile {
            relative_path: normalized,
            bytes,
        });
    }

    Ok(Extraction { files, skipped })
}

fn strip_root_prefix<'a>(path: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return path;
    }
    if let Some(rest) = path.strip_prefix(prefix) {
        return rest.strip_prefix('/').unwrap_or(rest);
    }
    path
}
