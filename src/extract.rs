//! Archive extraction behind a codec capability.
//!
//! The on-disk archive format is an external collaborator: given an archive
//! file, list its members and extract the named ones. [`RarCodec`] is the
//! single concrete implementation, backed by the `unrar` crate.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Capability over an archive codec: extract the members whose suffix is in
/// the caller-supplied allow-list into `target_dir`, returning their paths
/// in the archive's internal enumeration order (never re-sorted).
///
/// Zero matching members is a legitimate empty result, not an error. A
/// corrupt or unreadable archive fails with [`Error::Archive`] and is not
/// retried.
pub trait ArchiveCodec: Send + Sync {
    fn extract(
        &self,
        archive_path: &Path,
        target_dir: &Path,
        member_filter: &[String],
    ) -> Result<Vec<PathBuf>>;
}

/// True when the member filename ends in one of the allowed suffixes.
pub fn member_matches(name: &str, allow: &[String]) -> bool {
    allow.iter().any(|suffix| name.ends_with(suffix.as_str()))
}

/// Multi-part-aware rar extractor.
pub struct RarCodec;

impl ArchiveCodec for RarCodec {
    fn extract(
        &self,
        archive_path: &Path,
        target_dir: &Path,
        member_filter: &[String],
    ) -> Result<Vec<PathBuf>> {
        debug!(archive = %archive_path.display(), "opening archive");

        let processor = unrar::Archive::new(archive_path)
            .open_for_processing()
            .map_err(|e| Error::archive(archive_path, e))?;

        let mut extracted = Vec::new();
        let mut at_header = processor;
        loop {
            let at_file = match at_header.read_header() {
                Ok(Some(entry_processor)) => entry_processor,
                Ok(None) => break,
                Err(e) => return Err(Error::archive(archive_path, e)),
            };

            let header = at_file.entry();
            let is_directory = header.is_directory();

            // Keep only normal components so a hostile member name cannot
            // escape the target directory.
            let sanitized = Path::new(&header.filename)
                .components()
                .filter(|c| matches!(c, std::path::Component::Normal(_)))
                .collect::<PathBuf>();
            let member_name = sanitized
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            if is_directory
                || member_name.is_empty()
                || !member_matches(&member_name, member_filter)
            {
                debug!(member = %member_name, "skipping archive member");
                at_header = at_file
                    .skip()
                    .map_err(|e| Error::archive(archive_path, e))?;
                continue;
            }

            let file_path = target_dir.join(&member_name);
            at_header = at_file
                .extract_to(&file_path)
                .map_err(|e| Error::archive(archive_path, e))?;
            debug!(member = %member_name, "archive member extracted");
            extracted.push(file_path);
        }

        info!(
            archive = %archive_path.display(),
            extracted_count = extracted.len(),
            "archive extraction complete"
        );
        Ok(extracted)
    }
}
