//! Final delivery: classify staged output, extract if needed, relocate.

use crate::error::{Error, Result};
use crate::extract::ArchiveCodec;
use crate::types::{DeliveryResult, DownloadConfig, StagedKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Classifies the first staged file (post-sequencing) by suffix and delivers
/// the resulting media artifacts into the destination directory.
///
/// Branches on suffix, never content: an archive is handed to the codec with
/// the media allow-list, a media file is delivered directly, and anything
/// else gets its transport-wrapper suffix stripped by rename before being
/// re-classified. An archive whose members all miss the filter yields an
/// empty delivery set, which is not an error.
pub fn deliver(
    codec: &dyn ArchiveCodec,
    staging_dir: &Path,
    staged_names: &[String],
    config: &DownloadConfig,
) -> Result<DeliveryResult> {
    let Some(first) = staged_names.first() else {
        warn!("nothing landed in staging; nothing to deliver");
        return Ok(DeliveryResult::default());
    };

    // A stray `.html` wrapper hides the real suffix; unwrap it first.
    let mut first = first.clone();
    if config.classify(&first) == StagedKind::Unknown {
        if let Some(stripped) = first.strip_suffix(".html") {
            let from = staging_dir.join(&first);
            let to = staging_dir.join(stripped);
            std::fs::rename(&from, &to).map_err(|source| Error::Rename {
                from,
                to: to.clone(),
                source,
            })?;
            debug!(file = %to.display(), "transport wrapper suffix stripped");
            first = stripped.to_string();
        }
    }

    let staged_path = staging_dir.join(&first);
    let delivery_set: Vec<PathBuf> = match config.classify(&first) {
        StagedKind::Archive if config.extract => {
            let extracted = codec.extract(&staged_path, staging_dir, &config.media_formats)?;
            info!(members = extracted.len(), "archive extraction finished");
            extracted
        }
        // Archive with extraction disabled, plain media, or an artifact we
        // cannot classify: deliver the staged file untouched.
        StagedKind::Archive | StagedKind::Media | StagedKind::Unknown => vec![staged_path],
    };

    if delivery_set.is_empty() {
        warn!("no archive members matched the media filter; nothing to deliver");
        return Ok(DeliveryResult::default());
    }

    let multiple = delivery_set.len() > 1;
    let mut final_paths = Vec::with_capacity(delivery_set.len());
    for (index, source) in delivery_set.iter().enumerate() {
        let target_name = match &config.output_name {
            Some(base) => {
                let stem = if multiple {
                    format!("{}{}", base, index + 1)
                } else {
                    base.clone()
                };
                match source.extension().and_then(|e| e.to_str()) {
                    Some(ext) => format!("{}.{}", stem, ext),
                    None => stem,
                }
            }
            None => source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| Error::Delivery {
                    path: source.clone(),
                    source: std::io::Error::other("staged artifact has no filename"),
                })?,
        };

        let target = config.destination.join(&target_name);
        move_file(source, &target)?;
        info!(path = %target.display(), "artifact delivered");
        final_paths.push(target);
    }

    Ok(DeliveryResult { final_paths })
}

/// Moves a file across directories: rename when source and target share a
/// filesystem, copy-then-delete otherwise. Never copy-only, so disk usage
/// is not doubled for large media files.
fn move_file(source: &Path, target: &Path) -> Result<()> {
    if std::fs::rename(source, target).is_ok() {
        return Ok(());
    }
    std::fs::copy(source, target).map_err(|e| Error::Delivery {
        path: source.to_path_buf(),
        source: e,
    })?;
    std::fs::remove_file(source).map_err(|e| Error::Delivery {
        path: source.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::member_matches;

    /// Codec standing in for the rar collaborator: "contains" a fixed member
    /// list and writes the ones passing the filter.
    struct StubCodec {
        members: Vec<&'static str>,
    }

    impl ArchiveCodec for StubCodec {
        fn extract(
            &self,
            _archive_path: &Path,
            target_dir: &Path,
            member_filter: &[String],
        ) -> Result<Vec<PathBuf>> {
            let mut extracted = Vec::new();
            for member in &self.members {
                if member_matches(member, member_filter) {
                    let path = target_dir.join(member);
                    std::fs::write(&path, b"media").unwrap();
                    extracted.push(path);
                }
            }
            Ok(extracted)
        }
    }

    fn setup(staged: &[&str]) -> (tempfile::TempDir, tempfile::TempDir, Vec<String>, DownloadConfig)
    {
        let staging = tempfile::tempdir().unwrap();
        let dest = tempfile::tempdir().unwrap();
        for name in staged {
            std::fs::write(staging.path().join(name), b"data").unwrap();
        }
        let config = DownloadConfig {
            destination: dest.path().to_path_buf(),
            ..DownloadConfig::default()
        };
        (
            staging,
            dest,
            staged.iter().map(|s| s.to_string()).collect(),
            config,
        )
    }

    #[test]
    fn direct_media_is_moved_to_destination() {
        let (staging, dest, names, config) = setup(&["movie.mp4"]);
        let codec = StubCodec { members: vec![] };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();

        assert_eq!(result.final_paths, [dest.path().join("movie.mp4")]);
        assert!(dest.path().join("movie.mp4").is_file());
        assert!(!staging.path().join("movie.mp4").exists());
    }

    #[test]
    fn archive_members_are_filtered_in_enumeration_order() {
        let (staging, dest, names, config) = setup(&["show.rar"]);
        let codec = StubCodec {
            members: vec!["a.mp4", "b.txt", "c.mkv"],
        };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();

        assert_eq!(
            result.final_paths,
            [dest.path().join("a.mp4"), dest.path().join("c.mkv")]
        );
        assert!(!dest.path().join("b.txt").exists());
    }

    #[test]
    fn output_name_is_used_unmodified_for_a_single_artifact() {
        let (staging, dest, names, mut config) = setup(&["movie.mp4"]);
        config.output_name = Some("renamed".to_string());
        let codec = StubCodec { members: vec![] };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();
        assert_eq!(result.final_paths, [dest.path().join("renamed.mp4")]);
    }

    #[test]
    fn output_name_gets_indexed_for_multiple_artifacts() {
        let (staging, dest, names, mut config) = setup(&["show.rar"]);
        config.output_name = Some("episode".to_string());
        let codec = StubCodec {
            members: vec!["one.mkv", "two.mkv"],
        };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();
        assert_eq!(
            result.final_paths,
            [
                dest.path().join("episode1.mkv"),
                dest.path().join("episode2.mkv")
            ]
        );
    }

    #[test]
    fn html_wrapper_is_stripped_before_classification() {
        let (staging, dest, names, config) = setup(&["movie.mp4.html"]);
        let codec = StubCodec { members: vec![] };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();
        assert_eq!(result.final_paths, [dest.path().join("movie.mp4")]);
    }

    #[test]
    fn zero_matching_members_is_an_empty_result() {
        let (staging, dest, names, config) = setup(&["show.rar"]);
        let codec = StubCodec {
            members: vec!["readme.txt"],
        };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();
        assert!(result.final_paths.is_empty());
        assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 0);
    }

    #[test]
    fn extraction_toggle_delivers_the_archive_itself() {
        let (staging, dest, names, mut config) = setup(&["show.rar"]);
        config.extract = false;
        let codec = StubCodec {
            members: vec!["one.mkv"],
        };

        let result = deliver(&codec, staging.path(), &names, &config).unwrap();
        assert_eq!(result.final_paths, [dest.path().join("show.rar")]);
        assert!(dest.path().join("show.rar").is_file());
    }
}
