//! Data structures for the acquisition pipeline.

use std::path::PathBuf;

/// One remote part of a logical asset.
///
/// `ordinal` is present iff the asset has more than one part; within one run
/// ordinals are unique and contiguous starting at 1. It encodes retrieval
/// order and is later used to reconstruct multi-part assembly order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Part {
    /// Remote identifier (URL) of this part.
    pub remote_identifier: String,
    /// 1-based position among the asset's parts, absent for single-part assets.
    pub ordinal: Option<usize>,
    /// Sanitized local filename derived from the remote identifier.
    pub local_name: String,
}

impl Part {
    /// The filename this part lands under in staging: the sanitized name,
    /// prefixed with the ordinal when one is present. Zero-padding is not
    /// needed; sequencing re-derives order rather than trusting this prefix.
    pub fn effective_name(&self) -> String {
        match self.ordinal {
            Some(n) => format!("{}{}", n, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

/// Classification of a file found in staging after all fetches settle.
///
/// Derived from the filename suffix, never from content inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedKind {
    /// Directly deliverable media file (suffix in the media allow-list).
    Media,
    /// Archive that must be extracted before delivery.
    Archive,
    /// Anything else, typically a transport-wrapper artifact.
    Unknown,
}

/// Contract output of the pipeline: one path per independently deliverable
/// media artifact, in delivery order (archive-internal order for extracted
/// content, fetch-declaration order for direct media).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryResult {
    pub final_paths: Vec<PathBuf>,
}

/// Configuration for one acquisition run.
///
/// # Example
///
/// ```
/// use rapiddl::DownloadConfig;
/// use std::path::PathBuf;
///
/// let config = DownloadConfig {
///     destination: PathBuf::from("/media/library"),
///     output_name: Some("episode".to_string()),
///     ..DownloadConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct DownloadConfig {
    /// Directory final artifacts are moved into. Must exist before the run.
    pub destination: PathBuf,
    /// Optional base filename for delivered artifacts. With more than one
    /// artifact a 1-based index is appended to keep names distinct.
    pub output_name: Option<String>,
    /// Parent directory under which per-run staging directories are created.
    pub staging_parent: PathBuf,
    /// Suffixes treated as deliverable media, e.g. `".mkv"`.
    pub media_formats: Vec<String>,
    /// When false, a staged archive is delivered as-is instead of extracted.
    pub extract: bool,
    /// Login endpoint of the remote service.
    pub login_url: String,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            destination: PathBuf::from("."),
            output_name: None,
            staging_parent: PathBuf::from("staging"),
            media_formats: vec![".mkv".to_string(), ".mp4".to_string()],
            extract: true,
            login_url: crate::auth::LOGIN_URL.to_string(),
        }
    }
}

impl DownloadConfig {
    /// Suffix-based classification of a staged filename.
    pub fn classify(&self, name: &str) -> StagedKind {
        if name.ends_with(".rar") {
            StagedKind::Archive
        } else if self.media_formats.iter().any(|f| name.ends_with(f.as_str())) {
            StagedKind::Media
        } else {
            StagedKind::Unknown
        }
    }
}
