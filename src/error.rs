//! Error types for download, staging and delivery operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for rapiddl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while acquiring and delivering an asset.
///
/// Every variant is fatal to the run it occurs in; none is retried. The one
/// non-error edge case (an archive with zero members matching the media
/// filter) is reported as an empty delivery set, not through this type.
#[derive(Error, Debug)]
pub enum Error {
    /// A remote identifier is empty or yields an empty local name.
    #[error("invalid remote identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The login handshake against the remote service failed.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The filesystem refused to create the staging directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreation { path: PathBuf, source: io::Error },

    /// Connection, timeout or non-success status while fetching a part.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Local disk failure while streaming a part into staging.
    #[error("failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },

    /// The filesystem rejected a rename during part sequencing.
    #[error("failed to rename {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// The archive could not be opened or a member could not be extracted.
    #[error("archive error for {archive}: {reason}")]
    Archive { archive: PathBuf, reason: String },

    /// A final artifact could not be relocated into the destination.
    #[error("failed to deliver {path}: {source}")]
    Delivery { path: PathBuf, source: io::Error },

    /// Pre-flight check: the destination directory does not exist.
    #[error("destination directory does not exist: {0}")]
    DestinationNotFound(PathBuf),

    /// I/O error outside the more specific variants above.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn archive(archive: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Error::Archive {
            archive: archive.into(),
            reason: reason.to_string(),
        }
    }
}
