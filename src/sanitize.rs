//! Local filename derivation from remote identifiers.

use crate::error::{Error, Result};

/// Derives a stable local filename from a remote identifier.
///
/// Strips one trailing `.html` transport-wrapper suffix if present, then
/// takes the final path segment. Idempotent under re-application. Pure, no
/// I/O; fails only when the identifier (or the derived name) is empty.
///
/// # Example
///
/// ```
/// use rapiddl::sanitize;
///
/// assert_eq!(sanitize("https://host/path/name.mp4.html").unwrap(), "name.mp4");
/// assert_eq!(sanitize("https://host/path/name.mp4").unwrap(), "name.mp4");
/// ```
pub fn sanitize(remote_identifier: &str) -> Result<String> {
    if remote_identifier.is_empty() {
        return Err(Error::InvalidIdentifier(remote_identifier.to_string()));
    }

    let stripped = remote_identifier
        .strip_suffix(".html")
        .unwrap_or(remote_identifier);

    let name = stripped.rsplit('/').next().unwrap_or(stripped);
    if name.is_empty() {
        return Err(Error::InvalidIdentifier(remote_identifier.to_string()));
    }

    Ok(name.to_string())
}
