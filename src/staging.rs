//! Per-run staging directory, owned as a scoped resource.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// An isolated, uniquely-named working directory for one run.
///
/// Created before any fetch begins and removed on every exit path: the
/// `Drop` impl tears the directory down if the run aborts early, while the
/// success path calls [`StagingArea::destroy`] to surface removal errors.
/// The 128-bit random id keeps concurrent invocations on disjoint paths.
#[derive(Debug)]
pub struct StagingArea {
    root: PathBuf,
    /// Taken by `destroy`, disarming the drop guard.
    armed: bool,
}

impl StagingArea {
    /// Creates `parent/<uuid>/`, creating `parent` itself if absent.
    pub fn create(parent: &Path) -> Result<Self> {
        let root = parent.join(Uuid::new_v4().to_string());
        std::fs::create_dir_all(&root).map_err(|source| Error::DirectoryCreation {
            path: root.clone(),
            source,
        })?;
        info!(path = %root.display(), "staging directory created");
        Ok(Self { root, armed: true })
    }

    /// Path of the staging directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Lists staged filenames in lexicographic order. Fetch order is
    /// reconstructed later, from the numeric ordinal prefixes, during
    /// sequencing.
    pub fn list_sorted(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Removes the staging directory and everything in it.
    pub fn destroy(mut self) -> Result<()> {
        self.armed = false;
        std::fs::remove_dir_all(&self.root)?;
        info!(path = %self.root.display(), "staging directory removed");
        Ok(())
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = std::fs::remove_dir_all(&self.root) {
                warn!(path = %self.root.display(), error = %e, "failed to remove staging directory");
            } else {
                info!(path = %self.root.display(), "staging directory removed");
            }
        }
    }
}
