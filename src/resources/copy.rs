//! Copy resource: a file or directory tree materialised at the target.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{
    copy_dir_recursive, ensure_parent_dir, file_digest, remove_any, tree_digest,
};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A copy of `source` placed at `target`.
///
/// The copy is considered correct when the target has the same kind (file or
/// directory) as the source and an identical SHA-256 content digest.
#[derive(Debug, Clone)]
pub struct CopyResource {
    /// The file or directory being copied.
    pub source: PathBuf,
    /// Where the copy is placed.
    pub target: PathBuf,
}

impl CopyResource {
    /// Create a new copy resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }

    fn digests_match(&self) -> Result<bool> {
        if self.source.is_dir() {
            Ok(tree_digest(&self.source)? == tree_digest(&self.target)?)
        } else {
            Ok(file_digest(&self.source)? == file_digest(&self.target)?)
        }
    }
}

impl Applicable for CopyResource {
    fn description(&self) -> String {
        format!("{} <= {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        ensure_parent_dir(&self.target)?;
        remove_any(&self.target)?;
        if self.source.is_dir() {
            copy_dir_recursive(&self.source, &self.target)?;
        } else {
            std::fs::copy(&self.source, &self.target).with_context(|| {
                format!(
                    "copying {} to {}",
                    self.source.display(),
                    self.target.display()
                )
            })?;
        }
        Ok(ResourceChange::Applied)
    }

    /// Remove the copy, but only when its content still matches the source.
    fn remove(&self) -> Result<ResourceChange> {
        super::remove_owned(self, &self.target)
    }
}

impl Resource for CopyResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        let Ok(meta) = self.target.symlink_metadata() else {
            return Ok(ResourceState::Missing);
        };

        if meta.is_symlink() {
            return Ok(ResourceState::Incorrect {
                current: "target is a symlink".to_string(),
            });
        }

        if meta.is_dir() != self.source.is_dir() {
            let kind = if meta.is_dir() { "directory" } else { "file" };
            return Ok(ResourceState::Incorrect {
                current: format!("target is a {kind}"),
            });
        }

        if self.digests_match()? {
            Ok(ResourceState::Correct)
        } else {
            Ok(ResourceState::Incorrect {
                current: "content differs".to_string(),
            })
        }
    }
}
