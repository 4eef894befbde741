//! Idempotent resource primitives (check + apply pattern).
pub mod copy;
pub mod helpers;
pub mod symlink;

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::config::schema::Method;

/// Minimal interface for resources that can be described, applied, and removed.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Apply the resource change.
    ///
    /// Parent directories are created and whatever occupies the target is
    /// replaced.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource cannot be applied due to I/O failures,
    /// permission issues, invalid paths, or other system errors.
    fn apply(&self) -> Result<ResourceChange>;

    /// Remove the resource, undoing a previous `apply()`.
    ///
    /// Only a target this resource owns is removed; anything else is left
    /// in place and reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if the target cannot be inspected or deleted.
    fn remove(&self) -> Result<ResourceChange>;
}

/// State of a placed file.
///
/// # Examples
///
/// ```
/// use dotfiles_components::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let correct = ResourceState::Correct;
/// let wrong = ResourceState::Incorrect { current: "points to /other/path".into() };
/// let skip = ResourceState::Invalid { reason: "source does not exist".into() };
///
/// assert_ne!(missing, correct);
/// assert_eq!(correct, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Nothing exists at the target.
    Missing,
    /// The target matches the desired state.
    Correct,
    /// Something else occupies the target.
    Incorrect {
        /// Description of what is there now.
        current: String,
    },
    /// The resource cannot be applied (e.g. its source is gone).
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Result of applying a resource change.
///
/// # Examples
///
/// ```
/// use dotfiles_components::resources::ResourceChange;
///
/// let applied = ResourceChange::Applied;
/// let noop = ResourceChange::AlreadyCorrect;
/// let skipped = ResourceChange::Skipped { reason: "destination exists".into() };
///
/// assert_eq!(applied, ResourceChange::Applied);
/// assert_ne!(applied, noop);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceChange {
    /// Resource was created, updated, or removed.
    Applied,
    /// Resource was already in the desired state (no change needed).
    AlreadyCorrect,
    /// Resource was left alone.
    Skipped {
        /// Reason why the resource was skipped.
        reason: String,
    },
}

/// A placement that can report its current state before being applied.
///
/// # Examples
///
/// ```ignore
/// match resource.current_state()? {
///     ResourceState::Correct => {}
///     _ => {
///         resource.apply()?;
///     }
/// }
/// ```
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the resource state cannot be determined due to I/O failures,
    /// permission issues, or other system errors.
    fn current_state(&self) -> Result<ResourceState>;
}

/// Build the resource that places `source` at `target` using `method`.
#[must_use]
pub fn placement(method: Method, source: PathBuf, target: PathBuf) -> Box<dyn Resource> {
    match method {
        Method::Copy => Box::new(copy::CopyResource::new(source, target)),
        Method::Symlink => Box::new(symlink::SymlinkResource::new(source, target)),
    }
}

/// Shared `remove()` body: delete `target` only when `resource` is in its
/// correct state.
fn remove_owned<R: Resource + ?Sized>(resource: &R, target: &Path) -> Result<ResourceChange> {
    match resource.current_state()? {
        ResourceState::Correct => {
            helpers::fs::remove_any(target)?;
            Ok(ResourceChange::Applied)
        }
        ResourceState::Missing => Ok(ResourceChange::AlreadyCorrect),
        ResourceState::Incorrect { current } => Ok(ResourceChange::Skipped {
            reason: format!("not managed here: {current}"),
        }),
        ResourceState::Invalid { reason } => Ok(ResourceChange::Skipped { reason }),
    }
}
