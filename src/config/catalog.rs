//! Enumerate, resolve, and order the components under a source root.
use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::{self, Path};

use crate::config::resolver::{self, Component};
use crate::error::{CatalogError, ResolutionCause, ResolutionError};
use crate::logging::Log;
use crate::operations::FileSystemOps;

/// Ordering applied to a catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortBy {
    /// Ascending priority (unset sorts last), then name.
    #[default]
    Priority,
    /// Name only.
    Name,
}

/// Outcome of building a catalog.
///
/// Individual resolution failures never abort the catalog; they are kept in
/// `skipped` so the caller can report them.  A source root that cannot be
/// used yields no components and sets `error`.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Successfully resolved components, sorted.
    pub components: Vec<Component>,
    /// Components that failed to resolve.
    pub skipped: Vec<ResolutionError>,
    /// Set when the source root itself is unusable.
    pub error: Option<CatalogError>,
}

impl Catalog {
    /// Report every skipped component and the root error, if any.
    pub fn report(&self, log: &dyn Log) {
        if let Some(err) = &self.error {
            log.error(&err.to_string());
        }
        for skipped in &self.skipped {
            log.skip_component(&skipped.component, &skipped.cause.to_string());
        }
    }
}

/// Total order on components for `sort_by`.
fn compare(sort_by: SortBy, a: &Component, b: &Component) -> Ordering {
    match sort_by {
        SortBy::Name => a.name().cmp(b.name()),
        SortBy::Priority => {
            // `None` is greater than every explicit priority.
            let rank = |c: &Component| (c.manifest.priority.is_none(), c.manifest.priority);
            rank(a).cmp(&rank(b)).then_with(|| a.name().cmp(b.name()))
        }
    }
}

/// Directory names directly under `source_root`, in iteration order.
fn discover(source_root: &Path, fs: &dyn FileSystemOps) -> Result<Vec<String>, CatalogError> {
    let entries = fs
        .list_dir(source_root)
        .map_err(|source| CatalogError::Unreadable {
            path: source_root.to_path_buf(),
            source,
        })?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.is_dir)
        .map(|entry| entry.name)
        .collect())
}

/// Whether `name` is exactly one plain directory name.
fn is_dir_name(name: &str) -> bool {
    let mut parts = Path::new(name).components();
    matches!(
        (parts.next(), parts.next()),
        (Some(path::Component::Normal(_)), None)
    )
}

/// Requested names without repeats, first occurrence kept.
fn unique(names: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .iter()
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}

/// Build the catalog for `source_root`.
///
/// With an empty `names`, every directory directly under the root is
/// resolved; otherwise exactly the given names are, once each.  A name that
/// is not a single directory name is skipped.  The result is re-sorted either
/// way.
#[must_use]
pub fn list(
    source_root: &Path,
    sort_by: SortBy,
    names: &[String],
    fs: &dyn FileSystemOps,
) -> Catalog {
    if !fs.exists(source_root) {
        return Catalog {
            error: Some(CatalogError::RootNotFound(source_root.to_path_buf())),
            ..Catalog::default()
        };
    }

    let candidates = if names.is_empty() {
        match discover(source_root, fs) {
            Ok(found) => found,
            Err(err) => {
                return Catalog {
                    error: Some(err),
                    ..Catalog::default()
                };
            }
        }
    } else {
        unique(names)
    };

    let mut catalog = Catalog::default();
    for name in &candidates {
        if !is_dir_name(name) {
            let err = ResolutionError::new(name.as_str(), ResolutionCause::InvalidName);
            catalog.skipped.push(err);
            continue;
        }
        match resolver::resolve(name, source_root, fs) {
            Ok(component) => catalog.components.push(component),
            Err(err) => catalog.skipped.push(err),
        }
    }
    catalog.components.sort_by(|a, b| compare(sort_by, a, b));

    tracing::debug!(
        "catalog: {} resolved, {} skipped under {}",
        catalog.components.len(),
        catalog.skipped.len(),
        source_root.display()
    );
    catalog
}
