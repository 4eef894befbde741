//! Locate, parse, and validate a single component.
use std::path::{Path, PathBuf};

use crate::config::paths;
use crate::config::schema::{self, ComponentManifest};
use crate::error::{ResolutionCause, ResolutionError};
use crate::operations::FileSystemOps;

/// File name of a component manifest.
pub const MANIFEST_FILE: &str = "manifest.toml";

/// A successfully resolved component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    /// Name of the component directory under the source root.
    pub dir_name: String,
    /// Absolute path of the component directory.
    pub dir: PathBuf,
    /// The validated manifest.
    pub manifest: ComponentManifest,
}

impl Component {
    /// Name declared by the manifest.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.manifest.name
    }
}

/// Resolve the component in `source_root/name`.
///
/// Checks, in order: the manifest exists, parses as TOML, passes schema
/// validation, the component directory is a directory, and every
/// `configs[].from` stays inside it and exists.  Nothing on disk is modified.
///
/// # Errors
///
/// Returns a [`ResolutionError`] naming the component and the first failed
/// check.
pub fn resolve(
    name: &str,
    source_root: &Path,
    fs: &dyn FileSystemOps,
) -> Result<Component, ResolutionError> {
    let fail = |cause| ResolutionError::new(name, cause);

    let dir = std::path::absolute(source_root.join(name))
        .map(|abs| paths::normalize(&abs))
        .map_err(|e| fail(ResolutionCause::InvalidPath(e)))?;
    let manifest_path = dir.join(MANIFEST_FILE);

    if !fs.exists(&manifest_path) {
        return Err(fail(ResolutionCause::ManifestNotFound(manifest_path)));
    }

    let text = fs.read_to_string(&manifest_path).map_err(|source| {
        fail(ResolutionCause::Unreadable {
            path: manifest_path.clone(),
            source,
        })
    })?;

    let doc: toml::Table = text.parse().map_err(|e: toml::de::Error| {
        fail(ResolutionCause::Malformed(e.message().to_string()))
    })?;

    let manifest = schema::validate(&doc).map_err(|e| fail(e.into()))?;

    if !fs.stat(&dir).is_ok_and(|info| info.is_dir) {
        return Err(fail(ResolutionCause::MissingSrc(dir)));
    }

    for entry in &manifest.configs {
        let path = paths::normalize(&dir.join(&entry.from));
        if Path::new(&entry.from).is_absolute() || !path.starts_with(&dir) {
            return Err(fail(ResolutionCause::SourceOutsideComponent {
                from: entry.from.clone(),
            }));
        }
        if !fs.exists(&path) {
            return Err(fail(ResolutionCause::SourceNotFound {
                from: entry.from.clone(),
                path,
            }));
        }
    }

    tracing::debug!(
        "resolved component {} ({} configs) from {}",
        manifest.name,
        manifest.configs.len(),
        dir.display()
    );

    Ok(Component {
        dir_name: name.to_string(),
        dir,
        manifest,
    })
}
