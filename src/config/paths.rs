//! Source and destination path resolution for config entries.
use std::path::{Component, Path, PathBuf};

use crate::config::schema::ConfigEntry;
use crate::error::ConfigError;
use crate::operations::Environment;

/// Absolute source and destination of one config entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Absolute path of the payload inside the component directory.
    pub from: PathBuf,
    /// Absolute destination path.
    pub to: PathBuf,
}

impl ResolvedPaths {
    /// Whether the destination is the source, lies inside it, or contains it.
    #[must_use]
    pub fn overlaps(&self) -> bool {
        self.to.starts_with(&self.from) || self.from.starts_with(&self.to)
    }
}

/// Home directory used for `~` expansion.
fn home_var(env: &dyn Environment) -> Option<String> {
    let home = env.var("HOME").filter(|h| !h.is_empty());
    if cfg!(windows) {
        home.or_else(|| env.var("USERPROFILE").filter(|h| !h.is_empty()))
    } else {
        home
    }
}

/// Make `path` absolute against the current directory and fold `.` and `..`.
fn absolute(path: &Path) -> Result<PathBuf, ConfigError> {
    let abs = std::path::absolute(path).map_err(|source| ConfigError::InvalidPath {
        path: path.display().to_string(),
        source,
    })?;
    Ok(normalize(&abs))
}

/// Lexically remove `.` and `..` components without touching the filesystem.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expand a leading `~` and make the path absolute.
///
/// Only `~` alone or `~` followed by a separator is expanded; `~user/...` and
/// a `~` anywhere else in the string are left untouched.
///
/// # Errors
///
/// Returns [`ConfigError::HomeNotSet`] when expansion is requested and no
/// home directory is configured, or [`ConfigError::InvalidPath`] when the
/// path cannot be made absolute.
pub fn resolve_home(path: &str, env: &dyn Environment) -> Result<PathBuf, ConfigError> {
    let rest = path.strip_prefix('~').filter(|rest| {
        rest.is_empty() || rest.starts_with('/') || (cfg!(windows) && rest.starts_with('\\'))
    });

    match rest {
        Some(rest) => {
            let home = home_var(env).ok_or(ConfigError::HomeNotSet)?;
            let rest = rest.trim_start_matches(['/', '\\']);
            absolute(&Path::new(&home).join(rest))
        }
        None => absolute(Path::new(path)),
    }
}

/// Compute the absolute paths of `entry` for component directory `dir_name`.
///
/// Performs no filesystem access beyond reading the current directory.
///
/// # Errors
///
/// Propagates [`resolve_home`] failures for the destination.
pub fn resolve_config_paths(
    source_root: &Path,
    dir_name: &str,
    entry: &ConfigEntry,
    env: &dyn Environment,
) -> Result<ResolvedPaths, ConfigError> {
    let from = absolute(&source_root.join(dir_name).join(&entry.from))?;
    let to = resolve_home(&entry.to, env)?;
    Ok(ResolvedPaths { from, to })
}
