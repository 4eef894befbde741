//! Filesystem and environment abstractions for dependency injection.
//!
//! Provides the [`FileSystemOps`] and [`Environment`] traits so that manifest
//! resolution and build-command discovery can be unit-tested without touching
//! the real filesystem or process environment.  Production code uses
//! [`SystemFileSystemOps`] and [`SystemEnvironment`].

use std::io;
use std::path::{Path, PathBuf};

/// Result of [`FileSystemOps::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatInfo {
    /// The path is a directory (symlinks followed).
    pub is_dir: bool,
    /// The path is a regular file (symlinks followed).
    pub is_file: bool,
    /// Unix permission bits (`0` on platforms without them).
    pub mode: u32,
}

/// A single entry returned by [`FileSystemOps::list_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntryInfo {
    /// File name of the entry.
    pub name: String,
    /// Full path of the entry.
    pub path: PathBuf,
    /// The entry is a directory (symlinks followed).
    pub is_dir: bool,
    /// The entry is a regular file (symlinks followed).
    pub is_file: bool,
}

/// Abstraction over the filesystem queries used during discovery.
///
/// Discovery never mutates the tree, with one exception: build scripts are
/// marked executable through [`set_mode`](Self::set_mode).
pub trait FileSystemOps: Send + Sync + std::fmt::Debug {
    /// Returns `true` if `path` exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Return type and permission information for `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` does not exist or cannot be inspected.
    fn stat(&self, path: &Path) -> io::Result<StatInfo>;

    /// List the direct entries of the directory at `path`, in iteration order.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` cannot be opened or read as a directory.
    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>>;

    /// Read the whole file at `path` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the permission bits of `path` with `mode`.
    ///
    /// # Errors
    ///
    /// Returns an error if the permissions cannot be changed.
    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn stat(&self, path: &Path) -> io::Result<StatInfo> {
        let meta = std::fs::metadata(path)?;
        Ok(StatInfo {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            mode: permission_bits(&meta),
        })
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        std::fs::read_dir(path)?
            .map(|entry| {
                let entry = entry?;
                let path = entry.path();
                Ok(DirEntryInfo {
                    name: entry.file_name().to_string_lossy().into_owned(),
                    is_dir: path.is_dir(),
                    is_file: path.is_file(),
                    path,
                })
            })
            .collect()
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        }

        #[cfg(not(unix))]
        {
            let _ = (path, mode);
            Ok(())
        }
    }
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
const fn permission_bits(_meta: &std::fs::Metadata) -> u32 {
    0
}

/// Read access to process environment variables.
#[cfg_attr(test, mockall::automock)]
pub trait Environment: Send + Sync {
    /// Value of the variable `name`, or `None` when unset or not valid UTF-8.
    fn var(&self, name: &str) -> Option<String>;
}

/// Production [`Environment`] backed by [`std::env::var`].
#[derive(Debug, Default)]
pub struct SystemEnvironment;

impl Environment for SystemEnvironment {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Pre-configure files, directories, and permission bits using the
/// builder-style methods.  Permission changes made through
/// [`FileSystemOps::set_mode`] are recorded and visible to later
/// [`FileSystemOps::stat`] calls.
///
/// # Example
///
/// ```ignore
/// use dotfiles_components::operations::MockFileSystemOps;
///
/// let fs = MockFileSystemOps::new()
///     .with_dir("/src/git")
///     .with_file("/src/git/manifest.toml", "name = \"git\"");
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    files: std::collections::HashMap<PathBuf, String>,
    dirs: std::collections::HashMap<PathBuf, Vec<PathBuf>>,
    modes: std::sync::Mutex<std::collections::HashMap<PathBuf, u32>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockFileSystemOps {
    /// Create an empty mock with nothing configured.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a directory (and register it as a child of its parent).
    #[must_use]
    pub fn with_dir(mut self, path: impl Into<PathBuf>) -> Self {
        let p = path.into();
        self.link_parent(&p);
        self.dirs.entry(p).or_default();
        self
    }

    /// Register a regular file with `content` and mode `0o644`.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.with_file_mode(path, content, 0o644)
    }

    /// Register a regular file with explicit permission bits.
    #[must_use]
    pub fn with_file_mode(mut self, path: impl Into<PathBuf>, content: &str, mode: u32) -> Self {
        let p = path.into();
        self.link_parent(&p);
        self.modes
            .lock()
            .expect("mock modes poisoned")
            .insert(p.clone(), mode);
        self.files.insert(p, content.to_string());
        self
    }

    /// Current permission bits recorded for `path`.
    #[must_use]
    pub fn mode_of(&self, path: &Path) -> Option<u32> {
        self.modes
            .lock()
            .expect("mock modes poisoned")
            .get(path)
            .copied()
    }

    fn link_parent(&mut self, path: &Path) {
        if let Some(parent) = path.parent() {
            let children = self.dirs.entry(parent.to_path_buf()).or_default();
            if !children.iter().any(|c| c == path) {
                children.push(path.to_path_buf());
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl FileSystemOps for MockFileSystemOps {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path) || self.dirs.contains_key(path)
    }

    fn stat(&self, path: &Path) -> io::Result<StatInfo> {
        if self.dirs.contains_key(path) {
            return Ok(StatInfo {
                is_dir: true,
                is_file: false,
                mode: 0o755,
            });
        }
        if self.files.contains_key(path) {
            return Ok(StatInfo {
                is_dir: false,
                is_file: true,
                mode: self.mode_of(path).unwrap_or(0o644),
            });
        }
        Err(io::Error::from(io::ErrorKind::NotFound))
    }

    fn list_dir(&self, path: &Path) -> io::Result<Vec<DirEntryInfo>> {
        let children = self
            .dirs
            .get(path)
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?;
        Ok(children
            .iter()
            .map(|child| DirEntryInfo {
                name: child
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: child.clone(),
                is_dir: self.dirs.contains_key(child),
                is_file: self.files.contains_key(child),
            })
            .collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn set_mode(&self, path: &Path, mode: u32) -> io::Result<()> {
        if !self.files.contains_key(path) {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.modes
            .lock()
            .expect("mock modes poisoned")
            .insert(path.to_path_buf(), mode);
        Ok(())
    }
}
