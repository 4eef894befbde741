//! File-system resource helpers.
use anyhow::{Context as _, Result};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Whether anything (including a broken symlink) exists at `path`.
#[must_use]
pub fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Remove whatever is at `path`: a file, a symlink, or a whole directory tree.
///
/// Symlinks are removed without following them.  Does nothing if `path` does
/// not exist.
///
/// # Errors
///
/// Returns an error if the path exists but cannot be removed.
pub fn remove_any(path: &Path) -> Result<()> {
    let Ok(meta) = path.symlink_metadata() else {
        return Ok(());
    };
    if meta.is_dir() {
        std::fs::remove_dir_all(path)
            .with_context(|| format!("remove directory: {}", path.display()))
    } else if meta.is_symlink() && cfg!(windows) && path.is_dir() {
        std::fs::remove_dir(path)
            .with_context(|| format!("remove directory link: {}", path.display()))
    } else {
        std::fs::remove_file(path).with_context(|| format!("remove existing: {}", path.display()))
    }
}

/// Recursively copy a directory tree.
///
/// Symlinks within the source tree are *followed*, so their content is
/// materialised rather than the link itself.
///
/// # Errors
///
/// Returns an error if the destination directory cannot be created, a source
/// entry cannot be read, or a file cannot be copied.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    std::fs::create_dir_all(dst)
        .with_context(|| format!("creating directory {}", dst.display()))?;
    for entry in
        std::fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());
        if src_path.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path).with_context(|| {
                format!("copying {} to {}", src_path.display(), dst_path.display())
            })?;
        }
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    use std::fmt::Write as _;

    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // write! to a String is infallible; unwrap_or(()) makes that explicit.
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}

/// Compute the lowercase hex SHA-256 digest of the file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_digest(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(to_hex(&Sha256::digest(&bytes)))
}

/// Compute a SHA-256 digest over a directory tree.
///
/// Covers the relative path and content of every file and the relative path
/// of every directory, visited in name order, so two trees hash equal exactly
/// when they have the same shape and file contents.
///
/// # Errors
///
/// Returns an error if any directory or file in the tree cannot be read.
pub fn tree_digest(root: &Path) -> Result<String> {
    fn walk(hasher: &mut Sha256, root: &Path, dir: &Path) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)
            .with_context(|| format!("reading directory {}", dir.display()))?
            .collect::<std::io::Result<Vec<_>>>()
            .with_context(|| format!("reading entry in {}", dir.display()))?;
        entries.sort_by_key(std::fs::DirEntry::file_name);

        for entry in entries {
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap_or(&path);
            hasher.update(rel.to_string_lossy().as_bytes());
            if path.is_dir() {
                hasher.update(b"\0d\0");
                walk(hasher, root, &path)?;
            } else {
                hasher.update(b"\0f\0");
                hasher.update(file_digest(&path)?.as_bytes());
            }
        }
        Ok(())
    }

    let mut hasher = Sha256::new();
    walk(&mut hasher, root, root)?;
    Ok(to_hex(&hasher.finalize()))
}
