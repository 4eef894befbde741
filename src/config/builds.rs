//! Build-command resolution for a component on a given machine.
use std::path::Path;

use anyhow::{Context as _, Result};

use crate::config::resolver::Component;
use crate::operations::FileSystemOps;
use crate::platform::{MachineId, Tag};

/// Name of the optional per-machine scripts directory inside a component.
pub const BUILDS_DIR: &str = "builds";

/// Owner, group, and other execute bits.
const EXEC_BITS: u32 = 0o111;

/// Quote `path` as a single shell word.
fn shell_quote(path: &Path) -> String {
    let raw = path.display().to_string();
    if cfg!(windows) {
        format!("\"{raw}\"")
    } else {
        format!("'{}'", raw.replace('\'', r"'\''"))
    }
}

/// Ordered shell commands to build `component` on `machine`.
///
/// The manifest's `builds[machine]` list is used when present, otherwise
/// `builds["*"]`; the two are never combined.  Every regular file in the
/// component's `builds/` directory whose extension-stripped name equals the
/// machine identifier is then appended, after being made executable.
///
/// # Errors
///
/// Returns an error if the scripts directory exists but cannot be listed, or a
/// matching script cannot be inspected or made executable.
pub fn get_builds(
    machine: MachineId,
    component: &Component,
    fs: &dyn FileSystemOps,
) -> Result<Vec<String>> {
    let builds = &component.manifest.builds;
    let mut commands = builds
        .get(&Tag::Machine(machine))
        .or_else(|| builds.get(&Tag::Any))
        .cloned()
        .unwrap_or_default();

    let scripts_dir = component.dir.join(BUILDS_DIR);
    if !fs.stat(&scripts_dir).is_ok_and(|info| info.is_dir) {
        return Ok(commands);
    }

    let entries = fs
        .list_dir(&scripts_dir)
        .with_context(|| format!("listing {}", scripts_dir.display()))?;

    for entry in entries.into_iter().filter(|e| e.is_file) {
        let stem = Path::new(&entry.name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
        if stem.as_deref() != Some(machine.as_str()) {
            continue;
        }

        let mode = fs
            .stat(&entry.path)
            .with_context(|| format!("inspecting {}", entry.path.display()))?
            .mode;
        if mode & EXEC_BITS != EXEC_BITS {
            fs.set_mode(&entry.path, mode | EXEC_BITS)
                .with_context(|| format!("making {} executable", entry.path.display()))?;
            tracing::debug!("marked {} executable", entry.path.display());
        }
        commands.push(shell_quote(&entry.path));
    }

    Ok(commands)
}
