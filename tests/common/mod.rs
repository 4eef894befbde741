// Shared helpers for integration tests.
//
// Provides a temporary source tree and home directory with a fluent builder
// so each integration test can set up an isolated environment without
// repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotfiles_components::config::{Catalog, SortBy, catalog};
use dotfiles_components::logging::{Log, Outcome};
use dotfiles_components::operations::{Environment, SystemFileSystemOps};
use dotfiles_components::platform::{MachineId, Platform};
use dotfiles_components::tasks::Context;

/// Environment whose only variable is `HOME`.
pub struct FixedHome(pub PathBuf);

impl Environment for FixedHome {
    fn var(&self, name: &str) -> Option<String> {
        matches!(name, "HOME" | "USERPROFILE").then(|| self.0.display().to_string())
    }
}

/// [`Log`] that keeps every message in memory, tagged by level.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<String>>,
    outcomes: Mutex<Vec<(String, Outcome)>>,
}

impl MemoryLog {
    fn push(&self, level: &str, msg: &str) {
        self.lines.lock().unwrap().push(format!("{level}: {msg}"));
    }

    /// Every message as `level: text`, in order.
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    /// Whether any message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }

    /// Recorded component outcomes.
    pub fn outcomes(&self) -> Vec<(String, Outcome)> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl Log for MemoryLog {
    fn component(&self, name: &str) {
        self.push("component", name);
    }
    fn skip_component(&self, component: &str, reason: &str) {
        self.push("warn", &format!("skipping component '{component}': {reason}"));
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn dry_run(&self, msg: &str) {
        self.push("dry_run", msg);
    }
    fn record(&self, name: &str, outcome: Outcome, _detail: Option<&str>) {
        self.outcomes.lock().unwrap().push((name.to_string(), outcome));
    }
}

/// An isolated source root and home directory, both deleted on drop.
pub struct SourceTree {
    root: tempfile::TempDir,
    home: tempfile::TempDir,
}

impl SourceTree {
    /// Create an empty source root and home directory.
    pub fn new() -> Self {
        Self {
            root: tempfile::tempdir().expect("create source root"),
            home: tempfile::tempdir().expect("create home"),
        }
    }

    /// Write `manifest` as `<root>/<dir>/manifest.toml`.
    pub fn component(self, dir: &str, manifest: &str) -> Self {
        self.file(dir, "manifest.toml", manifest)
    }

    /// Write `content` to `<root>/<dir>/<rel>`, creating parents.
    pub fn file(self, dir: &str, rel: &str, content: &str) -> Self {
        let path = self.root.path().join(dir).join(rel);
        std::fs::create_dir_all(path.parent().expect("parent")).expect("create parent");
        std::fs::write(&path, content).expect("write file");
        self
    }

    /// Path of the source root.
    pub fn root(&self) -> &Path {
        self.root.path()
    }

    /// Path of the home directory.
    pub fn home(&self) -> &Path {
        self.home.path()
    }

    /// Build the catalog over the real filesystem.
    pub fn catalog(&self, sort_by: SortBy) -> Catalog {
        catalog::list(self.root(), sort_by, &[], &SystemFileSystemOps)
    }

    /// Task context for `machine` with `~` expanding to this tree's home.
    pub fn context(&self, machine: MachineId, log: Arc<dyn Log>) -> Context {
        Context::new(
            self.root().to_path_buf(),
            Platform::new(machine),
            log,
            false,
            false,
        )
        .with_env(Arc::new(FixedHome(self.home().to_path_buf())))
    }
}
