//! Shared state handed to every component task.
use std::path::PathBuf;
use std::sync::Arc;

use crate::exec::{Executor, SystemExecutor};
use crate::logging::Log;
use crate::operations::{Environment, FileSystemOps, SystemEnvironment, SystemFileSystemOps};
use crate::platform::{MachineId, Platform};

/// Shared context for task execution.
pub struct Context {
    /// Directory holding the component directories.
    pub source_root: PathBuf,
    /// Detected or simulated platform.
    pub platform: Platform,
    /// Logger for output and task recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Overwrite or remove destinations that are not ours.
    pub force: bool,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Filesystem queries used for build-script discovery.
    pub fs_ops: Arc<dyn FileSystemOps>,
    /// Environment used for `~` expansion.
    pub env: Arc<dyn Environment>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("source_root", &self.source_root)
            .field("platform", &self.platform)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("force", &self.force)
            .field("executor", &"<dyn Executor>")
            .field("fs_ops", &"<dyn FileSystemOps>")
            .field("env", &"<dyn Environment>")
            .finish()
    }
}

impl Context {
    /// Creates a context wired to the real system.
    #[must_use]
    pub fn new(
        source_root: PathBuf,
        platform: Platform,
        log: Arc<dyn Log>,
        dry_run: bool,
        force: bool,
    ) -> Self {
        Self {
            source_root,
            platform,
            log,
            dry_run,
            force,
            executor: Arc::new(SystemExecutor),
            fs_ops: Arc::new(SystemFileSystemOps),
            env: Arc::new(SystemEnvironment),
        }
    }

    /// Machine identifier used for tag and build selection.
    #[must_use]
    pub const fn machine(&self) -> MachineId {
        self.platform.machine
    }

    /// Create a copy of this context with a different logger.
    #[must_use]
    pub fn with_log(&self, log: Arc<dyn Log>) -> Self {
        Self {
            source_root: self.source_root.clone(),
            platform: self.platform,
            log,
            dry_run: self.dry_run,
            force: self.force,
            executor: Arc::clone(&self.executor),
            fs_ops: Arc::clone(&self.fs_ops),
            env: Arc::clone(&self.env),
        }
    }

    /// Create a copy of this context with a different [`Executor`].
    #[must_use]
    pub fn with_executor(&self, executor: Arc<dyn Executor>) -> Self {
        Self {
            executor,
            ..self.with_log(Arc::clone(&self.log))
        }
    }

    /// Create a copy of this context with a different [`Environment`].
    #[must_use]
    pub fn with_env(&self, env: Arc<dyn Environment>) -> Self {
        Self {
            env,
            ..self.with_log(Arc::clone(&self.log))
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{RecordingLog, make_context};

    #[test]
    fn machine_comes_from_platform() {
        let ctx = make_context(PathBuf::from("/src"), MachineId::Gentoo);
        assert_eq!(ctx.machine(), MachineId::Gentoo);
    }

    #[test]
    fn with_log_preserves_other_fields() {
        let mut ctx = make_context(PathBuf::from("/src"), MachineId::Arch);
        ctx.force = true;
        let ctx2 = ctx.with_log(Arc::new(RecordingLog::default()));
        assert_eq!(ctx2.source_root, ctx.source_root);
        assert_eq!(ctx2.platform, ctx.platform);
        assert_eq!(ctx2.dry_run, ctx.dry_run);
        assert!(ctx2.force);
    }

    #[test]
    fn debug_format_includes_key_fields() {
        let ctx = make_context(PathBuf::from("/src"), MachineId::Arch);
        let debug = format!("{ctx:?}");
        assert!(debug.contains("Context"));
        assert!(debug.contains("dry_run"));
        assert!(debug.contains("source_root"));
    }
}
