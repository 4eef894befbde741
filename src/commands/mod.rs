//! Top-level subcommand orchestration.
pub mod install;
pub mod list;
pub mod remove;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{GlobalOpts, SelectionOpts};
use crate::config::{Component, catalog, selection};
use crate::error::DotfilesError;
use crate::logging::{Log, Logger};
use crate::operations::{Environment, FileSystemOps, SystemEnvironment, SystemFileSystemOps};
use crate::platform::Platform;
use crate::tasks::{self, Context, Task};

/// Environment variable naming the source root when `--source` is absent.
pub const SOURCE_ENV: &str = "DOTFILES_SOURCE";

/// Source root used when neither `--source` nor [`SOURCE_ENV`] is given,
/// relative to the working directory.
pub const DEFAULT_SOURCE_DIR: &str = "components";

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates machine detection, source-root resolution, catalog
/// construction, and selection so that each command does not have to repeat
/// the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Detected or simulated platform.
    pub platform: Platform,
    /// Absolute source root.
    pub source_root: PathBuf,
    /// Selected components, in processing order.
    pub components: Vec<Component>,
}

impl CommandSetup {
    /// Detect the machine, resolve the source root, and select components.
    ///
    /// # Errors
    ///
    /// Returns an error if machine detection fails, the working directory
    /// cannot be determined, or the source root is unusable.
    pub fn init(global: &GlobalOpts, opts: &SelectionOpts, log: &dyn Log) -> Result<Self> {
        let platform = match global.machine {
            Some(machine) => Platform::new(machine),
            None => Platform::detect()?,
        };
        let source_root = resolve_source(global.source.as_deref(), &SystemEnvironment)?;
        let components = select(&source_root, opts, &SystemFileSystemOps, log)?;

        log.debug(&format!("machine: {}", platform.machine));
        log.debug(&format!("source: {}", source_root.display()));
        log.debug(&format!("{} component(s) selected", components.len()));

        Ok(Self {
            platform,
            source_root,
            components,
        })
    }

    /// Build the task context for this setup.
    #[must_use]
    pub fn context(&self, global: &GlobalOpts, force: bool, log: Arc<dyn Log>) -> Context {
        Context::new(
            self.source_root.clone(),
            self.platform,
            log,
            global.dry_run,
            force,
        )
    }
}

/// Pick the source root: `flag`, else [`SOURCE_ENV`], else
/// `<cwd>/`[`DEFAULT_SOURCE_DIR`].  The result is absolute.
///
/// # Errors
///
/// Returns an error if the working directory cannot be determined.
pub fn resolve_source(flag: Option<&Path>, env: &dyn Environment) -> Result<PathBuf> {
    let chosen = flag.map_or_else(
        || {
            env.var(SOURCE_ENV)
                .filter(|v| !v.is_empty())
                .map_or_else(|| PathBuf::from(DEFAULT_SOURCE_DIR), PathBuf::from)
        },
        Path::to_path_buf,
    );
    std::path::absolute(&chosen)
        .with_context(|| format!("cannot make {} absolute", chosen.display()))
}

/// Build the catalog under `source_root` and apply the selection filter.
///
/// Skipped components are reported as warnings.
///
/// # Errors
///
/// Returns an error if the source root does not exist or cannot be read.
pub fn select(
    source_root: &Path,
    opts: &SelectionOpts,
    fs: &dyn FileSystemOps,
    log: &dyn Log,
) -> Result<Vec<Component>> {
    let mut catalog = catalog::list(source_root, opts.sort, &opts.names, fs);
    if let Some(err) = catalog.error.take() {
        return Err(DotfilesError::from(err).into());
    }
    catalog.report(log);
    Ok(selection::filter(
        catalog.components,
        &opts.tags,
        &opts.exclude,
    ))
}

/// Execute every task in order, print the summary, and bail if any failed.
///
/// # Errors
///
/// Returns an error if one or more components recorded a failure.
pub fn run_tasks_to_completion<'a>(
    tasks: impl IntoIterator<Item = &'a dyn Task>,
    ctx: &Context,
    log: &Logger,
) -> Result<()> {
    for task in tasks {
        tasks::execute(task, ctx);
    }

    log.print_summary();

    let count = log.failure_count();
    if count > 0 {
        anyhow::bail!("{count} component(s) failed");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::operations::{MockEnvironment, MockFileSystemOps};
    use crate::platform::{MachineId, Tag};
    use crate::tasks::test_helpers::RecordingLog;

    fn env_with_source(value: Option<&'static str>) -> MockEnvironment {
        let mut env = MockEnvironment::new();
        env.expect_var().returning(move |name| match name {
            SOURCE_ENV => value.map(String::from),
            _ => None,
        });
        env
    }

    // -----------------------------------------------------------------------
    // resolve_source
    // -----------------------------------------------------------------------

    #[test]
    fn flag_wins_over_environment() {
        let root =
            resolve_source(Some(Path::new("/flag")), &env_with_source(Some("/env"))).unwrap();
        assert_eq!(root, PathBuf::from("/flag"));
    }

    #[test]
    fn environment_used_without_flag() {
        let root = resolve_source(None, &env_with_source(Some("/env"))).unwrap();
        assert_eq!(root, PathBuf::from("/env"));
    }

    #[test]
    fn defaults_to_components_under_cwd() {
        let root = resolve_source(None, &env_with_source(None)).unwrap();
        assert_eq!(root, std::env::current_dir().unwrap().join("components"));
    }

    #[test]
    fn empty_environment_value_is_ignored() {
        let root = resolve_source(None, &env_with_source(Some(""))).unwrap();
        assert!(root.ends_with("components"));
    }

    // -----------------------------------------------------------------------
    // select
    // -----------------------------------------------------------------------

    fn tree() -> MockFileSystemOps {
        MockFileSystemOps::new()
            .with_dir("/src/git")
            .with_file(
                "/src/git/manifest.toml",
                "name = \"git\"\npriority = 2\n[[configs]]\nfrom = \"gitconfig\"\nto = \"~/.gitconfig\"\nmethod = \"symlink\"\ntags = [\"arch\"]\n",
            )
            .with_file("/src/git/gitconfig", "")
            .with_dir("/src/zsh")
            .with_file(
                "/src/zsh/manifest.toml",
                "name = \"zsh\"\npriority = 1\n[[configs]]\nfrom = \"zshrc\"\nto = \"~/.zshrc\"\nmethod = \"copy\"\n",
            )
            .with_file("/src/zsh/zshrc", "")
            .with_dir("/src/broken")
            .with_file("/src/broken/manifest.toml", "name = 1")
    }

    #[test]
    fn select_sorts_filters_and_warns() {
        let log = RecordingLog::default();
        let opts = SelectionOpts {
            tags: vec![Tag::Machine(MachineId::Arch)],
            ..SelectionOpts::default()
        };
        let selected = select(Path::new("/src"), &opts, &tree(), &log).unwrap();
        let names: Vec<&str> = selected.iter().map(Component::name).collect();
        assert_eq!(names, vec!["git"]);
        assert_eq!(log.skips().len(), 1);
        assert!(log.skips()[0].starts_with("broken: "));
    }

    #[test]
    fn select_without_filters_uses_priority_order() {
        let log = RecordingLog::default();
        let selected = select(Path::new("/src"), &SelectionOpts::default(), &tree(), &log).unwrap();
        let names: Vec<&str> = selected.iter().map(Component::name).collect();
        assert_eq!(names, vec!["zsh", "git"]);
    }

    #[test]
    fn select_excludes_by_name() {
        let log = RecordingLog::default();
        let opts = SelectionOpts {
            exclude: vec!["zsh".to_string()],
            ..SelectionOpts::default()
        };
        let selected = select(Path::new("/src"), &opts, &tree(), &log).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].name(), "git");
    }

    #[test]
    fn missing_source_root_is_an_error() {
        let log = RecordingLog::default();
        let err = select(
            Path::new("/nowhere"),
            &SelectionOpts::default(),
            &MockFileSystemOps::new(),
            &log,
        )
        .unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
