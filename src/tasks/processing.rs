//! Per-entry processing shared by the install and remove tasks: check state,
//! place or remove one config entry, run command lists, collect stats.
use std::path::Path;

use anyhow::{Context as _, Result, bail};

use super::context::Context;
use crate::config::Component;
use crate::config::paths::{ResolvedPaths, resolve_config_paths};
use crate::config::schema::ConfigEntry;
use crate::exec::SHELL;
use crate::resources::{self, ResourceState, helpers};

/// Result of a single task execution.
///
/// # Examples
///
/// ```
/// use dotfiles_components::tasks::TaskResult;
///
/// let ok = TaskResult::Ok;
/// let skipped = TaskResult::Skipped("nothing applies to arch".into());
/// let dry = TaskResult::DryRun;
///
/// assert!(matches!(ok, TaskResult::Ok));
/// assert!(matches!(skipped, TaskResult::Skipped(_)));
/// assert!(matches!(dry, TaskResult::DryRun));
/// ```
#[derive(Debug, Clone)]
pub enum TaskResult {
    /// Task completed successfully.
    Ok,
    /// Task was skipped.
    Skipped(String),
    /// Task ran in dry-run mode.
    DryRun,
}

/// Counters for tasks that process many config entries.
///
/// # Examples
///
/// ```
/// use dotfiles_components::tasks::TaskStats;
///
/// let mut stats = TaskStats::new();
/// stats.changed = 3;
/// stats.already_ok = 10;
///
/// assert_eq!(stats.summary(false), "3 changed, 10 already ok");
/// assert_eq!(stats.summary(true), "3 would change, 10 already ok");
/// ```
///
/// When entries are skipped, the summary includes the count:
///
/// ```
/// use dotfiles_components::tasks::TaskStats;
///
/// let stats = TaskStats { changed: 1, already_ok: 2, skipped: 3 };
/// assert_eq!(stats.summary(false), "1 changed, 2 already ok, 3 skipped");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    /// Number of entries changed.
    pub changed: u32,
    /// Number of entries already in the desired state.
    pub already_ok: u32,
    /// Number of entries left alone.
    pub skipped: u32,
}

impl TaskStats {
    /// Create a new empty stats counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Format the summary string (e.g. "3 changed, 10 already ok, 1 skipped").
    #[must_use]
    pub fn summary(&self, dry_run: bool) -> String {
        let verb = if dry_run { "would change" } else { "changed" };
        if self.skipped > 0 {
            format!(
                "{} {verb}, {} already ok, {} skipped",
                self.changed, self.already_ok, self.skipped
            )
        } else {
            format!("{} {verb}, {} already ok", self.changed, self.already_ok)
        }
    }

    /// Log the summary and return the appropriate `TaskResult`.
    #[must_use]
    pub fn finish(self, ctx: &Context) -> TaskResult {
        ctx.log.info(&self.summary(ctx.dry_run));
        if ctx.dry_run {
            TaskResult::DryRun
        } else {
            TaskResult::Ok
        }
    }
}

impl std::ops::AddAssign for TaskStats {
    fn add_assign(&mut self, other: Self) {
        self.changed += other.changed;
        self.already_ok += other.already_ok;
        self.skipped += other.skipped;
    }
}

/// Place one config entry of `component`, returning a stats delta.
///
/// An existing destination is only replaced when the entry or the run is
/// forced; otherwise the entry is skipped and the destination left untouched.
/// A destination overlapping the source is an error, forced or not.
pub(super) fn place_entry(
    ctx: &Context,
    component: &Component,
    entry: &ConfigEntry,
) -> Result<TaskStats> {
    let paths = resolve_config_paths(&ctx.source_root, &component.dir_name, entry, &*ctx.env)?;
    ensure_disjoint(&paths)?;
    let to = paths.to.display().to_string();
    let resource = resources::placement(entry.method, paths.from, paths.to);
    let desc = resource.description();
    let mut delta = TaskStats::new();

    match resource.current_state()? {
        ResourceState::Correct => {
            ctx.log.info(&format!("skipping {to}: already installed"));
            delta.already_ok += 1;
        }
        ResourceState::Invalid { reason } => bail!("{desc}: {reason}"),
        ResourceState::Incorrect { current } if !(entry.force || ctx.force) => {
            ctx.log.info(&format!(
                "skipping {to}: destination exists ({current}); use --force to overwrite"
            ));
            delta.skipped += 1;
        }
        state => {
            if ctx.dry_run {
                let msg = if let ResourceState::Incorrect { current } = state {
                    format!("would {} {desc} (replacing: {current})", entry.method)
                } else {
                    format!("would {} {desc}", entry.method)
                };
                ctx.log.dry_run(&msg);
            } else {
                resource.apply()?;
                ctx.log.info(&format!("{}: {desc}", entry.method));
            }
            delta.changed += 1;
        }
    }
    Ok(delta)
}

/// Refuse entries whose destination would clobber their own source.
fn ensure_disjoint(paths: &ResolvedPaths) -> Result<()> {
    if paths.overlaps() {
        bail!(
            "destination {} overlaps source {}",
            paths.to.display(),
            paths.from.display()
        );
    }
    Ok(())
}

/// Remove one config entry of `component`, returning a stats delta.
///
/// Only destinations that are ours (a link to the source or an unmodified
/// copy) are removed unless the run is forced.  A destination overlapping the
/// source is never removed.
pub(super) fn remove_entry(
    ctx: &Context,
    component: &Component,
    entry: &ConfigEntry,
) -> Result<TaskStats> {
    let paths = resolve_config_paths(&ctx.source_root, &component.dir_name, entry, &*ctx.env)?;
    ensure_disjoint(&paths)?;
    let to = paths.to.clone();
    let resource = resources::placement(entry.method, paths.from, paths.to);
    let mut delta = TaskStats::new();

    match resource.current_state()? {
        ResourceState::Missing => {
            ctx.log.debug(&format!("not present: {}", to.display()));
            delta.already_ok += 1;
        }
        ResourceState::Correct if ctx.dry_run => {
            ctx.log.dry_run(&format!("would remove {}", to.display()));
            delta.changed += 1;
        }
        ResourceState::Correct => {
            resource.remove()?;
            ctx.log.info(&format!("removed {}", to.display()));
            delta.changed += 1;
        }
        ResourceState::Incorrect { current } | ResourceState::Invalid { reason: current }
            if ctx.force =>
        {
            if ctx.dry_run {
                ctx.log.dry_run(&format!("would force-remove {} ({current})", to.display()));
            } else {
                helpers::fs::remove_any(&to)?;
                ctx.log.info(&format!("force-removed {} ({current})", to.display()));
            }
            delta.changed += 1;
        }
        ResourceState::Incorrect { current } | ResourceState::Invalid { reason: current } => {
            ctx.log.info(&format!("skipping {}: {current}", to.display()));
            delta.skipped += 1;
        }
    }
    Ok(delta)
}

/// Run `commands` sequentially through the shell in `dir`.
///
/// The first failing command stops the rest.  In dry-run mode the commands
/// are only reported.
pub(super) fn run_commands(ctx: &Context, dir: &Path, commands: &[String]) -> Result<()> {
    if commands.is_empty() {
        return Ok(());
    }
    if ctx.dry_run {
        for command in commands {
            ctx.log.dry_run(&format!("would run: {command}"));
        }
        return Ok(());
    }
    if !ctx.executor.which(SHELL) {
        bail!("{SHELL} not found on PATH");
    }
    for command in commands {
        ctx.log.info(&format!("running: {command}"));
        let result = ctx
            .executor
            .run_shell(dir, command)
            .with_context(|| format!("command failed: {command}"))?;
        for line in result.stdout.lines() {
            ctx.log.debug(line);
        }
    }
    Ok(())
}
