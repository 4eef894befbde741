//! Per-component tasks that install or remove a component on this machine.
pub mod context;
pub mod install;
mod processing;
pub mod remove;

pub use context::Context;
pub use install::InstallComponent;
pub use processing::{TaskResult, TaskStats};
pub use remove::RemoveComponent;

use anyhow::Result;

use crate::logging::Outcome;

/// A named, executable task.
pub trait Task: Send + Sync {
    /// Human-readable task name.
    fn name(&self) -> &str;

    /// Whether this task has anything to do on the current machine.
    fn should_run(&self, ctx: &Context) -> bool;

    /// Execute the task.
    ///
    /// # Errors
    ///
    /// Returns an error if any build or cleanup command fails or a config
    /// entry cannot be placed or removed.
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Execute a task, recording the result in the logger.
pub fn execute(task: &dyn Task, ctx: &Context) {
    if !task.should_run(ctx) {
        ctx.log.debug(&format!("skipping {}: nothing applies to {}", task.name(), ctx.machine()));
        ctx.log.record(task.name(), Outcome::NotApplicable, None);
        return;
    }

    ctx.log.component(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record(task.name(), Outcome::Ok, None);
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log.record(task.name(), Outcome::Skipped, Some(&reason));
        }
        Ok(TaskResult::DryRun) => {
            ctx.log.record(task.name(), Outcome::DryRun, None);
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log.record(task.name(), Outcome::Failed, Some(&format!("{e:#}")));
        }
    }
}
