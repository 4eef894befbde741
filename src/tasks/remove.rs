//! Remove task: take back placed config entries, then run cleanup.
use anyhow::{Result, bail};

use super::processing::{remove_entry, run_commands};
use super::{Context, Task, TaskResult, TaskStats};
use crate::config::Component;

/// Undo one component: remove the destinations it placed, then run its
/// cleanup commands.
#[derive(Debug)]
pub struct RemoveComponent {
    component: Component,
}

impl RemoveComponent {
    /// Create the remove task for `component`.
    #[must_use]
    pub const fn new(component: Component) -> Self {
        Self { component }
    }
}

impl Task for RemoveComponent {
    fn name(&self) -> &str {
        self.component.name()
    }

    fn should_run(&self, ctx: &Context) -> bool {
        let manifest = &self.component.manifest;
        manifest.configs.iter().any(|e| e.applies_to(ctx.machine()))
            || !manifest.cleanup.is_empty()
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let machine = ctx.machine();
        let mut failures = 0u32;
        let mut stats = TaskStats::new();

        for entry in self
            .component
            .manifest
            .configs
            .iter()
            .filter(|e| e.applies_to(machine))
        {
            match remove_entry(ctx, &self.component, entry) {
                Ok(delta) => stats += delta,
                Err(e) => {
                    ctx.log.error(&format!("{}: {e:#}", entry.to));
                    failures += 1;
                }
            }
        }

        if let Err(e) = run_commands(ctx, &self.component.dir, &self.component.manifest.cleanup) {
            ctx.log.error(&format!("cleanup failed: {e:#}"));
            failures += 1;
        }

        if failures > 0 {
            ctx.log.info(&stats.summary(ctx.dry_run));
            bail!("{failures} step(s) failed");
        }
        Ok(stats.finish(ctx))
    }
}
