//! Remove command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{ChangeOpts, GlobalOpts};
use crate::config::Component;
use crate::logging::{Log, Logger};
use crate::tasks::{Context, RemoveComponent, Task};

/// Run the remove command.
///
/// # Errors
///
/// Returns an error if setup fails or any component fails to be removed.
pub fn run(global: &GlobalOpts, opts: &ChangeOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, &opts.selection, &**log)?;
    log.info(&format!(
        "removing {} component(s) for {}",
        setup.components.len(),
        setup.platform.machine
    ));
    let shared: Arc<dyn Log> = log.clone();
    let ctx = setup.context(global, opts.force, shared);
    remove_components(&setup.components, &ctx, log)
}

/// Remove `components` one after another in the given order.
///
/// # Errors
///
/// Returns an error if one or more components failed.
pub fn remove_components(components: &[Component], ctx: &Context, log: &Logger) -> Result<()> {
    let tasks: Vec<RemoveComponent> = components
        .iter()
        .cloned()
        .map(RemoveComponent::new)
        .collect();
    super::run_tasks_to_completion(tasks.iter().map(|t| t as &dyn Task), ctx, log)
}
