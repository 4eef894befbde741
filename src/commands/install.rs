//! Install command implementation.
use anyhow::Result;
use std::sync::Arc;

use crate::cli::{ChangeOpts, GlobalOpts};
use crate::config::Component;
use crate::logging::{Log, Logger};
use crate::tasks::{Context, InstallComponent, Task};

/// Run the install command.
///
/// # Errors
///
/// Returns an error if setup fails or any component fails to install.
pub fn run(global: &GlobalOpts, opts: &ChangeOpts, log: &Arc<Logger>) -> Result<()> {
    let setup = super::CommandSetup::init(global, &opts.selection, &**log)?;
    let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
    log.info(&format!(
        "dotfiles {version}: installing {} component(s) for {}",
        setup.components.len(),
        setup.platform.machine
    ));
    let shared: Arc<dyn Log> = log.clone();
    let ctx = setup.context(global, opts.force, shared);
    install_components(&setup.components, &ctx, log)
}

/// Install `components` one after another in the given order.
///
/// A failing component is recorded and the next one is still attempted.
///
/// # Errors
///
/// Returns an error if one or more components failed.
pub fn install_components(components: &[Component], ctx: &Context, log: &Logger) -> Result<()> {
    let tasks: Vec<InstallComponent> = components
        .iter()
        .cloned()
        .map(InstallComponent::new)
        .collect();
    super::run_tasks_to_completion(tasks.iter().map(|t| t as &dyn Task), ctx, log)
}
