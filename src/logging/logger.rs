//! The [`Log`] implementation used by commands.
use std::path::PathBuf;
use std::sync::Mutex;

use super::types::{
    CATALOG_TARGET, COMPONENT_TARGET, ComponentRecord, DRY_RUN_TARGET, Log, Outcome,
    SUMMARY_TARGET,
};
use super::utils::log_file_path;

/// Implement the plain message methods of [`Log`] by delegating to inherent
/// methods of the same name.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Emits `tracing` events and keeps one [`ComponentRecord`] per component
/// for the run summary.
///
/// Everything, debug included, also lands in the run log at
/// `$XDG_CACHE_HOME/dotfiles/<command>.log` (default
/// `~/.cache/dotfiles/<command>.log`).
#[derive(Debug)]
pub struct Logger {
    records: Mutex<Vec<ComponentRecord>>,
    log_file: Option<PathBuf>,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// Only remembers the run log path for the summary; the file itself is
    /// created by [`init_subscriber`](super::subscriber::init_subscriber).
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
        }
    }

    /// Logger whose summary points at `path`.
    #[cfg(test)]
    pub(super) const fn writing_to(path: PathBuf) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            log_file: Some(path),
        }
    }

    #[cfg(test)]
    pub(crate) const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Snapshot of the recorded outcomes, in recording order.
    #[must_use]
    pub fn records(&self) -> Vec<ComponentRecord> {
        self.records.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Open the section of component `name`.
    pub fn component(&self, name: &str) {
        tracing::info!(target: COMPONENT_TARGET, component = name, "{name}");
    }

    /// Report a component the catalog left out.
    pub fn skip_component(&self, component: &str, reason: &str) {
        tracing::warn!(
            target: CATALOG_TARGET,
            component,
            reason,
            "skipping component '{component}': {reason}"
        );
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        tracing::error!("{msg}");
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        tracing::warn!("{msg}");
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        tracing::info!("{msg}");
    }

    /// Log a debug message.
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log an action skipped because of dry-run mode.
    pub fn dry_run(&self, msg: &str) {
        tracing::info!(target: DRY_RUN_TARGET, "{msg}");
    }

    /// Record how component `name` ended.
    pub fn record(&self, name: &str, outcome: Outcome, detail: Option<&str>) {
        if let Ok(mut guard) = self.records.lock() {
            guard.push(ComponentRecord {
                name: name.to_string(),
                outcome,
                detail: detail.map(String::from),
            });
        }
    }

    /// Return `true` if any recorded component failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failure_count() > 0
    }

    /// Count the failed components.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.records.lock().map_or(0, |guard| {
            guard
                .iter()
                .filter(|r| r.outcome == Outcome::Failed)
                .count()
        })
    }

    /// Emit one summary line per recorded component, then the totals.
    #[allow(clippy::print_stdout)]
    pub fn print_summary(&self) {
        let records = self.records();
        if records.is_empty() {
            return;
        }

        println!();
        tracing::info!(target: SUMMARY_TARGET, "Summary");
        for record in &records {
            let outcome = record.outcome.label();
            tracing::info!(
                target: SUMMARY_TARGET,
                component = record.name.as_str(),
                outcome,
                detail = record.detail.as_deref(),
                "{} {outcome}",
                record.name
            );
        }

        println!();
        let counts = Outcome::ALL
            .iter()
            .map(|o| {
                let n = records.iter().filter(|r| r.outcome == *o).count();
                format!("{n} {o}")
            })
            .collect::<Vec<_>>()
            .join(", ");
        self.info(&format!("{} components: {counts}", records.len()));

        if let Some(path) = &self.log_file {
            self.info(&format!("log: {}", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(component, info, debug, warn, error, dry_run);

    fn skip_component(&self, component: &str, reason: &str) {
        self.skip_component(component, reason);
    }

    fn record(&self, name: &str, outcome: Outcome, detail: Option<&str>) {
        self.record(name, outcome, detail);
    }
}
