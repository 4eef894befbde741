//! What gets logged: per-component outcomes and the [`Log`] trait.
use std::fmt;

/// Target of the header event that opens a component's section.
pub(super) const COMPONENT_TARGET: &str = "dotfiles::component";
/// Target of catalog events for components that could not be resolved.
pub(super) const CATALOG_TARGET: &str = "dotfiles::catalog";
/// Target of actions reported but not performed.
pub(super) const DRY_RUN_TARGET: &str = "dotfiles::dry_run";
/// Target of the per-component lines of the run summary.
pub(super) const SUMMARY_TARGET: &str = "dotfiles::summary";

/// How processing one component ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every step completed.
    Ok,
    /// Nothing in the component applies to the current machine.
    NotApplicable,
    /// The component was explicitly skipped.
    Skipped,
    /// Ran in dry-run mode; no changes were applied.
    DryRun,
    /// At least one build command, config entry, or cleanup command failed.
    Failed,
}

impl Outcome {
    /// Every outcome, in summary order.
    pub const ALL: [Self; 5] = [
        Self::Ok,
        Self::NotApplicable,
        Self::Skipped,
        Self::DryRun,
        Self::Failed,
    ];

    /// Short label used in the summary.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotApplicable => "n/a",
            Self::Skipped => "skipped",
            Self::DryRun => "dry-run",
            Self::Failed => "failed",
        }
    }

    /// Parse a label produced by [`Outcome::label`].
    pub(super) fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|o| o.label() == label)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Outcome of one component, kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentRecord {
    /// Component name.
    pub name: String,
    /// How processing ended.
    pub outcome: Outcome,
    /// Failure or skip detail.
    pub detail: Option<String>,
}

/// Sink for everything a command reports while it runs.
///
/// [`Logger`](super::logger::Logger) forwards to `tracing`; tests substitute
/// a recorder so task code can be checked without a subscriber.
pub trait Log: Send + Sync {
    /// Open the section of output belonging to component `name`.
    fn component(&self, name: &str);
    /// A component the catalog could not resolve and left out.
    fn skip_component(&self, component: &str, reason: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (hidden on the console unless verbose).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log an action that would have been performed outside dry-run mode.
    fn dry_run(&self, msg: &str);
    /// Record how component `name` ended, for the summary.
    fn record(&self, name: &str, outcome: Outcome, detail: Option<&str>);
}
