//! Tracing subscriber: one renderer shared by the console and the run log.
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::Level;
use tracing::field::{Field, Visit};

use super::types::{CATALOG_TARGET, COMPONENT_TARGET, DRY_RUN_TARGET, Outcome, SUMMARY_TARGET};
use super::utils::log_file_path;

/// Environment variable holding a `tracing` filter for the console.
pub const FILTER_ENV: &str = "DOTFILES_LOG";

/// The fields dotfiles events carry.
#[derive(Debug, Default)]
struct EventFields {
    message: String,
    component: Option<String>,
    outcome: Option<Outcome>,
    detail: Option<String>,
}

impl Visit for EventFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = value.to_string(),
            "component" => self.component = Some(value.to_string()),
            "outcome" => self.outcome = Outcome::from_label(value),
            "detail" => self.detail = Some(value.to_string()),
            _ => {}
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }
}

/// Whether a rendered line may carry ANSI styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Style {
    Ansi,
    Plain,
}

impl Style {
    fn paint(self, code: &str, text: &str) -> String {
        match self {
            Self::Ansi => format!("\x1b[{code}m{text}\x1b[0m"),
            Self::Plain => text.to_string(),
        }
    }
}

/// Summary icon and SGR color of `outcome`.
const fn outcome_mark(outcome: Outcome) -> (&'static str, &'static str) {
    match outcome {
        Outcome::Ok => ("✓", "32"),
        Outcome::NotApplicable => ("·", "2"),
        Outcome::Skipped => ("○", "33"),
        Outcome::DryRun => ("~", "37"),
        Outcome::Failed => ("✗", "31"),
    }
}

/// Render one event as a single line.
fn render(level: Level, target: &str, fields: &EventFields, style: Style) -> String {
    let msg = &fields.message;
    match target {
        COMPONENT_TARGET => format!("{} {}", style.paint("1;34", "==>"), style.paint("1", msg)),
        DRY_RUN_TARGET => format!("  {} {msg}", style.paint("33", "[dry run]")),
        SUMMARY_TARGET => match (fields.outcome, fields.component.as_deref()) {
            (Some(outcome), Some(name)) => {
                let (icon, color) = outcome_mark(outcome);
                let detail = fields
                    .detail
                    .as_deref()
                    .map_or_else(String::new, |d| format!(" ({d})"));
                format!("  {}", style.paint(color, &format!("{icon} {name}{detail}")))
            }
            _ => format!("{} {}", style.paint("1;34", "==>"), style.paint("1", msg)),
        },
        _ => match level {
            Level::ERROR => format!("{} {msg}", style.paint("31", "ERROR")),
            Level::WARN => format!("{}  {msg}", style.paint("33", "WARN")),
            Level::INFO => format!("  {msg}"),
            _ => format!("  {}", style.paint("2", msg)),
        },
    }
}

/// Appends every event, debug included, to the run log of one command.
///
/// Lines logged while a component is being processed are prefixed with its
/// name; the summary closes the last component's section.
#[derive(Debug)]
pub(super) struct FileLayer {
    state: Mutex<FileState>,
}

#[derive(Debug)]
struct FileState {
    file: fs::File,
    component: Option<String>,
}

impl FileLayer {
    /// Truncate `path`, write the run header for `command`, and keep the file
    /// open for appending.
    ///
    /// Returns `None` if the file cannot be written.
    pub(super) fn create(path: &Path, command: &str) -> Option<Self> {
        let version = option_env!("DOTFILES_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"));
        let started = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
        fs::write(path, format!("# dotfiles {version} {command}, started {started}\n")).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            state: Mutex::new(FileState {
                file,
                component: None,
            }),
        })
    }
}

impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();

        let mut fields = EventFields::default();
        event.record(&mut fields);
        let rendered = render(level, target, &fields, Style::Plain);

        let Ok(mut state) = self.state.lock() else {
            return;
        };
        match target {
            COMPONENT_TARGET => state.component.clone_from(&fields.component),
            SUMMARY_TARGET => state.component = None,
            _ => {}
        }

        let body = rendered.trim_start();
        let body = if level == Level::DEBUG {
            format!("DEBUG {body}")
        } else {
            body.to_string()
        };
        let line = match (&state.component, target) {
            (Some(name), t) if t != COMPONENT_TARGET && t != CATALOG_TARGET => {
                format!("[{name}] {body}")
            }
            _ => body,
        };
        writeln!(state.file, "{line}").ok();
    }
}

/// Console formatter that styles dotfiles events when the writer supports
/// ANSI escapes.
struct ConsoleFormat;

impl<S, N> tracing_subscriber::fmt::FormatEvent<S, N> for ConsoleFormat
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    N: for<'a> tracing_subscriber::fmt::FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &tracing_subscriber::fmt::FmtContext<'_, S, N>,
        mut writer: tracing_subscriber::fmt::format::Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        let metadata = event.metadata();
        let mut fields = EventFields::default();
        event.record(&mut fields);
        let style = if writer.has_ansi_escapes() {
            Style::Ansi
        } else {
            Style::Plain
        };
        writeln!(
            writer,
            "{}",
            render(*metadata.level(), metadata.target(), &fields, style)
        )
    }
}

/// Initialise the global [`tracing`] subscriber for `command`.
///
/// The console shows `info` and above (`debug` with `verbose`), overridable
/// through [`FILTER_ENV`]; warnings and errors go to stderr.  The run log at
/// `$XDG_CACHE_HOME/dotfiles/<command>.log` receives everything.
/// Must be called once at program startup, before any logging.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        EnvFilter, Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let default_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let console_filter = EnvFilter::builder()
        .with_env_var(FILTER_ENV)
        .with_default_directive(default_level.into())
        .from_env_lossy();

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormat)
        .with_writer(make_writer)
        .with_filter(console_filter);

    let file_layer = log_file_path(command)
        .and_then(|path| FileLayer::create(&path, command))
        .map(|layer| layer.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn fields(message: &str) -> EventFields {
        EventFields {
            message: message.to_string(),
            ..EventFields::default()
        }
    }

    #[test]
    fn component_header_is_an_arrow() {
        let line = render(Level::INFO, COMPONENT_TARGET, &fields("zsh"), Style::Plain);
        assert_eq!(line, "==> zsh");
    }

    #[test]
    fn ansi_style_colors_the_header() {
        let line = render(Level::INFO, COMPONENT_TARGET, &fields("zsh"), Style::Ansi);
        assert_eq!(line, "\x1b[1;34m==>\x1b[0m \x1b[1mzsh\x1b[0m");
    }

    #[test]
    fn levels_are_marked() {
        let target = "dotfiles_components::tasks";
        let msg = fields("exit 3");
        assert_eq!(render(Level::ERROR, target, &msg, Style::Plain), "ERROR exit 3");
        assert_eq!(render(Level::WARN, target, &msg, Style::Plain), "WARN  exit 3");
        assert_eq!(render(Level::INFO, target, &msg, Style::Plain), "  exit 3");
    }

    #[test]
    fn catalog_skip_renders_as_warning() {
        let line = render(
            Level::WARN,
            CATALOG_TARGET,
            &fields("skipping component 'x': manifest not found"),
            Style::Plain,
        );
        assert_eq!(line, "WARN  skipping component 'x': manifest not found");
    }

    #[test]
    fn summary_row_shows_outcome_and_detail() {
        let row = EventFields {
            message: "nvim failed".to_string(),
            component: Some("nvim".to_string()),
            outcome: Some(Outcome::Failed),
            detail: Some("1 step(s) failed".to_string()),
        };
        let line = render(Level::INFO, SUMMARY_TARGET, &row, Style::Plain);
        assert_eq!(line, "  ✗ nvim (1 step(s) failed)");
    }

    #[test]
    fn summary_without_outcome_is_a_heading() {
        let line = render(Level::INFO, SUMMARY_TARGET, &fields("Summary"), Style::Plain);
        assert_eq!(line, "==> Summary");
    }

    #[test]
    fn file_header_names_command() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("install.log");
        FileLayer::create(&path, "install").unwrap();
        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# dotfiles "));
        assert!(contents.contains(" install, started "));
    }
}
