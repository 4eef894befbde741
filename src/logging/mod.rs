//! Component-scoped console and run-log output built on `tracing`.

mod logger;
mod subscriber;
mod types;
mod utils;

pub use logger::Logger;
pub use subscriber::{FILTER_ENV, init_subscriber};
pub use types::{ComponentRecord, Log, Outcome};
pub use utils::terminal_columns;

/// Create a Logger whose events reach a run log in a fresh temp directory,
/// through a subscriber installed for the current thread only.
///
/// Keep the returned [`tracing::dispatcher::DefaultGuard`] alive for the
/// duration of the test; dropping it restores the previous dispatcher.
#[cfg(test)]
#[allow(clippy::expect_used)]
pub(crate) fn isolated_logger() -> (Logger, tempfile::TempDir, tracing::dispatcher::DefaultGuard) {
    use tracing_subscriber::{Layer as _, filter::LevelFilter, layer::SubscriberExt as _};
    let tmp = tempfile::tempdir().expect("failed to create temp dir");
    let path = tmp.path().join("test.log");
    let file_layer =
        subscriber::FileLayer::create(&path, "test").expect("failed to create file layer");
    let log = Logger::writing_to(path);
    let subscriber =
        tracing_subscriber::registry().with(file_layer.with_filter(LevelFilter::DEBUG));
    let guard = tracing::dispatcher::set_default(&tracing::Dispatch::new(subscriber));
    (log, tmp, guard)
}
