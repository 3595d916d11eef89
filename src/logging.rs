//! File-based logging for FaunaDex
//!
//! Logs go to a daily-rotated file instead of stdout, since the terminal is
//! owned by the TUI.

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use crate::config::Config;

const LOG_FILE_PREFIX: &str = "faunadex";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/faunadex.YYYY-MM-DD.log`. `RUST_LOG`
/// takes precedence over the configured filter. The returned guard flushes
/// pending lines when dropped, so keep it alive until shutdown.
pub fn init_logging(config: &Config) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(&config.log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &config.log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.log_filter))?;

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!(log_dir = %config.log_dir.display(), "Logging initialized");

    Ok(guard)
}
