//! Logging setup and configuration

use anyhow::Result;
use std::sync::Arc;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

pub const LOG_DIR: &str = "output/logs";
pub const LOG_FILE: &str = "cycle-auditor.log";

/// Keeps the non-blocking file writer flushing until dropped.
pub struct LoggingGuard {
    pub _guard: tracing_appender::non_blocking::WorkerGuard,
}

/// Console output for the operator plus a compact hourly file as the audit trail.
///
/// `RUST_LOG` overrides the default `info` level. The file layer also records when each
/// `cycle` span closes, with its busy time.
pub fn setup_logging() -> Result<Arc<LoggingGuard>> {
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender(LOG_DIR));

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new("info"),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_ansi(true)
                .with_level(true),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_level(true)
                .with_ansi(false)
                .with_span_events(FmtSpan::CLOSE)
                .compact(),
        )
        .with(filter)
        .try_init()?;

    Ok(Arc::new(LoggingGuard { _guard: guard }))
}

fn file_appender(dir: impl AsRef<std::path::Path>) -> tracing_appender::rolling::RollingFileAppender {
    tracing_appender::rolling::hourly(dir, LOG_FILE)
}

pub fn setup_output_directories() -> Result<()> {
    std::fs::create_dir_all(LOG_DIR)?;
    Ok(())
}
