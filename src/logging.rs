use std::fs;
use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging.
///
/// - Console output goes to stderr; stdout is reserved for IPC commands.
/// - Rolling log files in `log_dir` with daily rotation, keeping the latest
///   5 files. If the appender cannot be created, logging stays console-only.
/// - Filter defaults to `info`, configurable via `RUST_LOG`.
pub fn init(log_dir: &Path) {
    let _ = fs::create_dir_all(log_dir);
    let file_layer = match RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("dispatch")
        .filename_suffix("log")
        .max_log_files(5)
        .build(log_dir)
    {
        Ok(appender) => Some(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        ),
        Err(e) => {
            eprintln!("Failed to create log file appender: {}", e);
            None
        }
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::info!(log_dir = %log_dir.display(), "Logger initialized");
}
