//! Logging infrastructure for saytime.
//!
//! This module provides:
//! - Per-run loggers with optional file + callback output
//! - Compact mode with progress filtering
//! - Tail buffer of external tool output for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use saytime_core::logging::{JobLogger, LogConfig};
//!
//! let logger = JobLogger::new(
//!     "narration",
//!     Some(Path::new("/path/to/logs")),
//!     LogConfig::default(),
//!     None,
//! )
//! .unwrap();
//!
//! logger.phase("Render");
//! logger.command("say 'Hello.' -o /tmp/saytime-x/0.wav");
//! logger.progress(50);
//! logger.success("Narration finished");
//! ```

mod job_logger;
mod types;

use std::path::Path;

pub use job_logger::{JobLogger, JobLoggerBuilder};
pub use types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// Respects `RUST_LOG`, falling back to `default_level`, and writes to
/// stderr. Should be called once at startup by the embedding program.
pub fn init_tracing(default_level: LogLevel) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(env_filter(default_level))
        .init();
}

/// Like [`init_tracing`], additionally writing to `<log_dir>/saytime.log`.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the life of the program.
pub fn init_tracing_with_file(default_level: LogLevel, log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(log_dir, "saytime.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(false))
        .with(fmt::layer().with_ansi(false).with_writer(writer))
        .with(env_filter(default_level))
        .init();

    guard
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)))
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
