//! Logging Module
//!
//! Sets up the `tracing` subscriber used by the service:
//! - A human-readable stderr layer
//! - An optional JSON file layer (daily rolling, non-blocking)
//! - A bridge so `log` macro events from library code reach `tracing`

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::LoggingConfig;

/// File name prefix of the rolling log file.
pub const LOG_FILE_PREFIX: &str = "conflict-coach.log";

/// Build the filter from `RUST_LOG`, falling back to the configured level.
fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

fn ensure_dir(dir: &Path) -> bool {
    if dir.exists() {
        return true;
    }
    match fs::create_dir_all(dir) {
        Ok(()) => true,
        Err(e) => {
            eprintln!("Failed to create logs directory {}: {}", dir.display(), e);
            false
        }
    }
}

/// Initialize the logging system.
///
/// Returns a `WorkerGuard` when a file layer was installed; it must be kept
/// alive for the lifetime of the process so buffered lines are flushed.
/// Calling this more than once leaves the first subscriber in place.
pub fn init(config: &LoggingConfig) -> Option<WorkerGuard> {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(true)
        .with_filter(env_filter(&config.level));

    let mut guard = None;
    let file_layer = match config.log_dir.as_deref() {
        Some(dir) if config.json_file && ensure_dir(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (non_blocking, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(
                tracing_subscriber::fmt::layer()
                    .with_writer(non_blocking)
                    .json()
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_filter(env_filter(&config.level)),
            )
        }
        _ => None,
    };

    let installed = tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .is_ok();

    if !installed {
        return None;
    }

    // Library code logs through the `log` facade
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to initialize LogTracer: {}", e);
    }

    log::debug!(
        "Logging initialized (level: {}, file: {:?})",
        config.level,
        config.log_dir.as_ref().map(|d| d.join(LOG_FILE_PREFIX))
    );

    guard
}
