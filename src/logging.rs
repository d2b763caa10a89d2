use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;

/// Initializes the logging system with both console and file output.
///
/// The returned guard flushes the file writer when dropped; keep it alive
/// for the whole process.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sb_cleaner=info"));

    // Console-only when the log directory cannot be created
    let file_writer = fs::create_dir_all(&config.dir).is_ok().then(|| {
        // Create a non-blocking file appender for daily log rotation
        let file_appender = tracing_appender::rolling::daily(&config.dir, &config.file_prefix);
        tracing_appender::non_blocking(file_appender)
    });

    let (writer, guard) = match file_writer {
        Some((writer, guard)) => (Some(writer), Some(guard)),
        None => (None, None),
    };

    let json_layer = writer
        .clone()
        .filter(|_| config.json_file)
        .map(|w| fmt::layer().json().with_writer(w));
    let plain_layer = writer
        .filter(|_| !config.json_file)
        .map(|w| fmt::layer().with_ansi(false).with_writer(w));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(plain_layer)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();

    guard
}
