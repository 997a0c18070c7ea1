use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Directory holding rotated log files
pub const LOG_DIRECTORY: &str = "logs";

/// Prefix of rotated log files
pub const LOG_FILE_PREFIX: &str = "todo-api.log";

/// Builds the filter for a level directive, falling back to `info`
fn build_filter(log_level: &str) -> EnvFilter {
    match EnvFilter::try_new(log_level) {
        Ok(f) => f,
        Err(_) => {
            eprintln!("Invalid log level '{}', defaulting to 'info'", log_level);
            EnvFilter::new("info")
        }
    }
}

/// Initialize the logging system from the logging settings.
///
/// Logs always go to stdout. With `file` enabled they are also written to
/// daily rotating files in the `logs` directory.
///
/// Calling this twice is harmless; the second subscriber is not installed.
pub fn init_logging(settings: &LoggingConfig) {
    let filter = build_filter(&settings.level);
    let stdout_layer = fmt::layer().with_target(true).with_line_number(true);

    let result = if settings.file {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIRECTORY, LOG_FILE_PREFIX);

        let file_layer = fmt::layer()
            .with_ansi(false)
            .with_line_number(true)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .with(file_layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(stdout_layer)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }
}
