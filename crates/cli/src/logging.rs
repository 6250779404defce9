//! Tracing setup.
//!
//! Logs go to stderr, filtered by `RUST_LOG` (default level chosen by the
//! command). When a log directory is configured the server also appends to
//! `<log_dir>/web_server.log`.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

pub(crate) const LOG_FILE_NAME: &str = "web_server.log";

/// Keeps the file writer flushing until dropped.
pub(crate) struct LogGuard {
    _file: Option<WorkerGuard>,
}

pub(crate) fn init(default_level: &str, log_dir: Option<&Path>) -> LogGuard {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let stderr = fmt::layer().with_writer(std::io::stderr).boxed();

    let (file_layer, guard) = match log_dir {
        Some(dir) => match std::fs::create_dir_all(dir) {
            Ok(()) => {
                let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
                let (writer, guard) = tracing_appender::non_blocking(appender);
                let layer = fmt::layer().with_writer(writer).with_ansi(false).boxed();
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!(
                    "Warning: could not create log directory '{}': {}",
                    dir.display(),
                    e
                );
                (None, None)
            }
        },
        None => (None, None),
    };

    // A subscriber may already be installed (tests); keep it.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file_layer)
        .try_init();

    LogGuard { _file: guard }
}
