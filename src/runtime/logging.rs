use std::fs;
use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;
use crate::persistence::default_data_dir;

/// Where log lines go: the configured file, or `cadenza.log` in the data dir.
pub fn log_file_path(settings: &LoggingSettings) -> Option<PathBuf> {
    settings
        .file
        .clone()
        .or_else(|| default_data_dir().map(|d| d.join("cadenza.log")))
}

/// Install a file-backed `tracing` subscriber.
///
/// The terminal belongs to the TUI, so nothing is written to stdout/stderr.
/// `RUST_LOG` wins over `logging.level`. Keep the returned guard alive until
/// exit so buffered lines are flushed.
pub fn init_logging(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let path = log_file_path(settings)?;
    let dir = path.parent()?.to_path_buf();
    let file_name = path.file_name()?.to_os_string();
    fs::create_dir_all(&dir).ok()?;

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;

    Some(guard)
}
