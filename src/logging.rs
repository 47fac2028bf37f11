use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::error::{GlueError, Result};

const DEFAULT_LOG_FILTER: &str = "info";

/// Optional daily-rotated log files next to the console output
pub struct FileLogger {
    log_directory: PathBuf,
    prefix: String,
    rotation: Rotation,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            log_directory,
            prefix: prefix.into(),
            rotation: Rotation::DAILY,
        }
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn setup_file_logging(
        &self,
    ) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.log_directory).map_err(|e| {
            GlueError::ConfigError(format!(
                "Failed to create log directory '{}': {}",
                self.log_directory.display(),
                e
            ))
        })?;

        let file_appender =
            RollingFileAppender::new(self.rotation.clone(), &self.log_directory, &self.prefix);
        Ok(tracing_appender::non_blocking(file_appender))
    }
}

/// Install the global subscriber. Console output goes to stderr so the
/// exporter's stdout carries nothing but SQL. Keep the returned guard alive
/// for as long as file logs should be flushed.
pub fn setup_logging(file_logger: Option<&FileLogger>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let (file_layer, guard) = match file_logger {
        Some(logger) => {
            let (writer, guard) = logger.setup_file_logging()?;
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file_layer)
        .init();

    Ok(guard)
}

/// `LOG_DIR` turns on file logging for the given binary.
pub fn file_logger_from_env(prefix: &str) -> Option<FileLogger> {
    std::env::var("LOG_DIR")
        .ok()
        .filter(|dir| !dir.is_empty())
        .map(|dir| FileLogger::new(PathBuf::from(dir), prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");
        let logger = FileLogger::new(log_dir.clone(), "notifier").with_rotation(Rotation::NEVER);

        let (_writer, _guard) = logger.setup_file_logging().unwrap();
        assert!(log_dir.is_dir());
    }
}
