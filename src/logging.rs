use crate::Settings;
use std::path::PathBuf;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_MAX_LOG_FILES: usize = 5;
const LOG_FILE_PREFIX: &str = "usewebhook";
const DEFAULT_FILTER: &str = "info";

/// Optional rolling file sink next to the console output
pub struct FileLogger {
    log_directory: PathBuf,
    max_files: usize,
    rotation: Rotation,
}

impl FileLogger {
    pub fn new(log_directory: PathBuf) -> Self {
        Self {
            log_directory,
            max_files: DEFAULT_MAX_LOG_FILES,
            rotation: Rotation::DAILY,
        }
    }

    /// File sink described by `settings`, or `None` when no log directory
    /// is configured. An unknown rotation name keeps daily rotation.
    pub fn from_settings(settings: &Settings) -> Option<Self> {
        let mut logger = Self::new(settings.log_dir.clone()?);
        if let Some(max_files) = settings.log_max_files {
            logger = logger.with_max_files(max_files);
        }
        if let Some(rotation) = settings.log_rotation.as_deref().and_then(parse_rotation) {
            logger = logger.with_rotation(rotation);
        }
        Some(logger)
    }

    pub fn with_max_files(mut self, max_files: usize) -> Self {
        self.max_files = max_files;
        self
    }

    pub fn with_rotation(mut self, rotation: Rotation) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn setup_file_logging(&self) -> std::io::Result<(NonBlocking, WorkerGuard)> {
        std::fs::create_dir_all(&self.log_directory)?;

        let file_appender = RollingFileAppender::builder()
            .rotation(self.rotation.clone())
            .filename_prefix(LOG_FILE_PREFIX)
            .max_log_files(self.max_files)
            .build(&self.log_directory)
            .map_err(|e| std::io::Error::other(e.to_string()))?;

        Ok(tracing_appender::non_blocking(file_appender))
    }
}

fn parse_rotation(name: &str) -> Option<Rotation> {
    match name.to_ascii_lowercase().as_str() {
        "minutely" => Some(Rotation::MINUTELY),
        "hourly" => Some(Rotation::HOURLY),
        "daily" => Some(Rotation::DAILY),
        "never" => Some(Rotation::NEVER),
        _ => None,
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber: stderr always, plus a file layer when a
/// log directory is given. Keep the returned guard alive until exit.
pub fn setup_logging(file_logger: Option<&FileLogger>) -> Option<WorkerGuard> {
    let console = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let file = file_logger.and_then(|logger| match logger.setup_file_logging() {
        Ok(sink) => Some(sink),
        Err(e) => {
            eprintln!(
                "Unable to open log directory {}: {}",
                logger.log_directory.display(),
                e
            );
            None
        }
    });

    match file {
        Some((writer, guard)) => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(console)
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(writer)
                        .with_ansi(false),
                )
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(env_filter())
                .with(console)
                .init();
            None
        }
    }
}
