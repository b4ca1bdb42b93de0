//! Console and rolling-file logging.
//!
//! `RUST_LOG` takes precedence over the configured level.

use crate::error::ConfigError;
use crate::settings::{LogFormat, LoggingSettings};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Installs the global subscriber.
///
/// The returned guard flushes the file writer when dropped, so the caller must
/// keep it alive for the lifetime of the process.
pub fn init_logging(settings: &LoggingSettings) -> Result<WorkerGuard, ConfigError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let file_appender = tracing_appender::rolling::daily(&settings.directory, &settings.file_prefix);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = match settings.format {
        LogFormat::Full => fmt::layer().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(std::io::stderr).boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
    };
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    tracing::debug!(directory = %settings.directory.display(), "Logging initialized.");
    Ok(guard)
}
