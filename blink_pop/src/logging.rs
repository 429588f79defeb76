//! Tracing subscriber setup.

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Filter used when `RUST_LOG` is unset or invalid.
    pub log_level:        String,
    pub enable_file_logs: bool,
    pub log_dir:          String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            log_level:        "info".to_string(),
            enable_file_logs: false,
            log_dir:          "./logs".to_string(),
        }
    }
}

/// Install the global subscriber: stdout always, daily JSON files when
/// enabled.  A second call leaves the first subscriber in place.
pub fn init_tracing(config: &LogConfig) -> Result<(), AppError> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let stdout_layer = fmt::layer().with_target(true).with_thread_ids(false);

    let registry = Registry::default().with(env_filter).with(stdout_layer);

    let result = if config.enable_file_logs {
        let file_appender = RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("blink-pop")
            .filename_suffix("log")
            .max_log_files(14)
            .build(&config.log_dir)
            .map_err(|e| AppError::Log(e.to_string()))?;
        let file_layer = fmt::layer().with_writer(file_appender).with_ansi(false).json();
        registry.with(file_layer).try_init()
    } else {
        registry.try_init()
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.to_string().contains("already been set") => Ok(()),
        Err(e) => Err(AppError::Log(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let cfg = LogConfig::default();
        assert!(init_tracing(&cfg).is_ok());
        assert!(init_tracing(&cfg).is_ok());
    }

    #[test]
    fn file_logs_build_an_appender() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LogConfig {
            enable_file_logs: true,
            log_dir:          dir.path().to_string_lossy().into_owned(),
            ..LogConfig::default()
        };
        // The appender is built before the global install is attempted, so
        // this holds even when another test installed a subscriber first.
        assert!(init_tracing(&cfg).is_ok());
    }
}
