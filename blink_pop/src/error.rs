use std::path::PathBuf;

use blink_detect::DetectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("window: {0}")]
    Window(String),

    #[error("cannot read {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad tuning file {path}: {source}")]
    Tuning {
        path:   PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("blink detection: {0}")]
    Detect(#[from] DetectError),

    #[error("logging: {0}")]
    Log(String),
}
