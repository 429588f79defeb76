use thiserror::Error;

/// Failure to acquire the camera.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no camera device found")]
    NotFound,
    #[error("camera is already held by another session")]
    Busy,
}

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("landmark provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("landmark provider failed on frame {frame}: {message}")]
    Provider { frame: u64, message: String },
    #[error("camera error: {0}")]
    Camera(#[from] CameraError),
    #[error("trace line {line}: {source}")]
    Trace {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
