use std::path::PathBuf;

/// Failures at the engine's file-backed edges. The engine itself never fails.
#[derive(Debug, thiserror::Error)]
pub enum LookoutError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}:{line}: invalid invocation record: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config at {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, LookoutError>;
