use std::path::PathBuf;
use thiserror::Error;

/// Central error type for the provisioning pipeline.
/// Every module returns `Result<T, SetupError>`.
#[derive(Debug, Error)]
pub enum SetupError {
    // ── IO ──────────────────────────────────────────────
    #[error("IO error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    // ── Network ─────────────────────────────────────────
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP error {status}: {reason} ({url})")]
    HttpStatus {
        url: String,
        status: u16,
        reason: String,
    },

    // ── Parsing ─────────────────────────────────────────
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    // ── Transfer integrity ──────────────────────────────
    #[error("Incomplete download: {received}/{expected} bytes")]
    IncompleteTransfer { received: u64, expected: u64 },

    #[error("Failed to finalize {path:?}: {reason}")]
    Finalization { path: PathBuf, reason: String },

    // ── Tooling ─────────────────────────────────────────
    #[error("{0}")]
    ToolMissing(String),

    #[error(
        "Required Java {0} not found. Currently installed versions are not compatible. \
         Please install Java {0} or newer."
    )]
    JavaNotFound(u32),

    #[error("{program} failed with exit code {code}")]
    Subprocess { program: String, code: i32 },

    // ── Input ───────────────────────────────────────────
    #[error("Unknown server software: {0}")]
    UnknownSoftware(String),

    #[error("Invalid game version: {0:?}")]
    InvalidVersion(String),

    // ── Generic ─────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type SetupResult<T> = Result<T, SetupError>;

impl SetupError {
    /// Whether a download attempt that failed with this error may be retried.
    ///
    /// A bad HTTP status or a missing tool cannot be fixed by trying again.
    pub fn is_retryable(&self) -> bool {
        match self {
            SetupError::Http(source) => source.status().is_none(),
            SetupError::Io { .. }
            | SetupError::IncompleteTransfer { .. }
            | SetupError::Finalization { .. } => true,
            _ => false,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SetupError::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<std::io::Error> for SetupError {
    fn from(source: std::io::Error) -> Self {
        SetupError::Io {
            path: PathBuf::new(),
            source,
        }
    }
}
