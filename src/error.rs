use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("source file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    FileUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("only {counted} hook(s) counted, expected at least {minimum} -- check the summary above")]
    ThresholdNotMet { counted: usize, minimum: usize },

    #[error("invalid guard macro '{0}' -- expected a C identifier")]
    InvalidGuard(String),

    #[error("invalid match pattern for hook '{hook}': {reason}")]
    InvalidPattern { hook: String, reason: String },

    #[error("failed to render report: {0}")]
    Json(#[from] serde_json::Error),
}
