use std::io;

/// Canonical result type for semrel code
pub type Result<T> = std::result::Result<T, SemrelError>;

/// Common error type for release resolution.
///
/// Every variant is terminal for a single resolution attempt: the engine
/// never retries internally, the caller owns retry policy.
#[derive(Debug, thiserror::Error)]
pub enum SemrelError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid repository slug '{0}', expected owner/name")]
    MalformedSlug(String),

    #[error("no pre-release possible against version {0}")]
    InvalidMaintenanceRequest(String),

    #[error("default branch not found")]
    NoDefaultBranch,

    #[error("current branch not found")]
    NoCurrentBranch,

    #[error("commit {0} not found in fetched history")]
    CommitNotFound(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("release resolution canceled")]
    Canceled,
}

impl From<reqwest::Error> for SemrelError {
    fn from(error: reqwest::Error) -> Self {
        SemrelError::Provider(error.to_string())
    }
}
