use thiserror::Error;

/// Unified error type for conventional-release operations.
///
/// The variants split into the categories the top-level run loop cares
/// about: user-initiated aborts and "nothing to do" exit cleanly, everything
/// else is surfaced and exits non-zero.
#[derive(Error, Debug)]
pub enum ReleaserError {
    /// The user declined a confirmation or chose Abort in a list prompt.
    #[error("User aborted the execution")]
    UserAborted,

    /// The branch is pristine and no forced bump was requested.
    #[error("No new commits since last tag, aborting.")]
    NoNewCommit,

    /// Neither a valid manifest nor a known current version after
    /// reconciliation. Internal consistency guard, never user-recoverable.
    #[error("Unknown config state.")]
    UnknownConfigState,

    /// The resolved tag label does not follow semver.
    #[error("Tag {0} does not follow semver.")]
    InvalidTag(String),

    #[error("Label {0} not found.")]
    LabelNotFound(String),

    #[error("Tag {0} already exists.")]
    TagAlreadyExists(String),

    #[error("CHANGELOG.md (case-insensitive) not found.")]
    ChangelogNotFound,

    #[error("The changelog backup file was not found.")]
    BackupNotFound,

    /// The upward package.json search walked past the repository root.
    #[error("Exhausted all directories within repository.")]
    ExhaustedSearch,

    #[error("The provided label {0} does not follow semver.")]
    InvalidVersion(String),

    #[error("Invalid release type {0} provided.")]
    InvalidBumpType(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Manifest error: {0}")]
    Manifest(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in conventional-release.
pub type Result<T> = std::result::Result<T, ReleaserError>;

impl ReleaserError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaserError::Config(msg.into())
    }

    /// Create a manifest error with context
    pub fn manifest(msg: impl Into<String>) -> Self {
        ReleaserError::Manifest(msg.into())
    }

    /// True for the two outcomes the run loop treats as clean exits.
    pub fn is_clean_exit(&self) -> bool {
        matches!(
            self,
            ReleaserError::UserAborted | ReleaserError::NoNewCommit
        )
    }
}
