//! Error types for kust-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from kust-core
    #[error(transparent)]
    Core(#[from] kust_core::Error),

    /// Error from kust-fs
    #[error(transparent)]
    Fs(#[from] kust_fs::Error),

    /// Error from kust-resource
    #[error(transparent)]
    Resource(#[from] kust_resource::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
