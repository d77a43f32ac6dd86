//! Error types for fluxmap-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from fluxmap-core
    #[error(transparent)]
    Core(#[from] fluxmap_core::Error),

    /// Error from fluxmap-render
    #[error(transparent)]
    Render(#[from] fluxmap_render::Error),

    /// Error from fluxmap-fs
    #[error(transparent)]
    Fs(#[from] fluxmap_fs::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

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
