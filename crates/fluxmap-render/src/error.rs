//! Error types for fluxmap-render

/// Result type for fluxmap-render operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while filtering documents or running external tools
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required binary is not on `PATH`
    #[error("unable to find {name} in path. is this installed?")]
    ExecutableNotFound { name: String },

    /// Subprocess exited with non-zero status
    #[error("Command failed (exit code {code}): {command}\n{stderr}")]
    CommandFailed {
        /// Full command line that was run
        command: String,
        /// Exit code, `-1` when killed by a signal
        code: i32,
        /// Captured stderr output
        stderr: String,
    },

    /// Invalid filter condition
    #[error("Invalid filter: {message}")]
    Filter { message: String },

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Fs(#[from] fluxmap_fs::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
