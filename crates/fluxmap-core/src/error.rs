//! Error types for fluxmap-core

use std::path::PathBuf;

/// Result type for fluxmap-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving a repository
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The crawl found no Flux Kustomizations at all
    #[error("no kustomizations found under {root}; are you sure this is a flux repository?")]
    NoManifests { root: PathBuf },

    /// The repository root is missing or not a directory
    #[error("Repository root not found: {path}")]
    RootNotFound { path: PathBuf },

    /// A crawl worker or the resolver thread panicked
    #[error("Resolver thread panicked")]
    WorkerPanicked,

    /// Filesystem error from fluxmap-fs
    #[error(transparent)]
    Fs(#[from] fluxmap_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this is the fatal "not a flux repository" condition.
    pub fn is_no_manifests(&self) -> bool {
        matches!(self, Self::NoManifests { .. })
    }
}
