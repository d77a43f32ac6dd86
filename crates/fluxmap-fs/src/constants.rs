//! Well-known file names in a Flux repository.

use std::path::Path;

/// File names the resolver looks for by exact name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FluxPath {
    /// `kustomization.yaml`, the preferred layering file name
    Kustomization,
    /// `kustomization.yml`, checked when the `.yaml` variant is absent
    KustomizationShort,
    /// `.fluxmap.toml`, optional resolver settings at the repository root
    ResolverConfig,
}

impl FluxPath {
    /// Layering file names in lookup order.
    pub const LAYERING_FILES: [FluxPath; 2] = [Self::Kustomization, Self::KustomizationShort];

    /// Get the string representation of the path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Kustomization => "kustomization.yaml",
            Self::KustomizationShort => "kustomization.yml",
            Self::ResolverConfig => ".fluxmap.toml",
        }
    }

    /// Whether `file_name` names a layering file.
    pub fn is_layering_file(file_name: &str) -> bool {
        Self::LAYERING_FILES
            .iter()
            .any(|candidate| candidate.as_str() == file_name)
    }
}

impl AsRef<Path> for FluxPath {
    fn as_ref(&self) -> &Path {
        Path::new(self.as_str())
    }
}

impl AsRef<str> for FluxPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for FluxPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
