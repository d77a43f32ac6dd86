//! Flux source records (GitRepository, HelmRepository, OCIRepository, ...)

use fluxmap_fs::NormalizedPath;
use serde::Serialize;

/// A discovered document from the Flux source API group.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub id: String,
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub path: NormalizedPath,
    pub rel_path: String,
    /// Manifests whose `sourceRef` resolved to this source
    pub children: Vec<usize>,
    /// Manifest whose build tree contains this source's file
    pub owner: Option<usize>,
}

impl Source {
    /// Namespace, or the empty string when none is declared.
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }
}
