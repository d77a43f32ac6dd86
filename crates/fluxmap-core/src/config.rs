//! Resolver settings
//!
//! Every field has a default matching the Flux conventions, so an empty
//! settings file (or none at all) gives the standard behaviour.

use fluxmap_fs::{ConfigStore, FluxPath, NormalizedPath};
use serde::Deserialize;

use crate::Result;

/// Settings for a resolution run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct ResolverConfig {
    /// API group of Flux Kustomizations
    pub kustomization_api: String,
    /// API group of Flux sources
    pub source_api: String,
    /// Directory names that introduce a cluster name
    pub cluster_markers: Vec<String>,
    /// Directory names that never become a cluster name on their own
    pub reserved_names: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_links: bool,
    /// Decode worker count; `0` means the available parallelism
    pub workers: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            kustomization_api: "kustomize.toolkit.fluxcd.io".to_string(),
            source_api: "source.toolkit.fluxcd.io".to_string(),
            cluster_markers: vec!["clusters".to_string(), "hub".to_string()],
            reserved_names: vec!["flux-system".to_string(), "default".to_string()],
            follow_links: true,
            workers: 0,
        }
    }
}

impl ResolverConfig {
    /// Load settings for a repository.
    ///
    /// An explicit file wins; otherwise `.fluxmap.toml` at the repository
    /// root is used when present; otherwise the defaults.
    pub fn load(root: &NormalizedPath, explicit: Option<&NormalizedPath>) -> Result<Self> {
        let store = ConfigStore::new();
        if let Some(path) = explicit {
            tracing::debug!(path = %path, "Loading resolver config");
            return Ok(store.load(path)?);
        }

        let default_path = root.join(FluxPath::ResolverConfig.as_str());
        Ok(store.load_optional(&default_path)?.unwrap_or_default())
    }

    /// Worker count with `0` resolved to the machine's parallelism.
    pub fn effective_workers(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4)
    }
}
