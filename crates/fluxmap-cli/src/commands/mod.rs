//! Command implementations for fluxmap-cli

use std::path::Path;

use fluxmap_core::{Resolution, Resolver, ResolverConfig};
use fluxmap_fs::NormalizedPath;

use crate::error::{CliError, Result};

pub mod clusters;
pub mod flux;
pub mod list;
pub mod show;

pub use clusters::run_clusters;
pub use flux::run_flux;
pub use list::run_list;
pub use show::run_show;

/// Load settings and resolve the repository at `root`.
pub fn resolve(root: &Path, config: Option<&Path>) -> Result<Resolution> {
    let root_path = NormalizedPath::new(root);
    let config_path = config.map(NormalizedPath::new);
    let settings = ResolverConfig::load(&root_path, config_path.as_ref())?;
    Ok(Resolver::with_config(root, settings).resolve()?)
}

/// Store index of the Kustomization named `name`, or a user error.
pub fn find(resolution: &Resolution, name: &str, namespace: Option<&str>) -> Result<usize> {
    resolution.find(name, namespace).ok_or_else(|| match namespace {
        Some(ns) => CliError::user(format!("no kustomization named '{name}' in namespace '{ns}'")),
        None => CliError::user(format!("no kustomization named '{name}'")),
    })
}
