//! Build and diff commands, both delegated to the flux CLI

use fluxmap_core::Resolution;
use fluxmap_render::{FluxAction, FluxCli};

use super::find;
use crate::error::Result;

/// Run `flux build` or `flux diff` for one Kustomization
pub fn run_flux(
    resolution: &Resolution,
    action: FluxAction,
    name: &str,
    namespace: Option<&str>,
) -> Result<()> {
    let index = find(resolution, name, namespace)?;
    let manifest = resolution.manifest(index);
    let flux = FluxCli::discover()?;

    let output = match action {
        FluxAction::Build => flux.build(manifest, resolution.root())?,
        FluxAction::Diff => flux.diff(manifest, resolution.root())?,
    };
    tracing::debug!(action = action.as_str(), bytes = output.len(), "flux finished");
    print!("{output}");
    Ok(())
}
