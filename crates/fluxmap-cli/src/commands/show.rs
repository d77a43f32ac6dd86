//! Show command implementation

use colored::Colorize;
use fluxmap_core::Resolution;
use fluxmap_render::{ContentRenderer, KustomizeCli};

use super::find;
use crate::error::{CliError, Result};

/// What `show` prints for the selected Kustomization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowMode {
    Summary,
    Source,
    Render,
}

/// Run the show command
pub fn run_show(
    resolution: &mut Resolution,
    name: &str,
    namespace: Option<&str>,
    mode: ShowMode,
) -> Result<()> {
    let index = find(resolution, name, namespace)?;
    resolution.select(name, namespace);

    match mode {
        ShowMode::Summary => print_summary(resolution, index),
        ShowMode::Source => {
            let selection = resolution.selection(index);
            let source = selection.source.ok_or_else(|| {
                CliError::user(format!("'{}' has no resolved source", selection.manifest.name))
            })?;
            print!("{}", renderer().source_content(source)?);
        }
        ShowMode::Render => {
            print!("{}", renderer().manifest_content(resolution.manifest(index))?);
        }
    }
    Ok(())
}

// A missing kustomize binary only matters once a patch has to be built.
fn renderer() -> ContentRenderer<KustomizeCli> {
    ContentRenderer::discover().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "Falling back to kustomize on PATH");
        ContentRenderer::new(KustomizeCli::with_program("kustomize", None))
    })
}

fn print_summary(resolution: &Resolution, index: usize) {
    let selection = resolution.selection(index);
    let manifest = selection.manifest;

    println!("{}", manifest.name.bold());
    println!();
    println!("{}:      {}", "Namespace".dimmed(), manifest.namespace_or_default());
    println!("{}:    {}", "API version".dimmed(), manifest.api_version);
    println!("{}: {}", "Classification".dimmed(), manifest.classification.to_string().cyan());
    println!("{}:           {}", "File".dimmed(), manifest.rel_path);
    if let Some(spec_path) = &manifest.spec_path {
        println!("{}:           {}", "Path".dimmed(), spec_path);
    }
    if let Some(layering) = &manifest.layering_file {
        let rel = layering
            .relative_to(resolution.root())
            .unwrap_or_else(|| layering.as_str().to_string());
        println!("{}:       {}", "Layering".dimmed(), rel);
    }
    if let Some(parent) = resolution.parent_of(index) {
        println!("{}:         {}", "Parent".dimmed(), parent.name.green());
    }
    match selection.source {
        Some(source) => println!(
            "{}:         {}/{} ({})",
            "Source".dimmed(),
            source.kind,
            source.name,
            source.rel_path
        ),
        None => {
            if let Some(source_ref) = &manifest.source_ref {
                println!(
                    "{}:         {}/{} {}",
                    "Source".dimmed(),
                    source_ref.kind,
                    source_ref.name,
                    "(unresolved)".yellow()
                );
            }
        }
    }

    println!();
    println!("{}:", "Children".bold());
    if manifest.children.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for child in resolution.children_of(index) {
        println!(
            "  {} {} ({})",
            "+".green(),
            child.name.cyan(),
            child.classification
        );
    }
}
