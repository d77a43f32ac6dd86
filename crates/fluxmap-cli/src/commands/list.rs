//! List command implementation

use colored::Colorize;
use fluxmap_core::Resolution;
use serde_json::json;

use crate::error::Result;

/// Run the list command
pub fn run_list(resolution: &Resolution, all: bool, json: bool) -> Result<()> {
    let mut indices = resolution.visible_indices().to_vec();
    if all {
        let hidden = (0..resolution.manifests().len()).filter(|&i| !resolution.manifest(i).is_visible());
        indices.extend(hidden);
    }

    if json {
        let entries: Vec<_> = indices.iter().map(|&i| entry(resolution, i)).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    println!("{}", "Kustomizations".bold());
    println!();
    for &index in &indices {
        let manifest = resolution.manifest(index);
        let line = format!(
            "  {:<24} {:<16} {:>3}  {:<9} {}",
            manifest.name,
            manifest.namespace_or_default(),
            manifest.children.len(),
            manifest.classification,
            manifest.rel_path
        );
        if manifest.is_visible() {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
    println!();
    println!(
        "{} {} shown, {} found, {} sources.",
        "Total:".dimmed(),
        indices.len(),
        resolution.manifests().len(),
        resolution.sources().len()
    );

    print_warnings(resolution);
    Ok(())
}

fn entry(resolution: &Resolution, index: usize) -> serde_json::Value {
    let manifest = resolution.manifest(index);
    let children: Vec<&str> = resolution.children_of(index).map(|m| m.name.as_str()).collect();
    json!({
        "id": manifest.id,
        "name": manifest.name,
        "namespace": manifest.namespace,
        "classification": manifest.classification,
        "path": manifest.rel_path,
        "spec_path": manifest.spec_path,
        "parent": resolution.parent_of(index).map(|m| m.name.as_str()),
        "children": children,
        "source": resolution.selection(index).source.map(|s| format!("{}/{}", s.kind, s.name)),
    })
}

fn print_warnings(resolution: &Resolution) {
    for warning in resolution.warnings() {
        eprintln!(
            "{} {} in {}: {} ({})",
            "warning:".yellow().bold(),
            warning.reference,
            warning.layering_file.as_deref().unwrap_or("spec.path"),
            warning.reason,
            warning.manifest
        );
    }
}
