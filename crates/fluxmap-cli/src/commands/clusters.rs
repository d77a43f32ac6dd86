//! Clusters command implementation

use colored::Colorize;
use fluxmap_core::{ClusterTree, Resolution};

use crate::error::{CliError, Result};

/// Run the clusters command
pub fn run_clusters(resolution: &mut Resolution, select: Option<&str>, json: bool) -> Result<()> {
    if let Some(branch) = select {
        let names: Vec<&str> = branch.split('/').filter(|s| !s.is_empty()).collect();
        if !resolution.select_cluster(&names) {
            return Err(CliError::user(format!("no cluster branch '{branch}'")));
        }
    }

    let trees = resolution.clusters().to_tree();
    if json {
        println!("{}", serde_json::to_string_pretty(&trees)?);
        return Ok(());
    }

    if trees.is_empty() {
        println!("{}", "No clusters found".dimmed());
        return Ok(());
    }
    for line in outline(&trees) {
        println!("{line}");
    }
    Ok(())
}

/// One line per cluster, indented by depth.
fn outline(trees: &[ClusterTree]) -> Vec<String> {
    fn walk(tree: &ClusterTree, depth: usize, lines: &mut Vec<String>) {
        let name = if tree.selected {
            tree.name.green().bold().to_string()
        } else {
            tree.name.cyan().to_string()
        };
        lines.push(format!("{}{} {}", "  ".repeat(depth), name, tree.path.dimmed()));
        for child in &tree.children {
            walk(child, depth + 1, lines);
        }
    }

    let mut lines = Vec::new();
    for tree in trees {
        walk(tree, 0, &mut lines);
    }
    lines
}
