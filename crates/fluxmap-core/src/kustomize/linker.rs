//! Parent/child linking between manifests
//!
//! A manifest's children are the manifests its build directory pulls in:
//! every file below the directory, plus whatever the layering files found
//! there reference, recursively.

use std::collections::HashSet;

use fluxmap_fs::{FluxPath, NormalizedPath, io};
use walkdir::WalkDir;

use super::layering::{LayeringFile, classify_manifest};
use crate::context::ResolutionContext;
use crate::substitute::substitute;

/// Classify and link every manifest in store order.
///
/// A manifest whose `spec.path` was rewritten by a later parent's
/// substitutions is linked again against its new build directory.
pub fn link_all(ctx: &mut ResolutionContext) {
    let mut pending = Vec::new();
    for index in 0..ctx.manifests.len() {
        let rewritten = link_manifest(ctx, index);
        pending.extend(rewritten.into_iter().filter(|&child| child < index));
    }

    while let Some(index) = pending.pop() {
        tracing::debug!(manifest = %ctx.manifests[index].name, "Relinking after substitution");
        pending.extend(link_build_dir(ctx, index));
    }
}

/// Classify one manifest and bind everything its build directory reaches.
///
/// Returns the children whose `spec.path` this manifest's substitutions
/// rewrote.
pub fn link_manifest(ctx: &mut ResolutionContext, index: usize) -> Vec<usize> {
    let (classification, layering) = classify_manifest(&ctx.manifests[index].path);
    {
        let manifest = &mut ctx.manifests[index];
        manifest.classification.promote(classification);
        manifest.layering_file = layering.map(|l| l.path);
    }
    link_build_dir(ctx, index)
}

fn link_build_dir(ctx: &mut ResolutionContext, index: usize) -> Vec<usize> {
    let Some(spec_path) = ctx.manifests[index].spec_path.clone() else {
        return Vec::new();
    };
    let build_dir = match ctx.root.resolve(&spec_path) {
        Ok(dir) => dir,
        Err(e) => {
            ctx.warn(index, None, &spec_path, format!("invalid build path: {e}"));
            return Vec::new();
        }
    };
    if !build_dir.is_dir() {
        tracing::debug!(
            manifest = %ctx.manifests[index].name,
            path = %spec_path,
            "Build directory does not exist"
        );
        return Vec::new();
    }

    let mut linker = Linker {
        parent: index,
        visited: HashSet::new(),
        rewritten: Vec::new(),
    };
    linker.walk_build_dir(ctx, &build_dir);
    linker.rewritten
}

/// Traversal state for one parent manifest.
struct Linker {
    parent: usize,
    /// Canonical directories whose layering file has been followed
    visited: HashSet<NormalizedPath>,
    rewritten: Vec<usize>,
}

impl Linker {
    fn walk_build_dir(&mut self, ctx: &mut ResolutionContext, dir: &NormalizedPath) {
        let walker = WalkDir::new(dir.to_native())
            .follow_links(ctx.config.follow_links)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!(error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = NormalizedPath::new(entry.path()).clean();
            let is_layering = path.file_name().is_some_and(FluxPath::is_layering_file);
            if is_layering {
                self.follow_layering_file(ctx, &path);
            } else {
                self.bind_file(ctx, &path);
            }
        }
    }

    fn follow_layering_file(&mut self, ctx: &mut ResolutionContext, path: &NormalizedPath) {
        let Some(layering) = LayeringFile::load(path) else {
            return;
        };
        let key = io::canonicalize(&layering.dir).unwrap_or_else(|_| layering.dir.clone());
        if !self.visited.insert(key) {
            return;
        }

        for reference in layering.references() {
            let target = match layering.dir.resolve(reference) {
                Ok(target) => target,
                Err(e) => {
                    ctx.warn(self.parent, Some(&layering.path), reference, e.to_string());
                    continue;
                }
            };

            if target.is_dir() {
                match LayeringFile::locate(&target) {
                    Some(nested) => self.follow_layering_file(ctx, &nested.path),
                    None => ctx.warn(
                        self.parent,
                        Some(&layering.path),
                        reference,
                        "directory has no kustomization file".to_string(),
                    ),
                }
            } else if target.is_file() {
                self.bind_file(ctx, &target);
            } else {
                ctx.warn(
                    self.parent,
                    Some(&layering.path),
                    reference,
                    "no such file or directory".to_string(),
                );
            }
        }
    }

    /// Bind every manifest and source declared in the file at `path`.
    fn bind_file(&mut self, ctx: &mut ResolutionContext, path: &NormalizedPath) {
        let parent = self.parent;
        let manifests = ctx.manifests_at(path).to_vec();
        for child in manifests {
            if bind_manifest(ctx, parent, child) {
                self.rewritten.push(child);
            }
        }

        let sources = ctx.sources_at(path).to_vec();
        for source in sources {
            if ctx.sources[source].owner.is_none() {
                ctx.sources[source].owner = Some(parent);
            }
        }
    }
}

/// Bind `child` under `parent`. Returns whether the parent's substitutions
/// changed the child's `spec.path`.
fn bind_manifest(ctx: &mut ResolutionContext, parent: usize, child: usize) -> bool {
    if child == parent || ctx.manifests[parent].children.contains(&child) {
        return false;
    }
    if ctx.reaches(child, parent) {
        tracing::debug!(
            parent = %ctx.manifests[parent].name,
            child = %ctx.manifests[child].name,
            "Skipping binding that would close a cycle"
        );
        return false;
    }

    let mut rewritten = false;
    if let Some(vars) = ctx.manifests[parent].substitutions.clone() {
        let manifest = &mut ctx.manifests[child];
        manifest.name = substitute(&manifest.name, &vars);
        let spec_path = manifest.spec_path.as_deref().map(|p| substitute(p, &vars));
        rewritten = spec_path != manifest.spec_path;
        manifest.spec_path = spec_path;
    }

    tracing::debug!(
        parent = %ctx.manifests[parent].name,
        child = %ctx.manifests[child].name,
        "Linked kustomization"
    );
    ctx.manifests[parent].children.push(child);
    let manifest = &mut ctx.manifests[child];
    if manifest.parent.is_none() {
        manifest.parent = Some(parent);
    }
    rewritten
}
