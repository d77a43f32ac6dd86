//! State threaded through the resolution pipeline

use std::collections::{HashMap, HashSet};

use fluxmap_fs::NormalizedPath;
use serde::Serialize;

use crate::clusters::ClusterForest;
use crate::config::ResolverConfig;
use crate::decode::{ManifestDoc, SourceDoc};
use crate::model::{Classification, Manifest, Source, short_id};

/// A reference the linker had to skip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkWarning {
    /// Name of the manifest being linked
    pub manifest: String,
    /// Layering file holding the reference; `None` when the reference is
    /// the manifest's own `spec.path`
    pub layering_file: Option<String>,
    pub reference: String,
    pub reason: String,
}

/// Stores filled by the crawl and refined by every later pass.
///
/// Manifests and sources live in flat, insertion-ordered vectors; all
/// relations between records are indices into them.
#[derive(Debug)]
pub struct ResolutionContext {
    pub root: NormalizedPath,
    pub config: ResolverConfig,
    pub manifests: Vec<Manifest>,
    pub sources: Vec<Source>,
    pub clusters: ClusterForest,
    pub warnings: Vec<LinkWarning>,
    manifests_by_path: HashMap<NormalizedPath, Vec<usize>>,
    sources_by_path: HashMap<NormalizedPath, Vec<usize>>,
}

impl ResolutionContext {
    pub fn new(root: NormalizedPath, config: ResolverConfig) -> Self {
        Self {
            root,
            config,
            manifests: Vec::new(),
            sources: Vec::new(),
            clusters: ClusterForest::default(),
            warnings: Vec::new(),
            manifests_by_path: HashMap::new(),
            sources_by_path: HashMap::new(),
        }
    }

    /// Append a decoded Kustomization found in `path`. Returns its index.
    pub fn push_manifest(&mut self, doc: ManifestDoc, path: NormalizedPath) -> usize {
        let index = self.manifests.len();
        let rel_path = self.relative(&path);
        tracing::debug!(name = %doc.name, path = %rel_path, "Discovered kustomization");

        self.manifests_by_path
            .entry(path.clone())
            .or_default()
            .push(index);
        self.manifests.push(Manifest {
            id: short_id(),
            api_version: doc.api_version,
            kind: doc.kind,
            name: doc.name,
            namespace: doc.namespace,
            path,
            rel_path,
            spec_path: doc.spec_path,
            source_ref: doc.source_ref,
            substitutions: doc.substitutions,
            classification: Classification::Base,
            layering_file: None,
            children: Vec::new(),
            parent: None,
            source: None,
        });
        index
    }

    /// Append a decoded source found in `path`. Returns its index.
    pub fn push_source(&mut self, doc: SourceDoc, path: NormalizedPath) -> usize {
        let index = self.sources.len();
        let rel_path = self.relative(&path);
        tracing::debug!(kind = %doc.kind, name = %doc.name, path = %rel_path, "Discovered source");

        self.sources_by_path
            .entry(path.clone())
            .or_default()
            .push(index);
        self.sources.push(Source {
            id: short_id(),
            api_version: doc.api_version,
            kind: doc.kind,
            name: doc.name,
            namespace: doc.namespace,
            path,
            rel_path,
            children: Vec::new(),
            owner: None,
        });
        index
    }

    /// Manifests declared in the file at `path`.
    pub fn manifests_at(&self, path: &NormalizedPath) -> &[usize] {
        self.manifests_by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Sources declared in the file at `path`.
    pub fn sources_at(&self, path: &NormalizedPath) -> &[usize] {
        self.sources_by_path
            .get(path)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Whether `to` can be reached from `from` by following children.
    pub fn reaches(&self, from: usize, to: usize) -> bool {
        let mut stack = vec![from];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(self.manifests[current].children.iter().copied());
        }
        false
    }

    pub fn warn(
        &mut self,
        manifest: usize,
        layering_file: Option<&NormalizedPath>,
        reference: &str,
        reason: String,
    ) {
        let name = self.manifests[manifest].name.clone();
        let layering_file = layering_file.map(|path| self.relative(path));
        tracing::warn!(
            manifest = %name,
            layering_file = layering_file.as_deref().unwrap_or("spec.path"),
            reference,
            reason = %reason,
            "Skipping unresolvable resource"
        );
        self.warnings.push(LinkWarning {
            manifest: name,
            layering_file,
            reference: reference.to_string(),
            reason,
        });
    }

    /// Path relative to the repository root, or the path itself when it
    /// lies outside the root.
    pub fn relative(&self, path: &NormalizedPath) -> String {
        path.relative_to(&self.root)
            .unwrap_or_else(|| path.as_str().to_string())
    }
}
