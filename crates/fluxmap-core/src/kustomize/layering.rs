//! Kustomize layering files (`kustomization.yaml`)

use fluxmap_fs::{FluxPath, NormalizedPath, io};
use serde::Deserialize;

use crate::model::Classification;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayeringDoc {
    #[serde(default)]
    resources: Vec<String>,
    #[serde(default)]
    components: Vec<String>,
    #[serde(default)]
    patches: Vec<PatchEntry>,
    #[serde(default)]
    patches_strategic_merge: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum PatchEntry {
    Target { path: Option<String> },
    Inline(String),
}

/// A parsed layering file and the directory it lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayeringFile {
    pub path: NormalizedPath,
    pub dir: NormalizedPath,
    doc: LayeringDoc,
}

impl LayeringFile {
    /// Find and parse the layering file of `dir`.
    ///
    /// `kustomization.yaml` is preferred over `kustomization.yml`. Returns
    /// `None` when neither exists or the file found cannot be parsed.
    pub fn locate(dir: &NormalizedPath) -> Option<Self> {
        let path = FluxPath::LAYERING_FILES
            .iter()
            .map(|name| dir.join(name.as_str()))
            .find(NormalizedPath::is_file)?;
        Self::load(&path)
    }

    /// Parse the layering file at `path`.
    pub fn load(path: &NormalizedPath) -> Option<Self> {
        let content = io::read_text_lenient(path)?;
        Self::parse(path.clone(), &content)
    }

    /// Parse layering file content as if read from `path`.
    pub fn parse(path: NormalizedPath, content: &str) -> Option<Self> {
        let doc = match serde_yaml::from_str::<Option<LayeringDoc>>(content) {
            Ok(doc) => doc.unwrap_or_default(),
            Err(e) => {
                tracing::debug!(path = %path, error = %e, "Ignoring unparsable layering file");
                return None;
            }
        };
        let dir = path.parent()?;
        Some(Self { path, dir, doc })
    }

    /// `resources` followed by `components`, in file order.
    pub fn references(&self) -> impl Iterator<Item = &str> {
        self.doc
            .resources
            .iter()
            .chain(&self.doc.components)
            .map(String::as_str)
    }

    /// File paths named by `patches[].path` and `patchesStrategicMerge`.
    pub fn patch_targets(&self) -> impl Iterator<Item = &str> {
        self.doc
            .patches
            .iter()
            .filter_map(|entry| match entry {
                PatchEntry::Target { path } => path.as_deref(),
                PatchEntry::Inline(_) => None,
            })
            .chain(self.doc.patches_strategic_merge.iter().map(String::as_str))
    }

    /// Classification of the manifest file at `target` according to this
    /// layering file, if it mentions it at all.
    pub fn classify(&self, target: &NormalizedPath) -> Option<Classification> {
        let names = |reference: &str| {
            self.dir
                .resolve(reference)
                .map(|resolved| &resolved == target)
                .unwrap_or(false)
        };

        if self.doc.resources.iter().any(|r| names(r)) {
            Some(Classification::Complete)
        } else if self.patch_targets().any(names) {
            Some(Classification::Patch)
        } else {
            None
        }
    }
}

/// Classification of the manifest file at `path` from its sibling
/// layering file.
///
/// A manifest with no usable sibling layering file stands alone and is
/// complete; one whose layering file does not mention it stays a base.
pub fn classify_manifest(path: &NormalizedPath) -> (Classification, Option<LayeringFile>) {
    let Some(layering) = path.parent().and_then(|dir| LayeringFile::locate(&dir)) else {
        return (Classification::Complete, None);
    };
    let classification = layering.classify(path).unwrap_or(Classification::Base);
    (classification, Some(layering))
}
