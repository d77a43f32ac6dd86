//! Flux Kustomization records

use std::collections::BTreeMap;

use fluxmap_fs::NormalizedPath;
use serde::Serialize;

/// Role of a manifest relative to the layering file next to it.
///
/// Every manifest starts as [`Classification::Base`]. Linking moves it to
/// [`Classification::Complete`] or [`Classification::Patch`]; both are
/// terminal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Consumed by an overlay, hidden from the visible listing
    #[default]
    Base,
    /// Listed as a patch target of its sibling layering file
    Patch,
    /// Listed as a resource of its sibling layering file, or standalone
    Complete,
}

impl Classification {
    /// Move away from `Base`. Terminal states never change.
    pub fn promote(&mut self, to: Classification) {
        if *self == Classification::Base {
            *self = to;
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Patch => "patch",
            Self::Complete => "complete",
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `spec.sourceRef` of a Flux Kustomization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceRef {
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

/// A discovered Flux Kustomization document.
///
/// Relations to other records are indices into the stores owned by
/// [`crate::ResolutionContext`].
#[derive(Debug, Clone, Serialize)]
pub struct Manifest {
    /// Short random identifier, stable for the lifetime of a resolution
    pub id: String,
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    /// Absolute path of the file holding the document
    pub path: NormalizedPath,
    /// Path of the file relative to the repository root
    pub rel_path: String,
    /// `spec.path`, after any substitution applied by a parent
    pub spec_path: Option<String>,
    pub source_ref: Option<SourceRef>,
    /// `spec.postBuild.substitute`
    pub substitutions: Option<BTreeMap<String, String>>,
    pub classification: Classification,
    /// Sibling `kustomization.yaml` found during linking
    pub layering_file: Option<NormalizedPath>,
    pub children: Vec<usize>,
    pub parent: Option<usize>,
    pub source: Option<usize>,
}

impl Manifest {
    /// Namespace, or the empty string when none is declared.
    pub fn namespace_or_default(&self) -> &str {
        self.namespace.as_deref().unwrap_or("")
    }

    /// Absolute build directory: repository root joined with `spec.path`.
    pub fn absolute_spec_path(&self, root: &NormalizedPath) -> Option<NormalizedPath> {
        self.spec_path.as_deref().map(|path| root.join(path))
    }

    /// Directory containing the manifest's file.
    pub fn dir(&self) -> Option<NormalizedPath> {
        self.path.parent()
    }

    /// Namespace the source reference should be looked up in.
    pub fn source_namespace(&self) -> Option<&str> {
        let source_ref = self.source_ref.as_ref()?;
        Some(
            source_ref
                .namespace
                .as_deref()
                .unwrap_or_else(|| self.namespace_or_default()),
        )
    }

    /// Whether this manifest shows up in the visible listing.
    pub fn is_visible(&self) -> bool {
        self.classification != Classification::Base
    }
}
