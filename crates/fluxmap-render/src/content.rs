//! What a selected manifest or source deploys

use fluxmap_core::{Classification, Manifest, Source};
use fluxmap_fs::io;

use crate::error::Result;
use crate::filter::filter_kustomization;
use crate::kustomize::{KustomizeBuilder, KustomizeCli};

/// Produces the YAML shown for a manifest or a source.
#[derive(Debug, Clone)]
pub struct ContentRenderer<B = KustomizeCli> {
    builder: B,
}

impl<B: KustomizeBuilder> ContentRenderer<B> {
    pub fn new(builder: B) -> Self {
        Self { builder }
    }

    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// The manifest's own Kustomization document.
    ///
    /// - Complete: read from its file.
    /// - Patch: the document only exists after kustomize applies the patch,
    ///   so the directory of its layering file is built first.
    /// - Base: nothing; bases are hidden from every listing.
    pub fn manifest_content(&self, manifest: &Manifest) -> Result<String> {
        let mut conditions = vec![("metadata.name", manifest.name.as_str())];
        if let Some(namespace) = manifest.namespace.as_deref().filter(|ns| !ns.is_empty()) {
            conditions.push(("metadata.namespace", namespace));
        }

        let stream = match manifest.classification {
            Classification::Base => return Ok(String::new()),
            Classification::Complete => io::read_text(&manifest.path)?,
            Classification::Patch => {
                let dir = manifest
                    .layering_file
                    .as_ref()
                    .and_then(|file| file.parent())
                    .or_else(|| manifest.dir());
                match dir {
                    Some(dir) => self.builder.build(&dir)?,
                    None => return Ok(String::new()),
                }
            }
        };
        filter_kustomization(&stream, &conditions)
    }

    /// Raw content of the file holding the source.
    pub fn source_content(&self, source: &Source) -> Result<String> {
        Ok(io::read_text(&source.path)?)
    }
}

impl ContentRenderer<KustomizeCli> {
    /// Renderer backed by the `kustomize` binary on `PATH`.
    pub fn discover() -> Result<Self> {
        Ok(Self::new(KustomizeCli::discover()?))
    }
}
