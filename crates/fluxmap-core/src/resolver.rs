//! Resolution pipeline and its read-only result

use std::path::Path;
use std::thread::JoinHandle;

use crossbeam_channel::Receiver;
use fluxmap_fs::{NormalizedPath, io};

use crate::clusters::ClusterForest;
use crate::config::ResolverConfig;
use crate::context::{LinkWarning, ResolutionContext};
use crate::model::{Manifest, Source};
use crate::{Error, Result, crawl, kustomize, order, sources};

/// Resolves a Flux repository into manifests, sources and clusters.
///
/// # Example
///
/// ```ignore
/// use fluxmap_core::Resolver;
///
/// let resolution = Resolver::new("./fleet-infra").resolve()?;
/// for manifest in resolution.visible() {
///     println!("{} ({})", manifest.name, manifest.classification);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Resolver {
    root: NormalizedPath,
    config: ResolverConfig,
}

/// Sent once when a background resolution finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadySignal {
    /// `false` when the resolution failed
    pub ready: bool,
}

/// Handle to a resolution running on its own thread.
#[derive(Debug)]
pub struct ResolverHandle {
    ready: Receiver<ReadySignal>,
    thread: JoinHandle<Result<Resolution>>,
}

impl Resolver {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::with_config(root, ResolverConfig::default())
    }

    pub fn with_config(root: impl AsRef<Path>, config: ResolverConfig) -> Self {
        Self {
            root: NormalizedPath::new(root.as_ref()),
            config,
        }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Run the whole pipeline on the calling thread.
    pub fn resolve(&self) -> Result<Resolution> {
        let root = self.canonical_root()?;
        tracing::info!(root = %root, "Resolving repository");

        let mut ctx = ResolutionContext::new(root, self.config.clone());
        crawl::crawl(&mut ctx)?;
        if ctx.manifests.is_empty() {
            return Err(Error::NoManifests {
                root: ctx.root.to_native(),
            });
        }

        kustomize::link_all(&mut ctx);
        sources::bind_sources(&mut ctx);
        ctx.clusters.reparent();

        let visible = order::visible_order(&ctx.manifests);
        tracing::info!(
            manifests = ctx.manifests.len(),
            visible = visible.len(),
            sources = ctx.sources.len(),
            clusters = ctx.clusters.roots().len(),
            warnings = ctx.warnings.len(),
            "Resolution complete"
        );
        Ok(Resolution::new(ctx, visible))
    }

    /// Run the pipeline on a background thread.
    pub fn spawn(self) -> ResolverHandle {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let thread = std::thread::spawn(move || {
            let result = self.resolve();
            if let Err(e) = &result {
                tracing::error!(error = %e, "Resolution failed");
            }
            let _ = tx.send(ReadySignal {
                ready: result.is_ok(),
            });
            result
        });
        ResolverHandle { ready: rx, thread }
    }

    fn canonical_root(&self) -> Result<NormalizedPath> {
        if !self.root.is_dir() {
            return Err(Error::RootNotFound {
                path: self.root.to_native(),
            });
        }
        Ok(io::canonicalize(&self.root)?)
    }
}

impl ResolverHandle {
    /// Channel carrying the single [`ReadySignal`].
    pub fn ready(&self) -> &Receiver<ReadySignal> {
        &self.ready
    }

    /// Block until the resolution finishes. Returns the ready flag.
    pub fn wait_ready(&self) -> bool {
        self.ready.recv().map(|signal| signal.ready).unwrap_or(false)
    }

    /// Wait for the resolution and take its result.
    pub fn join(self) -> Result<Resolution> {
        self.thread.join().map_err(|_| Error::WorkerPanicked)?
    }
}

/// A manifest together with the source it is bound to.
#[derive(Debug, Clone, Copy)]
pub struct Selection<'a> {
    pub index: usize,
    pub manifest: &'a Manifest,
    pub source: Option<&'a Source>,
}

/// Finished, read-only result of a resolution.
///
/// Only the selection and the cluster highlight can change after
/// construction.
#[derive(Debug)]
pub struct Resolution {
    ctx: ResolutionContext,
    visible: Vec<usize>,
    selected: Option<usize>,
}

impl Resolution {
    fn new(ctx: ResolutionContext, visible: Vec<usize>) -> Self {
        let selected = visible.first().copied();
        Self {
            ctx,
            visible,
            selected,
        }
    }

    /// Canonical repository root.
    pub fn root(&self) -> &NormalizedPath {
        &self.ctx.root
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.ctx.config
    }

    /// Every manifest in store order.
    pub fn manifests(&self) -> &[Manifest] {
        &self.ctx.manifests
    }

    /// Every source in store order.
    pub fn sources(&self) -> &[Source] {
        &self.ctx.sources
    }

    pub fn manifest(&self, index: usize) -> &Manifest {
        &self.ctx.manifests[index]
    }

    pub fn source(&self, index: usize) -> &Source {
        &self.ctx.sources[index]
    }

    /// Store indices of the visible manifests in display order.
    pub fn visible_indices(&self) -> &[usize] {
        &self.visible
    }

    /// Visible manifests in display order.
    pub fn visible(&self) -> impl Iterator<Item = &Manifest> {
        self.visible.iter().map(|&index| &self.ctx.manifests[index])
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &Manifest> {
        self.ctx.manifests[index]
            .children
            .iter()
            .map(|&child| &self.ctx.manifests[child])
    }

    pub fn parent_of(&self, index: usize) -> Option<&Manifest> {
        self.ctx.manifests[index]
            .parent
            .map(|parent| &self.ctx.manifests[parent])
    }

    /// Manifests bound to source `index`.
    pub fn manifests_of_source(&self, index: usize) -> impl Iterator<Item = &Manifest> {
        self.ctx.sources[index]
            .children
            .iter()
            .map(|&child| &self.ctx.manifests[child])
    }

    pub fn clusters(&self) -> &ClusterForest {
        &self.ctx.clusters
    }

    /// Highlight a cluster branch. See [`ClusterForest::select`].
    pub fn select_cluster(&mut self, branch: &[&str]) -> bool {
        self.ctx.clusters.select(branch)
    }

    pub fn clear_cluster_selection(&mut self) {
        self.ctx.clusters.clear_selection();
    }

    pub fn warnings(&self) -> &[LinkWarning] {
        &self.ctx.warnings
    }

    /// Store index of the first manifest named `name`, visible ones first.
    ///
    /// `namespace` narrows the match when given.
    pub fn find(&self, name: &str, namespace: Option<&str>) -> Option<usize> {
        let matches = |index: &usize| {
            let manifest = &self.ctx.manifests[*index];
            manifest.name == name
                && namespace.is_none_or(|ns| manifest.namespace_or_default() == ns)
        };
        self.visible
            .iter()
            .copied()
            .find(matches)
            .or_else(|| (0..self.ctx.manifests.len()).find(matches))
    }

    /// The selected manifest and its source.
    pub fn selected(&self) -> Option<Selection<'_>> {
        self.selected.map(|index| self.selection(index))
    }

    pub fn selection(&self, index: usize) -> Selection<'_> {
        let manifest = &self.ctx.manifests[index];
        Selection {
            index,
            manifest,
            source: manifest.source.map(|source| &self.ctx.sources[source]),
        }
    }

    /// Select the manifest found by [`Resolution::find`].
    pub fn select(&mut self, name: &str, namespace: Option<&str>) -> bool {
        match self.find(name, namespace) {
            Some(index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }

    /// Select the manifest at `position` in the visible order.
    pub fn select_index(&mut self, position: usize) -> bool {
        match self.visible.get(position) {
            Some(&index) => {
                self.selected = Some(index);
                true
            }
            None => false,
        }
    }
}
