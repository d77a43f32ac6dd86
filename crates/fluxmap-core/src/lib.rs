//! Resolution of Flux GitOps repositories
//!
//! Crawls a repository for Flux `Kustomization` and source documents,
//! links each Kustomization to the ones its build directory pulls in,
//! binds it to its source and groups the layout into named clusters.
//!
//! ```ignore
//! use fluxmap_core::{Resolver, ResolverConfig};
//!
//! let config = ResolverConfig::load(&root, None)?;
//! let handle = Resolver::with_config(&root, config).spawn();
//! if handle.wait_ready() {
//!     let resolution = handle.join()?;
//! }
//! ```

pub mod clusters;
pub mod config;
pub mod context;
pub mod crawl;
pub mod decode;
pub mod error;
pub mod kustomize;
pub mod model;
pub mod order;
pub mod resolver;
pub mod sources;
pub mod substitute;

pub use clusters::{ClusterForest, ClusterTree};
pub use config::ResolverConfig;
pub use context::{LinkWarning, ResolutionContext};
pub use error::{Error, Result};
pub use model::{Classification, Manifest, Source, SourceRef};
pub use resolver::{ReadySignal, Resolution, Resolver, ResolverHandle, Selection};
