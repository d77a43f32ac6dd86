//! Rendering collaborators for fluxmap
//!
//! The resolution core never touches external tools. This crate holds the
//! pieces that do: a field filter over multi-document YAML streams, a
//! `kustomize build` executor, the `flux build`/`flux diff` runner and the
//! [`ContentRenderer`] that shows what a manifest actually deploys.

pub mod content;
pub mod error;
pub mod exec;
pub mod filter;
pub mod flux;
pub mod kustomize;

pub use content::ContentRenderer;
pub use error::{Error, Result};
pub use filter::{filter_git_repository, filter_kustomization, select_documents};
pub use flux::{FluxAction, FluxCli};
pub use kustomize::{KustomizeBuilder, KustomizeCli};
