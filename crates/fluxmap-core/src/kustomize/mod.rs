//! Kustomize layering files and manifest linking

mod layering;
mod linker;

pub use layering::{LayeringFile, classify_manifest};
pub use linker::{link_all, link_manifest};
