//! Shared test utilities for the fluxmap workspace.
//!
//! A dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`flux`]: YAML document builders for Flux and Kustomize resources
//! - [`repo`]: [`repo::TestRepo`] builder for Flux repository layouts

pub mod flux;
pub mod repo;
