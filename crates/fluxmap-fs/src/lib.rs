//! Filesystem layer for fluxmap
//!
//! Provides normalized path handling, lenient read helpers and the
//! format-agnostic config loader shared by the resolver and the CLI.

pub mod config;
pub mod constants;
pub mod error;
pub mod io;
pub mod path;

pub use config::ConfigStore;
pub use constants::FluxPath;
pub use error::{Error, Result};
pub use path::NormalizedPath;
