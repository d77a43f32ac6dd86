//! Read helpers used by the crawler and the content renderers

use std::fs;

use crate::{Error, NormalizedPath, Result};

/// Read text content from a file.
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native_path = path.to_native();
    fs::read_to_string(&native_path).map_err(|e| Error::io(&native_path, e))
}

/// Read text content, returning `None` for anything unreadable.
///
/// The crawl skips files it cannot read, so callers there only need to
/// know whether there is something to decode.
pub fn read_text_lenient(path: &NormalizedPath) -> Option<String> {
    match read_text(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!(path = %path, error = %e, "Skipping unreadable file");
            None
        }
    }
}

/// Canonicalize a directory the way the rest of the workspace compares
/// paths: symlinks resolved, no `\\?\` prefix on Windows, forward slashes.
pub fn canonicalize(path: &NormalizedPath) -> Result<NormalizedPath> {
    let native_path = path.to_native();
    dunce::canonicalize(&native_path)
        .map(NormalizedPath::new)
        .map_err(|e| Error::io(&native_path, e))
}
