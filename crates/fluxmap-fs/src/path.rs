//! Normalized path handling for cross-platform compatibility

use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// A path normalized to use forward slashes internally.
///
/// Manifests, sources and layering files are matched by exact path
/// equality, so every path that takes part in a comparison goes through
/// [`NormalizedPath::clean`] (directly or via [`NormalizedPath::join`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedPath {
    /// Internal representation always uses forward slashes
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    ///
    /// Converts backslashes to forward slashes for internal storage.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path_str = path.as_ref().to_string_lossy();
        let normalized = path_str.replace('\\', "/");
        Self { inner: normalized }
    }

    /// Get the internal normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        PathBuf::from(&self.inner)
    }

    /// Join this path with a segment and clean the result.
    ///
    /// A segment starting with `/` is still treated as relative to `self`;
    /// Flux resolves `spec.path` against the source root the same way.
    pub fn join(&self, segment: &str) -> Self {
        let segment_normalized = segment.replace('\\', "/");
        let joined = if self.inner.is_empty() {
            segment_normalized
        } else if self.inner.ends_with('/') {
            format!("{}{}", self.inner, segment_normalized)
        } else {
            format!("{}/{}", self.inner, segment_normalized)
        };
        Self { inner: joined }.clean()
    }

    /// Lexically normalize the path.
    ///
    /// Collapses repeated separators, drops `.` segments and resolves `..`
    /// against preceding segments. A leading `//` (network path) is kept.
    /// `..` segments that would climb above an absolute root are dropped;
    /// use [`NormalizedPath::resolve`] to reject those instead.
    pub fn clean(&self) -> Self {
        let (prefix, rest) = self.split_prefix();
        let mut parts: Vec<&str> = Vec::new();
        for segment in rest.split('/') {
            match segment {
                "" | "." => {}
                ".." => match parts.last() {
                    Some(&last) if last != ".." => {
                        parts.pop();
                    }
                    _ if !prefix.is_empty() => {}
                    _ => parts.push(".."),
                },
                other => parts.push(other),
            }
        }

        let body = parts.join("/");
        let inner = match (prefix.is_empty(), body.is_empty()) {
            (true, true) => ".".to_string(),
            (false, true) => prefix.to_string(),
            _ => format!("{prefix}{body}"),
        };
        Self { inner }
    }

    /// Resolve a relative reference against this directory.
    ///
    /// Unlike [`NormalizedPath::join`] this rejects references that cannot
    /// be turned into a local absolute path: empty references, remote URLs
    /// and `..` chains that climb above the filesystem root.
    pub fn resolve(&self, reference: &str) -> Result<Self> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(Error::invalid_path(reference, "empty reference"));
        }
        if reference.contains("://") || reference.starts_with("git@") {
            return Err(Error::invalid_path(reference, "remote reference"));
        }

        let (prefix, _) = self.split_prefix();
        let mut depth = self.segments().count() as isize;
        for segment in reference.replace('\\', "/").split('/') {
            match segment {
                "" | "." => {}
                ".." => depth -= 1,
                _ => depth += 1,
            }
            if depth < 0 && !prefix.is_empty() {
                return Err(Error::invalid_path(
                    format!("{}/{}", self.inner, reference),
                    "escapes the filesystem root",
                ));
            }
        }
        Ok(self.join(reference))
    }

    /// Get the parent directory.
    pub fn parent(&self) -> Option<Self> {
        let trimmed = self.inner.trim_end_matches('/');
        match trimmed.rfind('/') {
            Some(idx) if idx > 0 => Some(Self {
                inner: trimmed[..idx].to_string(),
            }),
            Some(0) => Some(Self {
                inner: "/".to_string(),
            }),
            _ => None,
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        let trimmed = self.inner.trim_end_matches('/');
        trimmed.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Iterate over the non-empty segments of the path.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty() && *s != ".")
    }

    /// Express this path relative to `base`.
    ///
    /// Returns `None` when `self` is not `base` or below it. The path equal
    /// to `base` is returned as the empty string.
    pub fn relative_to(&self, base: &NormalizedPath) -> Option<String> {
        let base = base.inner.trim_end_matches('/');
        if self.inner == base {
            return Some(String::new());
        }
        let rest = self.inner.strip_prefix(base)?;
        if base.is_empty() {
            return Some(rest.trim_start_matches('/').to_string());
        }
        rest.strip_prefix('/').map(str::to_string)
    }

    /// Whether the path is absolute (`/…`, `//…` or `C:/…`).
    pub fn is_absolute(&self) -> bool {
        !self.split_prefix().0.is_empty()
    }

    /// Check if this path exists on the filesystem.
    pub fn exists(&self) -> bool {
        self.to_native().exists()
    }

    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        self.to_native().is_dir()
    }

    /// Check if this is a file.
    pub fn is_file(&self) -> bool {
        self.to_native().is_file()
    }

    /// Get the extension if present.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 {
                None
            } else {
                Some(&name[idx + 1..])
            }
        })
    }

    /// Whether the file carries a `.yaml`/`.yml` extension (any case).
    pub fn is_yaml(&self) -> bool {
        self.extension()
            .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
            .unwrap_or(false)
    }

    fn split_prefix(&self) -> (&str, &str) {
        let s = self.inner.as_str();
        if s.starts_with("//") && !s.starts_with("///") {
            return ("//", &s[2..]);
        }
        if s.starts_with('/') {
            return ("/", &s[1..]);
        }
        let bytes = s.as_bytes();
        if bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'/'
        {
            return (&s[..3], &s[3..]);
        }
        ("", s)
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl serde::Serialize for NormalizedPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.inner)
    }
}
