//! Cluster-naming heuristic over directory paths
//!
//! A directory below a `clusters` or `hub` segment names a cluster, so
//! `clusters/prod/hub/edge-1` yields the chain `prod` → `edge-1`. Reserved
//! names such as `flux-system` never name a cluster; when one follows a
//! marker the marker itself is used instead.

use fluxmap_fs::NormalizedPath;

use crate::config::ResolverConfig;

/// Directories under this segment hold shared bases, never clusters.
const BASES_SEGMENT: &str = "bases";

/// One cluster found on a directory path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterCandidate {
    pub name: String,
    pub path: NormalizedPath,
    pub rel_path: String,
}

/// Extracts cluster candidates from directory paths.
#[derive(Debug, Clone)]
pub struct ClusterMatcher {
    markers: Vec<String>,
    reserved: Vec<String>,
}

impl Default for ClusterMatcher {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl ClusterMatcher {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            markers: config.cluster_markers.clone(),
            reserved: config.reserved_names.clone(),
        }
    }

    /// Candidate chain for `dir`, outermost cluster first.
    ///
    /// Paths outside `root`, or with a hidden or `bases` segment, yield
    /// nothing.
    pub fn candidates(&self, root: &NormalizedPath, dir: &NormalizedPath) -> Vec<ClusterCandidate> {
        let Some(rel) = dir.relative_to(root) else {
            return Vec::new();
        };
        let segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        if segments
            .iter()
            .any(|s| s.starts_with('.') || *s == BASES_SEGMENT)
        {
            return Vec::new();
        }

        let mut chain = Vec::new();
        let mut i = 0;
        while i + 1 < segments.len() {
            if !self.is_marker(segments[i]) {
                i += 1;
                continue;
            }

            let next = segments[i + 1];
            let (name, last) = if self.is_reserved(next) {
                (segments[i], i)
            } else {
                (next, i + 1)
            };
            let rel_path = segments[..=last].join("/");
            chain.push(ClusterCandidate {
                name: name.to_string(),
                path: root.join(&rel_path),
                rel_path,
            });
            i += 2;
        }
        chain
    }

    fn is_marker(&self, segment: &str) -> bool {
        self.markers.iter().any(|m| m == segment)
    }

    fn is_reserved(&self, segment: &str) -> bool {
        self.reserved.iter().any(|r| r == segment)
    }
}
