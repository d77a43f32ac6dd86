//! Cluster discovery from repository layout

mod forest;
mod heuristic;

pub use forest::{ClusterForest, ClusterNode, ClusterTree};
pub use heuristic::{ClusterCandidate, ClusterMatcher};
