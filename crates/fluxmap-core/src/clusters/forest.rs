//! Cluster hierarchy built from directory names

use fluxmap_fs::NormalizedPath;
use serde::Serialize;

use super::heuristic::ClusterCandidate;

/// A named cluster node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNode {
    pub name: String,
    /// Absolute directory the name was taken from
    pub path: NormalizedPath,
    pub rel_path: String,
    pub children: Vec<usize>,
    pub selected: bool,
}

/// Owned, serializable snapshot of one subtree, children sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClusterTree {
    pub name: String,
    pub path: String,
    pub selected: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ClusterTree>,
}

/// Arena of cluster nodes plus the ordered list of roots.
#[derive(Debug, Clone, Default)]
pub struct ClusterForest {
    nodes: Vec<ClusterNode>,
    roots: Vec<usize>,
}

impl ClusterForest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, index: usize) -> &ClusterNode {
        &self.nodes[index]
    }

    /// Root indices in display order.
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    /// Total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a candidate chain, creating every missing node along it.
    ///
    /// Inserting the same chain twice is a no-op.
    pub fn insert(&mut self, chain: &[ClusterCandidate]) {
        let Some((first, rest)) = chain.split_first() else {
            return;
        };

        let mut current = match self.find_root(&first.name) {
            Some(index) => index,
            None => {
                let index = self.push(first);
                self.roots.push(index);
                index
            }
        };

        for candidate in rest {
            current = match self.find_child(current, &candidate.name) {
                Some(index) => index,
                None => {
                    let index = self.push(candidate);
                    self.nodes[current].children.push(index);
                    index
                }
            };
        }
    }

    /// Nest roots that their peers declare through a `<name>.yaml` file.
    ///
    /// Root `j` moves under root `i` when `<root_i.path>/<root_j.name>.yaml`
    /// exists. Each root moves at most once, a root that has been moved is
    /// not considered as a parent afterwards, and the remaining roots are
    /// sorted by name.
    pub fn reparent(&mut self) {
        self.reparent_with(|marker| marker.is_file());
    }

    /// [`ClusterForest::reparent`] with an injectable existence check.
    pub fn reparent_with(&mut self, exists: impl Fn(&NormalizedPath) -> bool) {
        let mut slots: Vec<Option<usize>> = self.roots.iter().copied().map(Some).collect();

        for i in 0..slots.len() {
            let Some(parent) = slots[i] else { continue };
            for j in 0..slots.len() {
                if i == j {
                    continue;
                }
                let Some(child) = slots[j] else { continue };

                let marker = self.nodes[parent]
                    .path
                    .join(&format!("{}.yaml", self.nodes[child].name));
                if exists(&marker) {
                    tracing::debug!(
                        parent = %self.nodes[parent].name,
                        child = %self.nodes[child].name,
                        "Nesting cluster"
                    );
                    self.nodes[parent].children.push(child);
                    slots[j] = None;
                }
            }
        }

        self.roots = slots.into_iter().flatten().collect();
        let nodes = &self.nodes;
        self.roots.sort_by(|a, b| nodes[*a].name.cmp(&nodes[*b].name));
    }

    /// Children of `index` in insertion order.
    pub fn children(&self, index: usize) -> &[usize] {
        &self.nodes[index].children
    }

    /// Children of `index`, sorted by name.
    pub fn sorted_children(&self, index: usize) -> Vec<usize> {
        let mut children = self.nodes[index].children.clone();
        children.sort_by(|a, b| self.nodes[*a].name.cmp(&self.nodes[*b].name));
        children
    }

    /// Number of nodes below `index`.
    pub fn descendant_count(&self, index: usize) -> usize {
        self.nodes[index]
            .children
            .iter()
            .map(|&child| 1 + self.descendant_count(child))
            .sum()
    }

    /// Mark the nodes along `branch`, starting at a root.
    ///
    /// Returns `false` and leaves the forest untouched when the branch does
    /// not exist.
    pub fn select(&mut self, branch: &[&str]) -> bool {
        let Some((first, rest)) = branch.split_first() else {
            return false;
        };
        let Some(mut current) = self.find_root(first) else {
            return false;
        };

        let mut path = vec![current];
        for name in rest {
            match self.find_child(current, name) {
                Some(child) => {
                    current = child;
                    path.push(child);
                }
                None => return false,
            }
        }

        self.clear_selection();
        for index in path {
            self.nodes[index].selected = true;
        }
        true
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    /// Snapshot of the whole forest in display order.
    pub fn to_tree(&self) -> Vec<ClusterTree> {
        self.roots.iter().map(|&root| self.subtree(root)).collect()
    }

    fn subtree(&self, index: usize) -> ClusterTree {
        let node = &self.nodes[index];
        ClusterTree {
            name: node.name.clone(),
            path: node.rel_path.clone(),
            selected: node.selected,
            children: self
                .sorted_children(index)
                .into_iter()
                .map(|child| self.subtree(child))
                .collect(),
        }
    }

    fn push(&mut self, candidate: &ClusterCandidate) -> usize {
        let index = self.nodes.len();
        self.nodes.push(ClusterNode {
            name: candidate.name.clone(),
            path: candidate.path.clone(),
            rel_path: candidate.rel_path.clone(),
            children: Vec::new(),
            selected: false,
        });
        index
    }

    fn find_root(&self, name: &str) -> Option<usize> {
        self.roots
            .iter()
            .copied()
            .find(|&index| self.nodes[index].name == name)
    }

    fn find_child(&self, parent: usize, name: &str) -> Option<usize> {
        self.nodes[parent]
            .children
            .iter()
            .copied()
            .find(|&index| self.nodes[index].name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clusters::ClusterMatcher;

    fn forest_from(dirs: &[&str]) -> ClusterForest {
        let root = NormalizedPath::new("/repo");
        let matcher = ClusterMatcher::default();
        let mut forest = ClusterForest::new();
        for dir in dirs {
            forest.insert(&matcher.candidates(&root, &root.join(dir)));
        }
        forest
    }

    fn root_names(forest: &ClusterForest) -> Vec<&str> {
        forest
            .roots()
            .iter()
            .map(|&r| forest.node(r).name.as_str())
            .collect()
    }

    #[test]
    fn insert_creates_whole_chain() {
        let forest = forest_from(&["clusters/prod/hub/edge-1/hub/leaf"]);
        assert_eq!(forest.len(), 3);
        let prod = forest.roots()[0];
        assert_eq!(forest.descendant_count(prod), 2);
    }

    #[test]
    fn repeated_insert_is_idempotent() {
        let forest = forest_from(&[
            "clusters/prod",
            "clusters/prod/apps",
            "clusters/prod/hub/edge-1",
            "clusters/prod/hub/edge-1/apps",
        ]);
        assert_eq!(forest.len(), 2);
        assert_eq!(root_names(&forest), vec!["prod"]);
    }

    #[test]
    fn reparent_nests_declared_roots() {
        let mut forest = forest_from(&["clusters/staging", "clusters/prod", "clusters/dev"]);
        forest.reparent_with(|p| p.as_str() == "/repo/clusters/prod/dev.yaml");

        assert_eq!(root_names(&forest), vec!["prod", "staging"]);
        let prod = forest.roots()[0];
        let children: Vec<&str> = forest
            .sorted_children(prod)
            .into_iter()
            .map(|c| forest.node(c).name.as_str())
            .collect();
        assert_eq!(children, vec!["dev"]);
    }

    #[test]
    fn reparent_moves_each_root_once() {
        let mut forest = forest_from(&["clusters/a", "clusters/b", "clusters/c"]);
        // a declares b, b declares c, c declares a
        forest.reparent_with(|p| {
            matches!(
                p.as_str(),
                "/repo/clusters/a/b.yaml" | "/repo/clusters/b/c.yaml" | "/repo/clusters/c/a.yaml"
            )
        });

        // b moves under a, then a (with b) moves under c; b is never a parent
        assert_eq!(root_names(&forest), vec!["c"]);
        let c = forest.roots()[0];
        assert_eq!(forest.descendant_count(c), 2);
        for name in ["a", "b"] {
            let parents = (0..forest.len())
                .filter(|&i| forest.node(i).children.iter().any(|&k| forest.node(k).name == name))
                .count();
            assert_eq!(parents, 1, "{name} should have exactly one parent");
        }
    }

    #[test]
    fn reparent_is_idempotent() {
        let mut forest = forest_from(&["clusters/staging", "clusters/prod", "clusters/dev"]);
        let exists = |p: &NormalizedPath| p.as_str() == "/repo/clusters/staging/dev.yaml";
        forest.reparent_with(exists);
        let once = forest.to_tree();
        forest.reparent_with(exists);
        assert_eq!(forest.to_tree(), once);
    }

    #[test]
    fn select_marks_branch_and_replaces_previous_selection() {
        let mut forest = forest_from(&["clusters/prod/hub/edge-1", "clusters/dev"]);
        assert!(forest.select(&["prod", "edge-1"]));
        let tree = forest.to_tree();
        let prod = tree.iter().find(|t| t.name == "prod").unwrap();
        assert!(prod.selected);
        assert!(prod.children[0].selected);

        assert!(forest.select(&["dev"]));
        let tree = forest.to_tree();
        assert!(!tree.iter().find(|t| t.name == "prod").unwrap().selected);

        assert!(!forest.select(&["missing"]));
        assert!(forest.to_tree().iter().any(|t| t.selected));

        forest.clear_selection();
        assert!(forest.to_tree().iter().all(|t| !t.selected));
    }
}
