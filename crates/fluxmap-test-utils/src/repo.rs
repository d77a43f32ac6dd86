//! [`TestRepo`] builder for Flux repository layouts.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::flux::{Kustomization, LayeringFile};

/// Path to the workspace `test-fixtures/repos` directory.
pub fn fixtures_dir() -> PathBuf {
    // crates/fluxmap-test-utils -> ../../test-fixtures/repos
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../test-fixtures/repos")
}

/// A temporary repository directory with helpers for writing Flux
/// resources and asserting on the tree.
///
/// # Example
///
/// ```rust,no_run
/// use fluxmap_test_utils::flux::{Kustomization, LayeringFile};
/// use fluxmap_test_utils::repo::TestRepo;
///
/// let repo = TestRepo::new();
/// repo.kustomization(
///     "clusters/prod/flux-system/gotk-sync.yaml",
///     &Kustomization::new("flux-system").path("./clusters/prod"),
/// );
/// repo.layering("clusters/prod/flux-system", &LayeringFile::new().resource("gotk-sync.yaml"));
/// repo.assert_file_exists("clusters/prod/flux-system/kustomization.yaml");
/// ```
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
        }
    }

    /// Copy `test-fixtures/repos/<name>` into a fresh temporary directory.
    pub fn from_fixture(name: &str) -> Self {
        let repo = Self::new();
        let source = fixtures_dir().join(name);
        assert!(source.is_dir(), "Unknown fixture: {}", source.display());
        copy_tree(&source, repo.root());
        repo
    }

    /// The `fleet-infra` fixture: three clusters, nested overlays and a
    /// substituted build path.
    pub fn fleet() -> Self {
        Self::from_fixture("fleet-infra")
    }

    /// Return the root path of the temporary directory.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Write `content` to `path` (relative to the root), creating parents.
    pub fn write(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.root().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&full_path, content).unwrap();
        full_path
    }

    /// Create an empty directory (relative to the root).
    pub fn mkdir(&self, path: &str) -> PathBuf {
        let full_path = self.root().join(path);
        fs::create_dir_all(&full_path).unwrap();
        full_path
    }

    /// Write a Flux `Kustomization` document to `path`.
    pub fn kustomization(&self, path: &str, kustomization: &Kustomization) -> PathBuf {
        self.write(path, &kustomization.to_yaml())
    }

    /// Write `kustomization.yaml` into `dir`.
    pub fn layering(&self, dir: &str, layering: &LayeringFile) -> PathBuf {
        let path = if dir.is_empty() {
            "kustomization.yaml".to_string()
        } else {
            format!("{dir}/kustomization.yaml")
        };
        self.write(&path, &layering.to_yaml())
    }

    /// Remove a file (relative to the root).
    pub fn remove(&self, path: &str) {
        fs::remove_file(self.root().join(path)).unwrap();
    }

    /// Assert that `path` (relative to the repo root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_file_exists(&self, path: &str) {
        let full_path = self.root().join(path);
        assert!(
            full_path.exists(),
            "Expected file to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the file at `path` (relative to root) contains `content`.
    ///
    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, path: &str, content: &str) {
        let full_path = self.root().join(path);
        let file_content = fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()));
        assert!(
            file_content.contains(content),
            "File {} does not contain expected content.\nExpected: {}\nActual: {}",
            full_path.display(),
            content,
            file_content
        );
    }
}

fn copy_tree(from: &Path, to: &Path) {
    fs::create_dir_all(to).unwrap();
    for entry in fs::read_dir(from).unwrap() {
        let entry = entry.unwrap();
        let target = to.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            fs::copy(entry.path(), &target).unwrap();
        }
    }
}
