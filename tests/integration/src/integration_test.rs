//! End-to-end test for the whole pipeline
//!
//! crawl -> link -> bind sources -> cluster forest -> ordering -> views,
//! then on-demand rendering of the selected manifest.

use fluxmap_core::{Classification, Resolver, ResolverConfig};
use fluxmap_fs::NormalizedPath;
use fluxmap_render::{ContentRenderer, KustomizeBuilder, Result as RenderResult};
use fluxmap_test_utils::flux::{Kustomization, LayeringFile, git_repository};
use fluxmap_test_utils::repo::TestRepo;
use pretty_assertions::assert_eq;

/// The smallest repository with an overlay, a base and a cluster.
fn overlay_repo() -> TestRepo {
    let repo = TestRepo::new();
    repo.layering("apps/base", &LayeringFile::new().resource("deploy.yaml"));
    repo.kustomization(
        "apps/base/deploy.yaml",
        &Kustomization::new("app").namespace("default"),
    );
    repo.kustomization(
        "clusters/prod/apps.yaml",
        &Kustomization::new("apps")
            .path("apps/overlay")
            .substitute("ENV", "prod"),
    );
    repo.layering("apps/overlay", &LayeringFile::new().resource("../base"));
    repo
}

#[test]
fn overlay_resolves_to_base_child() {
    let repo = overlay_repo();
    let resolution = Resolver::new(repo.root()).resolve().unwrap();

    let app = resolution.find("app", Some("default")).unwrap();
    let apps = resolution.find("apps", None).unwrap();
    assert_eq!(resolution.manifest(app).classification, Classification::Complete);
    assert_eq!(resolution.manifest(apps).classification, Classification::Complete);
    assert_eq!(resolution.manifest(app).parent, Some(apps));
    assert_eq!(resolution.manifest(apps).children, vec![app]);

    let roots = resolution.clusters().to_tree();
    assert_eq!(roots.len(), 1);
    assert_eq!(roots[0].name, "prod");
    assert_eq!(roots[0].path, "clusters/prod");

    // most children first
    let visible: Vec<&str> = resolution.visible().map(|m| m.name.as_str()).collect();
    assert_eq!(visible, vec!["apps", "app"]);
    assert_eq!(resolution.selected().unwrap().manifest.name, "apps");
}

#[test]
fn background_resolution_matches_foreground() {
    let repo = overlay_repo();
    let foreground = Resolver::new(repo.root()).resolve().unwrap();

    let handle = Resolver::new(repo.root()).spawn();
    assert!(handle.wait_ready());
    let background = handle.join().unwrap();

    let names = |r: &fluxmap_core::Resolution| {
        r.visible().map(|m| m.name.clone()).collect::<Vec<_>>()
    };
    assert_eq!(names(&background), names(&foreground));
}

#[test]
fn repository_settings_file_is_honoured() {
    let repo = TestRepo::new();
    repo.write(
        ".fluxmap.toml",
        "cluster_markers = [\"environments\"]\nworkers = 2\n",
    );
    repo.kustomization(
        "environments/staging/sync.yaml",
        &Kustomization::new("staging").path("./apps"),
    );
    repo.kustomization("clusters/ignored/sync.yaml", &Kustomization::new("ignored"));

    let root = NormalizedPath::new(repo.root());
    let config = ResolverConfig::load(&root, None).unwrap();
    assert_eq!(config.workers, 2);

    let resolution = Resolver::with_config(repo.root(), config).resolve().unwrap();
    let names: Vec<String> = resolution.clusters().to_tree().into_iter().map(|t| t.name).collect();
    assert_eq!(names, vec!["staging"]);
}

#[test]
fn explicit_settings_file_changes_api_group() {
    let repo = TestRepo::new();
    repo.write(
        "settings.yaml",
        "kustomization_api: kustomize.example.io\n",
    );
    repo.write(
        "clusters/prod/custom.yaml",
        "apiVersion: kustomize.example.io/v1\nkind: Kustomization\nmetadata:\n  name: custom\n",
    );
    repo.kustomization("clusters/prod/flux.yaml", &Kustomization::new("flux"));

    let root = NormalizedPath::new(repo.root());
    let explicit = root.join("settings.yaml");
    let config = ResolverConfig::load(&root, Some(&explicit)).unwrap();
    let resolution = Resolver::with_config(repo.root(), config).resolve().unwrap();

    let names: Vec<&str> = resolution.manifests().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["custom"]);
}

/// Stands in for `kustomize build`: concatenates the YAML files of a directory.
struct ConcatBuilder;

impl KustomizeBuilder for ConcatBuilder {
    fn build(&self, dir: &NormalizedPath) -> RenderResult<String> {
        let mut entries: Vec<_> = std::fs::read_dir(dir.to_native())?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "yaml"))
            .filter(|p| !p.ends_with("kustomization.yaml"))
            .collect();
        entries.sort();
        let documents = entries
            .iter()
            .map(std::fs::read_to_string)
            .collect::<std::io::Result<Vec<_>>>()?;
        Ok(documents.join("---\n"))
    }
}

#[test]
fn selected_manifest_renders_through_collaborators() {
    let repo = TestRepo::new();
    repo.write(
        "clusters/prod/flux-system/gotk-sync.yaml",
        &format!(
            "{}---\n{}",
            git_repository("flux-system", Some("flux-system")),
            Kustomization::new("flux-system")
                .namespace("flux-system")
                .path("./clusters/prod")
                .git_source("flux-system")
                .to_yaml()
        ),
    );
    repo.layering(
        "clusters/prod/apps",
        &LayeringFile::new().resource("apps.yaml").patch("apps-patch.yaml"),
    );
    repo.kustomization(
        "clusters/prod/apps/apps.yaml",
        &Kustomization::new("apps").namespace("flux-system").path("./apps"),
    );
    repo.kustomization(
        "clusters/prod/apps/apps-patch.yaml",
        &Kustomization::new("apps-patched").namespace("flux-system"),
    );

    let mut resolution = Resolver::new(repo.root()).resolve().unwrap();
    let renderer = ContentRenderer::new(ConcatBuilder);

    assert!(resolution.select("apps-patched", Some("flux-system")));
    let selected = resolution.selected().unwrap();
    assert_eq!(selected.manifest.classification, Classification::Patch);
    let rendered = renderer.manifest_content(selected.manifest).unwrap();
    assert!(rendered.contains("name: apps-patched"));
    assert!(!rendered.contains("name: apps\n"));

    assert!(resolution.select("flux-system", None));
    let selected = resolution.selected().unwrap();
    let source = selected.source.unwrap();
    assert_eq!(source.kind, "GitRepository");
    let raw = renderer.source_content(source).unwrap();
    assert!(raw.contains("kind: Kustomization"));
    assert!(raw.contains("url: https://example.com/fleet.git"));
}
