//! Repository layouts seen in real fleets
//!
//! Each test builds a layout from scratch and checks the resolved tree.

use fluxmap_core::{Classification, Resolution, Resolver};
use fluxmap_test_utils::flux::{Kustomization, LayeringFile, config_map, helm_repository};
use fluxmap_test_utils::repo::TestRepo;
use pretty_assertions::assert_eq;

fn resolve(repo: &TestRepo) -> Resolution {
    Resolver::new(repo.root()).resolve().unwrap()
}

fn children(resolution: &Resolution, name: &str) -> Vec<String> {
    let index = resolution.find(name, None).unwrap();
    resolution.children_of(index).map(|m| m.name.clone()).collect()
}

// =============================================================================
// Substitution only reaches direct children
// =============================================================================

#[test]
fn substitution_applies_at_the_binding_step_only() {
    let repo = TestRepo::new();
    repo.kustomization(
        "clusters/prod/root.yaml",
        &Kustomization::new("root").path("./mid").substitute("ENV", "prod"),
    );
    repo.kustomization("mid/mid.yaml", &Kustomization::new("mid").path("./leaf/${ENV}"));
    repo.kustomization("leaf/prod/leaf.yaml", &Kustomization::new("leaf-${ENV}"));

    let resolution = resolve(&repo);
    let mid = resolution.find("mid", None).unwrap();
    assert_eq!(resolution.manifest(mid).spec_path.as_deref(), Some("./leaf/prod"));
    // mid declares no substitutions of its own, so its child keeps the token
    assert_eq!(children(&resolution, "mid"), vec!["leaf-${ENV}"]);
    assert_eq!(children(&resolution, "root"), vec!["mid"]);
}

// =============================================================================
// Infrastructure split into controllers and configs
// =============================================================================

#[test]
fn nested_layering_directories_are_followed() {
    let repo = TestRepo::new();
    repo.kustomization(
        "clusters/prod/infrastructure.yaml",
        &Kustomization::new("infrastructure").path("./infrastructure"),
    );
    repo.layering(
        "infrastructure",
        &LayeringFile::new().resource("controllers").resource("configs"),
    );
    repo.layering(
        "infrastructure/controllers",
        &LayeringFile::new().resource("cert-manager.yaml").resource("repositories.yaml"),
    );
    repo.kustomization(
        "infrastructure/controllers/cert-manager.yaml",
        &Kustomization::new("cert-manager").path("./infrastructure/cert-manager"),
    );
    repo.write(
        "infrastructure/controllers/repositories.yaml",
        &helm_repository("jetstack", None),
    );
    repo.layering("infrastructure/configs", &LayeringFile::new().resource("issuers.yaml"));
    repo.kustomization(
        "infrastructure/configs/issuers.yaml",
        &Kustomization::new("issuers").source("HelmRepository", "jetstack", None),
    );
    repo.layering("infrastructure/cert-manager", &LayeringFile::new().resource("release.yaml"));
    repo.write("infrastructure/cert-manager/release.yaml", &config_map("cert-manager"));

    let resolution = resolve(&repo);
    // the build directory walk reaches configs/ before controllers/
    assert_eq!(children(&resolution, "infrastructure"), vec!["issuers", "cert-manager"]);
    assert!(children(&resolution, "cert-manager").is_empty());

    let source = &resolution.sources()[0];
    assert_eq!(source.name, "jetstack");
    let owner = source.owner.map(|i| resolution.manifest(i).name.as_str());
    assert_eq!(owner, Some("infrastructure"));

    let issuers = resolution.find("issuers", None).unwrap();
    assert_eq!(resolution.selection(issuers).source.map(|s| s.name.as_str()), Some("jetstack"));
    assert!(resolution.warnings().is_empty());
}

// =============================================================================
// Clusters declared by a file in another cluster
// =============================================================================

#[test]
fn cluster_declared_in_another_becomes_its_child() {
    let repo = TestRepo::new();
    repo.kustomization("clusters/management/sync.yaml", &Kustomization::new("management"));
    repo.write("clusters/management/edge.yaml", &config_map("edge"));
    repo.kustomization("clusters/edge/sync.yaml", &Kustomization::new("edge"));
    repo.kustomization("clusters/lab/sync.yaml", &Kustomization::new("lab"));

    let resolution = resolve(&repo);
    let trees = resolution.clusters().to_tree();
    let names: Vec<&str> = trees.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["lab", "management"]);
    assert_eq!(trees[1].children[0].name, "edge");
    assert_eq!(trees[1].children[0].path, "clusters/edge");
}

// =============================================================================
// Overlays patching a shared base
// =============================================================================

#[test]
fn overlays_patch_a_shared_base() {
    let repo = TestRepo::new();
    repo.layering("apps/base", &LayeringFile::new().resource("podinfo.yaml"));
    repo.kustomization(
        "apps/base/podinfo.yaml",
        &Kustomization::new("podinfo").namespace("flux-system"),
    );
    for env in ["staging", "production"] {
        repo.kustomization(
            &format!("clusters/{env}/apps.yaml"),
            &Kustomization::new(&format!("apps-{env}")).path(&format!("./apps/{env}")),
        );
        repo.layering(
            &format!("apps/{env}"),
            &LayeringFile::new().resource("../base").patch("podinfo-patch.yaml"),
        );
        repo.kustomization(
            &format!("apps/{env}/podinfo-patch.yaml"),
            &Kustomization::new(&format!("podinfo-{env}")).namespace("flux-system"),
        );
    }

    let resolution = resolve(&repo);
    let class = |name: &str| resolution.manifest(resolution.find(name, None).unwrap()).classification;
    assert_eq!(class("podinfo"), Classification::Complete);
    assert_eq!(class("podinfo-staging"), Classification::Patch);
    assert_eq!(class("podinfo-production"), Classification::Patch);

    // both overlays reach the base; the first one linked is the parent
    assert_eq!(children(&resolution, "apps-production"), vec!["podinfo", "podinfo-production"]);
    assert_eq!(children(&resolution, "apps-staging"), vec!["podinfo", "podinfo-staging"]);
    let podinfo = resolution.find("podinfo", None).unwrap();
    assert_eq!(resolution.parent_of(podinfo).unwrap().name, "apps-production");

    let visible: Vec<&str> = resolution.visible().map(|m| m.name.as_str()).collect();
    assert_eq!(
        visible,
        vec!["apps-production", "apps-staging", "podinfo", "podinfo-production", "podinfo-staging"]
    );
}
