//! Linking, classification and source binding on hand-built layouts

use fluxmap_core::context::ResolutionContext;
use fluxmap_core::{Classification, Resolution, Resolver, ResolverConfig, crawl, sources};
use fluxmap_fs::NormalizedPath;
use fluxmap_test_utils::flux::{self, Kustomization, LayeringFile};
use fluxmap_test_utils::repo::TestRepo;
use pretty_assertions::assert_eq;

fn resolve(repo: &TestRepo) -> Resolution {
    Resolver::new(repo.root()).resolve().unwrap()
}

fn find<'a>(resolution: &'a Resolution, name: &str) -> (usize, &'a fluxmap_core::Manifest) {
    let index = resolution
        .manifests()
        .iter()
        .position(|m| m.name == name)
        .unwrap_or_else(|| panic!("no manifest named {name}"));
    (index, resolution.manifest(index))
}

fn child_names(resolution: &Resolution, name: &str) -> Vec<String> {
    let (index, _) = find(resolution, name);
    resolution.children_of(index).map(|m| m.name.clone()).collect()
}

/// No manifest can reach itself through children.
fn assert_acyclic(resolution: &Resolution) {
    for start in 0..resolution.manifests().len() {
        let mut stack = resolution.manifest(start).children.clone();
        let mut seen = std::collections::HashSet::new();
        while let Some(current) = stack.pop() {
            assert_ne!(current, start, "{} reaches itself", resolution.manifest(start).name);
            if seen.insert(current) {
                stack.extend(resolution.manifest(current).children.iter().copied());
            }
        }
    }
}

#[test]
fn self_inclusion_is_ignored() {
    let repo = TestRepo::new();
    repo.kustomization(
        "clusters/prod/flux-system/gotk-sync.yaml",
        &Kustomization::new("flux-system").path("./clusters/prod"),
    );
    repo.layering("clusters/prod/flux-system", &LayeringFile::new().resource("gotk-sync.yaml"));

    let resolution = resolve(&repo);
    assert!(child_names(&resolution, "flux-system").is_empty());
    assert_acyclic(&resolution);
}

#[test]
fn mutual_inclusion_keeps_first_edge_only() {
    let repo = TestRepo::new();
    repo.kustomization("a/a.yaml", &Kustomization::new("a").path("./b"));
    repo.kustomization("b/b.yaml", &Kustomization::new("b").path("./a"));

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "a"), vec!["b"]);
    assert!(child_names(&resolution, "b").is_empty());
    assert_acyclic(&resolution);
}

#[test]
fn longer_cycles_are_broken() {
    let repo = TestRepo::new();
    repo.kustomization("a/a.yaml", &Kustomization::new("a").path("./b"));
    repo.kustomization("b/b.yaml", &Kustomization::new("b").path("./c"));
    repo.kustomization("c/c.yaml", &Kustomization::new("c").path("./a"));

    let resolution = resolve(&repo);
    assert_acyclic(&resolution);
    assert_eq!(child_names(&resolution, "a"), vec!["b"]);
    assert_eq!(child_names(&resolution, "b"), vec!["c"]);
    assert!(child_names(&resolution, "c").is_empty());
}

#[test]
fn layering_file_cycles_terminate() {
    let repo = TestRepo::new();
    repo.kustomization("root.yaml", &Kustomization::new("root").path("./one"));
    repo.layering("one", &LayeringFile::new().resource("../two"));
    repo.layering("two", &LayeringFile::new().resource("../one").resource("leaf.yaml"));
    repo.kustomization("two/leaf.yaml", &Kustomization::new("leaf"));

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "root"), vec!["leaf"]);
}

#[test]
fn components_are_followed() {
    let repo = TestRepo::new();
    repo.kustomization("root.yaml", &Kustomization::new("root").path("./overlay"));
    repo.layering("overlay", &LayeringFile::new().component("../components/monitoring"));
    repo.layering("components/monitoring", &LayeringFile::new().resource("monitoring.yaml"));
    repo.kustomization("components/monitoring/monitoring.yaml", &Kustomization::new("monitoring"));

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "root"), vec!["monitoring"]);
}

#[test]
fn unresolvable_references_become_warnings() {
    let repo = TestRepo::new();
    repo.kustomization("root.yaml", &Kustomization::new("root").path("./overlay"));
    let escape = "../".repeat(64);
    repo.layering(
        "overlay",
        &LayeringFile::new()
            .resource("https://github.com/example/remote//deploy?ref=main")
            .resource("missing.yaml")
            .resource(&escape)
            .resource("present.yaml"),
    );
    repo.kustomization("overlay/present.yaml", &Kustomization::new("present"));

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "root"), vec!["present"]);

    let references: Vec<&str> = resolution
        .warnings()
        .iter()
        .map(|w| w.reference.as_str())
        .collect();
    assert_eq!(
        references,
        vec!["https://github.com/example/remote//deploy?ref=main", "missing.yaml", escape.as_str()]
    );
    assert!(resolution.warnings().iter().all(|w| w.manifest == "root"));
    assert!(
        resolution
            .warnings()
            .iter()
            .all(|w| w.layering_file.as_deref() == Some("overlay/kustomization.yaml"))
    );
}

#[test]
fn directory_without_layering_file_is_a_warning() {
    let repo = TestRepo::new();
    repo.kustomization("root.yaml", &Kustomization::new("root").path("./overlay"));
    repo.layering("overlay", &LayeringFile::new().resource("../plain"));
    repo.kustomization("plain/leaf.yaml", &Kustomization::new("leaf"));

    let resolution = resolve(&repo);
    assert!(child_names(&resolution, "root").is_empty());

    let warnings = resolution.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].reference, "../plain");
    assert_eq!(warnings[0].reason, "directory has no kustomization file");
    assert_eq!(warnings[0].layering_file.as_deref(), Some("overlay/kustomization.yaml"));
}

#[test]
fn invalid_build_path_names_no_layering_file() {
    let repo = TestRepo::new();
    let escape = format!("{}etc", "../".repeat(64));
    repo.kustomization("root.yaml", &Kustomization::new("root").path(&escape));

    let resolution = resolve(&repo);
    let warnings = resolution.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].manifest, "root");
    assert_eq!(warnings[0].reference, escape);
    assert_eq!(warnings[0].layering_file, None);
    assert!(warnings[0].reason.starts_with("invalid build path"));
}

#[test]
fn substitution_applies_to_child_name_and_path() {
    let repo = TestRepo::new();
    repo.kustomization(
        "clusters/prod/sync.yaml",
        &Kustomization::new("sync")
            .path("./clusters/prod")
            .substitute("CLUSTER", "prod"),
    );
    repo.kustomization(
        "clusters/prod/apps.yaml",
        &Kustomization::new("${CLUSTER}-apps").path("./apps/${CLUSTER}/${MISSING}"),
    );

    let resolution = resolve(&repo);
    let (_, apps) = find(&resolution, "prod-apps");
    assert_eq!(apps.spec_path.as_deref(), Some("./apps/prod/${MISSING}"));
}

#[test]
fn substitution_is_not_recursive() {
    let repo = TestRepo::new();
    repo.kustomization(
        "parent/parent.yaml",
        &Kustomization::new("parent")
            .path("./parent")
            .substitute("A", "${B}")
            .substitute("B", "expanded"),
    );
    repo.kustomization("parent/child.yaml", &Kustomization::new("child-${A}"));

    let resolution = resolve(&repo);
    assert!(resolution.manifests().iter().any(|m| m.name == "child-${B}"));
}

#[test]
fn rewritten_build_path_is_linked_even_when_child_comes_first() {
    let repo = TestRepo::new();
    // "a-apps.yaml" is walked before "z-sync.yaml"
    repo.kustomization("clusters/prod/a-apps.yaml", &Kustomization::new("apps").path("./apps/${ENV}"));
    repo.kustomization(
        "clusters/prod/z-sync.yaml",
        &Kustomization::new("sync").path("./clusters/prod").substitute("ENV", "prod"),
    );
    repo.kustomization("apps/prod/podinfo.yaml", &Kustomization::new("podinfo"));

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "apps"), vec!["podinfo"]);
}

#[test]
fn patch_classification_covers_strategic_merge() {
    let repo = TestRepo::new();
    repo.layering(
        "overlay",
        &LayeringFile::new().resource("app.yaml").strategic_merge("merge.yaml"),
    );
    repo.kustomization("overlay/app.yaml", &Kustomization::new("app"));
    repo.kustomization("overlay/merge.yaml", &Kustomization::new("merge"));
    repo.kustomization("overlay/stray.yaml", &Kustomization::new("stray"));

    let resolution = resolve(&repo);
    assert_eq!(find(&resolution, "app").1.classification, Classification::Complete);
    assert_eq!(find(&resolution, "merge").1.classification, Classification::Patch);
    assert_eq!(find(&resolution, "stray").1.classification, Classification::Base);
}

#[test]
fn short_layering_file_name_is_recognized() {
    let repo = TestRepo::new();
    repo.write(
        "overlay/kustomization.yml",
        &LayeringFile::new().resource("app.yaml").to_yaml(),
    );
    repo.kustomization("overlay/app.yaml", &Kustomization::new("app"));
    repo.kustomization("overlay/other.yaml", &Kustomization::new("other"));

    let resolution = resolve(&repo);
    assert_eq!(find(&resolution, "app").1.classification, Classification::Complete);
    assert_eq!(find(&resolution, "other").1.classification, Classification::Base);
}

#[test]
fn unparsable_layering_file_counts_as_absent() {
    let repo = TestRepo::new();
    repo.write("overlay/kustomization.yaml", "resources: [unclosed\n");
    repo.kustomization("overlay/app.yaml", &Kustomization::new("app"));

    let resolution = resolve(&repo);
    assert_eq!(find(&resolution, "app").1.classification, Classification::Complete);
}

#[test]
fn decode_keeps_documents_before_malformed_one() {
    let repo = TestRepo::new();
    let content = format!(
        "{}---\nkey: [unclosed\n---\n{}",
        Kustomization::new("kept").to_yaml(),
        Kustomization::new("lost").to_yaml()
    );
    repo.write("mixed.yaml", &content);

    let resolution = resolve(&repo);
    let names: Vec<&str> = resolution.manifests().iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["kept"]);
}

#[test]
fn unrelated_documents_do_not_disturb_decoding() {
    let repo = TestRepo::new();
    repo.write(
        "mixed.yaml",
        &flux::stream(&[
            flux::config_map("settings"),
            Kustomization::new("app").to_yaml(),
            flux::helm_repository("charts", Some("flux-system")),
        ]),
    );
    repo.write("notes.txt", "apiVersion: kustomize.toolkit.fluxcd.io/v1\n");

    let resolution = resolve(&repo);
    assert_eq!(resolution.manifests().len(), 1);
    assert_eq!(resolution.sources().len(), 1);
    assert_eq!(resolution.sources()[0].kind, "HelmRepository");
}

#[test]
fn source_reference_honours_namespaces() {
    let repo = TestRepo::new();
    repo.write(
        "sources.yaml",
        &flux::stream(&[
            flux::git_repository("shared", Some("flux-system")),
            flux::git_repository("shared", Some("team-a")),
        ]),
    );
    repo.kustomization(
        "defaulted.yaml",
        &Kustomization::new("defaulted").namespace("team-a").git_source("shared"),
    );
    repo.kustomization(
        "explicit.yaml",
        &Kustomization::new("explicit")
            .namespace("team-a")
            .source("GitRepository", "shared", Some("flux-system")),
    );
    repo.kustomization(
        "wrong-kind.yaml",
        &Kustomization::new("wrong-kind").source("OCIRepository", "shared", Some("flux-system")),
    );

    let resolution = resolve(&repo);
    let source_ns = |name: &str| {
        let (index, _) = find(&resolution, name);
        resolution
            .selection(index)
            .source
            .and_then(|s| s.namespace.clone())
    };
    assert_eq!(source_ns("defaulted").as_deref(), Some("team-a"));
    assert_eq!(source_ns("explicit").as_deref(), Some("flux-system"));
    assert_eq!(source_ns("wrong-kind"), None);
}

#[test]
fn source_lists_same_named_manifests_once() {
    let repo = TestRepo::new();
    repo.write("source.yaml", &flux::git_repository("repo", None));
    repo.kustomization("one/app.yaml", &Kustomization::new("app").git_source("repo"));
    repo.kustomization("two/app.yaml", &Kustomization::new("app").git_source("repo"));

    let resolution = resolve(&repo);
    assert_eq!(resolution.manifests_of_source(0).count(), 1);
    assert!(resolution.manifests().iter().all(|m| m.source == Some(0)));
}

#[test]
fn binding_sources_twice_changes_nothing() {
    let repo = TestRepo::fleet();
    let root = fluxmap_fs::io::canonicalize(&NormalizedPath::new(repo.root())).unwrap();
    let mut ctx = ResolutionContext::new(root, ResolverConfig::default());
    crawl::crawl(&mut ctx).unwrap();

    sources::bind_sources(&mut ctx);
    let first: Vec<Vec<usize>> = ctx.sources.iter().map(|s| s.children.clone()).collect();
    sources::bind_sources(&mut ctx);
    let second: Vec<Vec<usize>> = ctx.sources.iter().map(|s| s.children.clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn names_and_namespaces_are_trimmed() {
    let repo = TestRepo::new();
    repo.write(
        "app.yaml",
        "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: \"  app \"\n  namespace: \" apps\"\n",
    );
    let resolution = resolve(&repo);
    let manifest = &resolution.manifests()[0];
    assert_eq!(manifest.name, "app");
    assert_eq!(manifest.namespace.as_deref(), Some("apps"));
}

#[cfg(unix)]
#[test]
fn symlink_loops_do_not_hang() {
    let repo = TestRepo::new();
    repo.kustomization("apps/app.yaml", &Kustomization::new("app").path("./apps"));
    repo.kustomization("root.yaml", &Kustomization::new("root").path("./apps"));
    std::os::unix::fs::symlink(repo.root().join("apps"), repo.root().join("apps/loop")).unwrap();

    let resolution = resolve(&repo);
    assert_eq!(child_names(&resolution, "root"), vec!["app"]);
}
