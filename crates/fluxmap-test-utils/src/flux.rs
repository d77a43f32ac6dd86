//! YAML document builders for Flux and Kustomize resources.

/// Builder for a Flux `Kustomization` document.
///
/// # Example
///
/// ```rust
/// use fluxmap_test_utils::flux::Kustomization;
///
/// let yaml = Kustomization::new("apps")
///     .namespace("flux-system")
///     .path("./apps/${ENV}")
///     .git_source("flux-system")
///     .substitute("ENV", "prod")
///     .to_yaml();
/// assert!(yaml.contains("kind: Kustomization"));
/// ```
#[derive(Debug, Clone)]
pub struct Kustomization {
    name: String,
    namespace: Option<String>,
    path: Option<String>,
    source: Option<(String, String, Option<String>)>,
    substitute: Vec<(String, String)>,
}

impl Kustomization {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: None,
            path: None,
            source: None,
            substitute: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: &str) -> Self {
        self.namespace = Some(namespace.to_string());
        self
    }

    /// `spec.path`
    pub fn path(mut self, path: &str) -> Self {
        self.path = Some(path.to_string());
        self
    }

    /// `spec.sourceRef` to a `GitRepository` in the manifest's namespace.
    pub fn git_source(self, name: &str) -> Self {
        self.source("GitRepository", name, None)
    }

    pub fn source(mut self, kind: &str, name: &str, namespace: Option<&str>) -> Self {
        self.source = Some((kind.to_string(), name.to_string(), namespace.map(str::to_string)));
        self
    }

    /// Add a `spec.postBuild.substitute` entry.
    pub fn substitute(mut self, key: &str, value: &str) -> Self {
        self.substitute.push((key.to_string(), value.to_string()));
        self
    }

    pub fn to_yaml(&self) -> String {
        let mut yaml = String::from("apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\n");
        yaml.push_str(&metadata(&self.name, self.namespace.as_deref()));
        yaml.push_str("spec:\n  interval: 10m\n  prune: true\n");
        if let Some(path) = &self.path {
            yaml.push_str(&format!("  path: \"{path}\"\n"));
        }
        if let Some((kind, name, namespace)) = &self.source {
            yaml.push_str(&format!("  sourceRef:\n    kind: {kind}\n    name: {name}\n"));
            if let Some(namespace) = namespace {
                yaml.push_str(&format!("    namespace: {namespace}\n"));
            }
        }
        if !self.substitute.is_empty() {
            yaml.push_str("  postBuild:\n    substitute:\n");
            for (key, value) in &self.substitute {
                yaml.push_str(&format!("      {key}: \"{value}\"\n"));
            }
        }
        yaml
    }
}

/// A Flux `GitRepository` document.
pub fn git_repository(name: &str, namespace: Option<&str>) -> String {
    source_document("GitRepository", name, namespace, "  url: https://example.com/fleet.git\n  ref:\n    branch: main\n")
}

/// A Flux `HelmRepository` document.
pub fn helm_repository(name: &str, namespace: Option<&str>) -> String {
    source_document("HelmRepository", name, namespace, "  url: https://charts.example.com\n")
}

/// A plain Kubernetes `ConfigMap` document.
pub fn config_map(name: &str) -> String {
    format!("apiVersion: v1\nkind: ConfigMap\n{}data:\n  key: value\n", metadata(name, None))
}

/// A Kustomize layering file.
///
/// # Example
///
/// ```rust
/// use fluxmap_test_utils::flux::LayeringFile;
///
/// let yaml = LayeringFile::new().resource("app.yaml").patch("patch.yaml").to_yaml();
/// assert!(yaml.contains("- app.yaml"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct LayeringFile {
    resources: Vec<String>,
    components: Vec<String>,
    patches: Vec<String>,
    strategic_merge: Vec<String>,
}

impl LayeringFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resource(mut self, reference: &str) -> Self {
        self.resources.push(reference.to_string());
        self
    }

    pub fn component(mut self, reference: &str) -> Self {
        self.components.push(reference.to_string());
        self
    }

    /// A `patches` entry with a `path`.
    pub fn patch(mut self, path: &str) -> Self {
        self.patches.push(path.to_string());
        self
    }

    pub fn strategic_merge(mut self, path: &str) -> Self {
        self.strategic_merge.push(path.to_string());
        self
    }

    pub fn to_yaml(&self) -> String {
        let mut yaml = String::from("apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\n");
        list(&mut yaml, "resources", &self.resources);
        list(&mut yaml, "components", &self.components);
        if !self.patches.is_empty() {
            yaml.push_str("patches:\n");
            for path in &self.patches {
                yaml.push_str(&format!("  - path: {path}\n    target:\n      kind: Kustomization\n"));
            }
        }
        list(&mut yaml, "patchesStrategicMerge", &self.strategic_merge);
        yaml
    }
}

/// Join documents into one multi-document stream.
pub fn stream(documents: &[String]) -> String {
    documents.join("---\n")
}

fn source_document(kind: &str, name: &str, namespace: Option<&str>, spec: &str) -> String {
    format!(
        "apiVersion: source.toolkit.fluxcd.io/v1\nkind: {kind}\n{}spec:\n  interval: 1m\n{spec}",
        metadata(name, namespace)
    )
}

fn metadata(name: &str, namespace: Option<&str>) -> String {
    match namespace {
        Some(namespace) => format!("metadata:\n  name: {name}\n  namespace: {namespace}\n"),
        None => format!("metadata:\n  name: {name}\n"),
    }
}

fn list(yaml: &mut String, key: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    yaml.push_str(&format!("{key}:\n"));
    for item in items {
        yaml.push_str(&format!("  - {item}\n"));
    }
}
