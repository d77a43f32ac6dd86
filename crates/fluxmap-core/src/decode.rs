//! Multi-document YAML decoding into tagged Flux documents
//!
//! Each document is read as a generic YAML value first and only then
//! decoded into the typed shape its API group calls for, so arbitrary
//! Kubernetes objects sharing a file with Flux resources never break the
//! decode of their neighbours.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::Value;

use crate::config::ResolverConfig;
use crate::model::SourceRef;

/// Kind carried by every document of the Kustomization API group.
pub const KUSTOMIZATION_KIND: &str = "Kustomization";

/// One decoded YAML document.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Manifest(ManifestDoc),
    Source(SourceDoc),
    Unrecognized,
}

/// Fields of a Flux Kustomization the resolver cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestDoc {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
    pub spec_path: Option<String>,
    pub source_ref: Option<SourceRef>,
    pub substitutions: Option<BTreeMap<String, String>>,
}

/// Fields of a Flux source the resolver cares about.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceDoc {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetadata {
    #[serde(default)]
    name: String,
    namespace: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    api_version: String,
    kind: String,
    #[serde(default)]
    metadata: RawMetadata,
    #[serde(default)]
    spec: RawSpec,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSpec {
    path: Option<String>,
    source_ref: Option<RawSourceRef>,
    post_build: Option<RawPostBuild>,
}

#[derive(Debug, Deserialize)]
struct RawSourceRef {
    #[serde(default)]
    kind: String,
    #[serde(default)]
    name: String,
    namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPostBuild {
    #[serde(default)]
    substitute: BTreeMap<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSource {
    api_version: String,
    kind: String,
    #[serde(default)]
    metadata: RawMetadata,
}

/// Classifies documents by API group.
#[derive(Debug, Clone)]
pub struct Decoder {
    kustomization_api: String,
    source_api: String,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::from_config(&ResolverConfig::default())
    }
}

impl Decoder {
    pub fn from_config(config: &ResolverConfig) -> Self {
        Self {
            kustomization_api: config.kustomization_api.clone(),
            source_api: config.source_api.clone(),
        }
    }

    /// Decode every document of a YAML stream.
    ///
    /// Decoding stops at the first malformed document; documents before
    /// it are kept.
    pub fn decode_stream(&self, content: &str) -> Vec<Document> {
        let mut documents = Vec::new();
        for document in serde_yaml::Deserializer::from_str(content) {
            match Value::deserialize(document) {
                Ok(value) => documents.push(self.classify(value)),
                Err(e) => {
                    tracing::debug!(error = %e, "Stopping at malformed YAML document");
                    break;
                }
            }
        }
        documents
    }

    /// Classify a single YAML value.
    pub fn classify(&self, value: Value) -> Document {
        let Some(group) = api_group(&value) else {
            return Document::Unrecognized;
        };

        if group == self.kustomization_api {
            match serde_yaml::from_value::<RawManifest>(value) {
                Ok(raw) if raw.kind == KUSTOMIZATION_KIND => Document::Manifest(raw.into()),
                Ok(_) => Document::Unrecognized,
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring undecodable Kustomization");
                    Document::Unrecognized
                }
            }
        } else if group == self.source_api {
            match serde_yaml::from_value::<RawSource>(value) {
                Ok(raw) => Document::Source(SourceDoc {
                    api_version: raw.api_version,
                    kind: raw.kind,
                    name: raw.metadata.name.trim().to_string(),
                    namespace: trimmed(raw.metadata.namespace),
                }),
                Err(e) => {
                    tracing::debug!(error = %e, "Ignoring undecodable source");
                    Document::Unrecognized
                }
            }
        } else {
            Document::Unrecognized
        }
    }
}

impl From<RawManifest> for ManifestDoc {
    fn from(raw: RawManifest) -> Self {
        let namespace = trimmed(raw.metadata.namespace);
        let source_ref = raw.spec.source_ref.map(|source| SourceRef {
            kind: source.kind,
            name: source.name.trim().to_string(),
            namespace: trimmed(source.namespace).or_else(|| namespace.clone()),
        });
        let substitutions = raw.spec.post_build.map(|post_build| {
            post_build
                .substitute
                .into_iter()
                .filter_map(|(key, value)| scalar_to_string(&value).map(|v| (key, v)))
                .collect()
        });

        Self {
            api_version: raw.api_version,
            kind: raw.kind,
            name: raw.metadata.name.trim().to_string(),
            namespace,
            spec_path: raw.spec.path,
            source_ref,
            substitutions,
        }
    }
}

fn api_group(value: &Value) -> Option<&str> {
    value
        .get("apiVersion")
        .and_then(Value::as_str)
        .and_then(|api_version| api_version.split('/').next())
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const STREAM: &str = r#"
apiVersion: source.toolkit.fluxcd.io/v1
kind: GitRepository
metadata:
  name: flux-system
  namespace: flux-system
---
apiVersion: kustomize.toolkit.fluxcd.io/v1
kind: Kustomization
metadata:
  name: " apps "
  namespace: flux-system
spec:
  path: ./apps/${ENV}
  sourceRef:
    kind: GitRepository
    name: flux-system
  postBuild:
    substitute:
      ENV: prod
      REPLICAS: 3
---
apiVersion: v1
kind: ConfigMap
metadata:
  name: settings
"#;

    #[test]
    fn decodes_tagged_documents() {
        let docs = Decoder::default().decode_stream(STREAM);
        assert_eq!(docs.len(), 3);

        let Document::Source(source) = &docs[0] else {
            panic!("expected a source, got {:?}", docs[0]);
        };
        assert_eq!(source.kind, "GitRepository");
        assert_eq!(source.namespace.as_deref(), Some("flux-system"));

        let Document::Manifest(manifest) = &docs[1] else {
            panic!("expected a manifest, got {:?}", docs[1]);
        };
        assert_eq!(manifest.name, "apps");
        assert_eq!(manifest.spec_path.as_deref(), Some("./apps/${ENV}"));
        let source_ref = manifest.source_ref.as_ref().unwrap();
        assert_eq!(source_ref.namespace.as_deref(), Some("flux-system"));
        let subs = manifest.substitutions.as_ref().unwrap();
        assert_eq!(subs.get("ENV").map(String::as_str), Some("prod"));
        assert_eq!(subs.get("REPLICAS").map(String::as_str), Some("3"));

        assert_eq!(docs[2], Document::Unrecognized);
    }

    #[test]
    fn layering_files_are_unrecognized() {
        let docs = Decoder::default().decode_stream(
            "apiVersion: kustomize.config.k8s.io/v1beta1\nkind: Kustomization\nresources:\n  - a.yaml\n",
        );
        assert_eq!(docs, vec![Document::Unrecognized]);
    }

    #[test]
    fn malformed_document_keeps_earlier_ones() {
        let stream = "apiVersion: source.toolkit.fluxcd.io/v1\nkind: HelmRepository\nmetadata:\n  name: charts\n---\nkey: [unclosed\n";
        let docs = Decoder::default().decode_stream(stream);
        assert_eq!(docs.len(), 1);
        assert!(matches!(docs[0], Document::Source(_)));
    }

    #[test]
    fn wrongly_typed_kustomization_is_unrecognized() {
        let stream = "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: broken\nspec:\n  path: [not, a, string]\n";
        let docs = Decoder::default().decode_stream(stream);
        assert_eq!(docs, vec![Document::Unrecognized]);
    }
}
