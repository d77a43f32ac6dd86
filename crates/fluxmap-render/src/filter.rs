//! Field filter over multi-document YAML streams

use serde::Deserialize;
use serde_yaml::Value;

use crate::error::{Error, Result};

/// Keep the documents of `input` where every `(field, value)` condition holds.
///
/// `field` is a dotted path into the document (`metadata.name`); a leading
/// `.` is accepted. A condition holds when the field exists and is a string
/// equal to `value`. The kept documents are re-emitted as a YAML stream
/// separated by `---`; no match yields an empty string.
pub fn select_documents(input: &str, conditions: &[(&str, &str)]) -> Result<String> {
    let paths = conditions
        .iter()
        .map(|(field, value)| Ok((field_path(field)?, *value)))
        .collect::<Result<Vec<_>>>()?;
    tracing::debug!(?conditions, "Filtering documents");

    let mut kept = Vec::new();
    for document in serde_yaml::Deserializer::from_str(input) {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        let matches = paths
            .iter()
            .all(|(path, expected)| lookup(&value, path).and_then(Value::as_str) == Some(*expected));
        if matches {
            kept.push(serde_yaml::to_string(&value)?);
        }
    }
    Ok(kept.join("---\n"))
}

/// [`select_documents`] restricted to `kind: Kustomization`.
pub fn filter_kustomization(input: &str, conditions: &[(&str, &str)]) -> Result<String> {
    select_documents(input, &with_kind("Kustomization", conditions))
}

/// [`select_documents`] restricted to `kind: GitRepository`.
pub fn filter_git_repository(input: &str, conditions: &[(&str, &str)]) -> Result<String> {
    select_documents(input, &with_kind("GitRepository", conditions))
}

fn with_kind<'a>(kind: &'a str, conditions: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut all = Vec::with_capacity(conditions.len() + 1);
    all.push((".kind", kind));
    all.extend_from_slice(conditions);
    all
}

fn field_path(field: &str) -> Result<Vec<&str>> {
    let trimmed = field.strip_prefix('.').unwrap_or(field);
    let segments: Vec<&str> = trimmed.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(Error::Filter {
            message: format!("invalid field path '{field}'"),
        });
    }
    Ok(segments)
}

fn lookup<'v>(value: &'v Value, path: &[&str]) -> Option<&'v Value> {
    path.iter().try_fold(value, |current, segment| current.get(*segment))
}
