//! Binding manifests to the source their `sourceRef` names

use crate::context::ResolutionContext;

/// Bind every manifest with a source reference.
pub fn bind_sources(ctx: &mut ResolutionContext) {
    for index in 0..ctx.manifests.len() {
        bind_source(ctx, index);
    }
}

/// Bind one manifest to the first source matching its reference on kind,
/// name and effective namespace.
///
/// The source lists the manifest at most once per (name, namespace), so
/// binding again is a no-op.
pub fn bind_source(ctx: &mut ResolutionContext, index: usize) {
    let manifest = &ctx.manifests[index];
    let (Some(source_ref), Some(namespace)) = (&manifest.source_ref, manifest.source_namespace())
    else {
        return;
    };

    let found = ctx.sources.iter().position(|source| {
        source.kind == source_ref.kind
            && source.name == source_ref.name
            && source.namespace_or_default() == namespace
    });
    let Some(source) = found else {
        tracing::debug!(
            manifest = %manifest.name,
            kind = %source_ref.kind,
            name = %source_ref.name,
            namespace,
            "No matching source"
        );
        return;
    };

    let name = manifest.name.clone();
    let manifest_namespace = manifest.namespace_or_default().to_string();
    ctx.manifests[index].source = Some(source);

    let listed = ctx.sources[source].children.iter().any(|&child| {
        let other = &ctx.manifests[child];
        other.name == name && other.namespace_or_default() == manifest_namespace
    });
    if !listed {
        ctx.sources[source].children.push(index);
    }
}
