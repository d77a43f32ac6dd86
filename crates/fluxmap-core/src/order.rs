//! Display order of the visible manifests

use crate::model::Manifest;

/// Indices of all non-base manifests, most children first, then by name.
///
/// The sort is stable, so manifests tying on both keys keep store order.
pub fn visible_order(manifests: &[Manifest]) -> Vec<usize> {
    let mut order: Vec<usize> = manifests
        .iter()
        .enumerate()
        .filter(|(_, manifest)| manifest.is_visible())
        .map(|(index, _)| index)
        .collect();

    order.sort_by(|&a, &b| {
        let (a, b) = (&manifests[a], &manifests[b]);
        b.children
            .len()
            .cmp(&a.children.len())
            .then_with(|| a.name.cmp(&b.name))
    });
    order
}
