//! Records produced by the crawl and mutated by the later passes

mod manifest;
mod source;

pub use manifest::{Classification, Manifest, SourceRef};
pub use source::Source;

/// Eight hex characters of a fresh v4 UUID.
pub(crate) fn short_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}
