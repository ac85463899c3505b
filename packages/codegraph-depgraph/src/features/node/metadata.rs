//! Per-language metadata registry
//!
//! Nodes carry an unordered list of opaque entries, each tagged with its
//! metadata kind. Diffs group entries by tag, so a language can add its own
//! kind without touching the node model.

use std::fmt;
use std::sync::Arc;

/// Metadata kind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MetadataTag(Arc<str>);

impl MetadataTag {
    /// Kotlin compiler metadata (`@kotlin.Metadata`)
    pub const KOTLIN: &'static str = "kotlin";

    pub fn new(tag: impl Into<Arc<str>>) -> Self {
        Self(tag.into())
    }

    pub fn kotlin() -> Self {
        Self::new(Self::KOTLIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetadataTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One opaque metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Metadata {
    tag: MetadataTag,
    payload: Vec<u8>,
}

impl Metadata {
    pub fn new(tag: MetadataTag, payload: Vec<u8>) -> Self {
        Self { tag, payload }
    }

    pub fn tag(&self) -> &MetadataTag {
        &self.tag
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}
