//! Data shared by every node kind

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, HashSet};
use std::hash::{Hash, Hasher};

use super::metadata::{Metadata, MetadataTag};
use crate::features::diff::{diff, Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::ReferenceId;
use crate::shared::utils::hash64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeCore {
    id: ReferenceId,
    /// Hash of the output file path, detects relocation
    out_file_hash: u64,
    usages: HashSet<Usage>,
    metadata: Vec<Metadata>,
}

impl NodeCore {
    pub fn new(
        id: impl Into<ReferenceId>,
        out_file_hash: u64,
        usages: HashSet<Usage>,
        metadata: Vec<Metadata>,
    ) -> Self {
        Self {
            id: id.into(),
            out_file_hash,
            usages,
            metadata,
        }
    }

    pub fn out_file_hash_of(path: &str) -> u64 {
        hash64(path.as_bytes())
    }

    pub fn id(&self) -> &ReferenceId {
        &self.id
    }

    pub fn out_file_hash(&self) -> u64 {
        self.out_file_hash
    }

    pub fn usages(&self) -> &HashSet<Usage> {
        &self.usages
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    pub fn metadata_of<'s>(&'s self, tag: &'s MetadataTag) -> impl Iterator<Item = &'s Metadata> {
        self.metadata.iter().filter(move |m| m.tag() == tag)
    }

    /// Same logical entity across revisions
    pub fn is_same(&self, other: &NodeCore) -> bool {
        self.id == other.id && self.out_file_hash == other.out_file_hash
    }
}

// Usage sets are not `Hash`; identity fields are enough to stay consistent
// with `Eq`.
impl Hash for NodeCore {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.out_file_hash.hash(state);
    }
}

pub struct NodeCoreDiff<'a> {
    past: &'a NodeCore,
    now: &'a NodeCore,
    usages: OnceCell<Specifier<'a, Usage>>,
    metadata: OnceCell<FxHashMap<&'a MetadataTag, Specifier<'a, Metadata>>>,
}

impl<'a> NodeCoreDiff<'a> {
    pub fn new(past: &'a NodeCore, now: &'a NodeCore) -> Self {
        Self {
            past,
            now,
            usages: OnceCell::new(),
            metadata: OnceCell::new(),
        }
    }

    pub fn usages(&self) -> &Specifier<'a, Usage> {
        self.usages
            .get_or_init(|| diff(&self.past.usages, &self.now.usages))
    }

    /// Metadata entries of one kind; `None` when neither revision has any
    pub fn metadata(&self, tag: &MetadataTag) -> Option<&Specifier<'a, Metadata>> {
        self.metadata_by_tag().get(tag)
    }

    pub fn metadata_unchanged(&self) -> bool {
        self.metadata_by_tag().values().all(|spec| spec.unchanged())
    }

    fn metadata_by_tag(&self) -> &FxHashMap<&'a MetadataTag, Specifier<'a, Metadata>> {
        self.metadata.get_or_init(|| {
            let (past, now) = (self.past, self.now);
            let tags: BTreeSet<&'a MetadataTag> = past
                .metadata
                .iter()
                .chain(now.metadata.iter())
                .map(Metadata::tag)
                .collect();
            tags.into_iter()
                .map(|tag| (tag, diff(past.metadata_of(tag), now.metadata_of(tag))))
                .collect()
        })
    }
}

impl Difference for NodeCoreDiff<'_> {
    fn unchanged(&self) -> bool {
        self.usages().unchanged() && self.metadata_unchanged()
    }
}
