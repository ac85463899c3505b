//! Generic file node: a usage set with no structure of its own

use super::common::{NodeCore, NodeCoreDiff};
use super::metadata::{Metadata, MetadataTag};
use crate::features::diff::{Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::ReferenceId;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileNode {
    core: NodeCore,
}

impl FileNode {
    pub fn new(core: NodeCore) -> Self {
        Self { core }
    }

    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    pub fn reference_id(&self) -> &ReferenceId {
        self.core.id()
    }

    pub fn usages(&self) -> impl Iterator<Item = &Usage> {
        self.core.usages().iter()
    }
}

pub struct FileDiff<'a> {
    core: NodeCoreDiff<'a>,
}

impl<'a> FileDiff<'a> {
    pub fn new(past: &'a FileNode, now: &'a FileNode) -> Self {
        Self {
            core: NodeCoreDiff::new(&past.core, &now.core),
        }
    }

    pub fn usages(&self) -> &Specifier<'a, Usage> {
        self.core.usages()
    }

    pub fn metadata(&self, tag: &MetadataTag) -> Option<&Specifier<'a, Metadata>> {
        self.core.metadata(tag)
    }
}

impl Difference for FileDiff<'_> {
    fn unchanged(&self) -> bool {
        self.core.unchanged()
    }
}
