//! The node union and its diff

use super::class::{ClassDiff, JvmClass};
use super::common::NodeCore;
use super::file::{FileDiff, FileNode};
use super::metadata::{Metadata, MetadataTag};
use super::module::{JvmModule, ModuleDiff};
use crate::features::diff::{DiffCapable, Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::ReferenceId;
use crate::shared::utils::fx_hash;

/// Discriminant of a [`Node`], also the persistence tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Class,
    Module,
    File,
}

impl NodeKind {
    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(NodeKind::Class),
            1 => Some(NodeKind::Module),
            2 => Some(NodeKind::File),
            _ => None,
        }
    }
}

/// Snapshot of one compiled unit at one revision
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Node {
    Class(JvmClass),
    Module(JvmModule),
    File(FileNode),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Class(_) => NodeKind::Class,
            Node::Module(_) => NodeKind::Module,
            Node::File(_) => NodeKind::File,
        }
    }

    pub fn core(&self) -> &NodeCore {
        match self {
            Node::Class(c) => c.core(),
            Node::Module(m) => m.core(),
            Node::File(f) => f.core(),
        }
    }

    pub fn reference_id(&self) -> &ReferenceId {
        self.core().id()
    }

    pub fn out_file_hash(&self) -> u64 {
        self.core().out_file_hash()
    }

    pub fn usages(&self) -> impl Iterator<Item = &Usage> {
        self.core().usages().iter()
    }

    pub fn metadata(&self) -> &[Metadata] {
        self.core().metadata()
    }

    pub fn as_class(&self) -> Option<&JvmClass> {
        match self {
            Node::Class(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&JvmModule> {
        match self {
            Node::Module(m) => Some(m),
            _ => None,
        }
    }
}

impl From<JvmClass> for Node {
    fn from(class: JvmClass) -> Self {
        Node::Class(class)
    }
}

impl From<JvmModule> for Node {
    fn from(module: JvmModule) -> Self {
        Node::Module(module)
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Node::File(file)
    }
}

pub enum NodeDiff<'a> {
    Class(ClassDiff<'a>),
    Module(ModuleDiff<'a>),
    File(FileDiff<'a>),
    /// Same reference id and output path, different node kind. Never
    /// unchanged.
    KindChanged { past: &'a Node, now: &'a Node },
}

impl<'a> NodeDiff<'a> {
    pub fn as_class(&self) -> Option<&ClassDiff<'a>> {
        match self {
            NodeDiff::Class(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_module(&self) -> Option<&ModuleDiff<'a>> {
        match self {
            NodeDiff::Module(d) => Some(d),
            _ => None,
        }
    }

    /// `None` when the node kind changed: every usage is then suspect
    pub fn usages(&self) -> Option<&Specifier<'a, Usage>> {
        match self {
            NodeDiff::Class(d) => Some(d.usages()),
            NodeDiff::Module(d) => Some(d.usages()),
            NodeDiff::File(d) => Some(d.usages()),
            NodeDiff::KindChanged { .. } => None,
        }
    }

    pub fn metadata(&self, tag: &MetadataTag) -> Option<&Specifier<'a, Metadata>> {
        match self {
            NodeDiff::Class(d) => d.metadata(tag),
            NodeDiff::Module(d) => d.metadata(tag),
            NodeDiff::File(d) => d.metadata(tag),
            NodeDiff::KindChanged { .. } => None,
        }
    }
}

impl Difference for NodeDiff<'_> {
    fn unchanged(&self) -> bool {
        match self {
            NodeDiff::Class(d) => d.unchanged(),
            NodeDiff::Module(d) => d.unchanged(),
            NodeDiff::File(d) => d.unchanged(),
            NodeDiff::KindChanged { .. } => false,
        }
    }
}

impl DiffCapable for Node {
    type Diff<'a> = NodeDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.core().is_same(other.core())
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&(self.reference_id(), self.out_file_hash()))
    }

    fn difference<'a>(&'a self, past: &'a Self) -> NodeDiff<'a> {
        match (past, self) {
            (Node::Class(p), Node::Class(n)) => NodeDiff::Class(ClassDiff::new(p, n)),
            (Node::Module(p), Node::Module(n)) => NodeDiff::Module(ModuleDiff::new(p, n)),
            (Node::File(p), Node::File(n)) => NodeDiff::File(FileDiff::new(p, n)),
            _ => NodeDiff::KindChanged { past, now: self },
        }
    }
}
