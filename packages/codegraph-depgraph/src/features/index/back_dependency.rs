//! Back-dependency indices
//!
//! Named, append-only reverse maps: referenced entity → units referencing
//! it. Each index decides which relation it records through
//! `process_indexed_dependencies`; the reverse map itself is shared.

use dashmap::DashMap;

use crate::features::node::Node;
use crate::shared::models::ReferenceId;

/// Lock-free reverse map, target → dependents (insertion order, no
/// duplicates)
#[derive(Debug, Default)]
pub struct ReverseMap {
    entries: DashMap<ReferenceId, Vec<ReferenceId>>,
}

impl ReverseMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `dependent → target`. Never removes earlier edges.
    pub fn append(&self, target: ReferenceId, dependent: ReferenceId) {
        let mut dependents = self.entries.entry(target).or_default();
        if !dependents.contains(&dependent) {
            dependents.push(dependent);
        }
    }

    pub fn get(&self, target: &ReferenceId) -> Vec<ReferenceId> {
        self.entries
            .get(target)
            .map(|dependents| dependents.clone())
            .unwrap_or_default()
    }

    /// Number of indexed targets
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub trait BackDependencyIndex: Send + Sync {
    fn name(&self) -> &str;

    fn storage(&self) -> &ReverseMap;

    /// Invoke `visit` once per indexed target of `node`
    fn process_indexed_dependencies(&self, node: &Node, visit: &mut dyn FnMut(ReferenceId));

    /// Record every indexed target of `node` as pointing back at it
    fn index_node(&self, node: &Node) {
        let dependent = node.reference_id();
        self.process_indexed_dependencies(node, &mut |target| {
            self.storage().append(target, dependent.clone());
        });
    }

    fn get_dependencies(&self, target: &ReferenceId) -> Vec<ReferenceId> {
        self.storage().get(target)
    }
}

/// Supertype → direct subclasses
#[derive(Debug, Default)]
pub struct SubclassesIndex {
    map: ReverseMap,
}

impl SubclassesIndex {
    pub const NAME: &'static str = "direct-subclasses";

    pub fn new() -> Self {
        Self::default()
    }
}

impl BackDependencyIndex for SubclassesIndex {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn storage(&self) -> &ReverseMap {
        &self.map
    }

    /// No-op for non-class nodes; one call per direct supertype otherwise
    fn process_indexed_dependencies(&self, node: &Node, visit: &mut dyn FnMut(ReferenceId)) {
        if let Node::Class(class) = node {
            for supertype in class.supertypes() {
                visit(ReferenceId::from(supertype));
            }
        }
    }
}
