//! In-memory node graph of one revision

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::Arc;

use super::back_dependency::{BackDependencyIndex, SubclassesIndex};
use crate::features::diff::{deep_diff, Specifier};
use crate::features::node::{Node, NodeDiff};
use crate::shared::models::ReferenceId;

/// Nodes keyed by reference id, plus the back-dependency indices built from
/// them. Safe to populate from several builder threads.
pub struct NodeGraph {
    nodes: RwLock<FxHashMap<ReferenceId, Arc<Node>>>,
    indices: Vec<Arc<dyn BackDependencyIndex>>,
}

impl NodeGraph {
    /// Graph with the subclasses index registered
    pub fn new() -> Self {
        Self::with_indices(vec![Arc::new(SubclassesIndex::new())])
    }

    pub fn with_indices(indices: Vec<Arc<dyn BackDependencyIndex>>) -> Self {
        Self {
            nodes: RwLock::new(FxHashMap::default()),
            indices,
        }
    }

    /// Insert or replace the node with the same reference id. Index edges
    /// are only ever added.
    pub fn add_node(&self, node: Node) -> Option<Arc<Node>> {
        for index in &self.indices {
            index.index_node(&node);
        }
        let id = node.reference_id().clone();
        tracing::debug!(node = %id, kind = ?node.kind(), "node added to graph");
        self.nodes.write().insert(id, Arc::new(node))
    }

    pub fn get(&self, id: &ReferenceId) -> Option<Arc<Node>> {
        self.nodes.read().get(id).cloned()
    }

    pub fn contains(&self, id: &ReferenceId) -> bool {
        self.nodes.read().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// All nodes, in no particular order
    pub fn nodes(&self) -> Vec<Arc<Node>> {
        self.nodes.read().values().cloned().collect()
    }

    pub fn index(&self, name: &str) -> Option<&Arc<dyn BackDependencyIndex>> {
        self.indices.iter().find(|index| index.name() == name)
    }

    /// Dependents of `id` recorded by the named index; empty for unknown
    /// indices
    pub fn dependencies(&self, index: &str, id: &ReferenceId) -> Vec<ReferenceId> {
        self.index(index)
            .map(|index| index.get_dependencies(id))
            .unwrap_or_default()
    }

    pub fn direct_subclasses(&self, id: &ReferenceId) -> Vec<ReferenceId> {
        self.dependencies(SubclassesIndex::NAME, id)
    }

    /// Transitive subclasses in breadth-first order, excluding `id`
    pub fn all_subclasses(&self, id: &ReferenceId) -> Vec<ReferenceId> {
        let mut visited = FxHashSet::default();
        visited.insert(id.clone());
        let mut queue = VecDeque::from([id.clone()]);
        let mut result = Vec::new();

        while let Some(current) = queue.pop_front() {
            for subclass in self.direct_subclasses(&current) {
                if visited.insert(subclass.clone()) {
                    result.push(subclass.clone());
                    queue.push_back(subclass);
                }
            }
        }
        result
    }
}

impl Default for NodeGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Deep diff of two revisions' node collections
pub fn differentiate<'a, P, N>(past: P, now: N) -> Specifier<'a, Node, NodeDiff<'a>>
where
    P: IntoIterator<Item = &'a Node>,
    N: IntoIterator<Item = &'a Node>,
{
    let spec = deep_diff(past, now);
    tracing::debug!(
        added = spec.added().len(),
        removed = spec.removed().len(),
        "differentiated node sets"
    );
    spec
}
