//! Back-dependency indices and the in-memory node graph

mod back_dependency;
mod graph;

pub use back_dependency::{BackDependencyIndex, ReverseMap, SubclassesIndex};
pub use graph::{differentiate, NodeGraph};
