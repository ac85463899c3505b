//! Node builder
//!
//! Consumes the structural callbacks of one compiled unit and produces its
//! `Node` and usage set. Bytecode walking itself belongs to the class-file
//! reader feeding [`ClassFileEvent`]s.

mod events;
mod node_builder;
mod parallel;
mod signature;

pub use events::{
    AnnotationArgs, ClassFileEvent, Constant, FieldOp, Handle, HandleKind, Insn, TypeOp,
};
pub use node_builder::NodeBuilder;
pub use parallel::{build_nodes, ClassFileSource, EventsSource};
pub use signature::generic_bound_classes;
