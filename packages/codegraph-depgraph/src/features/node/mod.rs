//! Node model
//!
//! Per-revision structural snapshots of compiled units. Class, module and
//! file nodes share a [`NodeCore`] (reference id, output-path hash, usages,
//! metadata). Every node kind and member implements `DiffCapable`; the
//! matching `*Diff` types expose the impact predicates consumed downstream.

mod annotation;
mod class;
mod common;
mod file;
mod member;
mod metadata;
mod module;
mod types;

pub use annotation::{
    AnnotationDiff, AnnotationValue, ElementAnnotation, ParamAnnotation, ParamAnnotationDiff,
};
pub use class::{package_of, ClassDiff, FieldsSpecifier, JvmClass, JvmClassParts, MethodsSpecifier};
pub use common::{NodeCore, NodeCoreDiff};
pub use file::{FileDiff, FileNode};
pub use member::{
    AnnotationsSpecifier, FieldDiff, JvmField, JvmMethod, MethodDiff, ParamAnnotationsSpecifier,
    ProtoMember, ProtoMemberDiff,
};
pub use metadata::{Metadata, MetadataTag};
pub use module::{
    ExportDiff, ExportsSpecifier, JvmModule, ModuleDiff, ModulePackage, ModuleRequires,
    RequiresDiff, RequiresSpecifier,
};
pub use types::{Node, NodeDiff, NodeKind};
