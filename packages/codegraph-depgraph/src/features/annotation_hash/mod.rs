//! Annotation content hashing
//!
//! Deterministic digest of annotation argument values, computed only for
//! annotation types a registered tracker cares about.

mod hasher;
mod tracker;

pub use hasher::content_hash;
pub use tracker::{
    AllAnnotationsTracker, AnnotationTracker, AnnotationTrackerRegistry, NamedAnnotationTracker,
};
