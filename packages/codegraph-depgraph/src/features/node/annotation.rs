//! Annotations attached to classes, members and parameters

use crate::features::diff::{DiffCapable, Difference};
use crate::shared::models::{ReferenceId, TypeRepr};
use crate::shared::utils::fx_hash;

/// Annotation argument value as delivered by the class-file reader.
///
/// Floating point values are kept as raw bits so values stay `Eq + Hash`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnnotationValue {
    Bool(bool),
    Byte(i8),
    Char(u16),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(u32),
    Double(u64),
    String(String),
    /// Class literal (`Foo.class`)
    Class(TypeRepr),
    /// Enum constant: enum type descriptor plus constant name
    Enum { descriptor: String, value: String },
    /// Nested annotation
    Annotation {
        descriptor: String,
        args: Vec<(String, AnnotationValue)>,
    },
    Array(Vec<AnnotationValue>),
}

impl AnnotationValue {
    pub fn float(value: f32) -> Self {
        AnnotationValue::Float(value.to_bits())
    }

    pub fn double(value: f64) -> Self {
        AnnotationValue::Double(value.to_bits())
    }

    pub fn string(value: impl Into<String>) -> Self {
        AnnotationValue::String(value.into())
    }

    pub fn enum_constant(descriptor: impl Into<String>, value: impl Into<String>) -> Self {
        AnnotationValue::Enum {
            descriptor: descriptor.into(),
            value: value.into(),
        }
    }
}

/// (annotation class, content hash) pair.
///
/// Equality is by the pair, not the full argument structure. `content_hash`
/// is `None` for annotation types no tracker cares about; such annotations
/// compare by class only and never register as changed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementAnnotation {
    annotation_class: ReferenceId,
    content_hash: Option<u64>,
}

impl ElementAnnotation {
    pub fn new(annotation_class: impl Into<ReferenceId>, content_hash: Option<u64>) -> Self {
        Self {
            annotation_class: annotation_class.into(),
            content_hash,
        }
    }

    pub fn annotation_class(&self) -> &ReferenceId {
        &self.annotation_class
    }

    pub fn content_hash(&self) -> Option<u64> {
        self.content_hash
    }
}

#[derive(Debug)]
pub struct AnnotationDiff<'a> {
    past: &'a ElementAnnotation,
    now: &'a ElementAnnotation,
}

impl<'a> AnnotationDiff<'a> {
    pub fn content_changed(&self) -> bool {
        self.past.content_hash != self.now.content_hash
    }

    pub fn past(&self) -> &'a ElementAnnotation {
        self.past
    }

    pub fn now(&self) -> &'a ElementAnnotation {
        self.now
    }
}

impl Difference for AnnotationDiff<'_> {
    fn unchanged(&self) -> bool {
        !self.content_changed()
    }
}

impl DiffCapable for ElementAnnotation {
    type Diff<'a> = AnnotationDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.annotation_class == other.annotation_class
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&self.annotation_class)
    }

    fn difference<'a>(&'a self, past: &'a Self) -> AnnotationDiff<'a> {
        AnnotationDiff { past, now: self }
    }
}

/// Annotation on one method parameter
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamAnnotation {
    param_index: u32,
    annotation: ElementAnnotation,
}

impl ParamAnnotation {
    pub fn new(param_index: u32, annotation: ElementAnnotation) -> Self {
        Self {
            param_index,
            annotation,
        }
    }

    pub fn param_index(&self) -> u32 {
        self.param_index
    }

    pub fn annotation(&self) -> &ElementAnnotation {
        &self.annotation
    }
}

#[derive(Debug)]
pub struct ParamAnnotationDiff<'a> {
    past: &'a ParamAnnotation,
    now: &'a ParamAnnotation,
}

impl<'a> ParamAnnotationDiff<'a> {
    pub fn content_changed(&self) -> bool {
        self.past.annotation.content_hash != self.now.annotation.content_hash
    }

    pub fn param_index(&self) -> u32 {
        self.now.param_index
    }
}

impl Difference for ParamAnnotationDiff<'_> {
    fn unchanged(&self) -> bool {
        !self.content_changed()
    }
}

impl DiffCapable for ParamAnnotation {
    type Diff<'a> = ParamAnnotationDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.param_index == other.param_index && self.annotation.is_same(&other.annotation)
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&(self.param_index, &self.annotation.annotation_class))
    }

    fn difference<'a>(&'a self, past: &'a Self) -> ParamAnnotationDiff<'a> {
        ParamAnnotationDiff { past, now: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::diff::deep_diff;

    #[test]
    fn test_identity_by_annotation_class() {
        let a = ElementAnnotation::new("a/Nullable", Some(1));
        let b = ElementAnnotation::new("a/Nullable", Some(2));
        assert!(a.is_same(&b));
        assert_ne!(a, b);
        assert_eq!(a.diff_hash_code(), b.diff_hash_code());
        assert!(!b.difference(&a).unchanged());
    }

    #[test]
    fn test_untracked_annotations_never_change() {
        let past = vec![ElementAnnotation::new("a/Marker", None)];
        let now = vec![ElementAnnotation::new("a/Marker", None)];
        let spec = deep_diff(&past, &now);
        assert!(spec.unchanged());
        assert!(spec.changed().is_empty());
    }

    #[test]
    fn test_param_annotation_identity_includes_index() {
        let first = ParamAnnotation::new(0, ElementAnnotation::new("a/NotNull", None));
        let second = ParamAnnotation::new(1, ElementAnnotation::new("a/NotNull", None));
        assert!(!first.is_same(&second));

        let past = vec![first.clone()];
        let now = vec![second.clone()];
        let spec = deep_diff(&past, &now);
        assert_eq!(spec.added(), &[&second]);
        assert_eq!(spec.removed(), &[&first]);
    }
}
