//! Class node and its impact predicates

use once_cell::unsync::OnceCell;

use super::annotation::ElementAnnotation;
use super::common::{NodeCore, NodeCoreDiff};
use super::member::{AnnotationsSpecifier, JvmField, JvmMethod};
use super::metadata::{Metadata, MetadataTag};
use crate::features::diff::{deep_diff, diff, DiffCapable, Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::{ElemType, JvmFlags, ReferenceId, RetentionPolicy, OBJECT_CLASS_NAME};

pub type FieldsSpecifier<'a> = Specifier<'a, JvmField, <JvmField as DiffCapable>::Diff<'a>>;
pub type MethodsSpecifier<'a> = Specifier<'a, JvmMethod, <JvmMethod as DiffCapable>::Diff<'a>>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmClass {
    core: NodeCore,
    flags: JvmFlags,
    signature: Option<String>,
    /// Empty when the class has no explicit superclass or extends Object
    super_fq_name: String,
    /// Empty for top-level classes
    outer_fq_name: String,
    interfaces: Vec<String>,
    fields: Vec<JvmField>,
    methods: Vec<JvmMethod>,
    annotations: Vec<ElementAnnotation>,
    /// `@Target` element kinds, for annotation types
    annotation_targets: Vec<ElemType>,
    retention_policy: Option<RetentionPolicy>,
}

/// Construction parameters for [`JvmClass`], filled by the node builder
#[derive(Debug, Clone, Default)]
pub struct JvmClassParts {
    pub flags: JvmFlags,
    pub signature: Option<String>,
    pub super_fq_name: String,
    pub outer_fq_name: String,
    pub interfaces: Vec<String>,
    pub fields: Vec<JvmField>,
    pub methods: Vec<JvmMethod>,
    pub annotations: Vec<ElementAnnotation>,
    pub annotation_targets: Vec<ElemType>,
    pub retention_policy: Option<RetentionPolicy>,
}

fn normalize_super(name: String) -> String {
    if name == OBJECT_CLASS_NAME {
        String::new()
    } else {
        name
    }
}

impl JvmClass {
    pub fn new(core: NodeCore, parts: JvmClassParts) -> Self {
        Self {
            core,
            flags: parts.flags,
            signature: parts.signature.filter(|s| !s.is_empty()),
            super_fq_name: normalize_super(parts.super_fq_name),
            outer_fq_name: parts.outer_fq_name,
            interfaces: parts.interfaces,
            fields: parts.fields,
            methods: parts.methods,
            annotations: parts.annotations,
            annotation_targets: parts.annotation_targets,
            retention_policy: parts.retention_policy,
        }
    }

    pub fn core(&self) -> &NodeCore {
        &self.core
    }

    pub fn reference_id(&self) -> &ReferenceId {
        self.core.id()
    }

    pub fn name(&self) -> &str {
        self.core.id().name()
    }

    pub fn usages(&self) -> impl Iterator<Item = &Usage> {
        self.core.usages().iter()
    }

    pub fn metadata(&self) -> &[Metadata] {
        self.core.metadata()
    }

    pub fn flags(&self) -> JvmFlags {
        self.flags
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Explicit superclass; `None` for Object and for classes without one
    pub fn superclass(&self) -> Option<&str> {
        (!self.super_fq_name.is_empty()).then_some(self.super_fq_name.as_str())
    }

    pub fn outer_fq_name(&self) -> &str {
        &self.outer_fq_name
    }

    pub fn interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// Direct supertypes: superclass (if any) followed by interfaces
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass()
            .into_iter()
            .chain(self.interfaces.iter().map(String::as_str))
    }

    pub fn fields(&self) -> &[JvmField] {
        &self.fields
    }

    pub fn methods(&self) -> &[JvmMethod] {
        &self.methods
    }

    pub fn annotations(&self) -> &[ElementAnnotation] {
        &self.annotations
    }

    pub fn annotation_targets(&self) -> &[ElemType] {
        &self.annotation_targets
    }

    pub fn retention_policy(&self) -> Option<RetentionPolicy> {
        self.retention_policy
    }

    pub fn package_name(&self) -> &str {
        package_of(self.name())
    }

    pub fn short_name(&self) -> &str {
        let name = self.name();
        name.rsplit_once('/').map_or(name, |(_, short)| short)
    }

    pub fn is_inner_class(&self) -> bool {
        !self.outer_fq_name.is_empty()
    }

    pub fn is_local(&self) -> bool {
        self.flags.is_local()
    }

    pub fn is_anonymous(&self) -> bool {
        self.flags.is_anonymous()
    }

    pub fn is_interface(&self) -> bool {
        self.flags.is_interface()
    }

    pub fn is_annotation(&self) -> bool {
        self.flags.is_annotation()
    }

    pub fn is_sealed(&self) -> bool {
        self.flags.is_sealed()
    }

    pub fn is_generated(&self) -> bool {
        self.flags.is_generated()
    }

    pub fn is_library(&self) -> bool {
        self.flags.is_library()
    }

    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&JvmMethod> {
        self.methods
            .iter()
            .find(|m| m.name() == name && m.descriptor() == descriptor)
    }

    pub fn find_field(&self, name: &str) -> Option<&JvmField> {
        self.fields.iter().find(|f| f.name() == name)
    }
}

/// Package part of an internal name, empty for the default package
pub fn package_of(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(package, _)| package)
}

pub struct ClassDiff<'a> {
    past: &'a JvmClass,
    now: &'a JvmClass,
    core: NodeCoreDiff<'a>,
    interfaces: OnceCell<Specifier<'a, String>>,
    fields: OnceCell<FieldsSpecifier<'a>>,
    methods: OnceCell<MethodsSpecifier<'a>>,
    annotations: OnceCell<AnnotationsSpecifier<'a>>,
    annotation_targets: OnceCell<Specifier<'a, ElemType>>,
}

impl<'a> ClassDiff<'a> {
    pub fn new(past: &'a JvmClass, now: &'a JvmClass) -> Self {
        Self {
            past,
            now,
            core: NodeCoreDiff::new(&past.core, &now.core),
            interfaces: OnceCell::new(),
            fields: OnceCell::new(),
            methods: OnceCell::new(),
            annotations: OnceCell::new(),
            annotation_targets: OnceCell::new(),
        }
    }

    pub fn past(&self) -> &'a JvmClass {
        self.past
    }

    pub fn now(&self) -> &'a JvmClass {
        self.now
    }

    pub fn usages(&self) -> &Specifier<'a, Usage> {
        self.core.usages()
    }

    pub fn metadata(&self, tag: &MetadataTag) -> Option<&Specifier<'a, Metadata>> {
        self.core.metadata(tag)
    }

    pub fn flags_changed(&self) -> bool {
        self.past.flags != self.now.flags
    }

    pub fn added_flags(&self) -> JvmFlags {
        self.now.flags.added(&self.past.flags)
    }

    pub fn removed_flags(&self) -> JvmFlags {
        self.now.flags.removed(&self.past.flags)
    }

    pub fn signature_changed(&self) -> bool {
        self.past.signature != self.now.signature
    }

    pub fn super_class_changed(&self) -> bool {
        let changed = self.past.super_fq_name != self.now.super_fq_name;
        if changed {
            tracing::debug!(
                class = %self.now.name(),
                past = %self.past.super_fq_name,
                now = %self.now.super_fq_name,
                "superclass changed"
            );
        }
        changed
    }

    /// Had no explicit superclass, now has one
    pub fn extends_added(&self) -> bool {
        self.past.super_fq_name.is_empty() && !self.now.super_fq_name.is_empty()
    }

    /// Had an explicit superclass, now has none
    pub fn extends_removed(&self) -> bool {
        !self.past.super_fq_name.is_empty() && self.now.super_fq_name.is_empty()
    }

    pub fn outer_class_changed(&self) -> bool {
        self.past.outer_fq_name != self.now.outer_fq_name
    }

    pub fn retention_policy_changed(&self) -> bool {
        self.past.retention_policy != self.now.retention_policy
    }

    /// TYPE_USE and RECORD_COMPONENT targets affect usage sites beyond what
    /// a plain added/removed check captures.
    pub fn target_attribute_category_might_change(&self) -> bool {
        let targets = self.annotation_targets();
        if targets.unchanged() {
            return false;
        }
        let sensitive = |t: &ElemType| matches!(t, ElemType::TypeUse | ElemType::RecordComponent);
        targets.added().iter().any(|t| sensitive(*t))
            || targets.removed().iter().any(|t| sensitive(*t))
            || self.past.annotation_targets.iter().any(sensitive)
    }

    pub fn interfaces(&self) -> &Specifier<'a, String> {
        self.interfaces
            .get_or_init(|| diff(&self.past.interfaces, &self.now.interfaces))
    }

    pub fn fields(&self) -> &FieldsSpecifier<'a> {
        self.fields
            .get_or_init(|| deep_diff(&self.past.fields, &self.now.fields))
    }

    pub fn methods(&self) -> &MethodsSpecifier<'a> {
        self.methods
            .get_or_init(|| deep_diff(&self.past.methods, &self.now.methods))
    }

    pub fn annotations(&self) -> &AnnotationsSpecifier<'a> {
        self.annotations
            .get_or_init(|| deep_diff(&self.past.annotations, &self.now.annotations))
    }

    pub fn annotation_targets(&self) -> &Specifier<'a, ElemType> {
        self.annotation_targets.get_or_init(|| {
            diff(&self.past.annotation_targets, &self.now.annotation_targets)
        })
    }
}

impl Difference for ClassDiff<'_> {
    fn unchanged(&self) -> bool {
        !self.flags_changed()
            && !self.signature_changed()
            && !self.super_class_changed()
            && !self.outer_class_changed()
            && !self.retention_policy_changed()
            && self.interfaces().unchanged()
            && self.fields().unchanged()
            && self.methods().unchanged()
            && self.annotations().unchanged()
            && self.annotation_targets().unchanged()
            && self.core.unchanged()
    }
}
