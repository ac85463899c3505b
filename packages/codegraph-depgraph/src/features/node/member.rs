//! Fields and methods of a class node

use once_cell::unsync::OnceCell;

use super::annotation::{AnnotationValue, ElementAnnotation, ParamAnnotation};
use crate::features::diff::{deep_diff, diff, DiffCapable, Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::{JvmFlags, ReferenceId, TypeRepr};
use crate::shared::utils::fx_hash;

pub type AnnotationsSpecifier<'a> =
    Specifier<'a, ElementAnnotation, <ElementAnnotation as DiffCapable>::Diff<'a>>;

pub type ParamAnnotationsSpecifier<'a> =
    Specifier<'a, ParamAnnotation, <ParamAnnotation as DiffCapable>::Diff<'a>>;

// ═══════════════════════════════════════════════════════════════════════════
// Common member data
// ═══════════════════════════════════════════════════════════════════════════

/// Data shared by fields and methods
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProtoMember {
    flags: JvmFlags,
    signature: Option<String>,
    name: String,
    /// Field type, or method return type
    ty: TypeRepr,
    annotations: Vec<ElementAnnotation>,
}

impl ProtoMember {
    pub fn new(
        flags: JvmFlags,
        signature: Option<String>,
        name: impl Into<String>,
        ty: TypeRepr,
        annotations: Vec<ElementAnnotation>,
    ) -> Self {
        Self {
            flags,
            signature: signature.filter(|s| !s.is_empty()),
            name: name.into(),
            ty,
            annotations,
        }
    }

    pub fn flags(&self) -> JvmFlags {
        self.flags
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeRepr {
        &self.ty
    }

    pub fn annotations(&self) -> &[ElementAnnotation] {
        &self.annotations
    }
}

/// Comparison of the common member data
pub struct ProtoMemberDiff<'a> {
    past: &'a ProtoMember,
    now: &'a ProtoMember,
    annotations: OnceCell<AnnotationsSpecifier<'a>>,
}

impl<'a> ProtoMemberDiff<'a> {
    fn new(past: &'a ProtoMember, now: &'a ProtoMember) -> Self {
        Self {
            past,
            now,
            annotations: OnceCell::new(),
        }
    }

    pub fn added_flags(&self) -> JvmFlags {
        self.now.flags.added(&self.past.flags)
    }

    pub fn removed_flags(&self) -> JvmFlags {
        self.now.flags.removed(&self.past.flags)
    }

    pub fn flags_changed(&self) -> bool {
        self.past.flags != self.now.flags
    }

    pub fn signature_changed(&self) -> bool {
        self.past.signature != self.now.signature
    }

    pub fn type_changed(&self) -> bool {
        self.past.ty != self.now.ty
    }

    pub fn annotations(&self) -> &AnnotationsSpecifier<'a> {
        self.annotations
            .get_or_init(|| deep_diff(&self.past.annotations, &self.now.annotations))
    }

    /// Access became more restrictive (public → protected → package → private)
    pub fn access_restricted(&self) -> bool {
        access_rank(self.now.flags) < access_rank(self.past.flags)
    }

    pub fn unchanged(&self) -> bool {
        !self.flags_changed()
            && !self.signature_changed()
            && !self.type_changed()
            && self.annotations().unchanged()
    }
}

fn access_rank(flags: JvmFlags) -> u8 {
    if flags.is_public() {
        3
    } else if flags.is_protected() {
        2
    } else if flags.is_private() {
        0
    } else {
        1
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Field
// ═══════════════════════════════════════════════════════════════════════════

/// Diff identity: name + type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmField {
    proto: ProtoMember,
}

impl JvmField {
    pub fn new(proto: ProtoMember) -> Self {
        Self { proto }
    }

    pub fn proto(&self) -> &ProtoMember {
        &self.proto
    }

    pub fn name(&self) -> &str {
        &self.proto.name
    }

    pub fn ty(&self) -> &TypeRepr {
        &self.proto.ty
    }

    pub fn flags(&self) -> JvmFlags {
        self.proto.flags
    }

    pub fn descriptor(&self) -> String {
        self.proto.ty.descriptor()
    }

    pub fn create_usage(&self, owner: impl Into<ReferenceId>) -> Usage {
        Usage::field(owner, self.name(), &self.descriptor())
    }

    pub fn create_assign_usage(&self, owner: impl Into<ReferenceId>) -> Usage {
        Usage::field_assign(owner, self.name(), &self.descriptor())
    }
}

pub struct FieldDiff<'a> {
    member: ProtoMemberDiff<'a>,
}

impl<'a> FieldDiff<'a> {
    pub fn member(&self) -> &ProtoMemberDiff<'a> {
        &self.member
    }
}

impl Difference for FieldDiff<'_> {
    fn unchanged(&self) -> bool {
        self.member.unchanged()
    }
}

impl DiffCapable for JvmField {
    type Diff<'a> = FieldDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.proto.name == other.proto.name && self.proto.ty == other.proto.ty
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&(&self.proto.name, &self.proto.ty))
    }

    fn difference<'a>(&'a self, past: &'a Self) -> FieldDiff<'a> {
        FieldDiff {
            member: ProtoMemberDiff::new(&past.proto, &self.proto),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Method
// ═══════════════════════════════════════════════════════════════════════════

/// Diff identity: name + erased argument types + return type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmMethod {
    proto: ProtoMember,
    arg_types: Vec<TypeRepr>,
    param_annotations: Vec<ParamAnnotation>,
    exceptions: Vec<TypeRepr>,
    /// Default value of an annotation-type element
    default_value: Option<AnnotationValue>,
}

impl JvmMethod {
    pub fn new(
        proto: ProtoMember,
        arg_types: Vec<TypeRepr>,
        param_annotations: Vec<ParamAnnotation>,
        exceptions: Vec<TypeRepr>,
        default_value: Option<AnnotationValue>,
    ) -> Self {
        Self {
            proto,
            arg_types,
            param_annotations,
            exceptions,
            default_value,
        }
    }

    pub fn proto(&self) -> &ProtoMember {
        &self.proto
    }

    pub fn name(&self) -> &str {
        &self.proto.name
    }

    pub fn flags(&self) -> JvmFlags {
        self.proto.flags
    }

    pub fn return_type(&self) -> &TypeRepr {
        &self.proto.ty
    }

    pub fn arg_types(&self) -> &[TypeRepr] {
        &self.arg_types
    }

    pub fn param_annotations(&self) -> &[ParamAnnotation] {
        &self.param_annotations
    }

    pub fn exceptions(&self) -> &[TypeRepr] {
        &self.exceptions
    }

    pub fn default_value(&self) -> Option<&AnnotationValue> {
        self.default_value.as_ref()
    }

    /// Derived from argument and return types
    pub fn descriptor(&self) -> String {
        TypeRepr::method_descriptor(&self.arg_types, &self.proto.ty)
    }

    pub fn is_constructor(&self) -> bool {
        self.proto.name == "<init>"
    }

    pub fn is_static_initializer(&self) -> bool {
        self.proto.name == "<clinit>"
    }

    /// Same under Java overriding rules: name and argument types, return
    /// type ignored
    pub fn is_same_by_java_rules(&self, other: &JvmMethod) -> bool {
        self.proto.name == other.proto.name && self.arg_types == other.arg_types
    }

    pub fn create_usage(&self, owner: impl Into<ReferenceId>) -> Usage {
        Usage::method(owner, self.name(), &self.descriptor())
    }
}

pub struct MethodDiff<'a> {
    past: &'a JvmMethod,
    now: &'a JvmMethod,
    member: ProtoMemberDiff<'a>,
    param_annotations: OnceCell<ParamAnnotationsSpecifier<'a>>,
    exceptions: OnceCell<Specifier<'a, TypeRepr>>,
}

impl<'a> MethodDiff<'a> {
    pub fn member(&self) -> &ProtoMemberDiff<'a> {
        &self.member
    }

    pub fn param_annotations(&self) -> &ParamAnnotationsSpecifier<'a> {
        self.param_annotations.get_or_init(|| {
            deep_diff(&self.past.param_annotations, &self.now.param_annotations)
        })
    }

    pub fn exceptions(&self) -> &Specifier<'a, TypeRepr> {
        self.exceptions
            .get_or_init(|| diff(&self.past.exceptions, &self.now.exceptions))
    }

    pub fn default_added(&self) -> bool {
        self.past.default_value.is_none() && self.now.default_value.is_some()
    }

    pub fn default_removed(&self) -> bool {
        self.past.default_value.is_some() && self.now.default_value.is_none()
    }

    pub fn default_changed(&self) -> bool {
        self.past.default_value != self.now.default_value
    }
}

impl Difference for MethodDiff<'_> {
    fn unchanged(&self) -> bool {
        self.member.unchanged()
            && self.param_annotations().unchanged()
            && self.exceptions().unchanged()
            && !self.default_changed()
    }
}

impl DiffCapable for JvmMethod {
    type Diff<'a> = MethodDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.proto.name == other.proto.name
            && self.proto.ty == other.proto.ty
            && self.arg_types == other.arg_types
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&(&self.proto.name, &self.proto.ty, &self.arg_types))
    }

    fn difference<'a>(&'a self, past: &'a Self) -> MethodDiff<'a> {
        MethodDiff {
            past,
            now: self,
            member: ProtoMemberDiff::new(&past.proto, &self.proto),
            param_annotations: OnceCell::new(),
            exceptions: OnceCell::new(),
        }
    }
}
