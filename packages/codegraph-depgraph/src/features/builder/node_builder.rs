//! Node builder - turns one class-file event stream into a `Node`
//!
//! Stateful across the stream of one compiled unit: accumulates flags,
//! members, the usage set and per-annotation-type bookkeeping, then
//! finalizes an immutable node. A failure affects this unit only.

use rustc_hash::FxHashMap;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::iter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::events::{AnnotationArgs, ClassFileEvent, Constant, Handle, Insn, TypeOp};
use super::signature::generic_bound_classes;
use crate::config::BuilderConfig;
use crate::errors::{DepGraphError, Result};
use crate::features::annotation_hash::{content_hash, AnnotationTrackerRegistry};
use crate::features::node::{
    package_of, AnnotationValue, ElementAnnotation, JvmClass, JvmClassParts, JvmField, JvmMethod,
    JvmModule, Metadata, MetadataTag, ModulePackage, ModuleRequires, Node, NodeCore, ParamAnnotation,
    ProtoMember,
};
use crate::features::usage::Usage;
use crate::shared::models::{ElemType, JvmFlags, RetentionPolicy, TypeRepr, OBJECT_CLASS_NAME};

const LAMBDA_METAFACTORY: &str = "java/lang/invoke/LambdaMetafactory";
const TARGET_ANNOTATION: &str = "java/lang/annotation/Target";
const RETENTION_ANNOTATION: &str = "java/lang/annotation/Retention";
const DEPRECATED_ANNOTATION: &str = "java/lang/Deprecated";
const KOTLIN_METADATA_ANNOTATION: &str = "kotlin/Metadata";
const GENERATED_ANNOTATIONS: [&str; 2] = [
    "javax/annotation/processing/Generated",
    "javax/annotation/Generated",
];

struct ClassDraft {
    name: String,
    parts: JvmClassParts,
}

struct ModuleDraft {
    name: String,
    flags: JvmFlags,
    version: String,
    requires: Vec<ModuleRequires>,
    exports: Vec<ModulePackage>,
}

enum State {
    Initial,
    Class(Box<ClassDraft>),
    Module(ModuleDraft),
}

struct FieldDraft {
    /// Private member of a library class, consumed but not kept
    skipped: bool,
    flags: JvmFlags,
    name: String,
    signature: Option<String>,
    ty: TypeRepr,
    annotations: Vec<ElementAnnotation>,
}

struct MethodDraft {
    skipped: bool,
    flags: JvmFlags,
    name: String,
    signature: Option<String>,
    args: Vec<TypeRepr>,
    ret: TypeRepr,
    exceptions: Vec<TypeRepr>,
    annotations: Vec<ElementAnnotation>,
    param_annotations: Vec<ParamAnnotation>,
    default_value: Option<AnnotationValue>,
}

enum MemberDraft {
    Field(FieldDraft),
    Method(MethodDraft),
}

/// Live argument names (intersected) and targets (unioned) over every site
/// of one annotation type
#[derive(Default)]
struct AnnotationSites {
    arg_names: Option<BTreeSet<String>>,
    targets: BTreeSet<ElemType>,
}

pub struct NodeBuilder {
    path: PathBuf,
    out_file_hash: u64,
    library_mode: bool,
    trackers: Arc<AnnotationTrackerRegistry>,
    state: State,
    member: Option<MemberDraft>,
    usages: HashSet<Usage>,
    annotation_sites: FxHashMap<String, AnnotationSites>,
    metadata: Vec<Metadata>,
}

impl NodeBuilder {
    pub fn new(
        path: impl Into<PathBuf>,
        config: &BuilderConfig,
        trackers: Arc<AnnotationTrackerRegistry>,
    ) -> Self {
        let path = path.into();
        let out_file_hash = NodeCore::out_file_hash_of(&path.to_string_lossy());
        Self {
            path,
            out_file_hash,
            library_mode: config.library_mode,
            trackers,
            state: State::Initial,
            member: None,
            usages: HashSet::new(),
            annotation_sites: FxHashMap::default(),
            metadata: Vec::new(),
        }
    }

    /// Feed a whole event stream and finalize
    pub fn build(
        path: impl Into<PathBuf>,
        events: impl IntoIterator<Item = ClassFileEvent>,
        config: &BuilderConfig,
        trackers: Arc<AnnotationTrackerRegistry>,
    ) -> Result<Node> {
        let mut builder = Self::new(path, config, trackers);
        for event in events {
            builder.accept(event)?;
        }
        builder.finish()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn accept(&mut self, event: ClassFileEvent) -> Result<()> {
        let event_name = event.name();
        match event {
            ClassFileEvent::ClassHeader {
                access,
                name,
                signature,
                super_name,
                interfaces,
            } => {
                self.expect_initial(event_name)?;
                self.begin_class(access, name, signature, super_name, interfaces)
            }
            ClassFileEvent::ModuleHeader {
                name,
                access,
                version,
            } => {
                self.expect_initial(event_name)?;
                self.state = State::Module(ModuleDraft {
                    name,
                    flags: JvmFlags::new(access),
                    version: version.unwrap_or_default(),
                    requires: Vec::new(),
                    exports: Vec::new(),
                });
                Ok(())
            }
            ClassFileEvent::ModuleRequire {
                module,
                access,
                version,
            } => {
                self.module_draft(event_name)?.requires.push(ModuleRequires::new(
                    module.as_str(),
                    JvmFlags::new(access),
                    version.unwrap_or_default(),
                ));
                self.add_usage(Usage::module(module));
                Ok(())
            }
            ClassFileEvent::ModuleExport {
                package, modules, ..
            } => {
                self.module_draft(event_name)?
                    .exports
                    .push(ModulePackage::new(package, modules.clone()));
                for module in modules {
                    self.add_usage(Usage::module(module));
                }
                Ok(())
            }
            ClassFileEvent::OuterClass { owner, method_name } => {
                let draft = self.class_draft(event_name)?;
                if draft.parts.outer_fq_name.is_empty() {
                    draft.parts.outer_fq_name = owner;
                }
                // declared inside a method body
                if method_name.is_some() && !draft.parts.flags.is_anonymous() {
                    draft.parts.flags = draft.parts.flags.with(JvmFlags::LOCAL);
                }
                Ok(())
            }
            ClassFileEvent::InnerClass {
                name,
                outer_name,
                inner_name,
                access,
            } => {
                let draft = self.class_draft(event_name)?;
                if name == draft.name {
                    // nested classes keep their declared visibility and
                    // static bit only in the InnerClasses entry
                    let nested_mask = JvmFlags::PUBLIC
                        | JvmFlags::PRIVATE
                        | JvmFlags::PROTECTED
                        | JvmFlags::STATIC;
                    draft.parts.flags = draft
                        .parts
                        .flags
                        .without(nested_mask)
                        .with(access & nested_mask);
                    if inner_name.is_none() {
                        draft.parts.flags = draft
                            .parts
                            .flags
                            .without(JvmFlags::LOCAL)
                            .with(JvmFlags::ANONYMOUS);
                    } else if outer_name.is_none() {
                        draft.parts.flags = draft.parts.flags.with(JvmFlags::LOCAL);
                    }
                    if let Some(outer) = outer_name {
                        draft.parts.outer_fq_name = outer;
                    }
                }
                Ok(())
            }
            ClassFileEvent::PermittedSubclass { name } => {
                let draft = self.class_draft(event_name)?;
                draft.parts.flags = draft.parts.flags.with(JvmFlags::SEALED);
                self.add_usage(Usage::class(name.as_str()));
                self.add_usage(Usage::class_permits(name));
                Ok(())
            }
            ClassFileEvent::Annotation { descriptor, args } => {
                self.on_annotation(event_name, &descriptor, args)
            }
            ClassFileEvent::ParameterAnnotation {
                parameter,
                descriptor,
                args,
            } => self.on_parameter_annotation(event_name, parameter, &descriptor, args),
            ClassFileEvent::AnnotationDefault { value } => {
                self.method_draft(event_name)?;
                self.add_value_usages(&value)?;
                if let Some(MemberDraft::Method(method)) = &mut self.member {
                    method.default_value = Some(value);
                }
                Ok(())
            }
            ClassFileEvent::Field {
                access,
                name,
                descriptor,
                signature,
            } => {
                self.close_member(event_name)?;
                let ty = self.parse_field_type(&descriptor)?;
                let flags = JvmFlags::new(access);
                self.add_class_usage(&ty);
                self.member = Some(MemberDraft::Field(FieldDraft {
                    skipped: self.library_mode && flags.is_private(),
                    flags,
                    name,
                    signature,
                    ty,
                    annotations: Vec::new(),
                }));
                Ok(())
            }
            ClassFileEvent::Method {
                access,
                name,
                descriptor,
                signature,
                exceptions,
            } => {
                self.close_member(event_name)?;
                let (args, ret) = self.parse_method_type(&descriptor)?;
                let exceptions = exceptions
                    .iter()
                    .map(|e| self.parse_type_name(e))
                    .collect::<Result<Vec<_>>>()?;
                for ty in args.iter().chain(iter::once(&ret)).chain(exceptions.iter()) {
                    self.add_class_usage(ty);
                }
                if let Some(signature) = signature.as_deref() {
                    self.add_generic_bound_usages(signature)?;
                }
                let flags = JvmFlags::new(access);
                self.member = Some(MemberDraft::Method(MethodDraft {
                    skipped: self.library_mode && flags.is_private(),
                    flags,
                    name,
                    signature,
                    args,
                    ret,
                    exceptions,
                    annotations: Vec::new(),
                    param_annotations: Vec::new(),
                    default_value: None,
                }));
                Ok(())
            }
            ClassFileEvent::Instruction(insn) => {
                self.method_draft(event_name)?;
                if self.library_mode {
                    return Ok(());
                }
                self.on_instruction(insn)
            }
            ClassFileEvent::MemberEnd => {
                if self.member.is_none() {
                    return Err(self.unexpected(event_name));
                }
                self.close_member(event_name)
            }
        }
    }

    /// Finalize the node. Fails when no header was seen.
    pub fn finish(mut self) -> Result<Node> {
        if let Some(member) = self.member.take() {
            self.finish_member(member);
        }

        let sites = std::mem::take(&mut self.annotation_sites);
        for (class, site) in sites {
            self.add_usage(Usage::annotation(
                class,
                site.arg_names.unwrap_or_default(),
                site.targets,
            ));
        }

        let usages = std::mem::take(&mut self.usages);
        let metadata = std::mem::take(&mut self.metadata);
        let node = match std::mem::replace(&mut self.state, State::Initial) {
            State::Initial => return Err(self.corrupt("no class or module header")),
            State::Class(draft) => {
                let core = NodeCore::new(draft.name, self.out_file_hash, usages, metadata);
                Node::Class(JvmClass::new(core, draft.parts))
            }
            State::Module(draft) => {
                let core = NodeCore::new(draft.name, self.out_file_hash, usages, metadata);
                Node::Module(JvmModule::new(
                    core,
                    draft.flags,
                    draft.version,
                    draft.requires,
                    draft.exports,
                ))
            }
        };

        tracing::debug!(
            path = %self.path.display(),
            node = %node.reference_id(),
            usages = node.core().usages().len(),
            library = self.library_mode,
            "node finalized"
        );
        Ok(node)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // State handling
    // ═══════════════════════════════════════════════════════════════════════

    fn state_name(&self) -> &'static str {
        match (&self.state, &self.member) {
            (_, Some(MemberDraft::Field(_))) => "field",
            (_, Some(MemberDraft::Method(_))) => "method",
            (State::Initial, None) => "initial",
            (State::Class(_), None) => "class",
            (State::Module(_), None) => "module",
        }
    }

    fn unexpected(&self, event: &'static str) -> DepGraphError {
        DepGraphError::UnexpectedEvent {
            path: self.path.clone(),
            event,
            state: self.state_name(),
        }
    }

    fn corrupt(&self, cause: impl fmt::Display) -> DepGraphError {
        DepGraphError::corrupt(&self.path, cause.to_string())
    }

    fn expect_initial(&self, event: &'static str) -> Result<()> {
        match self.state {
            State::Initial => Ok(()),
            _ => Err(self.unexpected(event)),
        }
    }

    fn class_draft(&mut self, event: &'static str) -> Result<&mut ClassDraft> {
        if !matches!(self.state, State::Class(_)) {
            return Err(self.unexpected(event));
        }
        match &mut self.state {
            State::Class(draft) => Ok(&mut **draft),
            _ => Err(DepGraphError::corrupt(&self.path, "class state lost")),
        }
    }

    fn module_draft(&mut self, event: &'static str) -> Result<&mut ModuleDraft> {
        if !matches!(self.state, State::Module(_)) {
            return Err(self.unexpected(event));
        }
        match &mut self.state {
            State::Module(draft) => Ok(draft),
            _ => Err(DepGraphError::corrupt(&self.path, "module state lost")),
        }
    }

    /// Validates that a method is open
    fn method_draft(&mut self, event: &'static str) -> Result<()> {
        match (&self.state, &self.member) {
            (State::Class(_), Some(MemberDraft::Method(_))) => Ok(()),
            _ => Err(self.unexpected(event)),
        }
    }

    fn close_member(&mut self, event: &'static str) -> Result<()> {
        self.class_draft(event)?;
        if let Some(member) = self.member.take() {
            self.finish_member(member);
        }
        Ok(())
    }

    fn finish_member(&mut self, member: MemberDraft) {
        let State::Class(draft) = &mut self.state else {
            return;
        };
        match member {
            MemberDraft::Field(field) if !field.skipped => {
                draft.parts.fields.push(JvmField::new(ProtoMember::new(
                    field.flags,
                    field.signature,
                    field.name,
                    field.ty,
                    field.annotations,
                )));
            }
            MemberDraft::Method(method) if !method.skipped => {
                draft.parts.methods.push(JvmMethod::new(
                    ProtoMember::new(
                        method.flags,
                        method.signature,
                        method.name,
                        method.ret,
                        method.annotations,
                    ),
                    method.args,
                    method.param_annotations,
                    method.exceptions,
                    method.default_value,
                ));
            }
            _ => {}
        }
    }

    fn begin_class(
        &mut self,
        access: u32,
        name: String,
        signature: Option<String>,
        super_name: Option<String>,
        interfaces: Vec<String>,
    ) -> Result<()> {
        let mut flags = JvmFlags::new(access);
        if self.library_mode {
            flags = flags.with(JvmFlags::LIBRARY);
        }
        if let Some(signature) = signature.as_deref() {
            self.add_generic_bound_usages(signature)?;
        }

        let super_fq_name = super_name.unwrap_or_default();
        if !super_fq_name.is_empty() {
            self.add_usage(Usage::class(super_fq_name.as_str()));
        }
        for interface in &interfaces {
            self.add_usage(Usage::class(interface.as_str()));
        }
        let package = package_of(&name);
        if !package.is_empty() {
            self.add_usage(Usage::import_package_on_demand(package));
        }

        self.state = State::Class(Box::new(ClassDraft {
            name,
            parts: JvmClassParts {
                flags,
                signature,
                super_fq_name,
                interfaces,
                ..Default::default()
            },
        }));
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Usages
    // ═══════════════════════════════════════════════════════════════════════

    fn add_usage(&mut self, usage: Usage) {
        if self.library_mode {
            return;
        }
        if usage.owner().name() == OBJECT_CLASS_NAME {
            return;
        }
        self.usages.insert(usage);
    }

    fn add_class_usage(&mut self, ty: &TypeRepr) {
        if let Some(class) = ty.class_name() {
            self.add_usage(Usage::class(class));
        }
    }

    fn add_instantiation(&mut self, ty: &TypeRepr) {
        if let Some(class) = ty.class_name() {
            self.add_usage(Usage::class(class));
            self.add_usage(Usage::class_new(class));
        }
    }

    fn add_generic_bound_usages(&mut self, signature: &str) -> Result<()> {
        let bounds = generic_bound_classes(signature).map_err(|e| self.corrupt(e))?;
        for bound in bounds {
            self.add_usage(Usage::class_as_generic_bound(bound));
        }
        Ok(())
    }

    fn add_handle_usage(&mut self, handle: &Handle) {
        let owner = handle.owner.as_str();
        if handle.kind.is_field() {
            self.add_usage(Usage::field(owner, handle.name.as_str(), &handle.descriptor));
            if handle.kind.is_field_write() {
                self.add_usage(Usage::field_assign(owner, handle.name.as_str(), &handle.descriptor));
            }
        } else {
            self.add_usage(Usage::method(owner, handle.name.as_str(), &handle.descriptor));
        }
    }

    fn add_constant_usages(&mut self, constant: &Constant) -> Result<()> {
        match constant {
            Constant::Type(descriptor) if descriptor.starts_with('(') => {
                let (args, ret) = self.parse_method_type(descriptor)?;
                for ty in args.iter().chain(iter::once(&ret)) {
                    self.add_class_usage(ty);
                }
            }
            Constant::Type(descriptor) => {
                let ty = self.parse_field_type(descriptor)?;
                self.add_class_usage(&ty);
            }
            Constant::Handle(handle) => self.add_handle_usage(handle),
            Constant::Other => {}
        }
        Ok(())
    }

    /// Lambda proxies: the call site instantiates the functional interface
    /// and exposes its single abstract method
    fn add_lambda_usages(&mut self, name: &str, descriptor: &str, args: &[Constant]) -> Result<()> {
        let (_, interface_ty) = self.parse_method_type(descriptor)?;
        let Some(interface) = interface_ty.class_name() else {
            return Ok(());
        };
        if let Some(Constant::Type(sam_descriptor)) = args.first() {
            self.add_usage(Usage::method(interface, name, sam_descriptor));
        }
        self.add_usage(Usage::class(interface));
        self.add_usage(Usage::class_new(interface));
        Ok(())
    }

    fn add_value_usages(&mut self, value: &AnnotationValue) -> Result<()> {
        match value {
            AnnotationValue::Class(ty) => self.add_class_usage(ty),
            AnnotationValue::Enum { descriptor, value } => {
                let ty = self.parse_field_type(descriptor)?;
                if let Some(owner) = ty.class_name() {
                    self.add_usage(Usage::class(owner));
                    self.add_usage(Usage::field(owner, value.as_str(), descriptor));
                }
            }
            AnnotationValue::Annotation { descriptor, args } => {
                let class = self.annotation_class(descriptor)?;
                self.add_usage(Usage::class(class));
                for (_, nested) in args {
                    self.add_value_usages(nested)?;
                }
            }
            AnnotationValue::Array(items) => {
                for item in items {
                    self.add_value_usages(item)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn on_instruction(&mut self, insn: Insn) -> Result<()> {
        match insn {
            Insn::Type { op, type_name } => {
                let ty = self.parse_type_name(&type_name)?;
                match op {
                    TypeOp::New | TypeOp::ANewArray => self.add_instantiation(&ty),
                    TypeOp::CheckCast | TypeOp::InstanceOf => self.add_class_usage(&ty),
                }
            }
            Insn::Field {
                op,
                owner,
                name,
                descriptor,
            } => {
                self.add_usage(Usage::field(owner.as_str(), name.as_str(), &descriptor));
                if op.is_write() {
                    self.add_usage(Usage::field_assign(owner, name, &descriptor));
                } else {
                    let ty = self.parse_field_type(&descriptor)?;
                    self.add_class_usage(&ty);
                }
            }
            Insn::Method {
                owner,
                name,
                descriptor,
            } => {
                // array owners come from calls like `int[].clone()`
                let owner_ty = self.parse_type_name(&owner)?;
                let (_, ret) = self.parse_method_type(&descriptor)?;
                if let Some(owner) = owner_ty.class_name() {
                    self.add_usage(Usage::method(owner, name, &descriptor));
                }
                self.add_class_usage(&ret);
            }
            Insn::InvokeDynamic {
                name,
                descriptor,
                bootstrap,
                bootstrap_args,
            } => {
                if bootstrap.owner == LAMBDA_METAFACTORY {
                    self.add_lambda_usages(&name, &descriptor, &bootstrap_args)?;
                }
                self.add_handle_usage(&bootstrap);
                for arg in &bootstrap_args {
                    self.add_constant_usages(arg)?;
                }
            }
            Insn::Ldc(constant) => self.add_constant_usages(&constant)?,
            Insn::MultiANewArray { descriptor } => {
                let ty = self.parse_field_type(&descriptor)?;
                self.add_instantiation(&ty);
            }
            Insn::TryCatch { exception_type } => {
                if let Some(exception) = exception_type {
                    let ty = self.parse_type_name(&exception)?;
                    self.add_class_usage(&ty);
                }
            }
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Annotations
    // ═══════════════════════════════════════════════════════════════════════

    fn annotation_class(&self, descriptor: &str) -> Result<String> {
        match self.parse_field_type(descriptor)? {
            TypeRepr::Class(name) => Ok(name),
            _ => Err(self.corrupt(format!("annotation type {} is not a class", descriptor))),
        }
    }

    fn record_annotation_site(&mut self, class: &str, args: &AnnotationArgs, target: ElemType) {
        let names: BTreeSet<String> = args.iter().map(|(name, _)| name.clone()).collect();
        let sites = self.annotation_sites.entry(class.to_string()).or_default();
        sites.arg_names = Some(match sites.arg_names.take() {
            Some(previous) => previous.intersection(&names).cloned().collect(),
            None => names,
        });
        sites.targets.insert(target);
    }

    /// Shared part of element and parameter annotations; returns the
    /// annotation class and content hash
    fn visit_annotation(
        &mut self,
        descriptor: &str,
        args: &AnnotationArgs,
        target: ElemType,
    ) -> Result<ElementAnnotation> {
        let class = self.annotation_class(descriptor)?;
        self.record_annotation_site(&class, args, target);
        self.add_usage(Usage::class(class.as_str()));
        for (_, value) in args {
            self.add_value_usages(value)?;
        }
        let content_hash = self.trackers.content_hash(&class, args);
        Ok(ElementAnnotation::new(class, content_hash))
    }

    fn on_annotation(
        &mut self,
        event: &'static str,
        descriptor: &str,
        args: AnnotationArgs,
    ) -> Result<()> {
        let target = match (&self.state, &self.member) {
            (State::Class(_), Some(MemberDraft::Field(_))) => ElemType::Field,
            (State::Class(_), Some(MemberDraft::Method(m))) if m.name == "<init>" => {
                ElemType::Constructor
            }
            (State::Class(_), Some(MemberDraft::Method(_))) => ElemType::Method,
            (State::Class(draft), None) if draft.parts.flags.is_annotation() => {
                ElemType::AnnotationType
            }
            (State::Class(_), None) => ElemType::Type,
            (State::Module(_), _) => ElemType::Module,
            (State::Initial, _) => return Err(self.unexpected(event)),
        };

        let annotation = self.visit_annotation(descriptor, &args, target)?;
        if let Some(member) = &mut self.member {
            match member {
                MemberDraft::Field(field) => field.annotations.push(annotation),
                MemberDraft::Method(method) => method.annotations.push(annotation),
            }
            return Ok(());
        }
        if target == ElemType::Module {
            return Ok(());
        }
        self.apply_class_annotation(annotation.annotation_class().name(), &args);
        if let State::Class(draft) = &mut self.state {
            draft.parts.annotations.push(annotation);
        }
        Ok(())
    }

    fn on_parameter_annotation(
        &mut self,
        event: &'static str,
        parameter: u32,
        descriptor: &str,
        args: AnnotationArgs,
    ) -> Result<()> {
        self.method_draft(event)?;
        let annotation = self.visit_annotation(descriptor, &args, ElemType::Parameter)?;
        if let Some(MemberDraft::Method(method)) = &mut self.member {
            method
                .param_annotations
                .push(ParamAnnotation::new(parameter, annotation));
        }
        Ok(())
    }

    /// Annotations that shape the class node itself
    fn apply_class_annotation(&mut self, class: &str, args: &AnnotationArgs) {
        if class == KOTLIN_METADATA_ANNOTATION {
            let payload = content_hash(args).to_be_bytes().to_vec();
            self.metadata.push(Metadata::new(MetadataTag::kotlin(), payload));
            return;
        }

        let State::Class(draft) = &mut self.state else {
            return;
        };
        match class {
            TARGET_ANNOTATION => {
                draft.parts.annotation_targets = args
                    .iter()
                    .filter(|(name, _)| name == "value")
                    .flat_map(|(_, value)| enum_constants(value))
                    .filter_map(ElemType::from_name)
                    .collect();
            }
            RETENTION_ANNOTATION => {
                draft.parts.retention_policy = args
                    .iter()
                    .filter(|(name, _)| name == "value")
                    .flat_map(|(_, value)| enum_constants(value))
                    .find_map(RetentionPolicy::from_name);
            }
            DEPRECATED_ANNOTATION => {
                draft.parts.flags = draft.parts.flags.with(JvmFlags::DEPRECATED);
            }
            _ if GENERATED_ANNOTATIONS.contains(&class) => {
                draft.parts.flags = draft.parts.flags.with(JvmFlags::GENERATED);
            }
            _ => {}
        }
    }

    // ═══════════════════════════════════════════════════════════════════════
    // Descriptor parsing (failures are corrupt input)
    // ═══════════════════════════════════════════════════════════════════════

    fn parse_field_type(&self, descriptor: &str) -> Result<TypeRepr> {
        TypeRepr::parse_field_descriptor(descriptor).map_err(|e| self.corrupt(e))
    }

    fn parse_method_type(&self, descriptor: &str) -> Result<(Vec<TypeRepr>, TypeRepr)> {
        TypeRepr::parse_method_descriptor(descriptor).map_err(|e| self.corrupt(e))
    }

    fn parse_type_name(&self, name: &str) -> Result<TypeRepr> {
        TypeRepr::from_internal_name(name).map_err(|e| self.corrupt(e))
    }
}

/// Enum constant names in a value or array of values
fn enum_constants(value: &AnnotationValue) -> Vec<&str> {
    match value {
        AnnotationValue::Enum { value, .. } => vec![value.as_str()],
        AnnotationValue::Array(items) => items.iter().flat_map(enum_constants).collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::builder::events::{FieldOp, HandleKind};
    use crate::features::diff::{deep_diff, DiffCapable};
    use crate::features::node::{ClassDiff, NodeDiff};
    use pretty_assertions::assert_eq;

    fn registry() -> Arc<AnnotationTrackerRegistry> {
        Arc::new(AnnotationTrackerRegistry::new())
    }

    fn header(name: &str) -> ClassFileEvent {
        ClassFileEvent::ClassHeader {
            access: JvmFlags::PUBLIC,
            name: name.to_string(),
            signature: None,
            super_name: Some(OBJECT_CLASS_NAME.to_string()),
            interfaces: vec![],
        }
    }

    fn method(name: &str, descriptor: &str) -> ClassFileEvent {
        ClassFileEvent::Method {
            access: JvmFlags::PUBLIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            exceptions: vec![],
        }
    }

    fn call(owner: &str, name: &str, descriptor: &str) -> ClassFileEvent {
        ClassFileEvent::Instruction(Insn::Method {
            owner: owner.to_string(),
            name: name.to_string(),
            descriptor: descriptor.to_string(),
        })
    }

    fn build(events: Vec<ClassFileEvent>) -> Result<Node> {
        NodeBuilder::build("out/a/A.class", events, &BuilderConfig::default(), registry())
    }

    fn build_class(events: Vec<ClassFileEvent>) -> JvmClass {
        match build(events) {
            Ok(Node::Class(class)) => class,
            other => panic!("expected class node, got {:?}", other),
        }
    }

    fn usages(class: &JvmClass) -> HashSet<Usage> {
        class.usages().cloned().collect()
    }

    #[test]
    fn test_method_call_usages() {
        let class = build_class(vec![
            header("a/A"),
            method("foo", "()V"),
            call("a/B", "bar", "()La/R;"),
            ClassFileEvent::MemberEnd,
        ]);
        let usages = usages(&class);
        assert!(usages.contains(&Usage::method("a/B", "bar", "()La/R;")));
        assert!(usages.contains(&Usage::class("a/R")));
        assert!(usages.contains(&Usage::import_package_on_demand("a")));
        assert!(!usages.iter().any(|u| u.owner().name() == OBJECT_CLASS_NAME));
        assert_eq!(class.methods().len(), 1);
        assert_eq!(class.superclass(), None);
    }

    #[test]
    fn test_instantiation_and_arrays() {
        let class = build_class(vec![
            header("a/A"),
            method("foo", "()V"),
            ClassFileEvent::Instruction(Insn::Type {
                op: TypeOp::New,
                type_name: "a/B".to_string(),
            }),
            ClassFileEvent::Instruction(Insn::Type {
                op: TypeOp::ANewArray,
                type_name: "a/C".to_string(),
            }),
            ClassFileEvent::Instruction(Insn::Type {
                op: TypeOp::New,
                type_name: OBJECT_CLASS_NAME.to_string(),
            }),
            ClassFileEvent::Instruction(Insn::MultiANewArray {
                descriptor: "[[La/D;".to_string(),
            }),
        ]);
        let usages = usages(&class);
        for name in ["a/B", "a/C", "a/D"] {
            assert!(usages.contains(&Usage::class(name)), "{name}");
            assert!(usages.contains(&Usage::class_new(name)), "{name}");
        }
        assert!(!usages.contains(&Usage::class_new(OBJECT_CLASS_NAME)));
    }

    #[test]
    fn test_field_access_usages() {
        let class = build_class(vec![
            header("a/A"),
            method("foo", "()V"),
            ClassFileEvent::Instruction(Insn::Field {
                op: FieldOp::GetField,
                owner: "a/B".to_string(),
                name: "x".to_string(),
                descriptor: "La/T;".to_string(),
            }),
            ClassFileEvent::Instruction(Insn::Field {
                op: FieldOp::PutStatic,
                owner: "a/B".to_string(),
                name: "y".to_string(),
                descriptor: "I".to_string(),
            }),
        ]);
        let usages = usages(&class);
        assert!(usages.contains(&Usage::field("a/B", "x", "La/T;")));
        assert!(usages.contains(&Usage::class("a/T")));
        assert!(!usages.contains(&Usage::field_assign("a/B", "x", "La/T;")));
        assert!(usages.contains(&Usage::field("a/B", "y", "I")));
        assert!(usages.contains(&Usage::field_assign("a/B", "y", "I")));
    }

    #[test]
    fn test_lambda_metafactory() {
        let class = build_class(vec![
            header("a/A"),
            method("foo", "()V"),
            ClassFileEvent::Instruction(Insn::InvokeDynamic {
                name: "apply".to_string(),
                descriptor: "()Ljava/util/function/Function;".to_string(),
                bootstrap: Handle {
                    kind: HandleKind::InvokeStatic,
                    owner: LAMBDA_METAFACTORY.to_string(),
                    name: "metafactory".to_string(),
                    descriptor: "(Ljava/lang/invoke/MethodHandles$Lookup;)V".to_string(),
                },
                bootstrap_args: vec![
                    Constant::Type("(Ljava/lang/Object;)Ljava/lang/Object;".to_string()),
                    Constant::Handle(Handle {
                        kind: HandleKind::InvokeStatic,
                        owner: "a/A".to_string(),
                        name: "lambda$foo$0".to_string(),
                        descriptor: "(La/X;)La/Y;".to_string(),
                    }),
                    Constant::Type("(La/X;)La/Y;".to_string()),
                ],
            }),
        ]);
        let usages = usages(&class);
        let function = "java/util/function/Function";
        assert!(usages.contains(&Usage::method(
            function,
            "apply",
            "(Ljava/lang/Object;)Ljava/lang/Object;"
        )));
        assert!(usages.contains(&Usage::class_new(function)));
        assert!(usages.contains(&Usage::method("a/A", "lambda$foo$0", "(La/X;)La/Y;")));
        assert!(usages.contains(&Usage::class("a/X")));
        assert!(usages.contains(&Usage::class("a/Y")));
    }

    #[test]
    fn test_permitted_subclasses_and_generic_bounds() {
        let class = build_class(vec![
            ClassFileEvent::ClassHeader {
                access: JvmFlags::PUBLIC | JvmFlags::ABSTRACT,
                name: "a/Shape".to_string(),
                signature: Some("<T:La/Unit;>Ljava/lang/Object;".to_string()),
                super_name: Some(OBJECT_CLASS_NAME.to_string()),
                interfaces: vec!["a/I".to_string()],
            },
            ClassFileEvent::PermittedSubclass {
                name: "a/Circle".to_string(),
            },
        ]);
        assert!(class.is_sealed());
        let usages = usages(&class);
        assert!(usages.contains(&Usage::class("a/Circle")));
        assert!(usages.contains(&Usage::class_permits("a/Circle")));
        assert!(usages.contains(&Usage::class_as_generic_bound("a/Unit")));
        assert!(usages.contains(&Usage::class("a/I")));
    }

    #[test]
    fn test_annotation_bookkeeping() {
        let ann = |args: Vec<(&str, AnnotationValue)>| ClassFileEvent::Annotation {
            descriptor: "La/Ann;".to_string(),
            args: args
                .into_iter()
                .map(|(n, v)| (n.to_string(), v))
                .collect(),
        };
        let class = build_class(vec![
            header("a/A"),
            ann(vec![("a", AnnotationValue::Int(1)), ("b", AnnotationValue::Int(2))]),
            method("m", "()V"),
            ann(vec![("a", AnnotationValue::Int(3))]),
            ClassFileEvent::MemberEnd,
        ]);
        let usages = usages(&class);
        assert!(usages.contains(&Usage::annotation(
            "a/Ann",
            ["a".to_string()],
            [ElemType::Type, ElemType::Method]
        )));
        assert_eq!(class.annotations().len(), 1);
        assert_eq!(class.annotations()[0].content_hash(), None);
        assert_eq!(class.methods()[0].proto().annotations().len(), 1);
    }

    #[test]
    fn test_annotation_type_targets_and_retention() {
        let enum_value = |ty: &str, v: &str| AnnotationValue::enum_constant(ty, v);
        let class = build_class(vec![
            ClassFileEvent::ClassHeader {
                access: JvmFlags::PUBLIC | JvmFlags::INTERFACE | JvmFlags::ANNOTATION,
                name: "a/Ann".to_string(),
                signature: None,
                super_name: Some(OBJECT_CLASS_NAME.to_string()),
                interfaces: vec!["java/lang/annotation/Annotation".to_string()],
            },
            ClassFileEvent::Annotation {
                descriptor: "Ljava/lang/annotation/Target;".to_string(),
                args: vec![(
                    "value".to_string(),
                    AnnotationValue::Array(vec![
                        enum_value("Ljava/lang/annotation/ElementType;", "METHOD"),
                        enum_value("Ljava/lang/annotation/ElementType;", "TYPE_USE"),
                    ]),
                )],
            },
            ClassFileEvent::Annotation {
                descriptor: "Ljava/lang/annotation/Retention;".to_string(),
                args: vec![(
                    "value".to_string(),
                    enum_value("Ljava/lang/annotation/RetentionPolicy;", "RUNTIME"),
                )],
            },
            method("value", "()I"),
            ClassFileEvent::AnnotationDefault {
                value: AnnotationValue::Int(5),
            },
            ClassFileEvent::MemberEnd,
        ]);
        assert_eq!(
            class.annotation_targets(),
            &[ElemType::Method, ElemType::TypeUse]
        );
        assert_eq!(class.retention_policy(), Some(RetentionPolicy::Runtime));
        assert_eq!(
            class.methods()[0].default_value(),
            Some(&AnnotationValue::Int(5))
        );
        let usages = usages(&class);
        assert!(usages.contains(&Usage::annotation(
            TARGET_ANNOTATION,
            ["value".to_string()],
            [ElemType::AnnotationType]
        )));
    }

    #[test]
    fn test_inner_local_anonymous_and_generated() {
        let class = build_class(vec![
            header("a/A$1"),
            ClassFileEvent::OuterClass {
                owner: "a/A".to_string(),
                method_name: Some("foo".to_string()),
            },
            ClassFileEvent::InnerClass {
                name: "a/A$1".to_string(),
                outer_name: None,
                inner_name: None,
                access: 0,
            },
            ClassFileEvent::Annotation {
                descriptor: "Ljavax/annotation/processing/Generated;".to_string(),
                args: vec![],
            },
        ]);
        assert!(class.is_anonymous());
        assert!(!class.is_local());
        assert!(class.is_generated());
        assert_eq!(class.outer_fq_name(), "a/A");
        assert!(class.is_inner_class());

        let local = build_class(vec![
            header("a/A$1Local"),
            ClassFileEvent::InnerClass {
                name: "a/A$1Local".to_string(),
                outer_name: None,
                inner_name: Some("Local".to_string()),
                access: 0,
            },
        ]);
        assert!(local.is_local());

        let in_method = build_class(vec![
            header("a/A$2Task"),
            ClassFileEvent::OuterClass {
                owner: "a/A".to_string(),
                method_name: Some("run".to_string()),
            },
        ]);
        assert!(in_method.is_local());
        assert!(!in_method.is_anonymous());
        assert_eq!(in_method.outer_fq_name(), "a/A");

        let member = build_class(vec![
            header("a/A$Member"),
            ClassFileEvent::OuterClass {
                owner: "a/A".to_string(),
                method_name: None,
            },
        ]);
        assert!(!member.is_local());
    }

    #[test]
    fn test_nested_class_flags_come_from_inner_class_entry() {
        let nested = |access: u32| {
            build_class(vec![
                header("a/Outer$N"),
                ClassFileEvent::InnerClass {
                    name: "a/Outer$N".to_string(),
                    outer_name: Some("a/Outer".to_string()),
                    inner_name: Some("N".to_string()),
                    access,
                },
            ])
        };
        let past = nested(JvmFlags::PROTECTED | JvmFlags::STATIC);
        let now = nested(JvmFlags::PUBLIC | JvmFlags::STATIC);

        assert!(past.flags().is_protected());
        assert!(!past.flags().is_public());
        assert!(past.flags().is_static());
        assert!(now.flags().is_public());

        let diff = ClassDiff::new(&past, &now);
        assert!(diff.flags_changed());
        assert!(diff.added_flags().is_public());
        assert!(diff.removed_flags().is_protected());

        let private = nested(JvmFlags::PRIVATE);
        assert!(private.flags().is_private());
        assert!(!private.flags().is_static());
        assert!(ClassDiff::new(&now, &private).removed_flags().is_static());

        // entries describing other nested classes leave this class alone
        let outer = build_class(vec![
            header("a/Outer"),
            ClassFileEvent::InnerClass {
                name: "a/Outer$N".to_string(),
                outer_name: Some("a/Outer".to_string()),
                inner_name: Some("N".to_string()),
                access: JvmFlags::PRIVATE | JvmFlags::STATIC,
            },
        ]);
        assert!(outer.flags().is_public());
        assert!(!outer.flags().is_static());
    }

    #[test]
    fn test_member_usages_on_object_are_suppressed() {
        let class = build_class(vec![
            header("a/A"),
            method("foo", "()V"),
            call(OBJECT_CLASS_NAME, "hashCode", "()I"),
            ClassFileEvent::Instruction(Insn::Field {
                op: FieldOp::GetField,
                owner: OBJECT_CLASS_NAME.to_string(),
                name: "x".to_string(),
                descriptor: "I".to_string(),
            }),
            call("a/B", "hashCode", "()I"),
            ClassFileEvent::MemberEnd,
        ]);
        let usages = usages(&class);
        assert!(!usages.iter().any(|u| u.owner().name() == OBJECT_CLASS_NAME));
        assert!(usages.contains(&Usage::method("a/B", "hashCode", "()I")));
    }

    #[test]
    fn test_kotlin_metadata_entry() {
        let kotlin = |k: i32| {
            build_class(vec![
                header("a/K"),
                ClassFileEvent::Annotation {
                    descriptor: "Lkotlin/Metadata;".to_string(),
                    args: vec![("k".to_string(), AnnotationValue::Int(k))],
                },
            ])
        };
        let (past, now) = (Node::Class(kotlin(1)), Node::Class(kotlin(2)));
        assert_eq!(now.metadata().len(), 1);
        assert_eq!(now.metadata()[0].tag(), &MetadataTag::kotlin());

        let d = now.difference(&past);
        let spec = d.metadata(&MetadataTag::kotlin()).map(|s| s.unchanged());
        assert_eq!(spec, Some(false));
        assert!(d.as_class().map_or(false, |c| c.methods().unchanged()));
    }

    #[test]
    fn test_library_mode() {
        let config = BuilderConfig {
            library_mode: true,
            ..Default::default()
        };
        let node = NodeBuilder::build(
            "lib.jar!/a/L.class",
            vec![
                header("a/L"),
                ClassFileEvent::Field {
                    access: JvmFlags::PRIVATE,
                    name: "secret".to_string(),
                    descriptor: "I".to_string(),
                    signature: None,
                },
                ClassFileEvent::MemberEnd,
                method("open", "()La/R;"),
                call("a/B", "bar", "()I"),
                ClassFileEvent::MemberEnd,
                ClassFileEvent::Method {
                    access: JvmFlags::PRIVATE,
                    name: "hidden".to_string(),
                    descriptor: "()V".to_string(),
                    signature: None,
                    exceptions: vec![],
                },
            ],
            &config,
            registry(),
        );
        let Ok(Node::Class(class)) = node else {
            panic!("expected class node");
        };
        assert!(class.is_library());
        assert_eq!(class.usages().count(), 0);
        assert!(class.fields().is_empty());
        assert_eq!(class.methods().len(), 1);
        assert_eq!(class.methods()[0].name(), "open");
    }

    #[test]
    fn test_module_node() {
        let node = build(vec![
            ClassFileEvent::ModuleHeader {
                name: "m.app".to_string(),
                access: 0,
                version: Some("1.0".to_string()),
            },
            ClassFileEvent::ModuleRequire {
                module: "m.lib".to_string(),
                access: JvmFlags::TRANSITIVE,
                version: None,
            },
            ClassFileEvent::ModuleExport {
                package: "a/api".to_string(),
                access: 0,
                modules: vec!["m.friend".to_string()],
            },
        ])
        .unwrap();
        let module = node.as_module().unwrap();
        assert_eq!(module.version(), "1.0");
        assert!(module.requires_transitive("m.lib"));
        assert!(module.exports_to("a/api", "m.friend"));
        let usages: HashSet<&Usage> = node.usages().collect();
        assert!(usages.contains(&Usage::module("m.lib")));
        assert!(usages.contains(&Usage::module("m.friend")));
    }

    #[test]
    fn test_out_of_order_events() {
        let err = build(vec![method("foo", "()V")]).unwrap_err();
        assert!(matches!(
            err,
            DepGraphError::UnexpectedEvent {
                event: "method",
                state: "initial",
                ..
            }
        ));

        let err = build(vec![header("a/A"), header("a/A")]).unwrap_err();
        assert!(matches!(err, DepGraphError::UnexpectedEvent { event: "class header", .. }));

        let err = build(vec![header("a/A"), call("a/B", "m", "()V")]).unwrap_err();
        assert!(matches!(err, DepGraphError::UnexpectedEvent { state: "class", .. }));

        let err = build(vec![header("a/A"), ClassFileEvent::MemberEnd]).unwrap_err();
        assert!(matches!(err, DepGraphError::UnexpectedEvent { .. }));
    }

    #[test]
    fn test_missing_header_and_bad_descriptor_are_corrupt() {
        let err = build(vec![]).unwrap_err();
        assert!(matches!(err, DepGraphError::CorruptClassFile { .. }));
        assert!(err.to_string().contains("out/a/A.class"));

        let err = build(vec![header("a/A"), method("foo", "(V")]).unwrap_err();
        assert!(matches!(err, DepGraphError::CorruptClassFile { .. }));
    }

    #[test]
    fn test_return_type_change_shows_in_caller_usages() {
        let caller = |descriptor: &str| {
            build(vec![
                header("a/A"),
                method("foo", "()V"),
                call("a/B", "bar", descriptor),
                ClassFileEvent::MemberEnd,
            ])
            .unwrap()
        };
        let past = caller("()I");
        let now = caller("()J");
        let diff = now.difference(&past);
        let NodeDiff::Class(class_diff) = &diff else {
            panic!("expected class diff");
        };
        assert_eq!(class_diff.usages().removed(), &[&Usage::method("a/B", "bar", "()I")]);
        assert_eq!(class_diff.usages().added(), &[&Usage::method("a/B", "bar", "()J")]);
        let past_usages: Vec<&Usage> = past.usages().collect();
        let now_usages: Vec<&Usage> = now.usages().collect();
        assert!(!deep_diff(past_usages.iter().copied(), now_usages.iter().copied()).unchanged());
    }
}
