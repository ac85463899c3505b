//! Structural callbacks delivered by the class-file reader
//!
//! One compiled unit arrives as a sequential stream: a class or module
//! header, class-level attributes, then fields and methods. Member-scoped
//! events (annotations, instructions) apply to the most recent `Field` or
//! `Method` until `MemberEnd`.

use crate::features::node::AnnotationValue;

pub type AnnotationArgs = Vec<(String, AnnotationValue)>;

#[derive(Debug, Clone, PartialEq)]
pub enum ClassFileEvent {
    ClassHeader {
        access: u32,
        /// Binary name, `a/b/C`
        name: String,
        signature: Option<String>,
        super_name: Option<String>,
        interfaces: Vec<String>,
    },
    ModuleHeader {
        name: String,
        access: u32,
        version: Option<String>,
    },
    ModuleRequire {
        module: String,
        access: u32,
        version: Option<String>,
    },
    ModuleExport {
        package: String,
        access: u32,
        modules: Vec<String>,
    },
    /// Enclosing class of a local or anonymous class; `method_name` is set
    /// when the class is declared inside a method body
    OuterClass {
        owner: String,
        method_name: Option<String>,
    },
    /// `InnerClasses` entry; only the entry describing this class matters
    InnerClass {
        name: String,
        outer_name: Option<String>,
        inner_name: Option<String>,
        access: u32,
    },
    PermittedSubclass {
        name: String,
    },
    /// Annotation on the current element (class, field or method)
    Annotation {
        descriptor: String,
        args: AnnotationArgs,
    },
    ParameterAnnotation {
        parameter: u32,
        descriptor: String,
        args: AnnotationArgs,
    },
    /// Default value of the current annotation-type element
    AnnotationDefault {
        value: AnnotationValue,
    },
    Field {
        access: u32,
        name: String,
        descriptor: String,
        signature: Option<String>,
    },
    Method {
        access: u32,
        name: String,
        descriptor: String,
        signature: Option<String>,
        exceptions: Vec<String>,
    },
    Instruction(Insn),
    MemberEnd,
}

impl ClassFileEvent {
    /// Short name used in error reports
    pub fn name(&self) -> &'static str {
        match self {
            ClassFileEvent::ClassHeader { .. } => "class header",
            ClassFileEvent::ModuleHeader { .. } => "module header",
            ClassFileEvent::ModuleRequire { .. } => "module requires",
            ClassFileEvent::ModuleExport { .. } => "module exports",
            ClassFileEvent::OuterClass { .. } => "outer class",
            ClassFileEvent::InnerClass { .. } => "inner class",
            ClassFileEvent::PermittedSubclass { .. } => "permitted subclass",
            ClassFileEvent::Annotation { .. } => "annotation",
            ClassFileEvent::ParameterAnnotation { .. } => "parameter annotation",
            ClassFileEvent::AnnotationDefault { .. } => "annotation default",
            ClassFileEvent::Field { .. } => "field",
            ClassFileEvent::Method { .. } => "method",
            ClassFileEvent::Instruction(_) => "instruction",
            ClassFileEvent::MemberEnd => "member end",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeOp {
    New,
    ANewArray,
    CheckCast,
    InstanceOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
}

impl FieldOp {
    pub fn is_write(&self) -> bool {
        matches!(self, FieldOp::PutField | FieldOp::PutStatic)
    }
}

/// `CONSTANT_MethodHandle` reference kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    GetField,
    GetStatic,
    PutField,
    PutStatic,
    InvokeVirtual,
    InvokeStatic,
    InvokeSpecial,
    NewInvokeSpecial,
    InvokeInterface,
}

impl HandleKind {
    pub fn is_field(&self) -> bool {
        matches!(
            self,
            HandleKind::GetField | HandleKind::GetStatic | HandleKind::PutField | HandleKind::PutStatic
        )
    }

    pub fn is_field_write(&self) -> bool {
        matches!(self, HandleKind::PutField | HandleKind::PutStatic)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Handle {
    pub kind: HandleKind,
    pub owner: String,
    pub name: String,
    pub descriptor: String,
}

/// Bootstrap method argument or loadable constant
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Class literal (field descriptor) or method type (method descriptor)
    Type(String),
    Handle(Handle),
    /// Numbers and strings, no dependency information
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Insn {
    Type {
        op: TypeOp,
        /// Internal name, or an array descriptor
        type_name: String,
    },
    Field {
        op: FieldOp,
        owner: String,
        name: String,
        descriptor: String,
    },
    Method {
        owner: String,
        name: String,
        descriptor: String,
    },
    InvokeDynamic {
        name: String,
        descriptor: String,
        bootstrap: Handle,
        bootstrap_args: Vec<Constant>,
    },
    Ldc(Constant),
    MultiANewArray {
        descriptor: String,
    },
    TryCatch {
        /// `None` for `finally` blocks
        exception_type: Option<String>,
    },
}
