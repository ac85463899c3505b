//! Symmetric read/write contract for every persisted entity
//!
//! `read_from(write_to(x))` yields a value equal to `x` up to the order of
//! usage sets, which are written grouped by usage kind.

use std::collections::HashSet;
use std::io::{Read, Write};

use super::codec::{GraphDataInput, GraphDataOutput};
use crate::errors::{DepGraphError, Result};
use crate::features::node::{
    AnnotationValue, ElementAnnotation, FileNode, JvmClass, JvmClassParts, JvmField, JvmMethod,
    JvmModule, Metadata, MetadataTag, ModulePackage, ModuleRequires, Node, NodeCore, NodeKind,
    ParamAnnotation, ProtoMember,
};
use crate::features::usage::{Usage, UsageKind};
use crate::shared::models::{ElemType, JvmFlags, ReferenceId, RetentionPolicy, TypeRepr};

pub trait Externalizable: Sized {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()>;

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self>;
}

fn write_all<W: Write, T: Externalizable>(out: &mut GraphDataOutput<W>, items: &[T]) -> Result<()> {
    out.write_collection(items.iter(), |o, item| item.write_to(o))
}

fn read_all<R: Read, T: Externalizable>(input: &mut GraphDataInput<R>) -> Result<Vec<T>> {
    input.read_collection(T::read_from)
}

impl Externalizable for ReferenceId {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(self.name())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(ReferenceId::from(input.read_string()?))
    }
}

impl Externalizable for String {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(self)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        input.read_string()
    }
}

impl Externalizable for JvmFlags {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_u32(self.bits())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(JvmFlags::new(input.read_u32()?))
    }
}

/// Stored as its descriptor
impl Externalizable for TypeRepr {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(&self.descriptor())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let descriptor = input.read_string()?;
        TypeRepr::parse_field_descriptor(&descriptor)
            .map_err(|_| DepGraphError::decode(format!("invalid type descriptor '{descriptor}'")))
    }
}

impl Externalizable for ElemType {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_u8(self.ordinal())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let ordinal = input.read_u8()?;
        ElemType::from_ordinal(ordinal)
            .ok_or_else(|| DepGraphError::decode(format!("unknown element type {ordinal}")))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Usages
// ═══════════════════════════════════════════════════════════════════════════

fn write_usage_body<W: Write>(out: &mut GraphDataOutput<W>, usage: &Usage) -> Result<()> {
    usage.owner().write_to(out)?;
    match usage {
        Usage::Class { .. }
        | Usage::ClassNew { .. }
        | Usage::ClassPermits { .. }
        | Usage::ClassAsGenericBound { .. }
        | Usage::Module { .. }
        | Usage::ImportPackageOnDemand { .. } => Ok(()),
        Usage::Field {
            name,
            descriptor_hash,
            ..
        }
        | Usage::FieldAssign {
            name,
            descriptor_hash,
            ..
        }
        | Usage::Method {
            name,
            descriptor_hash,
            ..
        } => {
            out.write_string(name)?;
            out.write_u64(*descriptor_hash)
        }
        Usage::ModulePackage { package, .. } => out.write_string(package),
        Usage::Annotation {
            used_arg_names,
            targets,
            ..
        } => {
            out.write_collection(used_arg_names.iter(), |o, name| o.write_string(name))?;
            out.write_collection(targets.iter(), |o, target| target.write_to(o))
        }
    }
}

fn read_usage_body<R: Read>(input: &mut GraphDataInput<R>, tag: u8) -> Result<Usage> {
    let kind = UsageKind::from_tag(tag)
        .ok_or_else(|| DepGraphError::decode(format!("unknown usage kind {tag}")))?;
    let owner = ReferenceId::read_from(input)?;
    let usage = match kind {
        UsageKind::Class => Usage::Class { owner },
        UsageKind::ClassNew => Usage::ClassNew { owner },
        UsageKind::ClassPermits => Usage::ClassPermits { owner },
        UsageKind::ClassAsGenericBound => Usage::ClassAsGenericBound { owner },
        UsageKind::Module => Usage::Module { owner },
        UsageKind::ImportPackageOnDemand => Usage::ImportPackageOnDemand { owner },
        UsageKind::Field | UsageKind::FieldAssign | UsageKind::Method => {
            let name = input.read_string()?;
            let descriptor_hash = input.read_u64()?;
            match kind {
                UsageKind::Field => Usage::Field {
                    owner,
                    name,
                    descriptor_hash,
                },
                UsageKind::FieldAssign => Usage::FieldAssign {
                    owner,
                    name,
                    descriptor_hash,
                },
                _ => Usage::Method {
                    owner,
                    name,
                    descriptor_hash,
                },
            }
        }
        UsageKind::ModulePackage => Usage::ModulePackage {
            owner,
            package: input.read_string()?,
        },
        UsageKind::Annotation => Usage::Annotation {
            owner,
            used_arg_names: input.read_collection(|i| i.read_string())?.into_iter().collect(),
            targets: read_all::<_, ElemType>(input)?.into_iter().collect(),
        },
    };
    Ok(usage)
}

impl Externalizable for Usage {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_u8(self.kind().tag())?;
        write_usage_body(out, self)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let tag = input.read_u8()?;
        read_usage_body(input, tag)
    }
}

/// Usage set, grouped by kind
pub fn write_usages<'u, W: Write>(
    out: &mut GraphDataOutput<W>,
    usages: impl IntoIterator<Item = &'u Usage>,
) -> Result<()> {
    out.write_grouped(usages, |u| u.kind().tag(), |o, u| write_usage_body(o, u))
}

pub fn read_usages<R: Read>(input: &mut GraphDataInput<R>) -> Result<HashSet<Usage>> {
    Ok(input.read_grouped(read_usage_body)?.into_iter().collect())
}

// ═══════════════════════════════════════════════════════════════════════════
// Annotations and metadata
// ═══════════════════════════════════════════════════════════════════════════

mod value_tag {
    pub const BOOL: u8 = 0;
    pub const BYTE: u8 = 1;
    pub const CHAR: u8 = 2;
    pub const SHORT: u8 = 3;
    pub const INT: u8 = 4;
    pub const LONG: u8 = 5;
    pub const FLOAT: u8 = 6;
    pub const DOUBLE: u8 = 7;
    pub const STRING: u8 = 8;
    pub const CLASS: u8 = 9;
    pub const ENUM: u8 = 10;
    pub const ANNOTATION: u8 = 11;
    pub const ARRAY: u8 = 12;
}

fn write_args<W: Write>(
    out: &mut GraphDataOutput<W>,
    args: &[(String, AnnotationValue)],
) -> Result<()> {
    out.write_collection(args.iter(), |o, (name, value)| {
        o.write_string(name)?;
        value.write_to(o)
    })
}

fn read_args<R: Read>(input: &mut GraphDataInput<R>) -> Result<Vec<(String, AnnotationValue)>> {
    input.read_collection(|i| Ok((i.read_string()?, AnnotationValue::read_from(i)?)))
}

impl Externalizable for AnnotationValue {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        match self {
            AnnotationValue::Bool(v) => {
                out.write_u8(value_tag::BOOL)?;
                out.write_bool(*v)
            }
            AnnotationValue::Byte(v) => {
                out.write_u8(value_tag::BYTE)?;
                out.write_i64(*v as i64)
            }
            AnnotationValue::Char(v) => {
                out.write_u8(value_tag::CHAR)?;
                out.write_i64(*v as i64)
            }
            AnnotationValue::Short(v) => {
                out.write_u8(value_tag::SHORT)?;
                out.write_i64(*v as i64)
            }
            AnnotationValue::Int(v) => {
                out.write_u8(value_tag::INT)?;
                out.write_i64(*v as i64)
            }
            AnnotationValue::Long(v) => {
                out.write_u8(value_tag::LONG)?;
                out.write_i64(*v)
            }
            AnnotationValue::Float(bits) => {
                out.write_u8(value_tag::FLOAT)?;
                out.write_u32(*bits)
            }
            AnnotationValue::Double(bits) => {
                out.write_u8(value_tag::DOUBLE)?;
                out.write_u64(*bits)
            }
            AnnotationValue::String(s) => {
                out.write_u8(value_tag::STRING)?;
                out.write_string(s)
            }
            AnnotationValue::Class(ty) => {
                out.write_u8(value_tag::CLASS)?;
                ty.write_to(out)
            }
            AnnotationValue::Enum { descriptor, value } => {
                out.write_u8(value_tag::ENUM)?;
                out.write_string(descriptor)?;
                out.write_string(value)
            }
            AnnotationValue::Annotation { descriptor, args } => {
                out.write_u8(value_tag::ANNOTATION)?;
                out.write_string(descriptor)?;
                write_args(out, args)
            }
            AnnotationValue::Array(items) => {
                out.write_u8(value_tag::ARRAY)?;
                write_all(out, items)
            }
        }
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let tag = input.read_u8()?;
        let narrow = |v: i64, kind: &str| DepGraphError::decode(format!("{kind} out of range: {v}"));
        let value = match tag {
            value_tag::BOOL => AnnotationValue::Bool(input.read_bool()?),
            value_tag::BYTE => {
                let v = input.read_i64()?;
                AnnotationValue::Byte(i8::try_from(v).map_err(|_| narrow(v, "byte"))?)
            }
            value_tag::CHAR => {
                let v = input.read_i64()?;
                AnnotationValue::Char(u16::try_from(v).map_err(|_| narrow(v, "char"))?)
            }
            value_tag::SHORT => {
                let v = input.read_i64()?;
                AnnotationValue::Short(i16::try_from(v).map_err(|_| narrow(v, "short"))?)
            }
            value_tag::INT => {
                let v = input.read_i64()?;
                AnnotationValue::Int(i32::try_from(v).map_err(|_| narrow(v, "int"))?)
            }
            value_tag::LONG => AnnotationValue::Long(input.read_i64()?),
            value_tag::FLOAT => AnnotationValue::Float(input.read_u32()?),
            value_tag::DOUBLE => AnnotationValue::Double(input.read_u64()?),
            value_tag::STRING => AnnotationValue::String(input.read_string()?),
            value_tag::CLASS => AnnotationValue::Class(TypeRepr::read_from(input)?),
            value_tag::ENUM => AnnotationValue::Enum {
                descriptor: input.read_string()?,
                value: input.read_string()?,
            },
            value_tag::ANNOTATION => AnnotationValue::Annotation {
                descriptor: input.read_string()?,
                args: read_args(input)?,
            },
            value_tag::ARRAY => AnnotationValue::Array(read_all(input)?),
            other => {
                return Err(DepGraphError::decode(format!(
                    "unknown annotation value tag {other}"
                )))
            }
        };
        Ok(value)
    }
}

impl Externalizable for ElementAnnotation {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.annotation_class().write_to(out)?;
        out.write_opt_u64(self.content_hash())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let class = ReferenceId::read_from(input)?;
        Ok(ElementAnnotation::new(class, input.read_opt_u64()?))
    }
}

impl Externalizable for ParamAnnotation {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_u32(self.param_index())?;
        self.annotation().write_to(out)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let index = input.read_u32()?;
        Ok(ParamAnnotation::new(index, ElementAnnotation::read_from(input)?))
    }
}

impl Externalizable for Metadata {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(self.tag().as_str())?;
        out.write_bytes(self.payload())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let tag = MetadataTag::new(input.read_string()?);
        Ok(Metadata::new(tag, input.read_bytes()?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Members
// ═══════════════════════════════════════════════════════════════════════════

impl Externalizable for ProtoMember {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.flags().write_to(out)?;
        out.write_opt_string(self.signature())?;
        out.write_string(self.name())?;
        self.ty().write_to(out)?;
        write_all(out, self.annotations())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(ProtoMember::new(
            JvmFlags::read_from(input)?,
            input.read_opt_string()?,
            input.read_string()?,
            TypeRepr::read_from(input)?,
            read_all(input)?,
        ))
    }
}

impl Externalizable for JvmField {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.proto().write_to(out)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(JvmField::new(ProtoMember::read_from(input)?))
    }
}

impl Externalizable for JvmMethod {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.proto().write_to(out)?;
        write_all(out, self.arg_types())?;
        write_all(out, self.param_annotations())?;
        write_all(out, self.exceptions())?;
        out.write_bool(self.default_value().is_some())?;
        match self.default_value() {
            Some(value) => value.write_to(out),
            None => Ok(()),
        }
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let proto = ProtoMember::read_from(input)?;
        let arg_types = read_all(input)?;
        let param_annotations = read_all(input)?;
        let exceptions = read_all(input)?;
        let default_value = if input.read_bool()? {
            Some(AnnotationValue::read_from(input)?)
        } else {
            None
        };
        Ok(JvmMethod::new(
            proto,
            arg_types,
            param_annotations,
            exceptions,
            default_value,
        ))
    }
}

impl Externalizable for ModuleRequires {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(self.name())?;
        self.flags().write_to(out)?;
        out.write_string(self.version())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(ModuleRequires::new(
            input.read_string()?,
            JvmFlags::read_from(input)?,
            input.read_string()?,
        ))
    }
}

impl Externalizable for ModulePackage {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_string(self.name())?;
        write_all(out, self.modules())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let name = input.read_string()?;
        Ok(ModulePackage::new(name, read_all(input)?))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Nodes
// ═══════════════════════════════════════════════════════════════════════════

impl Externalizable for NodeCore {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.id().write_to(out)?;
        out.write_u64(self.out_file_hash())?;
        write_usages(out, self.usages())?;
        write_all(out, self.metadata())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let id = ReferenceId::read_from(input)?;
        let out_file_hash = input.read_u64()?;
        let usages = read_usages(input)?;
        Ok(NodeCore::new(id, out_file_hash, usages, read_all(input)?))
    }
}

impl Externalizable for JvmClass {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.core().write_to(out)?;
        self.flags().write_to(out)?;
        out.write_opt_string(self.signature())?;
        out.write_string(self.superclass().unwrap_or(""))?;
        out.write_string(self.outer_fq_name())?;
        write_all(out, self.interfaces())?;
        write_all(out, self.fields())?;
        write_all(out, self.methods())?;
        write_all(out, self.annotations())?;
        write_all(out, self.annotation_targets())?;
        match self.retention_policy() {
            Some(policy) => {
                out.write_bool(true)?;
                out.write_u8(policy.ordinal())
            }
            None => out.write_bool(false),
        }
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let core = NodeCore::read_from(input)?;
        let flags = JvmFlags::read_from(input)?;
        let signature = input.read_opt_string()?;
        let super_fq_name = input.read_string()?;
        let outer_fq_name = input.read_string()?;
        let interfaces = read_all(input)?;
        let fields = read_all(input)?;
        let methods = read_all(input)?;
        let annotations = read_all(input)?;
        let annotation_targets = read_all(input)?;
        let retention_policy = if input.read_bool()? {
            let ordinal = input.read_u8()?;
            Some(RetentionPolicy::from_ordinal(ordinal).ok_or_else(|| {
                DepGraphError::decode(format!("unknown retention policy {ordinal}"))
            })?)
        } else {
            None
        };

        Ok(JvmClass::new(
            core,
            JvmClassParts {
                flags,
                signature,
                super_fq_name,
                outer_fq_name,
                interfaces,
                fields,
                methods,
                annotations,
                annotation_targets,
                retention_policy,
            },
        ))
    }
}

impl Externalizable for JvmModule {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.core().write_to(out)?;
        self.flags().write_to(out)?;
        out.write_string(self.version())?;
        write_all(out, self.requires())?;
        write_all(out, self.exports())
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(JvmModule::new(
            NodeCore::read_from(input)?,
            JvmFlags::read_from(input)?,
            input.read_string()?,
            read_all(input)?,
            read_all(input)?,
        ))
    }
}

impl Externalizable for FileNode {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        self.core().write_to(out)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        Ok(FileNode::new(NodeCore::read_from(input)?))
    }
}

fn write_node_body<W: Write>(out: &mut GraphDataOutput<W>, node: &Node) -> Result<()> {
    match node {
        Node::Class(class) => class.write_to(out),
        Node::Module(module) => module.write_to(out),
        Node::File(file) => file.write_to(out),
    }
}

fn read_node_body<R: Read>(input: &mut GraphDataInput<R>, tag: u8) -> Result<Node> {
    let kind = NodeKind::from_tag(tag)
        .ok_or_else(|| DepGraphError::decode(format!("unknown node kind {tag}")))?;
    Ok(match kind {
        NodeKind::Class => Node::Class(JvmClass::read_from(input)?),
        NodeKind::Module => Node::Module(JvmModule::read_from(input)?),
        NodeKind::File => Node::File(FileNode::read_from(input)?),
    })
}

impl Externalizable for Node {
    fn write_to<W: Write>(&self, out: &mut GraphDataOutput<W>) -> Result<()> {
        out.write_u8(self.kind().tag())?;
        write_node_body(out, self)
    }

    fn read_from<R: Read>(input: &mut GraphDataInput<R>) -> Result<Self> {
        let tag = input.read_u8()?;
        read_node_body(input, tag)
    }
}

/// Node collection, grouped by node kind
pub fn write_nodes<'n, W: Write>(
    out: &mut GraphDataOutput<W>,
    nodes: impl IntoIterator<Item = &'n Node>,
) -> Result<()> {
    out.write_grouped(nodes, |n| n.kind().tag(), |o, n| write_node_body(o, n))
}

pub fn read_nodes<R: Read>(input: &mut GraphDataInput<R>) -> Result<Vec<Node>> {
    input.read_grouped(read_node_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::diff::deep_diff;
    use pretty_assertions::assert_eq;

    fn round_trip<T: Externalizable>(value: &T) -> T {
        let mut out = GraphDataOutput::new(Vec::new());
        value.write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        let mut input = GraphDataInput::new(bytes.as_slice());
        let read = T::read_from(&mut input).unwrap();
        assert!(input.read_u8().is_err(), "trailing bytes after {}", std::any::type_name::<T>());
        read
    }

    fn sample_class() -> JvmClass {
        let usages: HashSet<Usage> = [
            Usage::class("b/B"),
            Usage::class_new("b/B"),
            Usage::method("b/B", "bar", "()I"),
            Usage::field_assign("b/B", "x", "J"),
            Usage::module_package("m.core", "b"),
            Usage::import_package_on_demand("a"),
            Usage::annotation("a/Ann", ["value".to_string()], [ElemType::Method]),
        ]
        .into_iter()
        .collect();

        let method = JvmMethod::new(
            ProtoMember::new(
                JvmFlags::new(JvmFlags::PUBLIC),
                Some("<T:Ljava/lang/Object;>()TT;".into()),
                "get",
                TypeRepr::class("java/lang/Object"),
                vec![ElementAnnotation::new("a/Ann", Some(11))],
            ),
            vec![TypeRepr::parse_field_descriptor("[I").unwrap()],
            vec![ParamAnnotation::new(0, ElementAnnotation::new("a/NotNull", None))],
            vec![TypeRepr::class("java/io/IOException")],
            Some(AnnotationValue::Array(vec![
                AnnotationValue::Int(-3),
                AnnotationValue::double(1.5),
                AnnotationValue::enum_constant("La/E;", "ONE"),
                AnnotationValue::Annotation {
                    descriptor: "La/Inner;".into(),
                    args: vec![("c".into(), AnnotationValue::Char(65))],
                },
            ])),
        );
        let field = JvmField::new(ProtoMember::new(
            JvmFlags::new(JvmFlags::PRIVATE | JvmFlags::FINAL),
            None,
            "x",
            TypeRepr::parse_field_descriptor("J").unwrap(),
            vec![],
        ));

        JvmClass::new(
            NodeCore::new(
                "a/A",
                NodeCore::out_file_hash_of("out/a/A.class"),
                usages,
                vec![Metadata::new(MetadataTag::kotlin(), vec![1, 2, 3])],
            ),
            JvmClassParts {
                flags: JvmFlags::new(JvmFlags::PUBLIC | JvmFlags::ANNOTATION),
                signature: None,
                super_fq_name: "a/Base".into(),
                outer_fq_name: "a/Outer".into(),
                interfaces: vec!["a/I".into()],
                fields: vec![field],
                methods: vec![method],
                annotations: vec![ElementAnnotation::new("a/Ann", None)],
                annotation_targets: vec![ElemType::TypeUse, ElemType::Field],
                retention_policy: Some(RetentionPolicy::Runtime),
            },
        )
    }

    #[test]
    fn test_class_round_trip() {
        let class = sample_class();
        assert_eq!(round_trip(&class), class);
    }

    #[test]
    fn test_module_and_file_round_trip() {
        let module = JvmModule::new(
            NodeCore::new("m.app", 9, [Usage::module("m.core")].into_iter().collect(), vec![]),
            JvmFlags::new(JvmFlags::MODULE),
            "2.1",
            vec![ModuleRequires::new("m.core", JvmFlags::new(JvmFlags::TRANSITIVE), "1")],
            vec![ModulePackage::new("a", vec!["m.friend".into()])],
        );
        assert_eq!(round_trip(&module), module);

        let file = FileNode::new(NodeCore::new("res/x.txt", 1, HashSet::new(), vec![]));
        assert_eq!(round_trip(&Node::File(file.clone())), Node::File(file));
    }

    #[test]
    fn test_node_collection_is_diff_identical() {
        let nodes = vec![
            Node::File(FileNode::new(NodeCore::new("f", 1, HashSet::new(), vec![]))),
            Node::Class(sample_class()),
        ];
        let mut out = GraphDataOutput::new(Vec::new());
        write_nodes(&mut out, &nodes).unwrap();
        let bytes = out.into_inner();
        let read = read_nodes(&mut GraphDataInput::new(bytes.as_slice())).unwrap();

        assert_eq!(read.len(), 2);
        let spec = deep_diff(&nodes, &read);
        assert!(spec.unchanged());
    }

    #[test]
    fn test_object_superclass_survives_round_trip() {
        let class = JvmClass::new(
            NodeCore::new("a/A", 0, HashSet::new(), vec![]),
            JvmClassParts {
                super_fq_name: "java/lang/Object".into(),
                ..Default::default()
            },
        );
        let read = round_trip(&class);
        assert_eq!(read.superclass(), None);
        assert_eq!(read, class);
    }

    #[test]
    fn test_unknown_tags_are_decode_errors() {
        let mut input = GraphDataInput::new(&[99u8][..]);
        assert!(matches!(Node::read_from(&mut input), Err(DepGraphError::Decode(_))));

        let mut input = GraphDataInput::new(&[200u8][..]);
        assert!(matches!(
            AnnotationValue::read_from(&mut input),
            Err(DepGraphError::Decode(_))
        ));

        let mut input = GraphDataInput::new(&[42u8][..]);
        assert!(matches!(Usage::read_from(&mut input), Err(DepGraphError::Decode(_))));
    }

    #[test]
    fn test_truncated_node_is_decode_error() {
        let mut out = GraphDataOutput::new(Vec::new());
        Node::Class(sample_class()).write_to(&mut out).unwrap();
        let bytes = out.into_inner();
        for cut in [1, bytes.len() / 2, bytes.len() - 1] {
            let mut input = GraphDataInput::new(&bytes[..cut]);
            let err = Node::read_from(&mut input).unwrap_err();
            assert!(matches!(err, DepGraphError::Decode(_)), "cut {cut}: {err}");
        }
    }
}
