//! JVM type representation parsed from descriptors

use crate::errors::{DepGraphError, Result};
use std::fmt;

/// Binary name of the root superclass. Usages against it are never recorded.
pub const OBJECT_CLASS_NAME: &str = "java/lang/Object";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Void,
    Boolean,
    Byte,
    Char,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub fn descriptor_char(&self) -> char {
        match self {
            PrimitiveType::Void => 'V',
            PrimitiveType::Boolean => 'Z',
            PrimitiveType::Byte => 'B',
            PrimitiveType::Char => 'C',
            PrimitiveType::Short => 'S',
            PrimitiveType::Int => 'I',
            PrimitiveType::Long => 'J',
            PrimitiveType::Float => 'F',
            PrimitiveType::Double => 'D',
        }
    }

    fn from_descriptor_char(c: char) -> Option<Self> {
        Some(match c {
            'V' => PrimitiveType::Void,
            'Z' => PrimitiveType::Boolean,
            'B' => PrimitiveType::Byte,
            'C' => PrimitiveType::Char,
            'S' => PrimitiveType::Short,
            'I' => PrimitiveType::Int,
            'J' => PrimitiveType::Long,
            'F' => PrimitiveType::Float,
            'D' => PrimitiveType::Double,
            _ => return None,
        })
    }
}

/// Erased JVM type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRepr {
    Primitive(PrimitiveType),
    /// Reference type by binary name (`java/lang/String`)
    Class(String),
    Array(Box<TypeRepr>),
}

impl TypeRepr {
    pub fn class(name: impl Into<String>) -> Self {
        TypeRepr::Class(name.into())
    }

    /// Parse a single field descriptor (`I`, `Ljava/lang/String;`, `[[J`)
    pub fn parse_field_descriptor(descriptor: &str) -> Result<Self> {
        let (ty, rest) = parse_one(descriptor, descriptor)?;
        if !rest.is_empty() {
            return Err(DepGraphError::malformed(descriptor));
        }
        Ok(ty)
    }

    /// Parse a method descriptor into (argument types, return type)
    pub fn parse_method_descriptor(descriptor: &str) -> Result<(Vec<TypeRepr>, TypeRepr)> {
        let body = descriptor
            .strip_prefix('(')
            .ok_or_else(|| DepGraphError::malformed(descriptor))?;

        let mut args = Vec::new();
        let mut rest = body;
        loop {
            if let Some(after) = rest.strip_prefix(')') {
                rest = after;
                break;
            }
            if rest.is_empty() {
                return Err(DepGraphError::malformed(descriptor));
            }
            let (arg, after) = parse_one(rest, descriptor)?;
            if arg == TypeRepr::Primitive(PrimitiveType::Void) {
                return Err(DepGraphError::malformed(descriptor));
            }
            args.push(arg);
            rest = after;
        }

        let (ret, tail) = parse_one(rest, descriptor)?;
        if !tail.is_empty() {
            return Err(DepGraphError::malformed(descriptor));
        }
        Ok((args, ret))
    }

    /// Type of an instruction operand that is either a binary name or, for
    /// arrays, a descriptor (`java/lang/String` vs `[Ljava/lang/String;`)
    pub fn from_internal_name(name: &str) -> Result<Self> {
        if name.starts_with('[') {
            Self::parse_field_descriptor(name)
        } else if name.is_empty() {
            Err(DepGraphError::malformed(name))
        } else {
            Ok(TypeRepr::Class(name.to_string()))
        }
    }

    /// Build a method descriptor from its parts
    pub fn method_descriptor(args: &[TypeRepr], ret: &TypeRepr) -> String {
        let mut out = String::from("(");
        for arg in args {
            arg.write_descriptor(&mut out);
        }
        out.push(')');
        ret.write_descriptor(&mut out);
        out
    }

    pub fn descriptor(&self) -> String {
        let mut out = String::new();
        self.write_descriptor(&mut out);
        out
    }

    fn write_descriptor(&self, out: &mut String) {
        match self {
            TypeRepr::Primitive(p) => out.push(p.descriptor_char()),
            TypeRepr::Class(name) => {
                out.push('L');
                out.push_str(name);
                out.push(';');
            }
            TypeRepr::Array(elem) => {
                out.push('[');
                elem.write_descriptor(out);
            }
        }
    }

    /// Referenced class, looking through arrays. `None` for primitives.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            TypeRepr::Primitive(_) => None,
            TypeRepr::Class(name) => Some(name),
            TypeRepr::Array(elem) => elem.class_name(),
        }
    }

    pub fn element_type(&self) -> &TypeRepr {
        match self {
            TypeRepr::Array(elem) => elem.element_type(),
            other => other,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRepr::Primitive(_))
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRepr::Array(_))
    }
}

impl fmt::Display for TypeRepr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.descriptor())
    }
}

fn parse_one<'a>(input: &'a str, whole: &str) -> Result<(TypeRepr, &'a str)> {
    let mut chars = input.chars();
    let first = chars.next().ok_or_else(|| DepGraphError::malformed(whole))?;

    match first {
        'L' => {
            let end = input.find(';').ok_or_else(|| DepGraphError::malformed(whole))?;
            let name = &input[1..end];
            if name.is_empty() {
                return Err(DepGraphError::malformed(whole));
            }
            Ok((TypeRepr::Class(name.to_string()), &input[end + 1..]))
        }
        '[' => {
            let (elem, rest) = parse_one(&input[1..], whole)?;
            if elem == TypeRepr::Primitive(PrimitiveType::Void) {
                return Err(DepGraphError::malformed(whole));
            }
            Ok((TypeRepr::Array(Box::new(elem)), rest))
        }
        c => {
            let p = PrimitiveType::from_descriptor_char(c)
                .ok_or_else(|| DepGraphError::malformed(whole))?;
            Ok((TypeRepr::Primitive(p), &input[1..]))
        }
    }
}
