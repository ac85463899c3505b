//! Annotation targets and retention policies

use std::fmt;

/// Element kinds an annotation can target (`java.lang.annotation.ElementType`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElemType {
    Type,
    Field,
    Method,
    Parameter,
    Constructor,
    LocalVariable,
    AnnotationType,
    Package,
    TypeParameter,
    TypeUse,
    Module,
    RecordComponent,
}

impl ElemType {
    pub const ALL: [ElemType; 12] = [
        ElemType::Type,
        ElemType::Field,
        ElemType::Method,
        ElemType::Parameter,
        ElemType::Constructor,
        ElemType::LocalVariable,
        ElemType::AnnotationType,
        ElemType::Package,
        ElemType::TypeParameter,
        ElemType::TypeUse,
        ElemType::Module,
        ElemType::RecordComponent,
    ];

    /// Enum constant name as written in `@Target` arguments
    pub fn as_str(&self) -> &'static str {
        match self {
            ElemType::Type => "TYPE",
            ElemType::Field => "FIELD",
            ElemType::Method => "METHOD",
            ElemType::Parameter => "PARAMETER",
            ElemType::Constructor => "CONSTRUCTOR",
            ElemType::LocalVariable => "LOCAL_VARIABLE",
            ElemType::AnnotationType => "ANNOTATION_TYPE",
            ElemType::Package => "PACKAGE",
            ElemType::TypeParameter => "TYPE_PARAMETER",
            ElemType::TypeUse => "TYPE_USE",
            ElemType::Module => "MODULE",
            ElemType::RecordComponent => "RECORD_COMPONENT",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|e| e.as_str() == name)
    }

    /// Stable ordinal used by the persistence codec
    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        Self::ALL.get(ordinal as usize).copied()
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `java.lang.annotation.RetentionPolicy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RetentionPolicy {
    Source,
    Class,
    Runtime,
}

impl RetentionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RetentionPolicy::Source => "SOURCE",
            RetentionPolicy::Class => "CLASS",
            RetentionPolicy::Runtime => "RUNTIME",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "SOURCE" => Some(RetentionPolicy::Source),
            "CLASS" => Some(RetentionPolicy::Class),
            "RUNTIME" => Some(RetentionPolicy::Runtime),
            _ => None,
        }
    }

    pub fn ordinal(&self) -> u8 {
        *self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(RetentionPolicy::Source),
            1 => Some(RetentionPolicy::Class),
            2 => Some(RetentionPolicy::Runtime),
            _ => None,
        }
    }
}
