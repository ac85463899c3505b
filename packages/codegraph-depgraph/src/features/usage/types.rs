//! Usage variants

use std::collections::BTreeSet;
use std::fmt;

use crate::features::diff::{DiffCapable, NoDiff};
use crate::shared::models::{ElemType, ReferenceId};
use crate::shared::utils::{descriptor_hash, fx_hash};

/// Discriminant of a [`Usage`], also the persistence group tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UsageKind {
    Class,
    ClassNew,
    ClassPermits,
    ClassAsGenericBound,
    Field,
    FieldAssign,
    Method,
    Module,
    ModulePackage,
    ImportPackageOnDemand,
    Annotation,
}

impl UsageKind {
    pub const ALL: [UsageKind; 11] = [
        UsageKind::Class,
        UsageKind::ClassNew,
        UsageKind::ClassPermits,
        UsageKind::ClassAsGenericBound,
        UsageKind::Field,
        UsageKind::FieldAssign,
        UsageKind::Method,
        UsageKind::Module,
        UsageKind::ModulePackage,
        UsageKind::ImportPackageOnDemand,
        UsageKind::Annotation,
    ];

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.get(tag as usize).copied()
    }
}

/// Reference fact recorded by the node builder.
///
/// `owner` is the unit that owns the referenced entity: the class for class
/// and member usages, the module for module usages, the package for
/// on-demand imports, the annotation class for annotation usages.
/// Field and method usages keep a 64-bit hash of the raw descriptor rather
/// than its text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Usage {
    /// Any reference to a class
    Class { owner: ReferenceId },
    /// Instantiation (`new`, array creation, lambda proxy)
    ClassNew { owner: ReferenceId },
    /// Sealed class declaring `owner` as a permitted subclass
    ClassPermits { owner: ReferenceId },
    /// `owner` used as a bound of a generic type parameter
    ClassAsGenericBound { owner: ReferenceId },
    /// Field read or write
    Field {
        owner: ReferenceId,
        name: String,
        descriptor_hash: u64,
    },
    /// Field write
    FieldAssign {
        owner: ReferenceId,
        name: String,
        descriptor_hash: u64,
    },
    /// Method invocation or method handle
    Method {
        owner: ReferenceId,
        name: String,
        descriptor_hash: u64,
    },
    /// `requires` of a module
    Module { owner: ReferenceId },
    /// Package read from a module
    ModulePackage { owner: ReferenceId, package: String },
    /// Implicit or explicit `import pkg.*`
    ImportPackageOnDemand { owner: ReferenceId },
    /// Annotation applied somewhere in the unit
    Annotation {
        owner: ReferenceId,
        used_arg_names: BTreeSet<String>,
        targets: BTreeSet<ElemType>,
    },
}

impl Usage {
    pub fn class(owner: impl Into<ReferenceId>) -> Self {
        Usage::Class {
            owner: owner.into(),
        }
    }

    pub fn class_new(owner: impl Into<ReferenceId>) -> Self {
        Usage::ClassNew {
            owner: owner.into(),
        }
    }

    pub fn class_permits(owner: impl Into<ReferenceId>) -> Self {
        Usage::ClassPermits {
            owner: owner.into(),
        }
    }

    pub fn class_as_generic_bound(owner: impl Into<ReferenceId>) -> Self {
        Usage::ClassAsGenericBound {
            owner: owner.into(),
        }
    }

    pub fn field(owner: impl Into<ReferenceId>, name: impl Into<String>, descriptor: &str) -> Self {
        Usage::Field {
            owner: owner.into(),
            name: name.into(),
            descriptor_hash: descriptor_hash(descriptor),
        }
    }

    pub fn field_assign(
        owner: impl Into<ReferenceId>,
        name: impl Into<String>,
        descriptor: &str,
    ) -> Self {
        Usage::FieldAssign {
            owner: owner.into(),
            name: name.into(),
            descriptor_hash: descriptor_hash(descriptor),
        }
    }

    pub fn method(owner: impl Into<ReferenceId>, name: impl Into<String>, descriptor: &str) -> Self {
        Usage::Method {
            owner: owner.into(),
            name: name.into(),
            descriptor_hash: descriptor_hash(descriptor),
        }
    }

    pub fn module(owner: impl Into<ReferenceId>) -> Self {
        Usage::Module {
            owner: owner.into(),
        }
    }

    pub fn module_package(owner: impl Into<ReferenceId>, package: impl Into<String>) -> Self {
        Usage::ModulePackage {
            owner: owner.into(),
            package: package.into(),
        }
    }

    pub fn import_package_on_demand(package: impl Into<ReferenceId>) -> Self {
        Usage::ImportPackageOnDemand {
            owner: package.into(),
        }
    }

    pub fn annotation(
        owner: impl Into<ReferenceId>,
        used_arg_names: impl IntoIterator<Item = String>,
        targets: impl IntoIterator<Item = ElemType>,
    ) -> Self {
        Usage::Annotation {
            owner: owner.into(),
            used_arg_names: used_arg_names.into_iter().collect(),
            targets: targets.into_iter().collect(),
        }
    }

    pub fn kind(&self) -> UsageKind {
        match self {
            Usage::Class { .. } => UsageKind::Class,
            Usage::ClassNew { .. } => UsageKind::ClassNew,
            Usage::ClassPermits { .. } => UsageKind::ClassPermits,
            Usage::ClassAsGenericBound { .. } => UsageKind::ClassAsGenericBound,
            Usage::Field { .. } => UsageKind::Field,
            Usage::FieldAssign { .. } => UsageKind::FieldAssign,
            Usage::Method { .. } => UsageKind::Method,
            Usage::Module { .. } => UsageKind::Module,
            Usage::ModulePackage { .. } => UsageKind::ModulePackage,
            Usage::ImportPackageOnDemand { .. } => UsageKind::ImportPackageOnDemand,
            Usage::Annotation { .. } => UsageKind::Annotation,
        }
    }

    pub fn owner(&self) -> &ReferenceId {
        match self {
            Usage::Class { owner }
            | Usage::ClassNew { owner }
            | Usage::ClassPermits { owner }
            | Usage::ClassAsGenericBound { owner }
            | Usage::Field { owner, .. }
            | Usage::FieldAssign { owner, .. }
            | Usage::Method { owner, .. }
            | Usage::Module { owner }
            | Usage::ModulePackage { owner, .. }
            | Usage::ImportPackageOnDemand { owner }
            | Usage::Annotation { owner, .. } => owner,
        }
    }

    /// Member name for field and method usages
    pub fn member_name(&self) -> Option<&str> {
        match self {
            Usage::Field { name, .. } | Usage::FieldAssign { name, .. } | Usage::Method { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Usage::Field {
                owner,
                name,
                descriptor_hash,
            }
            | Usage::FieldAssign {
                owner,
                name,
                descriptor_hash,
            }
            | Usage::Method {
                owner,
                name,
                descriptor_hash,
            } => write!(
                f,
                "{:?}({}.{}#{:016x})",
                self.kind(),
                owner,
                name,
                descriptor_hash
            ),
            Usage::ModulePackage { owner, package } => {
                write!(f, "ModulePackage({}/{})", owner, package)
            }
            Usage::Annotation {
                owner,
                used_arg_names,
                targets,
            } => write!(
                f,
                "Annotation({}, args={:?}, targets={:?})",
                owner, used_arg_names, targets
            ),
            other => write!(f, "{:?}({})", other.kind(), other.owner()),
        }
    }
}

/// Usages have no identity apart from their value
impl DiffCapable for Usage {
    type Diff<'a> = NoDiff;

    fn is_same(&self, other: &Self) -> bool {
        self == other
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(self)
    }

    fn difference<'a>(&'a self, _past: &'a Self) -> NoDiff {
        NoDiff
    }
}
