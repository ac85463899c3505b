//! Module node (`module-info.class`)

use once_cell::unsync::OnceCell;

use super::common::{NodeCore, NodeCoreDiff};
use super::metadata::{Metadata, MetadataTag};
use crate::features::diff::{deep_diff, diff, DiffCapable, Difference, Specifier};
use crate::features::usage::Usage;
use crate::shared::models::{JvmFlags, ReferenceId};
use crate::shared::utils::fx_hash;

/// `requires` edge; identity by module name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleRequires {
    name: String,
    flags: JvmFlags,
    version: String,
}

impl ModuleRequires {
    pub fn new(name: impl Into<String>, flags: JvmFlags, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags,
            version: version.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flags(&self) -> JvmFlags {
        self.flags
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_transitive(&self) -> bool {
        self.flags.is_transitive()
    }
}

pub struct RequiresDiff<'a> {
    past: &'a ModuleRequires,
    now: &'a ModuleRequires,
}

impl RequiresDiff<'_> {
    pub fn version_changed(&self) -> bool {
        self.past.version != self.now.version
    }

    pub fn became_non_transitive(&self) -> bool {
        self.past.is_transitive() && !self.now.is_transitive()
    }

    pub fn flags_changed(&self) -> bool {
        self.past.flags != self.now.flags
    }
}

impl Difference for RequiresDiff<'_> {
    fn unchanged(&self) -> bool {
        !self.version_changed() && !self.flags_changed()
    }
}

impl DiffCapable for ModuleRequires {
    type Diff<'a> = RequiresDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.name == other.name
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&self.name)
    }

    fn difference<'a>(&'a self, past: &'a Self) -> RequiresDiff<'a> {
        RequiresDiff { past, now: self }
    }
}

/// `exports` edge: package plus optional friend modules (`exports p to m`);
/// identity by package name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModulePackage {
    name: String,
    modules: Vec<String>,
}

impl ModulePackage {
    pub fn new(name: impl Into<String>, modules: Vec<String>) -> Self {
        Self {
            name: name.into(),
            modules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// Unqualified exports are visible to every module
    pub fn is_qualified(&self) -> bool {
        !self.modules.is_empty()
    }
}

pub struct ExportDiff<'a> {
    past: &'a ModulePackage,
    now: &'a ModulePackage,
    target_modules: OnceCell<Specifier<'a, String>>,
}

impl<'a> ExportDiff<'a> {
    pub fn target_modules(&self) -> &Specifier<'a, String> {
        self.target_modules
            .get_or_init(|| diff(&self.past.modules, &self.now.modules))
    }
}

impl Difference for ExportDiff<'_> {
    fn unchanged(&self) -> bool {
        self.target_modules().unchanged()
    }
}

impl DiffCapable for ModulePackage {
    type Diff<'a> = ExportDiff<'a> where Self: 'a;

    fn is_same(&self, other: &Self) -> bool {
        self.name == other.name
    }

    fn diff_hash_code(&self) -> u64 {
        fx_hash(&self.name)
    }

    fn difference<'a>(&'a self, past: &'a Self) -> ExportDiff<'a> {
        ExportDiff {
            past,
            now: self,
            target_modules: OnceCell::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JvmModule {
    core: NodeCore,
    flags: JvmFlags,
    version: String,
    requires: Vec<ModuleRequires>,
    exports: Vec<ModulePackage>,
}

impl JvmModule {
    pub fn new(
        core: NodeCore,
        flags: JvmFlags,
        version: impl Into<String>,
        requires: Vec<ModuleRequires>,
        exports: Vec<ModulePackage>,
    ) -> Self {
        Self {
            core,
            flags,
            version: version.into(),
            requires,
            exports,
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

    pub fn flags(&self) -> JvmFlags {
        self.flags
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn requires(&self) -> &[ModuleRequires] {
        &self.requires
    }

    pub fn exports(&self) -> &[ModulePackage] {
        &self.exports
    }

    pub fn requires_transitive(&self, module: &str) -> bool {
        self.requires
            .iter()
            .any(|r| r.name == module && r.is_transitive())
    }

    /// Whether `package` is readable from `module`
    pub fn exports_to(&self, package: &str, module: &str) -> bool {
        self.exports
            .iter()
            .any(|e| e.name == package && (!e.is_qualified() || e.modules.iter().any(|m| m == module)))
    }
}

pub type RequiresSpecifier<'a> =
    Specifier<'a, ModuleRequires, <ModuleRequires as DiffCapable>::Diff<'a>>;
pub type ExportsSpecifier<'a> =
    Specifier<'a, ModulePackage, <ModulePackage as DiffCapable>::Diff<'a>>;

pub struct ModuleDiff<'a> {
    past: &'a JvmModule,
    now: &'a JvmModule,
    core: NodeCoreDiff<'a>,
    requires: OnceCell<RequiresSpecifier<'a>>,
    exports: OnceCell<ExportsSpecifier<'a>>,
}

impl<'a> ModuleDiff<'a> {
    pub fn new(past: &'a JvmModule, now: &'a JvmModule) -> Self {
        Self {
            past,
            now,
            core: NodeCoreDiff::new(&past.core, &now.core),
            requires: OnceCell::new(),
            exports: OnceCell::new(),
        }
    }

    pub fn past(&self) -> &'a JvmModule {
        self.past
    }

    pub fn now(&self) -> &'a JvmModule {
        self.now
    }

    pub fn usages(&self) -> &Specifier<'a, Usage> {
        self.core.usages()
    }

    pub fn metadata(&self, tag: &MetadataTag) -> Option<&Specifier<'a, Metadata>> {
        self.core.metadata(tag)
    }

    pub fn version_changed(&self) -> bool {
        self.past.version != self.now.version
    }

    pub fn flags_changed(&self) -> bool {
        self.past.flags != self.now.flags
    }

    pub fn requires(&self) -> &RequiresSpecifier<'a> {
        self.requires
            .get_or_init(|| deep_diff(&self.past.requires, &self.now.requires))
    }

    pub fn exports(&self) -> &ExportsSpecifier<'a> {
        self.exports
            .get_or_init(|| deep_diff(&self.past.exports, &self.now.exports))
    }
}

impl Difference for ModuleDiff<'_> {
    fn unchanged(&self) -> bool {
        !self.version_changed()
            && !self.flags_changed()
            && self.requires().unchanged()
            && self.exports().unchanged()
            && self.core.unchanged()
    }
}
