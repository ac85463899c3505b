//! JVM access flags plus derived bits

use std::fmt;

/// Access flags as found in the class file, extended with bits the node
/// builder derives (local, anonymous, generated, library, sealed).
///
/// Class, field and method flags share one bit space; bits whose meaning
/// depends on the element kind (0x0020, 0x0040, 0x0080) get one constant per
/// meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct JvmFlags(u32);

impl JvmFlags {
    pub const PUBLIC: u32 = 0x0001;
    pub const PRIVATE: u32 = 0x0002;
    pub const PROTECTED: u32 = 0x0004;
    pub const STATIC: u32 = 0x0008;
    pub const FINAL: u32 = 0x0010;
    pub const SUPER: u32 = 0x0020;
    pub const SYNCHRONIZED: u32 = 0x0020;
    pub const VOLATILE: u32 = 0x0040;
    pub const BRIDGE: u32 = 0x0040;
    pub const TRANSIENT: u32 = 0x0080;
    pub const VARARGS: u32 = 0x0080;
    pub const NATIVE: u32 = 0x0100;
    pub const INTERFACE: u32 = 0x0200;
    pub const ABSTRACT: u32 = 0x0400;
    pub const STRICT: u32 = 0x0800;
    pub const SYNTHETIC: u32 = 0x1000;
    pub const ANNOTATION: u32 = 0x2000;
    pub const ENUM: u32 = 0x4000;
    pub const MANDATED: u32 = 0x8000;
    pub const MODULE: u32 = 0x8000;
    pub const RECORD: u32 = 0x1_0000;
    pub const DEPRECATED: u32 = 0x2_0000;

    // derived by the node builder, never present in class files
    pub const LOCAL: u32 = 0x0020_0000;
    pub const ANONYMOUS: u32 = 0x0040_0000;
    pub const GENERATED: u32 = 0x0080_0000;
    pub const LIBRARY: u32 = 0x0100_0000;
    pub const SEALED: u32 = 0x0200_0000;

    /// Module `requires` flag (shares the ACC_PUBLIC-adjacent slot in class files)
    pub const TRANSITIVE: u32 = 0x0020;
    pub const STATIC_PHASE: u32 = 0x0040;

    const VISIBILITY_MASK: u32 = Self::PUBLIC | Self::PRIVATE | Self::PROTECTED;

    pub const fn new(bits: u32) -> Self {
        Self(bits)
    }

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(&self) -> u32 {
        self.0
    }

    pub const fn contains(&self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    pub fn with(self, mask: u32) -> Self {
        Self(self.0 | mask)
    }

    pub fn without(self, mask: u32) -> Self {
        Self(self.0 & !mask)
    }

    /// Bits present now but not in `past`
    pub fn added(&self, past: &JvmFlags) -> JvmFlags {
        JvmFlags(self.0 & !past.0)
    }

    /// Bits present in `past` but not now
    pub fn removed(&self, past: &JvmFlags) -> JvmFlags {
        JvmFlags(past.0 & !self.0)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn is_public(&self) -> bool {
        self.contains(Self::PUBLIC)
    }

    pub fn is_private(&self) -> bool {
        self.contains(Self::PRIVATE)
    }

    pub fn is_protected(&self) -> bool {
        self.contains(Self::PROTECTED)
    }

    pub fn is_package_local(&self) -> bool {
        self.0 & Self::VISIBILITY_MASK == 0
    }

    pub fn is_static(&self) -> bool {
        self.contains(Self::STATIC)
    }

    pub fn is_final(&self) -> bool {
        self.contains(Self::FINAL)
    }

    pub fn is_abstract(&self) -> bool {
        self.contains(Self::ABSTRACT)
    }

    pub fn is_interface(&self) -> bool {
        self.contains(Self::INTERFACE)
    }

    pub fn is_annotation(&self) -> bool {
        self.contains(Self::ANNOTATION)
    }

    pub fn is_enum(&self) -> bool {
        self.contains(Self::ENUM)
    }

    pub fn is_record(&self) -> bool {
        self.contains(Self::RECORD)
    }

    pub fn is_synthetic(&self) -> bool {
        self.contains(Self::SYNTHETIC)
    }

    pub fn is_bridge(&self) -> bool {
        self.contains(Self::BRIDGE)
    }

    pub fn is_deprecated(&self) -> bool {
        self.contains(Self::DEPRECATED)
    }

    pub fn is_local(&self) -> bool {
        self.contains(Self::LOCAL)
    }

    pub fn is_anonymous(&self) -> bool {
        self.contains(Self::ANONYMOUS)
    }

    pub fn is_generated(&self) -> bool {
        self.contains(Self::GENERATED)
    }

    pub fn is_library(&self) -> bool {
        self.contains(Self::LIBRARY)
    }

    pub fn is_sealed(&self) -> bool {
        self.contains(Self::SEALED)
    }

    pub fn is_transitive(&self) -> bool {
        self.contains(Self::TRANSITIVE)
    }
}

impl fmt::Display for JvmFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_added_removed() {
        let past = JvmFlags::new(JvmFlags::PUBLIC | JvmFlags::STATIC);
        let now = JvmFlags::new(JvmFlags::PUBLIC | JvmFlags::FINAL);

        assert!(now.added(&past).is_final());
        assert!(!now.added(&past).is_public());
        assert!(now.removed(&past).is_static());
        assert_eq!(now.removed(&past).bits(), JvmFlags::STATIC);
    }

    #[test]
    fn test_package_local() {
        assert!(JvmFlags::new(JvmFlags::STATIC).is_package_local());
        assert!(!JvmFlags::new(JvmFlags::PROTECTED).is_package_local());
    }

    #[test]
    fn test_derived_bits_do_not_overlap_access_bits() {
        let derived = JvmFlags::LOCAL
            | JvmFlags::ANONYMOUS
            | JvmFlags::GENERATED
            | JvmFlags::LIBRARY
            | JvmFlags::SEALED;
        assert_eq!(derived & 0xFFFF, 0);
        assert_eq!(derived & (JvmFlags::RECORD | JvmFlags::DEPRECATED), 0);
    }
}
