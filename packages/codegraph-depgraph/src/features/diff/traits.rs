//! Identity vs. content contracts for diffable elements

/// Result of comparing two revisions of one logical entity
pub trait Difference {
    fn unchanged(&self) -> bool;
}

/// Element with an identity that is independent of its value equality.
///
/// `is_same`/`diff_hash_code` decide whether two revisions describe the same
/// logical entity (a method keeps its identity while its flags change).
/// `Eq`/`Hash` stay structural and are never used for identity matching.
pub trait DiffCapable {
    type Diff<'a>: Difference
    where
        Self: 'a;

    fn is_same(&self, other: &Self) -> bool;

    /// Must agree with `is_same`: same entities produce the same code
    fn diff_hash_code(&self) -> u64;

    /// Compare this (current) revision against `past`
    fn difference<'a>(&'a self, past: &'a Self) -> Self::Diff<'a>;
}

/// Placeholder difference for structural specifiers, which never report
/// changed elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NoDiff;

impl Difference for NoDiff {
    fn unchanged(&self) -> bool {
        true
    }
}

/// One identity match whose content differs between revisions
#[derive(Debug)]
pub struct Change<'a, T, D> {
    past: &'a T,
    now: &'a T,
    diff: D,
}

impl<'a, T, D> Change<'a, T, D> {
    pub fn new(past: &'a T, now: &'a T, diff: D) -> Self {
        Self { past, now, diff }
    }

    pub fn past(&self) -> &'a T {
        self.past
    }

    pub fn now(&self) -> &'a T {
        self.now
    }

    pub fn diff(&self) -> &D {
        &self.diff
    }
}
