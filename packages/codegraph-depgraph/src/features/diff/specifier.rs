//! Added / Removed / Changed computation over two revisions of a collection

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;
use std::collections::HashSet;
use std::hash::Hash;

use super::traits::{Change, DiffCapable, Difference, NoDiff};

/// Result of comparing `past` and `now` revisions of one collection.
///
/// Sub-results are memoized on first access. The memo cells are not `Sync`,
/// so one `Specifier` belongs to one thread; independent comparisons can
/// still run in parallel.
pub struct Specifier<'a, T, D = NoDiff> {
    kind: Kind<'a, T, D>,
}

enum Kind<'a, T, D> {
    /// Both sides empty. Carries no data so it costs no allocation.
    Unchanged,
    /// Past side empty
    AddedOnly(Vec<&'a T>),
    /// Now side empty
    RemovedOnly(Vec<&'a T>),
    Structural(Structural<'a, T>),
    Identity(Identity<'a, T, D>),
}

struct Structural<'a, T> {
    past: Vec<&'a T>,
    now: Vec<&'a T>,
    past_set: HashSet<&'a T>,
    now_set: HashSet<&'a T>,
    added: OnceCell<Vec<&'a T>>,
    removed: OnceCell<Vec<&'a T>>,
    unchanged: OnceCell<bool>,
}

struct Identity<'a, T, D> {
    added: Vec<&'a T>,
    removed: Vec<&'a T>,
    /// (past, now) identity matches in `now` order
    matched: Vec<(&'a T, &'a T)>,
    difference: fn(&'a T, &'a T) -> D,
    changed: OnceCell<Vec<Change<'a, T, D>>>,
}

impl<'a, T, D> Specifier<'a, T, D> {
    /// Specifier for two empty collections
    pub fn unchanged_empty() -> Self {
        Self {
            kind: Kind::Unchanged,
        }
    }

    /// Caller guarantees at least one side is empty
    fn one_sided(past: Vec<&'a T>, now: Vec<&'a T>) -> Self {
        debug_assert!(past.is_empty() || now.is_empty());
        let kind = if !now.is_empty() {
            Kind::AddedOnly(now)
        } else if !past.is_empty() {
            Kind::RemovedOnly(past)
        } else {
            Kind::Unchanged
        };
        Self { kind }
    }

    /// Elements present now with no counterpart in the past
    pub fn added(&self) -> &[&'a T]
    where
        T: Eq + Hash,
    {
        match &self.kind {
            Kind::Unchanged | Kind::RemovedOnly(_) => &[],
            Kind::AddedOnly(now) => now.as_slice(),
            Kind::Structural(s) => s
                .added
                .get_or_init(|| dedup_filter(&s.now, |item| !s.past_set.contains(item)))
                .as_slice(),
            Kind::Identity(i) => i.added.as_slice(),
        }
    }

    /// Elements present in the past with no counterpart now
    pub fn removed(&self) -> &[&'a T]
    where
        T: Eq + Hash,
    {
        match &self.kind {
            Kind::Unchanged | Kind::AddedOnly(_) => &[],
            Kind::RemovedOnly(past) => past.as_slice(),
            Kind::Structural(s) => s
                .removed
                .get_or_init(|| dedup_filter(&s.past, |item| !s.now_set.contains(item)))
                .as_slice(),
            Kind::Identity(i) => i.removed.as_slice(),
        }
    }

    /// Identity matches whose content differs. Always empty for
    /// structural specifiers.
    pub fn changed(&self) -> &[Change<'a, T, D>]
    where
        D: Difference,
    {
        match &self.kind {
            Kind::Identity(i) => i
                .changed
                .get_or_init(|| {
                    i.matched
                        .iter()
                        .filter_map(|&(past, now)| {
                            let diff = (i.difference)(now, past);
                            (!diff.unchanged()).then(|| Change::new(past, now, diff))
                        })
                        .collect()
                })
                .as_slice(),
            _ => &[],
        }
    }

    pub fn unchanged(&self) -> bool
    where
        T: Eq + Hash,
        D: Difference,
    {
        match &self.kind {
            Kind::Unchanged => true,
            Kind::AddedOnly(_) | Kind::RemovedOnly(_) => false,
            Kind::Structural(s) => *s.unchanged.get_or_init(|| s.past_set == s.now_set),
            Kind::Identity(i) => {
                i.added.is_empty() && i.removed.is_empty() && self.changed().is_empty()
            }
        }
    }
}

impl<'a, T, D> Difference for Specifier<'a, T, D>
where
    T: Eq + Hash,
    D: Difference,
{
    fn unchanged(&self) -> bool {
        Specifier::unchanged(self)
    }
}

impl<'a, T, D> std::fmt::Debug for Specifier<'a, T, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            Kind::Unchanged => "Unchanged",
            Kind::AddedOnly(_) => "AddedOnly",
            Kind::RemovedOnly(_) => "RemovedOnly",
            Kind::Structural(_) => "Structural",
            Kind::Identity(_) => "Identity",
        };
        f.debug_struct("Specifier").field("kind", &kind).finish()
    }
}

fn dedup_filter<'a, T: Eq + Hash>(items: &[&'a T], keep: impl Fn(&&'a T) -> bool) -> Vec<&'a T> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .copied()
        .filter(|item| keep(item) && seen.insert(*item))
        .collect()
}

/// Structural diff: elements compared by plain value equality
pub fn diff<'a, T, P, N>(past: P, now: N) -> Specifier<'a, T>
where
    T: Eq + Hash + 'a,
    P: IntoIterator<Item = &'a T>,
    N: IntoIterator<Item = &'a T>,
{
    let past: Vec<&'a T> = past.into_iter().collect();
    let now: Vec<&'a T> = now.into_iter().collect();

    if past.is_empty() || now.is_empty() {
        return Specifier::one_sided(dedup_filter(&past, |_| true), dedup_filter(&now, |_| true));
    }

    let past_set = past.iter().copied().collect();
    let now_set = now.iter().copied().collect();
    Specifier {
        kind: Kind::Structural(Structural {
            past,
            now,
            past_set,
            now_set,
            added: OnceCell::new(),
            removed: OnceCell::new(),
            unchanged: OnceCell::new(),
        }),
    }
}

/// Identity diff: elements matched by `is_same`, bucketed by
/// `diff_hash_code`; matched pairs are compared via `difference`
pub fn deep_diff<'a, T, P, N>(past: P, now: N) -> Specifier<'a, T, T::Diff<'a>>
where
    T: DiffCapable + 'a,
    P: IntoIterator<Item = &'a T>,
    N: IntoIterator<Item = &'a T>,
{
    let past: Vec<&'a T> = past.into_iter().collect();
    let now: Vec<&'a T> = now.into_iter().collect();

    if past.is_empty() || now.is_empty() {
        return Specifier::one_sided(past, now);
    }

    let past_buckets = bucket_by_identity(&past);
    let now_buckets = bucket_by_identity(&now);

    let mut added = Vec::new();
    let mut matched = Vec::new();
    for item in &now {
        match find_same(&past_buckets, item) {
            Some(past_item) => matched.push((past_item, *item)),
            None => added.push(*item),
        }
    }

    let removed = past
        .iter()
        .copied()
        .filter(|item| find_same(&now_buckets, item).is_none())
        .collect();

    Specifier {
        kind: Kind::Identity(Identity {
            added,
            removed,
            matched,
            difference: |now, past| now.difference(past),
            changed: OnceCell::new(),
        }),
    }
}

fn bucket_by_identity<'a, T: DiffCapable>(items: &[&'a T]) -> FxHashMap<u64, Vec<&'a T>> {
    let mut buckets: FxHashMap<u64, Vec<&'a T>> = FxHashMap::default();
    for item in items {
        buckets.entry(item.diff_hash_code()).or_default().push(*item);
    }
    buckets
}

fn find_same<'a, T: DiffCapable>(buckets: &FxHashMap<u64, Vec<&'a T>>, item: &T) -> Option<&'a T> {
    buckets
        .get(&item.diff_hash_code())
        .and_then(|bucket| bucket.iter().copied().find(|candidate| candidate.is_same(item)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::utils::fx_hash;

    /// Keyed element: identity by `key`, content by `value`
    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Item {
        key: &'static str,
        value: i32,
    }

    struct ItemDiff {
        changed: bool,
    }

    impl Difference for ItemDiff {
        fn unchanged(&self) -> bool {
            !self.changed
        }
    }

    impl DiffCapable for Item {
        type Diff<'a> = ItemDiff where Self: 'a;

        fn is_same(&self, other: &Self) -> bool {
            self.key == other.key
        }

        fn diff_hash_code(&self) -> u64 {
            fx_hash(self.key)
        }

        fn difference<'a>(&'a self, past: &'a Self) -> ItemDiff {
            ItemDiff {
                changed: self.value != past.value,
            }
        }
    }

    fn item(key: &'static str, value: i32) -> Item {
        Item { key, value }
    }

    #[test]
    fn test_empty_empty_is_unchanged() {
        let empty: Vec<i32> = Vec::new();
        let spec = diff(&empty, &empty);
        assert!(spec.unchanged());
        assert!(spec.added().is_empty());
        assert!(spec.removed().is_empty());

        let empty: Vec<Item> = Vec::new();
        let spec = deep_diff(&empty, &empty);
        assert!(spec.unchanged());
        assert!(spec.changed().is_empty());
    }

    #[test]
    fn test_one_side_empty() {
        let empty: Vec<i32> = Vec::new();
        let values = vec![1, 2];

        let spec = diff(&empty, &values);
        assert!(!spec.unchanged());
        assert_eq!(spec.added(), &[&1, &2]);
        assert!(spec.removed().is_empty());

        let spec = diff(&values, &empty);
        assert!(!spec.unchanged());
        assert_eq!(spec.removed(), &[&1, &2]);
        assert!(spec.added().is_empty());
    }

    #[test]
    fn test_one_side_empty_drops_duplicates() {
        let empty: Vec<i32> = Vec::new();
        let repeated = vec![1, 1, 3, 1];

        let spec = diff(&empty, &repeated);
        assert_eq!(spec.added(), &[&1, &3]);
        assert_eq!(diff(&vec![2], &repeated).added(), spec.added());

        let spec = diff(&repeated, &empty);
        assert_eq!(spec.removed(), &[&1, &3]);
        assert_eq!(diff(&repeated, &vec![2]).removed(), spec.removed());
    }

    #[test]
    fn test_structural_diff() {
        let past = vec!["a", "b", "c"];
        let now = vec!["c", "d", "b"];
        let spec = diff(&past, &now);

        assert!(!spec.unchanged());
        assert_eq!(spec.added(), &[&"d"]);
        assert_eq!(spec.removed(), &[&"a"]);
        assert!(spec.changed().is_empty());
    }

    #[test]
    fn test_structural_ignores_order_and_duplicates() {
        let past = vec![1, 2, 2, 3];
        let now = vec![3, 1, 2];
        assert!(diff(&past, &now).unchanged());
    }

    #[test]
    fn test_identity_diff_reports_change() {
        let past = vec![item("a", 1)];
        let now = vec![item("a", 2)];

        let spec = deep_diff(&past, &now);
        assert!(spec.added().is_empty());
        assert!(spec.removed().is_empty());
        assert_eq!(spec.changed().len(), 1);
        assert!(!spec.changed()[0].diff().unchanged());
        assert_eq!(spec.changed()[0].past().value, 1);
        assert_eq!(spec.changed()[0].now().value, 2);
        assert!(!spec.unchanged());

        // structurally the same pair is one added + one removed
        let structural = diff(&past, &now);
        assert_eq!(structural.added().len(), 1);
        assert_eq!(structural.removed().len(), 1);
    }

    #[test]
    fn test_identity_diff_mixed() {
        let past = vec![item("keep", 1), item("gone", 1), item("edit", 1)];
        let now = vec![item("edit", 5), item("keep", 1), item("new", 0)];

        let spec = deep_diff(&past, &now);
        assert_eq!(spec.added(), &[&item("new", 0)]);
        assert_eq!(spec.removed(), &[&item("gone", 1)]);
        assert_eq!(spec.changed().len(), 1);
        assert_eq!(spec.changed()[0].now().key, "edit");
    }

    #[test]
    fn test_identity_diff_unchanged() {
        let past = vec![item("a", 1), item("b", 2)];
        let now = vec![item("b", 2), item("a", 1)];
        let spec = deep_diff(&past, &now);
        assert!(spec.unchanged());
        assert!(spec.changed().is_empty());
    }
}
