use proptest::prelude::*;
use proptest::test_runner::TestCaseError;

use crate::map::{MemoryMap, RangeType, TypedRange};
use crate::range::PhysRange;

const MAX_ADDR: u64 = 1 << 20;
const MAX_SIZE: u64 = 1 << 16;

fn range_strategy() -> impl Strategy<Value = PhysRange> {
    (0..MAX_ADDR, 1..MAX_SIZE).prop_map(|(start, size)| PhysRange::new(start, size))
}

fn type_strategy() -> impl Strategy<Value = RangeType> {
    prop_oneof![
        Just(RangeType::Ram),
        Just(RangeType::Default),
        Just(RangeType::Acpi),
        Just(RangeType::Nvs),
        Just(RangeType::Reserved),
    ]
}

fn typed_range_strategy() -> impl Strategy<Value = TypedRange> {
    (range_strategy(), type_strategy()).prop_map(|(range, typ)| TypedRange::new(range, typ))
}

/// The addresses of `a` covered by `b`, as a range (they always form one
/// contiguous run for two intervals).
fn intersection(a: &PhysRange, b: &PhysRange) -> Option<PhysRange> {
    let start = a.start.max(b.start);
    let end = a.end().min(b.end());
    (start < end).then(|| PhysRange::from_interval(start, end))
}

fn check_map_invariants(m: &MemoryMap) -> Result<(), TestCaseError> {
    for w in m.entries().windows(2) {
        prop_assert!(
            w[0].range.start <= w[1].range.start,
            "map not sorted: {:?}",
            m
        );
        prop_assert!(
            !w[0].range.overlaps(&w[1].range),
            "entries overlap: {} / {}",
            w[0],
            w[1]
        );
    }
    for e in m.entries() {
        prop_assert!(!e.range.is_empty(), "empty entry in map: {m:?}");
    }
    Ok(())
}

proptest! {
    /// `minus` partitions `a`: the pieces plus `a ∩ b` reconstruct `a`
    /// exactly, the pieces are disjoint, non-empty and never touch `b`.
    #[test]
    fn minus_partitions_the_minuend(a in range_strategy(), b in range_strategy()) {
        let pieces = a.minus(&b);

        prop_assert!(pieces.len() <= 2);
        for p in &pieces {
            prop_assert!(!p.is_empty());
            // Each piece lies within `a` and outside `b`.
            prop_assert!(p.start >= a.start && p.end() <= a.end());
            prop_assert!(!p.overlaps(&b));
        }
        if let [lo, hi] = pieces[..] {
            prop_assert!(!lo.overlaps(&hi));
            prop_assert!(lo.start < hi.start);
        }

        // Sizes add back up to `a`.
        let covered: u64 = intersection(&a, &b).map_or(0, |r| r.size);
        let remainder: u64 = pieces.iter().map(|p| p.size).sum();
        prop_assert_eq!(covered + remainder, a.size);
    }

    /// Subtracting `b` a second time changes nothing.
    #[test]
    fn minus_is_idempotent(a in range_strategy(), b in range_strategy()) {
        let once = a.minus(&b);
        let twice: Vec<PhysRange> = once.iter().flat_map(|p| p.minus(&b)).collect();
        prop_assert_eq!(once, twice);
    }

    /// Map invariants hold after *every* insert, not just at the end.
    #[test]
    fn insert_upholds_map_invariants(entries in proptest::collection::vec(typed_range_strategy(), 0..32)) {
        let mut m = MemoryMap::new();
        for e in entries {
            m.insert(e);
            check_map_invariants(&m)?;
        }
    }

    /// The most recent insert owns its full footprint: every address of the
    /// inserted range is attributed to it and to nothing else.
    #[test]
    fn last_insert_owns_its_footprint(entries in proptest::collection::vec(typed_range_strategy(), 1..16)) {
        let mut m = MemoryMap::new();
        for e in &entries {
            m.insert(*e);
        }
        let last = entries.last().unwrap();
        // The final entry survives unclipped somewhere in the map.
        prop_assert!(m.entries().contains(last));
    }

    /// filter_by_type returns ascending ranges of only that type.
    #[test]
    fn filter_by_type_is_ordered_and_exact(entries in proptest::collection::vec(typed_range_strategy(), 0..16)) {
        let mut m = MemoryMap::new();
        for e in entries {
            m.insert(e);
        }
        let ram = m.filter_by_type(RangeType::Ram);
        for w in ram.windows(2) {
            prop_assert!(w[0].start < w[1].start);
        }
        let expected = m
            .entries()
            .iter()
            .filter(|e| e.typ == RangeType::Ram)
            .count();
        prop_assert_eq!(ram.len(), expected);
    }
}
