use core::fmt;

use crate::range::{PhysRange, Ranges};

/// Classification of a physical range, keyed by the label strings Linux
/// uses in firmware-provided memory maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RangeType {
    Ram,
    Default,
    Acpi,
    Nvs,
    Reserved,
}

impl RangeType {
    /// The Linux label for this range type.
    pub fn as_str(self) -> &'static str {
        match self {
            RangeType::Ram => "System RAM",
            RangeType::Default => "Default",
            RangeType::Acpi => "ACPI Tables",
            RangeType::Nvs => "ACPI Non-volatile Storage",
            RangeType::Reserved => "Reserved",
        }
    }

    /// Resolve a source label to a range type.
    ///
    /// Returns `None` for labels we do not know; callers coerce those to
    /// [`RangeType::Reserved`] and log a warning.
    pub fn from_label(label: &str) -> Option<RangeType> {
        match label {
            "System RAM" => Some(RangeType::Ram),
            "Default" => Some(RangeType::Default),
            "ACPI Tables" => Some(RangeType::Acpi),
            "ACPI Non-volatile Storage" => Some(RangeType::Nvs),
            "Reserved" | "reserved" => Some(RangeType::Reserved),
            _ => None,
        }
    }
}

impl fmt::Display for RangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A physical range together with its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedRange {
    pub range: PhysRange,
    pub typ: RangeType,
}

impl TypedRange {
    pub fn new(range: PhysRange, typ: RangeType) -> Self {
        Self { range, typ }
    }
}

impl fmt::Display for TypedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{addr: {}, type: {}}}", self.range, self.typ)
    }
}

/// The layout of physical memory: which ranges are usable RAM and which are
/// reserved for various reasons.
///
/// Invariants, upheld after every mutation:
/// - entries are sorted ascending by `start`;
/// - no two entries overlap.
///
/// Adjacent entries of the same type are *not* merged; two abutting RAM
/// ranges stay two entries.
///
/// A map is built by a single owner feeding it [`MemoryMap::insert`] calls
/// (directly or through one of the source adapters) and is read-only from
/// then on. `insert` is a read-modify-replace over the whole entry list, so
/// it must never be called concurrently against the same map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemoryMap {
    entries: Vec<TypedRange>,
}

impl MemoryMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from entries that are already known to be disjoint, e.g.
    /// a firmware source that publishes a non-overlapping table. Sorts once
    /// instead of paying the overlay cost per entry.
    pub(crate) fn from_disjoint_entries(mut entries: Vec<TypedRange>) -> Self {
        entries.sort_by_key(|e| e.range.start);
        Self { entries }
    }

    pub fn entries(&self) -> &[TypedRange] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, TypedRange> {
        self.entries.iter()
    }

    /// Insert a new range, carving its footprint out of every existing
    /// entry first.
    ///
    /// This gives last-insert-wins overlay semantics: the new entry's type
    /// and boundaries take priority over anything already present in the
    /// overlapping region. Boot-time sources rely on insertion order for
    /// exactly this: raw RAM extents go in first, reservations afterwards
    /// to override portions of them.
    ///
    /// Inserting an empty range is a no-op.
    pub fn insert(&mut self, r: TypedRange) {
        if r.range.is_empty() {
            return;
        }

        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        for q in self.entries.drain(..) {
            for piece in q.range.minus(&r.range) {
                entries.push(TypedRange::new(piece, q.typ));
            }
        }
        entries.push(r);
        entries.sort_by_key(|e| e.range.start);
        self.entries = entries;
    }

    /// All ranges of the given type, ascending by start.
    pub fn filter_by_type(&self, typ: RangeType) -> Ranges {
        self.entries
            .iter()
            .filter(|e| e.typ == typ)
            .map(|e| e.range)
            .collect()
    }
}

impl<'a> IntoIterator for &'a MemoryMap {
    type Item = &'a TypedRange;
    type IntoIter = core::slice::Iter<'a, TypedRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ram(start: u64, size: u64) -> TypedRange {
        TypedRange::new(PhysRange::new(start, size), RangeType::Ram)
    }

    fn reserved(start: u64, size: u64) -> TypedRange {
        TypedRange::new(PhysRange::new(start, size), RangeType::Reserved)
    }

    fn assert_invariants(m: &MemoryMap) {
        for w in m.entries().windows(2) {
            assert!(w[0].range.start <= w[1].range.start, "map not sorted: {m:?}");
            assert!(
                !w[0].range.overlaps(&w[1].range),
                "map entries overlap: {} and {}",
                w[0],
                w[1]
            );
        }
    }

    #[test]
    fn reservation_carves_into_ram() {
        let mut m = MemoryMap::new();
        m.insert(ram(0, 0x1000));
        m.insert(ram(0x2000, 0x1000));
        m.insert(reserved(0x800, 0x1000));
        assert_invariants(&m);

        assert_eq!(
            m.entries(),
            &[
                ram(0, 0x800),
                reserved(0x800, 0x1000),
                ram(0x2000, 0x1000),
            ]
        );
    }

    #[test]
    fn insert_removes_fully_covered_entries() {
        let mut m = MemoryMap::new();
        m.insert(ram(0x100, 0x100));
        m.insert(reserved(0, 0x1000));
        assert_eq!(m.entries(), &[reserved(0, 0x1000)]);
    }

    #[test]
    fn insert_inside_entry_splits_it_in_two() {
        let mut m = MemoryMap::new();
        m.insert(ram(0, 0x1000));
        m.insert(reserved(0x400, 0x100));
        assert_invariants(&m);
        assert_eq!(
            m.entries(),
            &[ram(0, 0x400), reserved(0x400, 0x100), ram(0x500, 0xb00)]
        );
    }

    #[test]
    fn last_insert_wins_even_between_same_types() {
        let mut m = MemoryMap::new();
        m.insert(ram(0, 0x1000));
        m.insert(ram(0x800, 0x1000));
        assert_invariants(&m);
        assert_eq!(m.entries(), &[ram(0, 0x800), ram(0x800, 0x1000)]);
    }

    #[test]
    fn abutting_same_type_entries_are_not_merged() {
        let mut m = MemoryMap::new();
        m.insert(ram(0, 0x1000));
        m.insert(ram(0x1000, 0x1000));
        assert_eq!(m.len(), 2);
    }

    #[test]
    fn empty_insert_is_a_no_op() {
        let mut m = MemoryMap::new();
        m.insert(ram(0, 0x1000));
        let before = m.clone();
        m.insert(reserved(0x400, 0));
        assert_eq!(m, before);
    }

    #[test]
    fn filter_by_type_preserves_order_and_type() {
        let mut m = MemoryMap::new();
        m.insert(ram(0x4000, 0x1000));
        m.insert(ram(0, 0x1000));
        m.insert(reserved(0x2000, 0x1000));
        m.insert(TypedRange::new(PhysRange::new(0x6000, 0x100), RangeType::Acpi));

        assert_eq!(
            m.filter_by_type(RangeType::Ram),
            vec![PhysRange::new(0, 0x1000), PhysRange::new(0x4000, 0x1000)]
        );
        assert_eq!(
            m.filter_by_type(RangeType::Nvs),
            Vec::<PhysRange>::new()
        );
    }

    #[test]
    fn labels_round_trip_through_display() {
        for typ in [
            RangeType::Ram,
            RangeType::Default,
            RangeType::Acpi,
            RangeType::Nvs,
            RangeType::Reserved,
        ] {
            assert_eq!(RangeType::from_label(typ.as_str()), Some(typ));
        }
        assert_eq!(RangeType::from_label("reserved"), Some(RangeType::Reserved));
        assert_eq!(RangeType::from_label("Bogus"), None);
    }
}
