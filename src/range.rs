use core::fmt;

/// A half-open physical address range `[start, start + size)`.
///
/// `end` is exclusive: a range starting at `0x100` with size `0x100` covers
/// addresses `0x100..=0x1ff`. Several firmware sources report *inclusive* end
/// addresses instead; use [`PhysRange::from_inclusive`] when translating those
/// so the off-by-one lives in exactly one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PhysRange {
    pub start: u64,
    pub size: u64,
}

/// An ordered list of physical ranges.
pub type Ranges = Vec<PhysRange>;

impl PhysRange {
    pub fn new(start: u64, size: u64) -> Self {
        Self { start, size }
    }

    /// Build a range from an *exclusive* end address.
    ///
    /// A reversed interval (`end < start`) yields an empty range.
    pub fn from_interval(start: u64, end: u64) -> Self {
        Self {
            start,
            size: end.saturating_sub(start),
        }
    }

    /// Build a range from an *inclusive* end address.
    ///
    /// E.g. sysfs publishes `start: 0x100, end: 0x1ff` for what we represent
    /// as `start: 0x100, size: 0x100`. A reversed interval yields an empty
    /// range. The one span whose size is not representable, `[0, u64::MAX]`,
    /// saturates to `u64::MAX` bytes (one short) instead of overflowing.
    pub fn from_inclusive(start: u64, end_inclusive: u64) -> Self {
        if end_inclusive < start {
            return Self { start, size: 0 };
        }
        Self {
            start,
            size: (end_inclusive - start).saturating_add(1),
        }
    }

    /// Exclusive end address.
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size)
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Whether `self` and `other` share at least one address.
    pub fn overlaps(&self, other: &PhysRange) -> bool {
        self.start < other.end() && other.start < self.end()
    }

    /// The portion(s) of `self` not covered by `other`.
    ///
    /// Returns 0, 1 or 2 ranges: none if `other` covers `self` entirely, two
    /// if `other` sits strictly inside `self` with margin on both sides, one
    /// if `other` clips only the head or tail (or nothing at all, in which
    /// case `self` is returned unchanged). Zero-size pieces are never
    /// produced.
    pub fn minus(&self, other: &PhysRange) -> Vec<PhysRange> {
        if !self.overlaps(other) || other.is_empty() {
            return vec![*self];
        }

        let mut pieces = Vec::with_capacity(2);
        if self.start < other.start {
            // Piece below `other`.
            pieces.push(PhysRange::from_interval(self.start, other.start));
        }
        if other.end() < self.end() {
            // Piece above `other`.
            pieces.push(PhysRange::from_interval(other.end(), self.end()));
        }
        pieces
    }
}

impl fmt::Display for PhysRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end())
    }
}
