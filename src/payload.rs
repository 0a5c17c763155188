//! Projection of a [`MemoryMap`] into the entry list handed to the next
//! kernel (LinuxBoot UEFI payload format).
//!
//! The byte-level encoding of the entry list is the boot-staging side's
//! business; this module only produces the ordered, typed entries with the
//! numeric type codes the payload expects.

use crate::map::{MemoryMap, RangeType};

/// Memory type codes used in LinuxBoot UEFI payload memory maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum UefiPayloadMemType {
    Ram = 1,
    Default = 2,
    Acpi = 3,
    Nvs = 4,
    Reserved = 5,
}

impl From<RangeType> for UefiPayloadMemType {
    // `RangeType` is closed, so the mapping is total; a new variant without
    // a payload code fails to compile here instead of leaking through.
    fn from(typ: RangeType) -> Self {
        match typ {
            RangeType::Ram => UefiPayloadMemType::Ram,
            RangeType::Default => UefiPayloadMemType::Default,
            RangeType::Acpi => UefiPayloadMemType::Acpi,
            RangeType::Nvs => UefiPayloadMemType::Nvs,
            RangeType::Reserved => UefiPayloadMemType::Reserved,
        }
    }
}

/// One UEFI payload memory map entry. `end` is inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UefiPayloadEntry {
    pub start: u64,
    pub end: u64,
    pub typ: UefiPayloadMemType,
}

/// A memory map in UEFI payload form, ascending by start.
pub type UefiPayloadMemoryMap = Vec<UefiPayloadEntry>;

impl MemoryMap {
    /// Project the map into UEFI payload entries, one per map entry, in map
    /// order. Pure and infallible.
    pub fn to_uefi_payload(&self) -> UefiPayloadMemoryMap {
        self.iter()
            .map(|e| UefiPayloadEntry {
                start: e.range.start,
                // Map entries are non-empty, so size - 1 cannot underflow,
                // and grouping it first keeps the sum in range for entries
                // ending at the last address.
                end: e.range.start + (e.range.size - 1),
                typ: e.typ.into(),
            })
            .collect()
    }
}
