#![forbid(unsafe_code)]

//! Physical memory map engine for kexec-style kernel handoff.
//!
//! A freshly kexec'd kernel needs an accurate description of physical
//! memory: which ranges are usable RAM and which are reserved, ACPI, NVS
//! and so on. This crate ingests that description from the heterogeneous
//! sources Linux firmware/kernel interfaces provide, reconciles it into one
//! sorted, non-overlapping map of typed ranges, and projects the result
//! into the entry list a LinuxBoot UEFI payload consumes:
//!
//! - [`PhysRange`]: half-open address range with interval arithmetic
//! - [`MemoryMap`]: ordered typed ranges with last-insert-wins overlay
//!   [`MemoryMap::insert`]
//! - source adapters: [`MemoryMap::from_fdt`] (device tree),
//!   [`MemoryMap::from_sysfs_memmap`] (`/sys/firmware/memmap`),
//!   [`MemoryMap::from_iomem`] (`/proc/iomem`),
//!   [`MemoryMap::from_memblock`] (debugfs memblock)
//! - [`MemoryMap::to_uefi_payload`]: projection to numeric-typed entries
//!
//! Each source reports ranges in its own encoding (inclusive vs. exclusive
//! ends, hex vs. decimal, tree vs. flat text); the adapters normalize all
//! of them through [`PhysRange::from_inclusive`] and friends so the
//! off-by-one translation exists exactly once.

mod error;
mod fdt;
mod iomem;
mod map;
mod memblock;
mod payload;
mod range;
mod sysfs;

pub use error::{MemmapError, Result};
pub use fdt::{Fdt, FdtNode, FdtProperty, FdtReserveEntry};
pub use map::{MemoryMap, RangeType, TypedRange};
pub use memblock::DEBUGFS_MEMBLOCK_ROOT;
pub use payload::{UefiPayloadEntry, UefiPayloadMemType, UefiPayloadMemoryMap};
pub use range::{PhysRange, Ranges};
pub use sysfs::SYSFS_MEMMAP_ROOT;

#[cfg(test)]
mod proptests;
