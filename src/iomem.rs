//! Kernel resource list, `/proc/iomem` style.
//!
//! Flat text, one resource per line:
//!
//! ```text
//! 740100000000-7401001fffff : PCI Bus 0001:01
//! ```
//!
//! Addresses are hex with an inclusive end. Lines are fed into the map in
//! file order, which is what resolves overlaps: the kernel lists child
//! resources after their parents, so later (more specific) lines override
//! the region they refine.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::map::{MemoryMap, RangeType, TypedRange};
use crate::range::PhysRange;

impl MemoryMap {
    /// Parse a kernel resource list from a line-oriented reader.
    ///
    /// Malformed lines are skipped. A line with `start == end` encodes an
    /// *empty* resource (not a 1-byte one) and is skipped too. Only a read
    /// failure on the underlying stream is fatal.
    pub fn from_iomem(r: impl BufRead) -> Result<MemoryMap> {
        let mut map = MemoryMap::new();
        for line in r.lines() {
            let line = line?;

            let fields: Vec<&str> = line.split(':').collect();
            let [addrs, label] = fields[..] else {
                // Wrong field count. A resource name containing a colon
                // is dropped with the line.
                continue;
            };
            let addrs: Vec<&str> = addrs.trim().split('-').collect();
            let [start, end] = addrs[..] else {
                continue;
            };
            let Ok(start) = u64::from_str_radix(start, 16) else {
                continue;
            };
            let Ok(end) = u64::from_str_radix(end, 16) else {
                continue;
            };
            // Empty resources print as "000-000" even though an inclusive
            // end would make that a 1-byte region.
            if start == end {
                continue;
            }

            let label = label.trim();
            let typ = RangeType::from_label(label).unwrap_or_else(|| {
                warn!(label, "unrecognized iomem resource type, defaulting to Reserved");
                RangeType::Reserved
            });
            map.insert(TypedRange::new(
                PhysRange::from_inclusive(start, end),
                typ,
            ));
        }
        Ok(map)
    }

    /// Parse a kernel resource list from a file.
    pub fn from_iomem_file(path: impl AsRef<Path>) -> Result<MemoryMap> {
        Self::from_iomem(BufReader::new(File::open(path)?))
    }

    /// Read the kernel-maintained memory map from `/proc/iomem`.
    pub fn from_proc_iomem() -> Result<MemoryMap> {
        Self::from_iomem_file("/proc/iomem")
    }
}
