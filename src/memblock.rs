//! Kernel memblock debugfs source.
//!
//! `/sys/kernel/debug/memblock` exposes two independent streams, `memory`
//! and `reserved`, each with lines of the form:
//!
//! ```text
//!    0: 0x0000004000000000..0x00000040113fffff
//! ```
//!
//! Bounds are inclusive. The whole memory stream is inserted (as RAM)
//! before any line of the reserved stream, so reservations always win on
//! overlap regardless of line order within each stream.
//!
//! memblock is only available on kernels with `CONFIG_ARCH_KEEP_MEMBLOCK`
//! (and debugfs); without it the kernel drops memblock after early init.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::Result;
use crate::map::{MemoryMap, RangeType, TypedRange};
use crate::range::PhysRange;

/// Where debugfs exposes the memblock streams.
pub const DEBUGFS_MEMBLOCK_ROOT: &str = "/sys/kernel/debug/memblock";

/// Extract the range from one memblock line, or `None` if the line is
/// malformed or encodes an empty range (`start == end`).
fn range_from_memblock_line(line: &str) -> Option<PhysRange> {
    let fields: Vec<&str> = line.split(':').collect();
    let [_index, addrs] = fields[..] else {
        return None;
    };
    let addrs: Vec<&str> = addrs.trim().split("..").collect();
    let [start, end] = addrs[..] else {
        return None;
    };
    let start = u64::from_str_radix(start.strip_prefix("0x").unwrap_or(start), 16).ok()?;
    let end = u64::from_str_radix(end.strip_prefix("0x").unwrap_or(end), 16).ok()?;

    // Empty ranges print as "000..000" even though the inclusive end would
    // make that a 1-byte region.
    if start == end {
        return None;
    }
    Some(PhysRange::from_inclusive(start, end))
}

impl MemoryMap {
    /// Build a memory map from the two memblock streams.
    ///
    /// Unparsable lines are skipped; a read failure on either stream is
    /// fatal.
    pub fn from_memblock(memory: impl BufRead, reserved: impl BufRead) -> Result<MemoryMap> {
        let mut map = MemoryMap::new();
        for line in memory.lines() {
            let Some(range) = range_from_memblock_line(&line?) else {
                continue;
            };
            map.insert(TypedRange::new(range, RangeType::Ram));
        }
        for line in reserved.lines() {
            let Some(range) = range_from_memblock_line(&line?) else {
                continue;
            };
            map.insert(TypedRange::new(range, RangeType::Reserved));
        }
        Ok(map)
    }

    /// Read the kernel-maintained memory map from debugfs memblock under
    /// `root` (see [`DEBUGFS_MEMBLOCK_ROOT`]).
    pub fn from_debugfs_memblock(root: impl AsRef<Path>) -> Result<MemoryMap> {
        let root = root.as_ref();
        let memory = BufReader::new(File::open(root.join("memory"))?);
        let reserved = BufReader::new(File::open(root.join("reserved"))?);
        Self::from_memblock(memory, reserved)
    }
}
