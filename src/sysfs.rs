//! Firmware memory map from `/sys/firmware/memmap`.
//!
//! The kernel exposes one directory per firmware map entry, each holding
//! three attribute files: `start`, `end` (inclusive) and `type`. The walk
//! yields those files one at a time, so entries are accumulated per parent
//! directory and only emitted once all three attributes were seen.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::{MemmapError, Result};
use crate::map::{MemoryMap, RangeType, TypedRange};
use crate::range::PhysRange;

/// Where the kernel mounts the firmware memory map.
pub const SYSFS_MEMMAP_ROOT: &str = "/sys/firmware/memmap";

#[derive(Debug, Default)]
struct PendingEntry {
    start: Option<u64>,
    end: Option<u64>,
    typ: Option<RangeType>,
}

impl MemoryMap {
    /// Read the firmware-provided memory map from a `/sys/firmware/memmap`
    /// style directory tree rooted at `root`.
    ///
    /// Entries from this source are disjoint by construction, so the map is
    /// assembled with a single sort instead of overlay inserts. An
    /// unrecognized `type` label demotes the entry to `Reserved` with a
    /// warning; an unreadable or unparsable attribute, an unexpected file,
    /// or an entry directory missing one of its three attributes is fatal.
    pub fn from_sysfs_memmap(root: impl AsRef<Path>) -> Result<MemoryMap> {
        let mut pending: HashMap<PathBuf, PendingEntry> = HashMap::new();
        visit_dir(root.as_ref(), &mut pending)?;

        let mut entries = Vec::with_capacity(pending.len());
        for (dir, e) in pending {
            let (Some(start), Some(end), Some(typ)) = (e.start, e.end, e.typ) else {
                return Err(MemmapError::IncompleteSysfsEntry(dir));
            };
            // end is inclusive: sysfs prints start: 0x100, end: 0x1ff for
            // what we store as start: 0x100, size: 0x100.
            let range = PhysRange::from_inclusive(start, end);
            if range.is_empty() {
                warn!(entry = %dir.display(), "skipping empty firmware memory map entry");
                continue;
            }
            entries.push(TypedRange::new(range, typ));
        }
        Ok(MemoryMap::from_disjoint_entries(entries))
    }
}

fn visit_dir(dir: &Path, pending: &mut HashMap<PathBuf, PendingEntry>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            visit_dir(&path, pending)?;
        } else {
            read_attribute(&path, pending)?;
        }
    }
    Ok(())
}

fn read_attribute(path: &Path, pending: &mut HashMap<PathBuf, PendingEntry>) -> Result<()> {
    let name = path.file_name().and_then(|n| n.to_str());
    let Some(name @ ("start" | "end" | "type")) = name else {
        return Err(MemmapError::UnexpectedSysfsFile(path.to_path_buf()));
    };

    let data = fs::read_to_string(path)?;
    let data = data.trim();
    let parent = path.parent().unwrap_or(Path::new("")).to_path_buf();
    let slot = pending.entry(parent).or_default();

    match name {
        "start" => slot.start = Some(parse_sysfs_u64(path, data)?),
        "end" => slot.end = Some(parse_sysfs_u64(path, data)?),
        "type" => {
            slot.typ = Some(RangeType::from_label(data).unwrap_or_else(|| {
                warn!(
                    attribute = %path.display(),
                    label = data,
                    "unrecognized memory map type, defaulting to Reserved"
                );
                RangeType::Reserved
            }));
        }
        _ => unreachable!(),
    }
    Ok(())
}

/// Parse an attribute value the way the kernel prints it: `0x`-prefixed hex
/// or plain decimal.
fn parse_sysfs_u64(path: &Path, s: &str) -> Result<u64> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|_| MemmapError::InvalidSysfsValue {
        path: path.to_path_buf(),
        value: s.to_string(),
    })
}
