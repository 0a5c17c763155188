//! Flattened device-tree source.
//!
//! This module does not parse DTB blobs; the boot-staging side hands us an
//! already-decoded [`Fdt`]: a node tree with named properties plus the
//! blob's top-level memory reservation table. Only the two properties the
//! memory map cares about are interpreted here (`device_type` and `reg`).

use crate::error::{MemmapError, Result};
use crate::map::{MemoryMap, RangeType, TypedRange};
use crate::range::PhysRange;

/// A decoded flattened device tree, reduced to what the memory map needs.
#[derive(Debug, Clone, Default)]
pub struct Fdt {
    pub root: FdtNode,
    /// The blob's top-level reservation table (the `/memreserve/` entries),
    /// separate from the node hierarchy.
    pub reserve_entries: Vec<FdtReserveEntry>,
}

/// One entry of the top-level reservation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdtReserveEntry {
    pub address: u64,
    pub size: u64,
}

/// A device-tree node: a name, a property list and child nodes.
#[derive(Debug, Clone, Default)]
pub struct FdtNode {
    pub name: String,
    pub properties: Vec<FdtProperty>,
    pub children: Vec<FdtNode>,
}

/// A raw property value attached to a node.
#[derive(Debug, Clone)]
pub struct FdtProperty {
    pub name: String,
    pub value: Vec<u8>,
}

impl FdtProperty {
    pub fn new(name: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Interpret the value as a NUL-terminated string.
    pub fn as_string(&self) -> core::result::Result<&str, &'static str> {
        let Some((&0, body)) = self.value.split_last() else {
            return Err("string property is not NUL-terminated");
        };
        if body.contains(&0) {
            return Err("string property contains interior NUL");
        }
        core::str::from_utf8(body).map_err(|_| "string property is not UTF-8")
    }

    /// Interpret the value as a `reg` region: two big-endian u64s, address
    /// then size.
    pub fn as_region(&self) -> core::result::Result<PhysRange, &'static str> {
        let bytes: &[u8; 16] = self
            .value
            .as_slice()
            .try_into()
            .map_err(|_| "region property is not 16 bytes")?;
        let start = u64::from_be_bytes(bytes[..8].try_into().unwrap());
        let size = u64::from_be_bytes(bytes[8..].try_into().unwrap());
        Ok(PhysRange::new(start, size))
    }
}

impl FdtNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn property(&self, name: &str) -> Option<&FdtProperty> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Depth-first pre-order traversal. Stops at the first error.
    pub fn walk<F>(&self, f: &mut F) -> Result<()>
    where
        F: FnMut(&FdtNode) -> Result<()>,
    {
        f(self)?;
        for child in &self.children {
            child.walk(f)?;
        }
        Ok(())
    }

    /// First node with the given name, depth-first, including `self`.
    pub fn find_by_name(&self, name: &str) -> Option<&FdtNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find_by_name(name))
    }

    fn region_property(&self, name: &'static str) -> Result<Option<PhysRange>> {
        let Some(p) = self.property(name) else {
            return Ok(None);
        };
        p.as_region()
            .map(Some)
            .map_err(|reason| MemmapError::MalformedProperty {
                node: self.name.clone(),
                property: name,
                reason,
            })
    }
}

impl MemoryMap {
    /// Build a memory map from a firmware-provided device tree.
    ///
    /// Every node with `device_type = "memory"` contributes its `reg` region
    /// as RAM. Reservations follow, so they carve into the RAM just
    /// inserted: first the `reserved-memory` subtree (if present), then the
    /// top-level reservation table, which therefore has final priority.
    ///
    /// Nodes missing `device_type` or `reg` are skipped; a `reg` value that
    /// cannot be decoded aborts construction.
    pub fn from_fdt(fdt: &Fdt) -> Result<MemoryMap> {
        let mut map = MemoryMap::new();

        fdt.root.walk(&mut |n| {
            let Some(devtype) = n.property("device_type") else {
                return Ok(());
            };
            // An undecodable device_type just means "not a memory node".
            if devtype.as_string() != Ok("memory") {
                return Ok(());
            }
            if let Some(region) = n.region_property("reg")? {
                map.insert(TypedRange::new(region, RangeType::Ram));
            }
            Ok(())
        })?;

        if let Some(resv) = fdt.root.find_by_name("reserved-memory") {
            resv.walk(&mut |n| {
                if let Some(region) = n.region_property("reg")? {
                    map.insert(TypedRange::new(region, RangeType::Reserved));
                }
                Ok(())
            })?;
        }

        for e in &fdt.reserve_entries {
            map.insert(TypedRange::new(
                PhysRange::new(e.address, e.size),
                RangeType::Reserved,
            ));
        }

        Ok(map)
    }
}
