use std::io;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemmapError>;

/// Fatal, structural failures while building a memory map from a source.
///
/// Recoverable per-entry problems (an unparsable line in a text source, a
/// node missing an optional property) never show up here; the adapters
/// skip those and keep going. Anything that *does* surface means the pass
/// failed and no partial map is returned.
#[derive(Debug, Error)]
pub enum MemmapError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed {property:?} property on device-tree node {node:?}: {reason}")]
    MalformedProperty {
        node: String,
        property: &'static str,
        reason: &'static str,
    },

    #[error("unexpected file {0:?} in sysfs memory map (expected start/end/type)")]
    UnexpectedSysfsFile(PathBuf),

    #[error("sysfs memory map entry {0:?} is missing one of start/end/type")]
    IncompleteSysfsEntry(PathBuf),

    #[error("sysfs attribute {path:?} contains invalid value {value:?}")]
    InvalidSysfsValue { path: PathBuf, value: String },
}
