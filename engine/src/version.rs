//! Target backend versions and the wire-protocol features derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the search backend a document is compiled for.
///
/// Ordering is lexicographic over `(major, minor, patch)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl EngineVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Wire-protocol capabilities of a backend version.
///
/// The compilers consult these only where output genuinely differs between
/// versions; everything else is version-independent.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Features {
    pub supports_runtime_fields: bool,
    pub supports_track_total_hits: bool,
}

impl Features {
    pub const RUNTIME_FIELDS_SINCE: EngineVersion = EngineVersion::new(7, 11, 0);
    pub const TRACK_TOTAL_HITS_SINCE: EngineVersion = EngineVersion::new(7, 0, 0);

    pub fn for_version(version: EngineVersion) -> Self {
        Self {
            supports_runtime_fields: version >= Self::RUNTIME_FIELDS_SINCE,
            supports_track_total_hits: version >= Self::TRACK_TOTAL_HITS_SINCE,
        }
    }
}
