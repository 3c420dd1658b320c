//! Per-asset metadata persisted in the [`crate::AssetDatabase`].

use serde::{Deserialize, Serialize};

use crate::id::{normalize_path, AssetOrigin, AssetType};
use crate::AssetID;

/// Everything the database and resource manager need to know about one
/// imported asset.
///
/// `(guid, source_path)` must both be non-empty for any persisted record —
/// see [`AssetInfo::is_valid`]. `source_path` is always stored relative,
/// forward-slash normalized, in the filesystem's case convention (§3.3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetInfo {
    pub guid: AssetID,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    #[serde(default = "default_origin")]
    pub origin: AssetOrigin,
    /// Relative path, forward-slash normalized.
    #[serde(rename = "source")]
    pub source_path: String,
    /// Absolute path into the import cache.
    #[serde(rename = "imported")]
    pub imported_path: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    pub source_timestamp: u64,
    pub imported_timestamp: u64,
    pub source_file_size: u64,
    pub imported_file_size: u64,
}

fn default_origin() -> AssetOrigin {
    AssetOrigin::Project
}

impl AssetInfo {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.guid.is_nil() && !self.source_path.is_empty()
    }

    /// `(source_timestamp, source_file_size)` — the fingerprint compared
    /// against the on-disk file to decide whether a re-import is needed.
    #[must_use]
    pub fn fingerprint(&self) -> (u64, u64) {
        (self.source_timestamp, self.source_file_size)
    }

    /// The id `MakeDeterministicIDFromPath(self.source_path)` ought to
    /// produce, for the invariant in spec.md §8.1.
    #[must_use]
    pub fn expected_guid(&self) -> AssetID {
        AssetID::from_path(&self.source_path)
    }

    #[must_use]
    pub fn normalized_source_path(path: &str) -> String {
        normalize_path(path)
    }
}
