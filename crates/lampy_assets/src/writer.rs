//! Type-indexed writer registry (spec.md §4.4.1's "Importer/Writer hubs").
//!
//! Writers turn an already-imported [`AssetInfo`] into bytes destined for
//! the cooked content folder or a PAK payload. The default writer for every
//! [`AssetType`] simply streams the imported cache file back out — the hook
//! exists so a future writer can re-pack (e.g. strip debug-only fields)
//! without touching the importer or cooker.

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::id::AssetType;
use crate::info::AssetInfo;

/// Produces the bytes to embed for one asset type.
pub trait Writer: Send + Sync {
    fn write(&self, info: &AssetInfo) -> Result<Vec<u8>>;
}

/// Streams the imported cache file back unchanged.
struct PassthroughWriter;

impl Writer for PassthroughWriter {
    fn write(&self, info: &AssetInfo) -> Result<Vec<u8>> {
        let path = Path::new(&info.imported_path);
        std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone)]
pub struct WriterHub {
    by_type: FxHashMap<AssetType, Arc<dyn Writer>>,
    default: Arc<dyn Writer>,
}

impl Default for WriterHub {
    fn default() -> Self {
        Self {
            by_type: FxHashMap::default(),
            default: Arc::new(PassthroughWriter),
        }
    }
}

impl WriterHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, asset_type: AssetType, writer: impl Writer + 'static) {
        self.by_type.insert(asset_type, Arc::new(writer));
    }

    pub fn write(&self, info: &AssetInfo) -> Result<Vec<u8>> {
        match self.by_type.get(&info.asset_type) {
            Some(writer) => writer.write(info),
            None => self.default.write(info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AssetOrigin;
    use crate::AssetID;

    #[test]
    fn default_writer_streams_cache_file_back() {
        let dir = tempfile::tempdir().unwrap();
        let cached = dir.path().join("a.texbin");
        std::fs::write(&cached, b"binary-blob").unwrap();

        let info = AssetInfo {
            guid: AssetID::from_path("a.png"),
            asset_type: AssetType::Texture,
            origin: AssetOrigin::Project,
            source_path: "a.png".into(),
            imported_path: cached.to_string_lossy().into_owned(),
            dependencies: vec![],
            source_timestamp: 0,
            imported_timestamp: 0,
            source_file_size: 0,
            imported_file_size: 11,
        };

        let hub = WriterHub::new();
        assert_eq!(hub.write(&info).unwrap(), b"binary-blob");
    }
}
