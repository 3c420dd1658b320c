//! World blobs are validated against a 100 MiB ceiling and written to
//! `Worlds/<stem>.worldbin`: `{ u32 size, u8[size] utf8-json }`
//! (spec.md §6.3).

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::limits::MAX_WORLD_BYTES;
use super::util::{build_info, read_source, source_metadata, write_cache_file};
use super::Importer;
use crate::error::{Error, Result};
use crate::id::AssetType;
use crate::info::AssetInfo;

pub struct WorldImporter;

impl Importer for WorldImporter {
    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_ascii_lowercase().as_str(), "world" | "scene")
    }

    fn asset_type(&self) -> AssetType {
        AssetType::World
    }

    fn import(&self, source_abs_path: &Path, rel_source_path: &str, cache_root: &Path) -> Result<AssetInfo> {
        let bytes = read_source(source_abs_path)?;
        let (source_timestamp, source_file_size) = source_metadata(source_abs_path)?;

        if bytes.len() as u64 > MAX_WORLD_BYTES {
            return Err(Error::SourceTooLarge(format!(
                "world {rel_source_path} is {} bytes, exceeds {MAX_WORLD_BYTES}",
                bytes.len()
            )));
        }
        // Validate it's at least well-formed JSON before baking it in.
        serde_json::from_slice::<serde_json::Value>(&bytes).map_err(|source| Error::Json {
            path: source_abs_path.to_path_buf(),
            source,
        })?;

        let mut payload = Vec::with_capacity(4 + bytes.len());
        payload.write_u32::<LittleEndian>(bytes.len() as u32).unwrap();
        payload.write_all(&bytes).unwrap();

        let stem = super::util::stem_of(rel_source_path);
        let out_path = write_cache_file(cache_root, "Worlds", &format!("{stem}.worldbin"), &payload)?;
        let imported_file_size = payload.len() as u64;

        Ok(build_info(
            rel_source_path,
            AssetType::World,
            &out_path,
            source_timestamp,
            source_file_size,
            imported_file_size,
            Vec::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn imports_a_world_blob() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("level1.world");
        std::fs::write(&src, r#"{"entities":[]}"#).unwrap();

        let cache = dir.path().join("cache");
        let info = WorldImporter.import(&src, "level1.world", &cache).unwrap();
        let bytes = std::fs::read(&info.imported_path).unwrap();
        let size = u32::from_le_bytes(bytes[0..4].try_into().unwrap()) as usize;
        assert_eq!(&bytes[4..4 + size], br#"{"entities":[]}"#);
    }

    #[test]
    fn non_json_world_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.world");
        std::fs::write(&src, "not json at all").unwrap();
        let cache = dir.path().join("cache");
        assert!(WorldImporter.import(&src, "bad.world", &cache).is_err());
    }
}
