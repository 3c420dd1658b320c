//! Materials are re-serialized to canonical JSON (spec.md §4.4.1), written
//! to `Materials/<guid>.lmat` (spec.md §6.3) — the cache path is keyed by
//! guid rather than stem so two differently-named materials never collide.

use std::path::Path;

use super::util::{build_info, read_source, source_metadata, write_cache_file};
use super::Importer;
use crate::error::{Error, Result};
use crate::id::AssetType;
use crate::info::AssetInfo;
use crate::AssetID;

pub struct MaterialImporter;

impl Importer for MaterialImporter {
    fn supports_extension(&self, ext: &str) -> bool {
        ext.eq_ignore_ascii_case("mat")
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Material
    }

    fn import(&self, source_abs_path: &Path, rel_source_path: &str, cache_root: &Path) -> Result<AssetInfo> {
        let bytes = read_source(source_abs_path)?;
        let (source_timestamp, source_file_size) = source_metadata(source_abs_path)?;

        let value: serde_json::Value = serde_json::from_slice(&bytes).map_err(|source| Error::Json {
            path: source_abs_path.to_path_buf(),
            source,
        })?;
        let canonical = serde_json::to_vec_pretty(&value).map_err(|source| Error::Json {
            path: source_abs_path.to_path_buf(),
            source,
        })?;

        let guid = AssetID::from_path(rel_source_path);
        let out_path = write_cache_file(cache_root, "Materials", &format!("{guid}.lmat"), &canonical)?;

        Ok(build_info(
            rel_source_path,
            AssetType::Material,
            &out_path,
            source_timestamp,
            source_file_size,
            canonical.len() as u64,
            Vec::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn re_serializes_to_canonical_json() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("red.mat");
        std::fs::write(&src, r#"{"albedo":[1,0,0],"roughness":0.5}"#).unwrap();

        let cache = dir.path().join("cache");
        let info = MaterialImporter.import(&src, "red.mat", &cache).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&info.imported_path).unwrap()).unwrap();
        assert_eq!(value["roughness"], 0.5);
        assert!(info.imported_path.ends_with(".lmat"));
    }

    #[test]
    fn malformed_json_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("bad.mat");
        std::fs::write(&src, "{not json}").unwrap();
        let cache = dir.path().join("cache");
        assert!(MaterialImporter.import(&src, "bad.mat", &cache).is_err());
    }
}
