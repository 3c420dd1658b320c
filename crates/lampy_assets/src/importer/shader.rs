//! Shaders are copied verbatim (spec.md §4.4.1) into `Shaders/<file>.(vert|frag)`.

use std::path::Path;

use super::util::{build_info, read_source, source_metadata, write_cache_file};
use super::Importer;
use crate::error::Result;
use crate::id::AssetType;
use crate::info::AssetInfo;

pub struct ShaderImporter;

impl Importer for ShaderImporter {
    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_ascii_lowercase().as_str(), "vert" | "frag")
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Shader
    }

    fn import(&self, source_abs_path: &Path, rel_source_path: &str, cache_root: &Path) -> Result<AssetInfo> {
        let bytes = read_source(source_abs_path)?;
        let (source_timestamp, source_file_size) = source_metadata(source_abs_path)?;

        let file_name = Path::new(rel_source_path)
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or(rel_source_path);
        let out_path = write_cache_file(cache_root, "Shaders", file_name, &bytes)?;

        Ok(build_info(
            rel_source_path,
            AssetType::Shader,
            &out_path,
            source_timestamp,
            source_file_size,
            bytes.len() as u64,
            Vec::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn copies_shader_source_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("basic.frag");
        std::fs::write(&src, "void main() {}\n").unwrap();

        let cache = dir.path().join("cache");
        let info = ShaderImporter.import(&src, "basic.frag", &cache).unwrap();
        let copied = std::fs::read_to_string(&info.imported_path).unwrap();
        assert_eq!(copied, "void main() {}\n");
    }
}
