//! Shared helpers for the concrete importers.

use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use crate::error::{Error, Result};
use crate::id::{AssetOrigin, AssetType};
use crate::info::AssetInfo;
use crate::AssetID;

pub fn read_source(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn source_metadata(path: &Path) -> Result<(u64, u64)> {
    let meta = std::fs::metadata(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let timestamp = meta
        .modified()
        .ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(0, |d| d.as_secs());
    Ok((timestamp, meta.len()))
}

pub fn cache_subdir(cache_root: &Path, kind: &str) -> PathBuf {
    cache_root.join(kind)
}

pub fn stem_of(rel_source_path: &str) -> &str {
    Path::new(rel_source_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(rel_source_path)
}

pub fn write_cache_file(cache_root: &Path, kind: &str, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
    let dir = cache_subdir(cache_root, kind);
    std::fs::create_dir_all(&dir).map_err(|source| Error::Io {
        path: dir.clone(),
        source,
    })?;
    let out_path = dir.join(file_name);
    std::fs::write(&out_path, bytes).map_err(|source| Error::Io {
        path: out_path.clone(),
        source,
    })?;
    Ok(out_path)
}

#[allow(clippy::too_many_arguments)]
pub fn build_info(
    rel_source_path: &str,
    asset_type: AssetType,
    imported_path: &Path,
    source_timestamp: u64,
    source_file_size: u64,
    imported_file_size: u64,
    dependencies: Vec<String>,
) -> AssetInfo {
    let imported_timestamp = std::time::SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs());
    AssetInfo {
        guid: AssetID::from_path(rel_source_path),
        asset_type,
        origin: AssetOrigin::Project,
        source_path: crate::id::normalize_path(rel_source_path),
        imported_path: imported_path.to_string_lossy().into_owned(),
        dependencies,
        source_timestamp,
        imported_timestamp,
        source_file_size,
        imported_file_size,
    }
}
