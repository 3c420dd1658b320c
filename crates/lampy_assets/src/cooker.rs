//! Builds the runtime content folder from the imported cache (spec.md §2's
//! "Cooker" row, §6.4).

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::database::AssetDatabase;
use crate::error::{Error, Result};
use crate::pak::PakBuilder;
use crate::writer::WriterHub;

#[derive(Clone, Copy, Debug)]
pub struct CookOptions {
    pub use_pak: bool,
    pub copy_loose: bool,
}

impl Default for CookOptions {
    fn default() -> Self {
        Self {
            use_pak: true,
            copy_loose: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct CookReport {
    pub assets_written: usize,
    pub pak_bytes: Option<u64>,
}

#[derive(Serialize)]
struct Manifest {
    #[serde(rename = "usePak")]
    use_pak: bool,
    #[serde(rename = "pakName")]
    pak_name: String,
}

pub const PAK_NAME: &str = "Content.pak";
pub const RUNTIME_DATABASE_NAME: &str = "AssetDatabase.runtime.json";
pub const MANIFEST_NAME: &str = "Content.manifest.json";

pub struct Cooker;

impl Cooker {
    /// Writes `Content.pak` (when `options.use_pak`), a stripped
    /// `AssetDatabase.runtime.json`, `Content.manifest.json`, and — when
    /// `options.copy_loose` — loose copies of every imported blob
    /// alongside the PAK, into `content_root`.
    pub fn cook(db: &AssetDatabase, content_root: impl AsRef<Path>, options: CookOptions) -> Result<CookReport> {
        let content_root = content_root.as_ref();
        std::fs::create_dir_all(content_root).map_err(|source| Error::Io {
            path: content_root.to_path_buf(),
            source,
        })?;

        let writers = WriterHub::new();
        let mut report = CookReport::default();

        if options.use_pak {
            let pak_path = content_root.join(PAK_NAME);
            PakBuilder::build(db, &writers, &pak_path)?;
            let meta = std::fs::metadata(&pak_path).map_err(|source| Error::Io {
                path: pak_path.clone(),
                source,
            })?;
            report.pak_bytes = Some(meta.len());
        }

        if options.copy_loose {
            for info in db.snapshot() {
                let bytes = writers.write(&info)?;
                let dest = loose_dest(content_root, &info.imported_path);
                if let Some(parent) = dest.parent() {
                    std::fs::create_dir_all(parent).map_err(|source| Error::Io {
                        path: parent.to_path_buf(),
                        source,
                    })?;
                }
                std::fs::write(&dest, bytes).map_err(|source| Error::Io { path: dest, source })?;
            }
        }

        db.save(content_root.join(RUNTIME_DATABASE_NAME))?;

        let manifest = Manifest {
            use_pak: options.use_pak,
            pak_name: PAK_NAME.to_string(),
        };
        let manifest_path = content_root.join(MANIFEST_NAME);
        let manifest_json = serde_json::to_vec_pretty(&manifest).map_err(|source| Error::Json {
            path: manifest_path.clone(),
            source,
        })?;
        std::fs::write(&manifest_path, manifest_json).map_err(|source| Error::Io {
            path: manifest_path,
            source,
        })?;

        report.assets_written = db.len();
        Ok(report)
    }
}

fn loose_dest(content_root: &Path, imported_path: &str) -> PathBuf {
    let file_name = Path::new(imported_path)
        .file_name()
        .map_or_else(|| imported_path.into(), std::ffi::OsStr::to_os_string);
    content_root.join("Loose").join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{AssetOrigin, AssetType};
    use crate::info::AssetInfo;
    use crate::AssetID;

    #[test]
    fn cook_writes_pak_manifest_and_runtime_database() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("cache");
        std::fs::create_dir_all(&cache).unwrap();
        let imported = cache.join("a.texbin");
        std::fs::write(&imported, b"pixels").unwrap();

        let db = AssetDatabase::new();
        db.upsert(AssetInfo {
            guid: AssetID::from_path("a.png"),
            asset_type: AssetType::Texture,
            origin: AssetOrigin::Project,
            source_path: "a.png".into(),
            imported_path: imported.to_string_lossy().into_owned(),
            dependencies: vec![],
            source_timestamp: 0,
            imported_timestamp: 0,
            source_file_size: 6,
            imported_file_size: 6,
        });

        let content_root = dir.path().join("content");
        let report = Cooker::cook(&db, &content_root, CookOptions::default()).unwrap();
        assert_eq!(report.assets_written, 1);
        assert!(report.pak_bytes.unwrap() > 0);
        assert!(content_root.join(PAK_NAME).exists());
        assert!(content_root.join(MANIFEST_NAME).exists());
        assert!(content_root.join(RUNTIME_DATABASE_NAME).exists());
    }
}
