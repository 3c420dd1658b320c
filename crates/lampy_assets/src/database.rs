//! Persistent map `AssetID -> AssetInfo`, guarded by a reader-writer lock.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::id::normalize_path;
use crate::info::AssetInfo;
use crate::AssetID;

#[derive(Default)]
struct Inner {
    assets: FxHashMap<AssetID, AssetInfo>,
    source_to_guid: FxHashMap<String, AssetID>,
}

/// `{assets: AssetID -> AssetInfo, sourceToGuid: normalizedPath -> AssetID}`
/// (spec.md §3.3). `forEach` takes a shared lock and must not re-enter the
/// database from the callback.
pub struct AssetDatabase {
    inner: RwLock<Inner>,
}

impl Default for AssetDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetDatabase {
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Inserts or replaces a record, keeping `source_to_guid` consistent.
    pub fn upsert(&self, info: AssetInfo) {
        let mut inner = self.inner.write();
        let key = normalize_path(&info.source_path);
        inner.source_to_guid.insert(key, info.guid);
        inner.assets.insert(info.guid, info);
    }

    #[must_use]
    pub fn get(&self, id: AssetID) -> Option<AssetInfo> {
        self.inner.read().assets.get(&id).cloned()
    }

    #[must_use]
    pub fn get_by_source(&self, source_path: &str) -> Option<AssetInfo> {
        let inner = self.inner.read();
        let key = normalize_path(source_path);
        let id = inner.source_to_guid.get(&key)?;
        inner.assets.get(id).cloned()
    }

    pub fn remove(&self, id: AssetID) -> Option<AssetInfo> {
        let mut inner = self.inner.write();
        let info = inner.assets.remove(&id)?;
        let key = normalize_path(&info.source_path);
        inner.source_to_guid.remove(&key);
        Some(info)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().assets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Takes a shared lock and calls `f` once per record. `f` must not
    /// re-enter the database.
    pub fn for_each(&self, mut f: impl FnMut(&AssetInfo)) {
        let inner = self.inner.read();
        for info in inner.assets.values() {
            f(info);
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Vec<AssetInfo> {
        self.inner.read().assets.values().cloned().collect()
    }

    /// Serializes to JSON and writes atomically-ish (write then rename is
    /// left to callers who need it; this writes directly).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let map: HashMap<String, &AssetInfo> = {
            let inner = self.inner.read();
            inner
                .assets
                .iter()
                .map(|(id, info)| (id.to_string(), info))
                .collect()
        };
        let json = serde_json::to_vec_pretty(&map).map_err(|source| Error::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Loads the on-disk JSON map. Malformed individual records are skipped
    /// with a warning rather than aborting the whole load (spec.md §3.3).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::load_from_bytes(&bytes, path)
    }

    fn load_from_bytes(bytes: &[u8], path: &Path) -> Result<Self> {
        let raw: HashMap<String, serde_json::Value> =
            serde_json::from_slice(bytes).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            })?;

        let db = Self::new();
        for (guid_str, value) in raw {
            match serde_json::from_value::<AssetInfo>(value) {
                Ok(info) if info.is_valid() => db.upsert(info),
                Ok(_) => {
                    log::warn!("AssetDatabase::load: skipping record {guid_str} with empty guid/source");
                }
                Err(err) => {
                    log::warn!("AssetDatabase::load: skipping malformed record {guid_str}: {err}");
                }
            }
        }
        Ok(db)
    }

    /// Loads from `path` if it exists, otherwise starts from an empty
    /// database — the common "first run" case for `AssetManager::new`.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path.exists() {
            match Self::load(path) {
                Ok(db) => return db,
                Err(err) => log::error!("AssetDatabase::load_or_default({path:?}): {err}"),
            }
        }
        Self::new()
    }
}

/// Path of the `AssetDatabase.json` file under a project root, by
/// convention.
#[must_use]
pub fn default_database_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join("AssetDatabase.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AssetOrigin;
    use crate::info::AssetType;

    fn sample(source: &str) -> AssetInfo {
        AssetInfo {
            guid: AssetID::from_path(source),
            asset_type: AssetType::Texture,
            origin: AssetOrigin::Project,
            source_path: source.to_string(),
            imported_path: format!("/cache/{source}.texbin"),
            dependencies: vec![],
            source_timestamp: 1,
            imported_timestamp: 2,
            source_file_size: 10,
            imported_file_size: 20,
        }
    }

    #[test]
    fn upsert_then_get_round_trips() {
        let db = AssetDatabase::new();
        let info = sample("Textures/foo.png");
        db.upsert(info.clone());
        let fetched = db.get(info.guid).unwrap();
        assert_eq!(fetched.source_path, info.source_path);
        assert_eq!(db.get_by_source("Textures/foo.png").unwrap().guid, info.guid);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AssetDatabase.json");
        let db = AssetDatabase::new();
        db.upsert(sample("Textures/a.png"));
        db.upsert(sample("Meshes/b.mesh"));
        db.save(&path).unwrap();

        let loaded = AssetDatabase::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert!(loaded.get_by_source("Textures/a.png").is_some());
    }

    #[test]
    fn malformed_record_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("AssetDatabase.json");
        std::fs::write(
            &path,
            r#"{ "bad": { "guid": "", "source": "" }, "good-entry": null }"#,
        )
        .unwrap();
        let loaded = AssetDatabase::load(&path).unwrap();
        assert_eq!(loaded.len(), 0);
    }
}
