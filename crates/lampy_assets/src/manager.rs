//! Watches source roots, imports out-of-date assets, and maintains the
//! [`AssetDatabase`] (spec.md §4.4.2).

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::database::{default_database_path, AssetDatabase};
use crate::id::{normalize_path, AssetOrigin};
use crate::importer::ImporterHub;
use crate::info::AssetInfo;

/// Startup configuration for [`AssetManager`].
pub struct AssetManagerConfig {
    pub project_root: PathBuf,
    pub engine_root: Option<PathBuf>,
    pub cache_root: PathBuf,
    pub database_path: Option<PathBuf>,
}

impl AssetManagerConfig {
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>, cache_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            engine_root: None,
            cache_root: cache_root.into(),
            database_path: None,
        }
    }

    #[must_use]
    pub fn with_engine_root(mut self, engine_root: impl Into<PathBuf>) -> Self {
        self.engine_root = Some(engine_root.into());
        self
    }
}

/// A mutex + condvar-guarded queue fed by the filesystem watcher thread.
/// `process_file_changes` drains it under the mutex then releases
/// (spec.md §4.4.2, §5).
#[derive(Default)]
struct ChangeQueue {
    pending: Mutex<VecDeque<PathBuf>>,
    signal: Condvar,
}

impl ChangeQueue {
    fn push(&self, path: PathBuf) {
        let mut pending = self.pending.lock().expect("change queue mutex poisoned");
        if !pending.contains(&path) {
            pending.push_back(path);
        }
        self.signal.notify_one();
    }

    fn drain(&self) -> Vec<PathBuf> {
        let mut pending = self.pending.lock().expect("change queue mutex poisoned");
        pending.drain(..).collect()
    }
}

type ImportedCallback = Box<dyn Fn(&AssetInfo) + Send + Sync>;

/// Roots a scan walks, a watcher observes, and re-imports feed back into.
pub struct AssetManager {
    importers: ImporterHub,
    database: Arc<AssetDatabase>,
    cache_root: PathBuf,
    roots: Vec<(PathBuf, AssetOrigin)>,
    queue: Arc<ChangeQueue>,
    _watcher: Option<RecommendedWatcher>,
    on_imported: Vec<ImportedCallback>,
}

impl AssetManager {
    /// Wires a recursive watcher over every root, registers the default
    /// importers, then performs a full scan.
    pub fn new(config: AssetManagerConfig) -> Self {
        let database_path = config
            .database_path
            .clone()
            .unwrap_or_else(|| default_database_path(&config.project_root));
        let database = Arc::new(AssetDatabase::load_or_default(&database_path));

        let mut roots = vec![(config.project_root.clone(), AssetOrigin::Project)];
        if let Some(engine_root) = config.engine_root.clone() {
            roots.push((engine_root, AssetOrigin::Engine));
        }

        let queue = Arc::new(ChangeQueue::default());
        let watcher = Self::spawn_watcher(&roots, Arc::clone(&queue));

        let mut manager = Self {
            importers: ImporterHub::with_defaults(),
            database,
            cache_root: config.cache_root,
            roots,
            queue,
            _watcher: watcher,
            on_imported: Vec::new(),
        };
        manager.scan_and_import_all();
        manager
    }

    fn spawn_watcher(roots: &[(PathBuf, AssetOrigin)], queue: Arc<ChangeQueue>) -> Option<RecommendedWatcher> {
        let handler = move |res: notify::Result<Event>| {
            if let Ok(event) = res {
                for path in event.paths {
                    queue.push(path);
                }
            }
        };
        let mut watcher = match notify::recommended_watcher(handler) {
            Ok(w) => w,
            Err(err) => {
                log::error!("AssetManager: failed to create filesystem watcher: {err}");
                return None;
            }
        };
        for (root, _) in roots {
            if let Err(err) = watcher.watch(root, RecursiveMode::Recursive) {
                log::warn!("AssetManager: failed to watch {root:?}: {err}");
            }
        }
        Some(watcher)
    }

    #[must_use]
    pub fn database(&self) -> Arc<AssetDatabase> {
        Arc::clone(&self.database)
    }

    #[must_use]
    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    pub fn on_asset_imported(&mut self, callback: impl Fn(&AssetInfo) + Send + Sync + 'static) {
        self.on_imported.push(Box::new(callback));
    }

    fn fire_imported(&self, info: &AssetInfo) {
        for cb in &self.on_imported {
            cb(info);
        }
    }

    /// Walks every root; for each source, generates the expected guid from
    /// its relative path, looks it up, and skips re-import iff
    /// `(source_timestamp, source_file_size)` both match the on-disk file.
    /// Returns the number of assets (re-)imported.
    pub fn scan_and_import_all(&mut self) -> usize {
        let mut imported_count = 0;
        let roots = self.roots.clone();
        for (root, _origin) in &roots {
            imported_count += self.scan_root(root);
        }
        imported_count
    }

    fn scan_root(&mut self, root: &Path) -> usize {
        let mut count = 0;
        let mut stack = vec![root.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(err) => {
                    log::error!("AssetManager: failed to read dir {dir:?}: {err}");
                    continue;
                }
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                    continue;
                }
                if self.import_if_stale(root, &path).is_some() {
                    count += 1;
                }
            }
        }
        count
    }

    /// Imports `path` iff it's out of date (or new). Returns `Some(info)`
    /// when a re-import happened, `None` when it was skipped or failed.
    fn import_if_stale(&mut self, root: &Path, path: &Path) -> Option<AssetInfo> {
        let ext = path.extension()?.to_str()?.to_string();
        let importer = self.importers.for_extension(&ext)?;

        let rel = path.strip_prefix(root).ok()?.to_string_lossy().replace('\\', "/");
        let rel_norm = normalize_path(&rel);

        let expected_guid = crate::AssetID::from_path(&rel_norm);
        if let Some(existing) = self.database.get(expected_guid) {
            if let Ok(meta) = std::fs::metadata(path) {
                let mtime = meta
                    .modified()
                    .ok()
                    .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
                    .map_or(0, |d| d.as_secs());
                if existing.fingerprint() == (mtime, meta.len()) {
                    return None;
                }
            }
        }

        match importer.import(path, &rel_norm, &self.cache_root) {
            Ok(info) => {
                self.database.upsert(info.clone());
                self.fire_imported(&info);
                Some(info)
            }
            Err(err) => {
                log::error!("AssetManager: failed to import {path:?}: {err}");
                None
            }
        }
    }

    /// Drains the watcher's change queue under its mutex, then re-imports
    /// each out-of-date source, releasing the lock before running importers
    /// (spec.md §5).
    pub fn process_file_changes(&mut self) -> usize {
        let changed = self.queue.drain();
        let mut count = 0;
        let roots = self.roots.clone();
        for path in changed {
            let Some(root) = roots.iter().map(|(r, _)| r.clone()).find(|r| path.starts_with(r)) else {
                continue;
            };
            if !path.is_file() {
                continue;
            }
            if self.import_if_stale(&root, &path).is_some() {
                count += 1;
            }
        }
        count
    }

    /// Saves the database to its on-disk path.
    pub fn save_database(&self, path: impl AsRef<Path>) {
        if let Err(err) = self.database.save(path) {
            log::error!("AssetManager: failed to save database: {err}");
        }
    }

    /// Hands a full rescan to the job system, then saves the database once
    /// it completes.
    pub fn schedule_rescan_job(
        manager: Arc<Mutex<AssetManager>>,
        jobs: &lampy_jobs::JobSystem,
        database_path: PathBuf,
    ) -> lampy_jobs::JobHandle {
        jobs.submit(move || {
            let mut guard = manager.lock().expect("asset manager mutex poisoned");
            guard.scan_and_import_all();
            guard.save_database(&database_path);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_imports_new_sources_and_skips_unchanged_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        std::fs::write(project.join("a.mat"), r#"{"albedo":[1,1,1]}"#).unwrap();

        let cache_root = dir.path().join("cache");
        let mut manager = AssetManager::new(AssetManagerConfig::new(&project, &cache_root));
        assert_eq!(manager.database().len(), 1);

        // Unchanged rescan reports zero additional imports.
        let imported = manager.scan_and_import_all();
        assert_eq!(imported, 0);
        assert_eq!(manager.database().len(), 1);
    }

    #[test]
    fn changed_source_is_reimported_on_rescan() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).unwrap();
        let src = project.join("a.mat");
        std::fs::write(&src, r#"{"albedo":[1,1,1]}"#).unwrap();

        let cache_root = dir.path().join("cache");
        let mut manager = AssetManager::new(AssetManagerConfig::new(&project, &cache_root));
        let first = manager.database().get(crate::AssetID::from_path("a.mat")).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(10));
        std::fs::write(&src, r#"{"albedo":[0,0,0]}"#).unwrap();
        // Force a fingerprint mismatch independent of mtime resolution.
        manager.database().upsert(crate::info::AssetInfo {
            source_file_size: first.source_file_size + 1,
            ..first.clone()
        });

        let imported = manager.scan_and_import_all();
        assert_eq!(imported, 1);
    }
}
