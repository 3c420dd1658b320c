//! Cross-crate integration: job system driving an asset rescan, and a
//! cooked PAK being read back through the resource cache — scenarios that
//! span `lampy_jobs` + `lampy_assets` and can't be exercised from either
//! crate's own `#[cfg(test)]` modules alone.

use std::sync::{Arc, Mutex};

use lampy::assets::{
    AssetManager, AssetManagerConfig, CookOptions, Cooker, PakReader, Resource, ResourceManager,
};
use lampy::jobs::{JobSystem, JobSystemConfig};

#[test]
fn scheduled_rescan_job_runs_on_the_job_system_and_saves_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("a.mat"), r#"{"albedo":[1,0,0]}"#).unwrap();

    let cache_root = dir.path().join("cache");
    let manager = Arc::new(Mutex::new(AssetManager::new(AssetManagerConfig::new(
        &project,
        &cache_root,
    ))));

    {
        let guard = manager.lock().unwrap();
        assert_eq!(guard.database().len(), 1);
    }

    let jobs = JobSystem::new(JobSystemConfig { worker_count: 2 });
    let database_path = dir.path().join("AssetDatabase.json");
    let handle =
        AssetManager::schedule_rescan_job(Arc::clone(&manager), &jobs, database_path.clone());
    jobs.wait(&handle);

    assert!(database_path.exists(), "rescan job should have saved the database");
    let saved = std::fs::read_to_string(&database_path).unwrap();
    assert!(saved.contains("a.mat"));
}

struct TextBlob(String);

impl Resource for TextBlob {
    fn load_from_path(path: &std::path::Path) -> Result<Self, String> {
        std::fs::read_to_string(path).map(TextBlob).map_err(|e| e.to_string())
    }
}

#[test]
fn cooked_pak_round_trips_through_the_resource_cache() {
    let dir = tempfile::tempdir().unwrap();
    let project = dir.path().join("project");
    std::fs::create_dir_all(&project).unwrap();
    std::fs::write(project.join("hello.frag"), "void main() {}").unwrap();

    let cache_root = dir.path().join("cache");
    let manager = AssetManager::new(AssetManagerConfig::new(&project, &cache_root));
    let db = manager.database();
    assert_eq!(db.len(), 1);

    let content_root = dir.path().join("content");
    let report = Cooker::cook(&db, &content_root, CookOptions { use_pak: true, copy_loose: false }).unwrap();
    assert!(report.pak_bytes.unwrap() > 0);

    let pak = Arc::new(PakReader::open(content_root.join("Content.pak")).unwrap());
    let mut resources: ResourceManager<TextBlob> = ResourceManager::new(Arc::clone(&db));
    resources.mount_pak(Arc::clone(&pak));

    let id = lampy::assets::AssetID::from_path("hello.frag");
    assert!(pak.contains(id));

    let loaded = resources.load(id).expect("resource should load through the mounted pak");
    assert_eq!(loaded.0, "void main() {}");
}
