//! Extension-indexed importer registry (spec.md §4.4.1).
//!
//! Each importer validates its source against a hard size ceiling, writes a
//! compact binary (or canonical JSON/verbatim-copy) sibling into
//! `cache_root/<Kind>/`, and returns the populated [`AssetInfo`].
//! Importers never unwind — every failure path returns `Err` and the
//! caller (the asset manager) logs and moves to the next source.

mod material;
mod mesh;
mod shader;
mod texture;
mod util;
mod world;

pub use material::MaterialImporter;
pub use mesh::MeshImporter;
pub use shader::ShaderImporter;
pub use texture::TextureImporter;
pub use world::WorldImporter;

use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::Result;
use crate::id::AssetType;
use crate::info::AssetInfo;

/// One importer per extension class.
pub trait Importer: Send + Sync {
    fn supports_extension(&self, ext: &str) -> bool;
    fn asset_type(&self) -> AssetType;

    /// `source_abs_path` is where to read bytes from; `rel_source_path` is
    /// the forward-slash normalized path relative to the scan root, used
    /// to derive the deterministic guid and as the persisted `source_path`.
    fn import(
        &self,
        source_abs_path: &Path,
        rel_source_path: &str,
        cache_root: &Path,
    ) -> Result<AssetInfo>;
}

/// Extension-indexed registry of importers. Multiple extensions may map to
/// the same importer instance (e.g. `png`/`jpg`/`tga` all route to
/// [`TextureImporter`]).
#[derive(Default, Clone)]
pub struct ImporterHub {
    by_extension: FxHashMap<String, Arc<dyn Importer>>,
}

impl ImporterHub {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `importer` under every extension in `extensions`
    /// (case-insensitive, without the leading dot).
    pub fn register(&mut self, extensions: &[&str], importer: impl Importer + 'static) {
        let importer: Arc<dyn Importer> = Arc::new(importer);
        for ext in extensions {
            self.by_extension.insert(ext.to_ascii_lowercase(), Arc::clone(&importer));
        }
    }

    /// The hub pre-wired with [`TextureImporter`], [`MeshImporter`],
    /// [`ShaderImporter`], [`MaterialImporter`], and [`WorldImporter`].
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut hub = Self::new();
        hub.register(&["png", "jpg", "jpeg", "tga", "bmp"], TextureImporter);
        hub.register(&["mesh", "obj"], MeshImporter);
        hub.register(&["vert", "frag"], ShaderImporter);
        hub.register(&["mat"], MaterialImporter);
        hub.register(&["world", "scene"], WorldImporter);
        hub
    }

    #[must_use]
    pub fn for_extension(&self, ext: &str) -> Option<&dyn Importer> {
        self.by_extension.get(&ext.to_ascii_lowercase()).map(Arc::as_ref)
    }

    #[must_use]
    pub fn supports(&self, ext: &str) -> bool {
        self.for_extension(ext).is_some()
    }
}

/// Hard input ceilings from spec.md §4.4.1 — inputs outside these are
/// rejected without allocating.
pub mod limits {
    pub const MAX_TEXTURE_DIM: u32 = 16384;
    pub const MAX_MESH_VERTS: u64 = 1_000_000;
    pub const MAX_MESH_INDICES: u64 = 10_000_000;
    pub const MAX_WORLD_BYTES: u64 = 100 * 1024 * 1024;
}
