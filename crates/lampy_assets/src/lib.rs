//! On-disk content-addressed asset database, importer/writer pipeline, PAK
//! archive format, and reference-counted runtime resource cache.
//!
//! Layered bottom-up: [`AssetID`] identifies content; [`AssetDatabase`]
//! persists [`AssetInfo`] records; [`importer`]/[`writer`] convert between
//! source files and the import cache; [`AssetManager`] drives the
//! watch-and-reimport loop; [`pak`] seals the cache into a distributable
//! archive; [`cooker`] assembles the runtime content folder; [`resource`]
//! is the typed, PAK-aware runtime cache everything else loads through.

mod cooker;
mod database;
mod error;
mod id;
mod importer;
mod info;
mod manager;
mod pak;
mod resource;
mod writer;

pub use cooker::{CookOptions, CookReport, Cooker};
pub use database::{default_database_path, AssetDatabase};
pub use error::{Error, Result};
pub use id::{normalize_path, AssetID, AssetOrigin, AssetType};
pub use importer::{Importer, ImporterHub, MaterialImporter, MeshImporter, ShaderImporter, TextureImporter, WorldImporter};
pub use info::AssetInfo;
pub use manager::{AssetManager, AssetManagerConfig};
pub use pak::{PakBuilder, PakEntry, PakReader};
pub use resource::{Resource, ResourceManager};
pub use writer::{Writer, WriterHub};
