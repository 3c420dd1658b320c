//! Sealed, offset-indexed archive over imported blobs (spec.md §3.3, §6.1).
//!
//! ```text
//! Header:  magic "LPAK" (4 bytes) | version u32 | indexOffset u64 | indexSize u64
//! Payload: concatenated imported blobs
//! Index:   JSON object guidString -> {offset, size, type, path}
//! ```
//! All integers little-endian.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::database::AssetDatabase;
use crate::error::{Error, Result};
use crate::id::AssetType;
use crate::info::AssetInfo;
use crate::writer::WriterHub;
use crate::AssetID;

pub const MAGIC: [u8; 4] = *b"LPAK";
pub const VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PakEntry {
    pub offset: u64,
    pub size: u64,
    #[serde(rename = "type")]
    pub asset_type: AssetType,
    pub path: String,
}

/// Writes a placeholder header, streams every imported file tail-to-tail,
/// then seeks back and rewrites the header with the final index position.
pub struct PakBuilder;

impl PakBuilder {
    /// Builds a PAK at `dest` containing every asset in `db`, with each
    /// asset's bytes produced by `writers`.
    pub fn build(db: &AssetDatabase, writers: &WriterHub, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        let file = File::create(dest).map_err(|source| Error::Io {
            path: dest.to_path_buf(),
            source,
        })?;
        let mut w = BufWriter::new(file);

        // Placeholder header (24 bytes: magic + version + indexOffset + indexSize).
        w.write_all(&MAGIC).map_err(|source| io_err(dest, source))?;
        w.write_u32::<LittleEndian>(VERSION).map_err(|source| io_err(dest, source))?;
        w.write_u64::<LittleEndian>(0).map_err(|source| io_err(dest, source))?;
        w.write_u64::<LittleEndian>(0).map_err(|source| io_err(dest, source))?;

        let mut index: HashMap<String, PakEntry> = HashMap::new();
        let mut cursor: u64 = 24;

        for info in db.snapshot() {
            let bytes = match writers.write(&info) {
                Ok(bytes) => bytes,
                Err(err) => {
                    log::error!("PakBuilder: skipping {} ({err})", info.guid);
                    continue;
                }
            };
            w.write_all(&bytes).map_err(|source| io_err(dest, source))?;
            index.insert(
                info.guid.to_string(),
                PakEntry {
                    offset: cursor,
                    size: bytes.len() as u64,
                    asset_type: info.asset_type,
                    path: info.source_path.clone(),
                },
            );
            cursor += bytes.len() as u64;
        }

        let index_bytes = serde_json::to_vec(&index).map_err(|source| Error::Json {
            path: dest.to_path_buf(),
            source,
        })?;
        let index_offset = cursor;
        w.write_all(&index_bytes).map_err(|source| io_err(dest, source))?;

        let mut file = w.into_inner().map_err(|e| io_err(dest, e.into_error()))?;
        file.seek(SeekFrom::Start(4)).map_err(|source| io_err(dest, source))?;
        file.write_u32::<LittleEndian>(VERSION).map_err(|source| io_err(dest, source))?;
        file.write_u64::<LittleEndian>(index_offset).map_err(|source| io_err(dest, source))?;
        file.write_u64::<LittleEndian>(index_bytes.len() as u64)
            .map_err(|source| io_err(dest, source))?;
        Ok(())
    }
}

fn io_err(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Opens a PAK read-only and holds the parsed in-memory index.
pub struct PakReader {
    file: parking_lot::Mutex<File>,
    path: std::path::PathBuf,
    entries: FxHashMap<AssetID, PakEntry>,
}

impl PakReader {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = File::open(&path).map_err(|source| io_err(&path, source))?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic).map_err(|source| io_err(&path, source))?;
        if magic != MAGIC {
            return Err(Error::MalformedPak {
                path: path.clone(),
                reason: "bad magic".into(),
            });
        }
        let _version = file.read_u32::<LittleEndian>().map_err(|source| io_err(&path, source))?;
        let index_offset = file.read_u64::<LittleEndian>().map_err(|source| io_err(&path, source))?;
        let index_size = file.read_u64::<LittleEndian>().map_err(|source| io_err(&path, source))?;

        file.seek(SeekFrom::Start(index_offset))
            .map_err(|source| io_err(&path, source))?;
        let mut index_bytes = vec![0u8; index_size as usize];
        file.read_exact(&mut index_bytes).map_err(|source| io_err(&path, source))?;

        let raw: HashMap<String, PakEntry> =
            serde_json::from_slice(&index_bytes).map_err(|source| Error::Json {
                path: path.clone(),
                source,
            })?;

        let mut entries = FxHashMap::default();
        for (guid_str, entry) in raw {
            match AssetID::from_uuid_str(&guid_str) {
                Some(id) => {
                    entries.insert(id, entry);
                }
                None => log::warn!("PakReader: skipping non-uuid index key {guid_str}"),
            }
        }

        Ok(Self {
            file: parking_lot::Mutex::new(file),
            path,
            entries,
        })
    }

    #[must_use]
    pub fn contains(&self, id: AssetID) -> bool {
        self.entries.contains_key(&id)
    }

    #[must_use]
    pub fn entry(&self, id: AssetID) -> Option<&PakEntry> {
        self.entries.get(&id)
    }

    pub fn read_asset(&self, id: AssetID) -> Result<Vec<u8>> {
        let entry = self.entries.get(&id).ok_or(Error::AssetNotInPak(id))?;
        let mut file = self.file.lock();
        file.seek(SeekFrom::Start(entry.offset))
            .map_err(|source| io_err(&self.path, source))?;
        let mut buf = vec![0u8; entry.size as usize];
        file.read_exact(&mut buf).map_err(|source| io_err(&self.path, source))?;
        Ok(buf)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::AssetOrigin;

    fn sample(source: &str, content: &[u8], cache_dir: &Path) -> AssetInfo {
        let stem = source.split(['/', '.']).next().unwrap_or(source);
        let imported = cache_dir.join(format!("{stem}.bin"));
        std::fs::write(&imported, content).unwrap();
        AssetInfo {
            guid: AssetID::from_path(source),
            asset_type: AssetType::Texture,
            origin: AssetOrigin::Project,
            source_path: source.to_string(),
            imported_path: imported.to_string_lossy().into_owned(),
            dependencies: vec![],
            source_timestamp: 0,
            imported_timestamp: 0,
            source_file_size: content.len() as u64,
            imported_file_size: content.len() as u64,
        }
    }

    #[test]
    fn round_trip_reads_back_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let db = AssetDatabase::new();
        db.upsert(sample("a.png", b"hello-a", dir.path()));
        db.upsert(sample("b.png", b"hello-bee", dir.path()));

        let pak_path = dir.path().join("Content.pak");
        PakBuilder::build(&db, &WriterHub::new(), &pak_path).unwrap();

        let reader = PakReader::open(&pak_path).unwrap();
        assert_eq!(reader.len(), 2);
        let a_id = AssetID::from_path("a.png");
        assert!(reader.contains(a_id));
        assert_eq!(reader.read_asset(a_id).unwrap(), b"hello-a");
    }

    #[test]
    fn rejects_file_with_bad_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pak");
        std::fs::write(&path, b"NOPE01234567890123456").unwrap();
        assert!(PakReader::open(&path).is_err());
    }
}
