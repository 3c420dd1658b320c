//! Parses a minimal Wavefront OBJ subset (or the engine's own `.mesh`
//! indexed-triangle text format) and writes a compact `.meshbin` sibling:
//! `{ u32 vertexCount, u32 indexCount, f32[3*V] pos, f32[3*V] normal,
//! f32[2*V] uv, u32[I] indices }` (spec.md §6.3).

use std::io::Write;
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use super::limits::{MAX_MESH_INDICES, MAX_MESH_VERTS};
use super::util::{build_info, read_source, source_metadata, write_cache_file};
use super::Importer;
use crate::error::{Error, Result};
use crate::id::AssetType;
use crate::info::AssetInfo;

pub struct MeshImporter;

#[derive(Default)]
struct ParsedMesh {
    positions: Vec<[f32; 3]>,
    normals: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    indices: Vec<u32>,
}

/// Parses `v`/`vn`/`vt`/`f` directives. Faces are expected already
/// triangulated (`f v/vt/vn v/vt/vn v/vt/vn`); anything else is ignored.
/// Missing normal/uv channels are filled with zero.
fn parse_obj(text: &str) -> ParsedMesh {
    let mut raw_pos = Vec::new();
    let mut raw_norm = Vec::new();
    let mut raw_uv = Vec::new();

    let mut positions = Vec::new();
    let mut normals = Vec::new();
    let mut uvs = Vec::new();
    let mut indices = Vec::new();
    let mut seen: rustc_hash::FxHashMap<(i64, i64, i64), u32> = rustc_hash::FxHashMap::default();

    for line in text.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let v: Vec<f32> = tokens.filter_map(|t| t.parse().ok()).collect();
                raw_pos.push([
                    v.first().copied().unwrap_or(0.0),
                    v.get(1).copied().unwrap_or(0.0),
                    v.get(2).copied().unwrap_or(0.0),
                ]);
            }
            Some("vn") => {
                let v: Vec<f32> = tokens.filter_map(|t| t.parse().ok()).collect();
                raw_norm.push([
                    v.first().copied().unwrap_or(0.0),
                    v.get(1).copied().unwrap_or(0.0),
                    v.get(2).copied().unwrap_or(0.0),
                ]);
            }
            Some("vt") => {
                let v: Vec<f32> = tokens.filter_map(|t| t.parse().ok()).collect();
                raw_uv.push([v.first().copied().unwrap_or(0.0), v.get(1).copied().unwrap_or(0.0)]);
            }
            Some("f") => {
                for tok in tokens {
                    let mut parts = tok.split('/');
                    let pi: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let ti: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let ni: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(0);
                    let key = (pi, ti, ni);
                    let index = *seen.entry(key).or_insert_with(|| {
                        let idx = positions.len() as u32;
                        let p = raw_pos.get((pi.max(1) - 1) as usize).copied().unwrap_or([0.0; 3]);
                        let n = if ni != 0 {
                            raw_norm.get((ni.max(1) - 1) as usize).copied().unwrap_or([0.0; 3])
                        } else {
                            [0.0; 3]
                        };
                        let uv = if ti != 0 {
                            raw_uv.get((ti.max(1) - 1) as usize).copied().unwrap_or([0.0; 2])
                        } else {
                            [0.0; 2]
                        };
                        positions.push(p);
                        normals.push(n);
                        uvs.push(uv);
                        idx
                    });
                    indices.push(index);
                }
            }
            _ => {}
        }
    }

    ParsedMesh {
        positions,
        normals,
        uvs,
        indices,
    }
}

impl Importer for MeshImporter {
    fn supports_extension(&self, ext: &str) -> bool {
        matches!(ext.to_ascii_lowercase().as_str(), "mesh" | "obj")
    }

    fn asset_type(&self) -> AssetType {
        AssetType::Mesh
    }

    fn import(&self, source_abs_path: &Path, rel_source_path: &str, cache_root: &Path) -> Result<AssetInfo> {
        let bytes = read_source(source_abs_path)?;
        let (source_timestamp, source_file_size) = source_metadata(source_abs_path)?;

        let text = String::from_utf8_lossy(&bytes);
        let mesh = parse_obj(&text);

        let vertex_count = mesh.positions.len() as u64;
        let index_count = mesh.indices.len() as u64;
        if vertex_count > MAX_MESH_VERTS || index_count > MAX_MESH_INDICES {
            return Err(Error::SourceTooLarge(format!(
                "mesh {rel_source_path}: {vertex_count} verts / {index_count} indices exceeds ceiling"
            )));
        }
        if vertex_count == 0 {
            return Err(Error::SourceTooLarge(format!(
                "mesh {rel_source_path}: no vertices parsed"
            )));
        }

        let mut payload = Vec::new();
        payload.write_u32::<LittleEndian>(mesh.positions.len() as u32).unwrap();
        payload.write_u32::<LittleEndian>(mesh.indices.len() as u32).unwrap();
        for p in &mesh.positions {
            for c in p {
                payload.write_f32::<LittleEndian>(*c).unwrap();
            }
        }
        for n in &mesh.normals {
            for c in n {
                payload.write_f32::<LittleEndian>(*c).unwrap();
            }
        }
        for uv in &mesh.uvs {
            for c in uv {
                payload.write_f32::<LittleEndian>(*c).unwrap();
            }
        }
        for i in &mesh.indices {
            payload.write_u32::<LittleEndian>(*i).unwrap();
        }
        let _ = payload.flush();

        let stem = super::util::stem_of(rel_source_path);
        let out_path = write_cache_file(cache_root, "Meshes", &format!("{stem}.meshbin"), &payload)?;
        let imported_file_size = payload.len() as u64;

        Ok(build_info(
            rel_source_path,
            AssetType::Mesh,
            &out_path,
            source_timestamp,
            source_file_size,
            imported_file_size,
            Vec::new(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvn 0 0 1\nf 1//1 2//1 3//1\n";

    #[test]
    fn imports_a_triangle_into_meshbin() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("tri.obj");
        std::fs::write(&src, TRIANGLE_OBJ).unwrap();

        let cache = dir.path().join("cache");
        let info = MeshImporter.import(&src, "tri.obj", &cache).unwrap();
        assert_eq!(info.asset_type, AssetType::Mesh);

        let bytes = std::fs::read(&info.imported_path).unwrap();
        let vertex_count = u32::from_le_bytes(bytes[0..4].try_into().unwrap());
        let index_count = u32::from_le_bytes(bytes[4..8].try_into().unwrap());
        assert_eq!(vertex_count, 3);
        assert_eq!(index_count, 3);
    }

    #[test]
    fn empty_mesh_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("empty.obj");
        std::fs::write(&src, "# nothing here\n").unwrap();
        let cache = dir.path().join("cache");
        assert!(MeshImporter.import(&src, "empty.obj", &cache).is_err());
    }
}
