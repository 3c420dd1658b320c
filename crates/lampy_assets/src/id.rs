//! Deterministic 128-bit asset identifier.
//!
//! Backed by [`uuid::Uuid`] rather than a hand-rolled 128-bit type — the
//! teacher already keys asset storage by `uuid::Uuid`
//! (`assets/storage.rs`'s `FxHashMap<Uuid, H>`), and `uuid` gives us the
//! canonical 36-char string form and a SHA-1-based namespaced constructor
//! (`Uuid::new_v5`) for free.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Fixed namespace UUID: every path-derived [`AssetID`] is scoped under this
/// constant so the same relative path hashes to the same id across
/// processes and machines. Generated once, never regenerated.
const ENGINE_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6c, 0x61, 0x6d, 0x70, 0x79, 0x2d, 0x65, 0x6e, 0x67, 0x69, 0x6e, 0x65, 0x2d, 0x6e, 0x73, 0x00,
]);

/// Opaque 128-bit asset identifier.
///
/// Three ways to obtain one: [`AssetID::from_uuid_str`] for a literal
/// 36-char UUID, [`AssetID::from_path`] for a deterministic id derived from
/// a source path, and [`AssetID::random`] for synthesized assets that have
/// no source file.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetID(Uuid);

impl AssetID {
    /// The all-zero id, used as a sentinel for "no asset".
    pub const NIL: AssetID = AssetID(Uuid::nil());

    /// Parses `s` as a canonical UUID iff it has the 36-char
    /// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx` shape.
    #[must_use]
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        if s.len() != 36 {
            return None;
        }
        Uuid::parse_str(s).ok().map(AssetID)
    }

    /// Derives a stable id from any path string. Normalizes backslashes to
    /// forward slashes, lowercases on a case-insensitive filesystem
    /// convention, then hashes the result into [`ENGINE_NAMESPACE`] via
    /// SHA-1 (`Uuid::new_v5`).
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let normalized = normalize_path(path);
        AssetID(Uuid::new_v5(&ENGINE_NAMESPACE, normalized.as_bytes()))
    }

    /// A fresh, non-deterministic id for an asset synthesized at runtime
    /// (no backing source file to re-derive it from).
    #[must_use]
    pub fn random() -> Self {
        AssetID(Uuid::new_v4())
    }

    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AssetID {
    fn default() -> Self {
        Self::NIL
    }
}

impl fmt::Display for AssetID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for AssetID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssetID({})", self.0.hyphenated())
    }
}

/// Backslashes to forward slashes; lowercased when the target filesystem
/// convention is case-insensitive (Windows, macOS default).
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let slashed = path.replace('\\', "/");
    if case_insensitive_filesystem() {
        slashed.to_lowercase()
    } else {
        slashed
    }
}

#[must_use]
const fn case_insensitive_filesystem() -> bool {
    cfg!(windows) || cfg!(target_os = "macos")
}

/// Closed enumeration of asset kinds.
///
/// Wire form is a plain integer (spec.md §3.3/§6.1/§6.2: index and database
/// entries carry `type` as an int, not a variant name) — `Serialize`/
/// `Deserialize` round-trip through `u8` via the discriminants below rather
/// than the derive's default string form.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum AssetType {
    Unknown = 0,
    Texture = 1,
    Mesh = 2,
    Shader = 3,
    Material = 4,
    Audio = 5,
    Script = 6,
    World = 7,
}

impl AssetType {
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "tga" | "bmp" => AssetType::Texture,
            "mesh" | "obj" | "gltf" | "glb" | "fbx" => AssetType::Mesh,
            "vert" | "frag" | "glsl" | "hlsl" => AssetType::Shader,
            "mat" | "lmat" => AssetType::Material,
            "wav" | "ogg" | "mp3" => AssetType::Audio,
            "lua" | "py" | "wasm" => AssetType::Script,
            "world" | "scene" => AssetType::World,
            _ => AssetType::Unknown,
        }
    }
}

impl From<AssetType> for u8 {
    fn from(value: AssetType) -> Self {
        value as u8
    }
}

impl TryFrom<u8> for AssetType {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(AssetType::Unknown),
            1 => Ok(AssetType::Texture),
            2 => Ok(AssetType::Mesh),
            3 => Ok(AssetType::Shader),
            4 => Ok(AssetType::Material),
            5 => Ok(AssetType::Audio),
            6 => Ok(AssetType::Script),
            7 => Ok(AssetType::World),
            other => Err(format!("invalid AssetType discriminant {other}")),
        }
    }
}

/// Which scan root an [`AssetInfo`](crate::AssetInfo) came from.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum AssetOrigin {
    Project,
    Engine,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_distinct() {
        assert_ne!(AssetID::random(), AssetID::random());
    }

    #[test]
    fn uuid_str_round_trips() {
        let raw = "123e4567-e89b-12d3-a456-426614174000";
        let id = AssetID::from_uuid_str(raw).unwrap();
        assert_eq!(id.to_string(), raw);
    }

    #[test]
    fn non_uuid_shaped_strings_are_rejected() {
        assert!(AssetID::from_uuid_str("not-a-uuid").is_none());
        assert!(AssetID::from_uuid_str("textures/foo.png").is_none());
    }

    #[test]
    fn path_derived_ids_are_deterministic() {
        let a = AssetID::from_path("Textures/Foo.png");
        let b = AssetID::from_path("Textures/Foo.png");
        assert_eq!(a, b);
    }

    #[test]
    fn backslashes_normalize_to_forward_slashes() {
        let a = AssetID::from_path("Textures/Foo.png");
        let b = AssetID::from_path("Textures\\Foo.png");
        assert_eq!(a, b);
    }

    #[cfg(any(windows, target_os = "macos"))]
    #[test]
    fn case_insensitive_on_this_platform() {
        let a = AssetID::from_path("Textures/Foo.png");
        let b = AssetID::from_path("textures/foo.PNG");
        assert_eq!(a, b);
    }
}
