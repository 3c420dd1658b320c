//! Crate-local error enum.
//!
//! Per spec.md §7, most failures surface as `Option`/`bool`/no-op rather than
//! `Err` — this enum exists only for the minority of operations (database
//! load/save, PAK I/O, importer I/O) that need to propagate a reason rather
//! than silently degrade.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("pak file {path} is not a valid LPAK archive: {reason}")]
    MalformedPak { path: PathBuf, reason: String },

    #[error("asset {0} not found in pak index")]
    AssetNotInPak(crate::AssetID),

    #[error("source exceeds hard ceiling: {0}")]
    SourceTooLarge(String),

    #[error("unsupported extension: {0}")]
    UnsupportedExtension(String),
}

pub type Result<T> = std::result::Result<T, Error>;
