//! Crate-local error enum. Per spec.md §7, render-core failures are meant
//! to never throw out of `render()` — this enum exists for the narrow set
//! of construction-time failures (bad graph wiring) that are easier to
//! catch as `Err` than to paper over silently.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("render graph pass {pass:?} reads {resource:?} before any earlier pass writes it")]
    ReadBeforeWrite { pass: String, resource: String },

    #[error("render graph has no resource named {0:?}")]
    UnknownResource(String),

    #[error("render graph pass name {0:?} is already in use")]
    DuplicatePassName(String),
}

pub type Result<T> = std::result::Result<T, Error>;
