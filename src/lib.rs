#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Umbrella crate for the Lampy engine's core runtime: memory allocators,
//! the job system, the asset pipeline, and the render graph. Each
//! subsystem lives in its own workspace crate and is re-exported here
//! under a matching module name — `lampy::memory`, `lampy::jobs`,
//! `lampy::assets`, `lampy::render` — since `lampy_memory::Result` and
//! `lampy_assets::Result` (for instance) name different error types and
//! can't both be flattened into this crate's top level.

pub use lampy_assets as assets;
pub use lampy_jobs as jobs;
pub use lampy_memory as memory;
pub use lampy_render as render;
