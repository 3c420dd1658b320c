//! Named logical resources the render graph's passes read and write
//! (spec.md §3.4).

use crate::handle::TextureHandle;

/// One entry in the graph's resource table. `handle` is
/// [`TextureHandle::UNSET`] until some pass writes it for the first time.
#[derive(Debug, Clone)]
pub struct RenderGraphResource {
    pub name: String,
    pub handle: TextureHandle,
    pub width: u32,
    pub height: u32,
}

impl RenderGraphResource {
    #[must_use]
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self { name: name.into(), handle: TextureHandle::UNSET, width, height }
    }
}
