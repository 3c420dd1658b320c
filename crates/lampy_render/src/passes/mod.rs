//! The fixed Shadow → PBR → Grid → Debug → FinalCompose built-in pass
//! chain (spec.md §4.5.5). Each pass owns its GPU-side resources lazily,
//! constructing them on first [`crate::graph::Pass::exec`] and resizing
//! its framebuffer to the current viewport on every call thereafter.

mod compose;
mod debug;
mod grid;
mod pbr;
mod shadow;

pub use compose::FinalComposePass;
pub use debug::DebugPass;
pub use grid::GridPass;
pub use pbr::PbrPass;
pub use shadow::ShadowPass;

use crate::gpu::{GpuBackend, IFramebuffer, IMesh, IShader};

/// Shared lazy-construction state every built-in pass owns (spec.md
/// §4.5.5: "shaders, framebuffers, and a full-screen quad mesh"). Not all
/// three fields are exercised by every pass — `Shadow` never samples the
/// full-screen quad, for instance — they are still carried uniformly to
/// match the spec's blanket statement about what a pass owns.
pub(crate) struct LazyGpuResources {
    framebuffer: Option<Box<dyn IFramebuffer>>,
    shader: Option<Box<dyn IShader>>,
    quad: Option<Box<dyn IMesh>>,
}

impl Default for LazyGpuResources {
    fn default() -> Self {
        Self { framebuffer: None, shader: None, quad: None }
    }
}

impl LazyGpuResources {
    /// Ensures the framebuffer, shader, and quad exist, then resizes the
    /// framebuffer to `(width, height)` if it isn't already that size.
    /// Returns the framebuffer's current color handle.
    pub(crate) fn ensure(&mut self, gpu: &dyn GpuBackend, label: &str, width: u32, height: u32) -> crate::handle::TextureHandle {
        let framebuffer = self.framebuffer.get_or_insert_with(|| gpu.create_framebuffer(width, height, label));
        if framebuffer.width() != width || framebuffer.height() != height {
            framebuffer.resize(width, height);
        }
        self.shader.get_or_insert_with(|| gpu.create_shader(label));
        self.quad.get_or_insert_with(|| gpu.create_fullscreen_quad());
        framebuffer.color_handle()
    }
}
