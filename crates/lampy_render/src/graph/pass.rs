//! The `Pass` capability every built-in and custom render-graph node
//! implements (SPEC_FULL §4.5's shared trait, generalizing spec.md
//! §4.5.5's five ad hoc pass bodies).

use crate::gpu::GpuBackend;
use crate::handle::TextureHandle;
use crate::scene::RenderScene;

/// Everything a pass's `exec` needs that isn't one of its own declared
/// resources: the frozen per-frame scene and a handle to the GPU backend
/// for lazily constructing shaders/framebuffers/meshes on first use
/// (spec.md §4.5.5).
pub struct PassExecContext<'a> {
    pub scene: &'a RenderScene,
    pub gpu: &'a dyn GpuBackend,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

/// Read-only snapshots of a pass's declared input resources, and
/// write-only slots for its declared outputs (spec.md §3.4's
/// `RenderGraphPass` invariant: `writes[i]` is the slot `exec` deposits an
/// output handle into).
pub struct PassIo<'a> {
    pub inputs: &'a [TextureHandle],
    pub outputs: &'a mut [TextureHandle],
}

/// A node in the render graph: reads named resources, writes named
/// resources, executes once per frame in the graph's insertion order.
pub trait Pass: Send {
    fn name(&self) -> &str;

    /// Lazily constructs shaders/framebuffers/meshes on first execution,
    /// resizing framebuffers to the current viewport on every call
    /// (spec.md §4.5.5).
    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>);
}
