//! World-space infinite-grid quad blended over the upstream color
//! (spec.md §4.5.5). Optional — only present in the chain when the
//! orchestrator enables it. Output: `grid_color`.

use super::LazyGpuResources;
use crate::graph::{Pass, PassExecContext, PassIo};

pub struct GridPass {
    resources: LazyGpuResources,
}

impl Default for GridPass {
    fn default() -> Self {
        Self { resources: LazyGpuResources::default() }
    }
}

impl GridPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pass for GridPass {
    fn name(&self) -> &str {
        "Grid"
    }

    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>) {
        let handle = self.resources.ensure(ctx.gpu, "grid_color", ctx.viewport_width, ctx.viewport_height);
        let upstream = io.inputs.first().copied().unwrap_or_default();
        log::trace!("GridPass: blending grid over upstream={upstream:?}");
        io.outputs[0] = handle;
    }
}
