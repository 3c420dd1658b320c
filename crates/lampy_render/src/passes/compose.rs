//! Samples the last upstream color onto a full-screen quad (spec.md
//! §4.5.5). Always present — the graph's required final node. Output:
//! `final`.

use super::LazyGpuResources;
use crate::graph::{Pass, PassExecContext, PassIo};

/// Sampler name the fragment shader binds the upstream color under,
/// regardless of that resource's actual name in the graph (spec.md
/// §4.5.5).
pub const UPSTREAM_COLOR_SAMPLER_NAME: &str = "texture_pass_color";

pub struct FinalComposePass {
    resources: LazyGpuResources,
}

impl Default for FinalComposePass {
    fn default() -> Self {
        Self { resources: LazyGpuResources::default() }
    }
}

impl FinalComposePass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pass for FinalComposePass {
    fn name(&self) -> &str {
        "FinalCompose"
    }

    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>) {
        let handle = self.resources.ensure(ctx.gpu, "final", ctx.viewport_width, ctx.viewport_height);
        let upstream = io.inputs.first().copied().unwrap_or_default();
        log::trace!("FinalComposePass: sampling upstream={upstream:?} as {UPSTREAM_COLOR_SAMPLER_NAME:?}");
        io.outputs[0] = handle;
    }
}
