//! Built, executable render graph (spec.md §4.5.4): a resource table plus
//! a linear pass schedule. The graph performs no dependency sorting —
//! insertion order is execution order, full stop.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::pass::{Pass, PassExecContext, PassIo};
use super::resource::RenderGraphResource;
use crate::gpu::GpuBackend;
use crate::handle::TextureHandle;
use crate::scene::RenderScene;

pub(crate) struct GraphPass {
    pub name: String,
    pub reads: Vec<String>,
    pub writes: Vec<String>,
    pub body: Box<dyn Pass>,
}

/// The built, immutable-shape graph [`super::builder::RenderGraphBuilder::build`]
/// produces. Re-executed once per frame via [`execute`](RenderGraph::execute).
///
/// `passes` is a `SmallVec` sized for the fixed five-pass built-in chain
/// (spec.md §4.5.5) — custom graphs with more passes spill to the heap
/// transparently.
pub struct RenderGraph {
    resources: FxHashMap<String, RenderGraphResource>,
    passes: SmallVec<[GraphPass; 8]>,
}

impl RenderGraph {
    pub(crate) fn new(resources: FxHashMap<String, RenderGraphResource>, passes: Vec<GraphPass>) -> Self {
        Self { resources, passes: passes.into() }
    }

    /// Rewrites every declared resource's width/height (spec.md §4.5.4's
    /// `resizeAll`). Passes observe the new size via
    /// [`PassExecContext`] on their next `exec` call and recreate their
    /// own framebuffers accordingly — this call does not touch handles.
    pub fn resize_all(&mut self, width: u32, height: u32) {
        for resource in self.resources.values_mut() {
            resource.width = width;
            resource.height = height;
        }
    }

    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&RenderGraphResource> {
        self.resources.get(name)
    }

    /// Runs every pass once, in insertion order, feeding each one the
    /// current handles of its declared reads and collecting the handles it
    /// deposits into its declared writes, then publishing those handles
    /// back into the resource table. Returns the handle currently bound to
    /// `"final"` — [`TextureHandle::UNSET`] if no pass ever writes it.
    pub fn execute(&mut self, scene: &RenderScene, gpu: &dyn GpuBackend, viewport_width: u32, viewport_height: u32) -> TextureHandle {
        let ctx = PassExecContext { scene, gpu, viewport_width, viewport_height };

        for pass in &mut self.passes {
            let inputs: SmallVec<[TextureHandle; 4]> = pass
                .reads
                .iter()
                .map(|name| self.resources.get(name).map_or(TextureHandle::UNSET, |r| r.handle))
                .collect();
            let mut outputs: SmallVec<[TextureHandle; 4]> = smallvec::smallvec![TextureHandle::UNSET; pass.writes.len()];

            pass.body.exec(&ctx, PassIo { inputs: &inputs, outputs: &mut outputs });

            for (name, handle) in pass.writes.iter().zip(outputs) {
                if let Some(resource) = self.resources.get_mut(name) {
                    resource.handle = handle;
                } else {
                    log::error!("render graph pass {:?} wrote undeclared resource {name:?}", pass.name);
                }
            }
        }

        self.resources.get("final").map_or(TextureHandle::UNSET, |r| r.handle)
    }

    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }
}
