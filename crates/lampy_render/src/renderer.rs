//! Per-frame orchestrator (spec.md §4.5.6): binds the external
//! collaborators (window, UI overlay, physics debug-draw, ECS frame
//! source), owns the render graph, and drives one frame end to end. A
//! missing collaborator short-circuits its step with a logged warning —
//! `render()` never panics or propagates an error out of a frame.

use std::sync::Arc;

use crate::context::RenderContext;
use crate::ecs::EcsFrameSource;
use crate::gpu::GpuBackend;
use crate::graph::RenderGraph;
use crate::handle::TextureHandle;
use crate::list_manager::RenderListManager;
use crate::tracker::RenderEntityTracker;
use crate::updaters::{update_camera, update_lights_from_ecs, update_transforms};

/// Selects the final presentation path (spec.md §6.5's
/// `LAMPY_RENDER_OUTPUT` environment variable, overridable
/// programmatically via [`Renderer::set_output`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutput {
    WindowSwapchain,
    Offscreen,
}

impl RenderOutput {
    /// Reads `LAMPY_RENDER_OUTPUT` (`"window"` | `"offscreen"`), defaulting
    /// to `WindowSwapchain` for any unset or unrecognized value.
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var("LAMPY_RENDER_OUTPUT").as_deref() {
            Ok("offscreen") => RenderOutput::Offscreen,
            _ => RenderOutput::WindowSwapchain,
        }
    }
}

/// Presents a composited frame to the platform window. Implemented by the
/// windowing collaborator (spec.md §1 — addressed only as an interface).
pub trait WindowPresenter: Send {
    fn present(&mut self, texture: TextureHandle);
    fn size(&self) -> (u32, u32);
}

/// Renders an overlay (editor/game UI) after the frame is presented.
pub trait UiOverlay: Send {
    fn render(&mut self);
}

/// Draws physics debug primitives into the frame's debug buffer before it
/// is frozen for the graph.
pub trait PhysicsDebugDraw: Send {
    fn debug_draw(&mut self, ctx: &mut RenderContext);
}

pub struct Renderer {
    context: RenderContext,
    tracker: RenderEntityTracker,
    list_manager: RenderListManager,
    graph: RenderGraph,
    gpu: Arc<dyn GpuBackend>,
    output: RenderOutput,
    viewport: (u32, u32),
    needs_full_rebuild: bool,
    window: Option<Box<dyn WindowPresenter>>,
    ui: Option<Box<dyn UiOverlay>>,
    physics: Option<Box<dyn PhysicsDebugDraw>>,
}

impl Renderer {
    #[must_use]
    pub fn new(gpu: Arc<dyn GpuBackend>, graph: RenderGraph, viewport: (u32, u32)) -> Self {
        Self {
            context: RenderContext::new(),
            tracker: RenderEntityTracker::new(),
            list_manager: RenderListManager::new(),
            graph,
            gpu,
            output: RenderOutput::from_env(),
            viewport,
            needs_full_rebuild: true,
            window: None,
            ui: None,
            physics: None,
        }
    }

    pub fn set_output(&mut self, output: RenderOutput) {
        self.output = output;
    }

    pub fn set_window(&mut self, window: Box<dyn WindowPresenter>) {
        self.window = Some(window);
    }

    pub fn set_ui(&mut self, ui: Box<dyn UiOverlay>) {
        self.ui = Some(ui);
    }

    pub fn set_physics_debug_draw(&mut self, physics: Box<dyn PhysicsDebugDraw>) {
        self.physics = Some(physics);
    }

    /// Entities added via `tracker()` before the first frame (or after a
    /// bulk scene load) need a full rebuild rather than an incremental
    /// diff — set once, consumed on the next `render()` call.
    pub fn request_full_rebuild(&mut self) {
        self.needs_full_rebuild = true;
    }

    #[must_use]
    pub fn tracker(&self) -> &RenderEntityTracker {
        &self.tracker
    }

    #[must_use]
    pub fn context(&self) -> &RenderContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut RenderContext {
        &mut self.context
    }

    #[must_use]
    pub fn graph(&self) -> &RenderGraph {
        &self.graph
    }

    /// Drives one frame. `ecs_frame` is `None` when no world is bound yet
    /// (e.g. the main menu) — transform/camera/light update is skipped
    /// with a logged warning in that case, matching spec.md §4.5.6's
    /// "null collaborator ... short-circuits the relevant step".
    pub fn render(&mut self, ecs_frame: Option<&dyn EcsFrameSource>) {
        self.context.begin_frame();
        if let Some(physics) = self.physics.as_mut() {
            physics.debug_draw(&mut self.context);
        }
        self.context.flush_debug_primitives();

        self.update_render_list(ecs_frame);

        let (viewport_width, viewport_height) = self.resolve_viewport();
        let active_texture = self.graph.execute(self.context.scene(), self.gpu.as_ref(), viewport_width, viewport_height);

        if self.output == RenderOutput::WindowSwapchain {
            match self.window.as_mut() {
                Some(window) => window.present(active_texture),
                None => log::warn!("Renderer: output is WindowSwapchain but no window collaborator is set"),
            }
            match self.ui.as_mut() {
                Some(ui) => ui.render(),
                None => log::trace!("Renderer: no UI overlay collaborator set"),
            }
        }

        self.context.end_frame();
    }

    fn update_render_list(&mut self, ecs_frame: Option<&dyn EcsFrameSource>) {
        if self.needs_full_rebuild {
            self.list_manager.rebuild_from_tracker(&self.tracker);
            self.needs_full_rebuild = false;
        } else {
            let diff = self.tracker.consume_diff();
            self.list_manager.apply_diff(&diff);
        }

        let Some(source) = ecs_frame else {
            log::warn!("Renderer: no ECS frame source bound; skipping transform/camera/light update");
            return;
        };
        let frame = source.frame_data();
        update_transforms(&self.tracker, &frame);
        update_camera(&mut self.context, &frame);
        update_lights_from_ecs(&mut self.context, &frame);
    }

    fn resolve_viewport(&mut self) -> (u32, u32) {
        if self.output != RenderOutput::WindowSwapchain {
            return self.viewport;
        }
        let Some(window) = self.window.as_ref() else {
            log::warn!("Renderer: output is WindowSwapchain but no window collaborator is set; using last-known viewport");
            return self.viewport;
        };
        let size = window.size();
        if size != self.viewport {
            self.graph.resize_all(size.0, size.1);
            self.viewport = size;
        }
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EcsEvent, MeshComponent, TransformComponent};
    use crate::graph::RenderGraphBuilder;
    use crate::gpu::testing::NullGpu;
    use crate::testing::FakeEcs;

    struct RecordingWindow {
        presented: Vec<TextureHandle>,
        size: (u32, u32),
    }

    impl WindowPresenter for RecordingWindow {
        fn present(&mut self, texture: TextureHandle) {
            self.presented.push(texture);
        }
        fn size(&self) -> (u32, u32) {
            self.size
        }
    }

    fn make_renderer() -> Renderer {
        let graph = RenderGraphBuilder::new().add_builtin_pipeline(640, 480, false, false).build().unwrap();
        let mut renderer = Renderer::new(Arc::new(NullGpu::new()), graph, (640, 480));
        renderer.set_output(RenderOutput::Offscreen);
        renderer
    }

    #[test]
    fn render_without_collaborators_never_panics() {
        let mut renderer = make_renderer();
        renderer.render(None);
    }

    #[test]
    fn full_rebuild_then_incremental_diff_track_tracker_state() {
        let mut renderer = make_renderer();
        let mut ecs = FakeEcs::new();
        renderer.tracker().register(&mut ecs);

        ecs.raise(EcsEvent::TransformChanged { entity: 1, transform: TransformComponent::default() });
        ecs.raise(EcsEvent::MeshChanged {
            entity: 1,
            mesh: MeshComponent { mesh: lampy_assets::AssetID::random(), ..Default::default() },
        });

        renderer.request_full_rebuild();
        renderer.render(Some(&ecs));

        ecs.raise(EcsEvent::TransformChanged { entity: 2, transform: TransformComponent::default() });
        ecs.raise(EcsEvent::MeshChanged {
            entity: 2,
            mesh: MeshComponent { mesh: lampy_assets::AssetID::random(), ..Default::default() },
        });
        renderer.render(Some(&ecs));
    }

    #[test]
    fn window_output_presents_and_resizes_graph() {
        let graph = RenderGraphBuilder::new().add_builtin_pipeline(640, 480, false, false).build().unwrap();
        let mut renderer = Renderer::new(Arc::new(NullGpu::new()), graph, (640, 480));
        renderer.set_output(RenderOutput::WindowSwapchain);
        renderer.set_window(Box::new(RecordingWindow { presented: Vec::new(), size: (1280, 720) }));

        renderer.render(None);
        assert_eq!(renderer.graph().resource("final").unwrap().width, 1280);
    }
}
