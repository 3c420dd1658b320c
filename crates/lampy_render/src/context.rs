//! Per-frame render context (spec.md §4.5.6): owns the [`RenderScene`]
//! record and the staging buffer debug primitives accumulate into before
//! being frozen for the graph.

use crate::scene::{CameraState, DebugBox, DebugLine, DebugSphere, RenderScene, SunState};

/// Staging area for debug primitives, plus the scene record that the
/// render graph's passes ultimately read. The split between "staging" and
/// "scene.debug_*" exists so callers (physics debug-draw, gameplay code)
/// can keep pushing primitives for the entire frame up until
/// [`flush_debug_primitives`](Self::flush_debug_primitives) freezes them —
/// matching spec.md §4.5.6's `beginFrame` / `flushDebugPrimitives` split.
#[derive(Default)]
pub struct RenderContext {
    scene: RenderScene,
    staged_lines: Vec<DebugLine>,
    staged_boxes: Vec<DebugBox>,
    staged_spheres: Vec<DebugSphere>,
}

impl RenderContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the debug primitive staging buffers. Called once at the top
    /// of a frame, before gameplay/physics debug-draw calls run.
    pub fn begin_frame(&mut self) {
        self.staged_lines.clear();
        self.staged_boxes.clear();
        self.staged_spheres.clear();
    }

    pub fn add_debug_line(&mut self, line: DebugLine) {
        self.staged_lines.push(line);
    }

    pub fn add_debug_box(&mut self, b: DebugBox) {
        self.staged_boxes.push(b);
    }

    pub fn add_debug_sphere(&mut self, s: DebugSphere) {
        self.staged_spheres.push(s);
    }

    /// Moves the staged debug primitives into the scene record, where the
    /// debug pass will find them. After this call, further
    /// `add_debug_*` calls this frame do not reach the graph.
    pub fn flush_debug_primitives(&mut self) {
        self.scene.debug_lines = std::mem::take(&mut self.staged_lines);
        self.scene.debug_boxes = std::mem::take(&mut self.staged_boxes);
        self.scene.debug_spheres = std::mem::take(&mut self.staged_spheres);
    }

    /// End-of-frame hook. Currently a no-op seam matching the orchestrator
    /// sequence in spec.md §4.5.6; reserved for future per-frame bookkeeping
    /// (e.g. frame-index counters) without changing the call sequence.
    pub fn end_frame(&mut self) {}

    #[must_use]
    pub fn scene(&self) -> &RenderScene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut RenderScene {
        &mut self.scene
    }

    pub fn set_camera(&mut self, camera: CameraState) {
        self.scene.camera = camera;
    }

    pub fn set_sun(&mut self, sun: SunState) {
        self.scene.sun = sun;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn staged_primitives_only_reach_the_scene_after_flush() {
        let mut ctx = RenderContext::new();
        ctx.begin_frame();
        ctx.add_debug_line(DebugLine { start: Vec3::ZERO, end: Vec3::ONE, color: [1.0; 4] });
        assert!(ctx.scene().debug_lines.is_empty());

        ctx.flush_debug_primitives();
        assert_eq!(ctx.scene().debug_lines.len(), 1);

        // A fresh frame clears the staging buffer, not the frozen scene.
        ctx.begin_frame();
        assert_eq!(ctx.scene().debug_lines.len(), 1);
        ctx.flush_debug_primitives();
        assert!(ctx.scene().debug_lines.is_empty());
    }
}
