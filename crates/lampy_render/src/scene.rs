//! Per-frame scene record (spec.md §3.4): camera, sun, point lights, the
//! flat render list, and frozen debug primitives. Everything in this
//! module is plain data — passes read it, nothing here touches the GPU.

use glam::{Mat4, Vec3};
use lampy_assets::AssetID;

use crate::handle::TextureHandle;

/// Camera block a pass binds as `CameraData` (spec.md §6.6).
#[derive(Debug, Clone, Copy)]
pub struct CameraState {
    pub view: Mat4,
    pub projection: Mat4,
    pub position: Vec3,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

/// The single directional light ("sun"), including the light-space
/// matrices the shadow pass renders from and the PBR pass samples with.
#[derive(Debug, Clone, Copy)]
pub struct SunState {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub light_view: Mat4,
    pub light_projection: Mat4,
}

impl Default for SunState {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, -1.0, 0.0),
            color: Vec3::ONE,
            intensity: 1.0,
            light_view: Mat4::IDENTITY,
            light_projection: Mat4::IDENTITY,
        }
    }
}

/// Maximum simultaneous point lights the PBR pass's uniform arrays carry
/// (spec.md §4.5.5 / §6.6).
pub const MAX_POINT_LIGHTS: usize = 100;

#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Material properties baked into `MaterialData` (spec.md §6.6). Owned by
/// [`crate::entity_state::EntityRenderState`]; copied into a `RenderObject`
/// each time the object is (re)built.
#[derive(Debug, Clone, Copy)]
pub struct MaterialComponent {
    pub albedo_color: [f32; 4],
    pub roughness: f32,
    pub metallic: f32,
    pub normal_strength: f32,
}

impl Default for MaterialComponent {
    fn default() -> Self {
        Self {
            albedo_color: [1.0, 1.0, 1.0, 1.0],
            roughness: 0.5,
            metallic: 0.0,
            normal_strength: 1.0,
        }
    }
}

/// GPU-ready per-object record (spec.md §3.4). The flat `objects` array on
/// [`RenderScene`] is exactly the render list the PBR pass iterates.
#[derive(Debug, Clone)]
pub struct RenderObject {
    pub model_matrix: Mat4,
    pub mesh: AssetID,
    pub shader_handle: Option<TextureHandle>,
    pub texture_handle: Option<TextureHandle>,
    pub material: MaterialComponent,
}

#[derive(Debug, Clone, Copy)]
pub struct DebugLine {
    pub start: Vec3,
    pub end: Vec3,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy)]
pub struct DebugBox {
    pub center: Vec3,
    pub half_extents: Vec3,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Copy)]
pub struct DebugSphere {
    pub center: Vec3,
    pub radius: f32,
    pub color: [f32; 4],
}

/// The full per-frame record built-in passes consume (spec.md §3.4).
#[derive(Debug, Clone, Default)]
pub struct RenderScene {
    pub camera: CameraState,
    pub sun: SunState,
    pub point_lights: Vec<PointLight>,
    pub objects: Vec<RenderObject>,
    pub debug_lines: Vec<DebugLine>,
    pub debug_boxes: Vec<DebugBox>,
    pub debug_spheres: Vec<DebugSphere>,
}

impl RenderScene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Truncates `point_lights` to [`MAX_POINT_LIGHTS`], the cap the PBR
    /// pass's uniform arrays enforce (spec.md §4.5.5).
    pub fn clamp_point_lights(&mut self) {
        if self.point_lights.len() > MAX_POINT_LIGHTS {
            self.point_lights.truncate(MAX_POINT_LIGHTS);
        }
    }
}
