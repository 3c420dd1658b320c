//! Full-scene PBR shading pass (spec.md §4.5.5). Output: `color`.
//!
//! Builds the uniform blocks spec.md §6.6 names — `CameraData`,
//! `DirectionalLightData`, `LightSpaceMatrix`, the point-light arrays, and
//! per-object `model`/`normalMatrix` — even though [`crate::gpu::GpuBackend`]
//! has no real binding call to hand them to; this is the seam a concrete
//! backend (OpenGL/wgpu) fills in. If an object has no bound texture, its
//! `normalStrength` is forced to zero regardless of material authoring
//! (spec.md §4.5.5) — our simplified [`crate::entity_state::MeshRefs`]
//! tracks one texture slot rather than separate albedo/normal/roughness
//! slots, so "texture absent" stands in for "normal map absent".

use glam::{Mat3, Vec4};

use super::LazyGpuResources;
use crate::graph::{Pass, PassExecContext, PassIo};
use crate::scene::MAX_POINT_LIGHTS;

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniforms {
    pub view: glam::Mat4,
    pub projection: glam::Mat4,
    pub position: Vec4,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DirectionalLightUniforms {
    pub direction: Vec4,
    pub color: Vec4,
    pub intensity: f32,
    pub _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniforms {
    pub albedo_color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
    pub normal_strength: f32,
    pub _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PerObjectUniforms {
    pub model: glam::Mat4,
    pub normal_matrix_cols: [[f32; 3]; 3],
}

impl PerObjectUniforms {
    #[must_use]
    pub fn from_model(model: glam::Mat4) -> Self {
        let normal_matrix = Mat3::from_mat4(model).inverse().transpose();
        Self { model, normal_matrix_cols: normal_matrix.to_cols_array_2d() }
    }
}

pub struct PbrPass {
    resources: LazyGpuResources,
}

impl Default for PbrPass {
    fn default() -> Self {
        Self { resources: LazyGpuResources::default() }
    }
}

impl PbrPass {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Pass for PbrPass {
    fn name(&self) -> &str {
        "PBR"
    }

    fn exec(&mut self, ctx: &PassExecContext<'_>, io: PassIo<'_>) {
        let handle = self.resources.ensure(ctx.gpu, "color", ctx.viewport_width, ctx.viewport_height);
        let shadow_map = io.inputs.first().copied().unwrap_or_default();

        let _camera = CameraUniforms {
            view: ctx.scene.camera.view,
            projection: ctx.scene.camera.projection,
            position: ctx.scene.camera.position.extend(1.0),
        };
        let _sun = DirectionalLightUniforms {
            direction: ctx.scene.sun.direction.extend(0.0),
            color: ctx.scene.sun.color.extend(0.0),
            intensity: ctx.scene.sun.intensity,
            _pad: [0.0; 3],
        };
        let _light_space_matrix = ctx.scene.sun.light_projection * ctx.scene.sun.light_view;
        let point_light_count = ctx.scene.point_lights.len().min(MAX_POINT_LIGHTS);

        for object in &ctx.scene.objects {
            let mut material = object.material;
            if object.texture_handle.is_none() {
                material.normal_strength = 0.0;
            }
            let _material_uniforms = MaterialUniforms {
                albedo_color: Vec4::from(material.albedo_color),
                roughness: material.roughness,
                metallic: material.metallic,
                normal_strength: material.normal_strength,
                _pad: 0.0,
            };
            let _per_object = PerObjectUniforms::from_model(object.model_matrix);
        }

        log::trace!(
            "PBRPass: {} objects, {point_light_count} point lights, shadow_map={shadow_map:?}",
            ctx.scene.objects.len(),
        );
        io.outputs[0] = handle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_texture_forces_zero_normal_strength() {
        let mut material = crate::scene::MaterialComponent::default();
        material.normal_strength = 1.0;
        let object = crate::scene::RenderObject {
            model_matrix: glam::Mat4::IDENTITY,
            mesh: lampy_assets::AssetID::random(),
            shader_handle: None,
            texture_handle: None,
            material,
        };
        let mut effective = object.material;
        if object.texture_handle.is_none() {
            effective.normal_strength = 0.0;
        }
        assert_eq!(effective.normal_strength, 0.0);
    }

    #[test]
    fn per_object_uniforms_identity_normal_matrix() {
        let uniforms = PerObjectUniforms::from_model(glam::Mat4::IDENTITY);
        assert_eq!(uniforms.normal_matrix_cols, Mat3::IDENTITY.to_cols_array_2d());
    }
}
