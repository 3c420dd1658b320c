//! Per-frame mutation of render state from the ECS's pulled snapshot
//! (spec.md §4.5.3): transform propagation, camera matrix recomputation,
//! and light extraction.

use glam::{Mat4, Vec3};

use crate::context::RenderContext;
use crate::ecs::RenderFrameData;
use crate::scene::PointLight;
use crate::tracker::RenderEntityTracker;

/// Pushes this frame's ECS transforms into every matching tracked entity.
/// Entities not (yet) in the tracker are silently skipped — spec.md
/// §4.5.3's documented add/remove race.
pub fn update_transforms(tracker: &RenderEntityTracker, frame: &RenderFrameData) {
    tracker.apply_frame_transforms(&frame.entities);
}

/// Recomputes `view`/`projection` from the frame's camera snapshot and
/// writes them into the render context's scene record (spec.md §4.5.3).
pub fn update_camera(ctx: &mut RenderContext, frame: &RenderFrameData) {
    let cam = &frame.camera;
    let forward = cam.rotation * Vec3::NEG_Z;
    let up = cam.rotation * Vec3::Y;
    let view = Mat4::look_at_rh(cam.position, cam.position + forward, up);
    let aspect = if cam.height > 0.0 { cam.width / cam.height } else { 1.0 };
    let projection = Mat4::perspective_rh(cam.fov_y_radians, aspect, cam.near, cam.far);

    let mut camera = ctx.scene().camera;
    camera.view = view;
    camera.projection = projection;
    camera.position = cam.position;
    ctx.set_camera(camera);
}

/// Copies the frame's sun and point lights into the scene record
/// (spec.md §4.5.6's `updateLightsFromECS`), clamping to
/// [`crate::scene::MAX_POINT_LIGHTS`].
pub fn update_lights_from_ecs(ctx: &mut RenderContext, frame: &RenderFrameData) {
    let mut sun = ctx.scene().sun;
    sun.direction = frame.sun.direction;
    sun.color = frame.sun.color;
    sun.intensity = frame.sun.intensity;
    ctx.set_sun(sun);

    let scene = ctx.scene_mut();
    scene.point_lights = frame
        .point_lights
        .iter()
        .map(|p| PointLight {
            position: p.position,
            color: p.color,
            intensity: p.intensity,
            inner_radius: p.inner_radius,
            outer_radius: p.outer_radius,
        })
        .collect();
    scene.clamp_point_lights();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{EcsEvent, FrameEntityTransform, FramePointLight, MeshComponent, TransformComponent};

    #[test]
    fn transform_update_skips_untracked_entities() {
        let tracker = RenderEntityTracker::new();
        tracker.apply_event(EcsEvent::TransformChanged { entity: 1, transform: TransformComponent::default() });
        tracker.apply_event(EcsEvent::MeshChanged {
            entity: 1,
            mesh: MeshComponent { mesh: lampy_assets::AssetID::random(), ..Default::default() },
        });
        tracker.consume_diff();

        let frame = RenderFrameData {
            entities: vec![
                FrameEntityTransform {
                    entity_id: 1,
                    position: Vec3::new(5.0, 0.0, 0.0),
                    rotation_euler: Vec3::ZERO,
                    rotation: glam::Quat::IDENTITY,
                    scale: Vec3::ONE,
                },
                FrameEntityTransform {
                    entity_id: 999,
                    position: Vec3::ZERO,
                    rotation_euler: Vec3::ZERO,
                    rotation: glam::Quat::IDENTITY,
                    scale: Vec3::ONE,
                },
            ],
            ..Default::default()
        };

        update_transforms(&tracker, &frame);
        let state = tracker.get(1).unwrap();
        assert_eq!(state.position, Vec3::new(5.0, 0.0, 0.0));
        let diff = tracker.consume_diff();
        assert_eq!(diff.len(), 1, "only the tracked entity produces a diff entry");
    }

    #[test]
    fn lights_are_clamped_to_max() {
        let mut ctx = RenderContext::new();
        let frame = RenderFrameData {
            point_lights: (0..150)
                .map(|_| FramePointLight {
                    position: Vec3::ZERO,
                    color: Vec3::ONE,
                    intensity: 1.0,
                    inner_radius: 0.1,
                    outer_radius: 10.0,
                })
                .collect(),
            ..Default::default()
        };
        update_lights_from_ecs(&mut ctx, &frame);
        assert_eq!(ctx.scene().point_lights.len(), crate::scene::MAX_POINT_LIGHTS);
    }
}
