//! The boundary between the render core and a third-party ECS world
//! (spec.md §1: "core consumes queries and observer events; never owns").
//!
//! Two traits, chosen per spec.md §9's redesign note ("push or pull by the
//! target ECS library"): [`EcsObserverSource`] is the push side feeding
//! [`crate::tracker::RenderEntityTracker`], [`EcsFrameSource`] is the pull
//! side feeding the transform/camera updaters. Neither is implemented by
//! this crate against a real ECS — [`crate::testing::FakeEcs`] is the only
//! implementation, used by tests.

use glam::{Quat, Vec3};

use crate::scene::MaterialComponent;

/// The three component kinds the observer watches (spec.md §4.5.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Transform,
    Mesh,
    Material,
}

/// Snapshot of a `TransformComponent` at the moment an event fires.
#[derive(Debug, Clone, Copy)]
pub struct TransformComponent {
    pub position: Vec3,
    pub rotation_euler: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for TransformComponent {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Snapshot of a `MeshComponent`: the mesh-identity triplet plus the
/// albedo texture (spec.md §3.4's "mesh (4 AssetIDs)").
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshComponent {
    pub mesh: lampy_assets::AssetID,
    pub vertex_shader: lampy_assets::AssetID,
    pub fragment_shader: lampy_assets::AssetID,
    pub texture: lampy_assets::AssetID,
}

/// One raised component-lifecycle event (spec.md §4.5.1's Add / Set /
/// Remove / Update). `Set` and `Update` are folded together here — both
/// mean "this component's current value changed"; the tracker is the one
/// that decides whether that produces an `Added` or `Updated` diff entry.
#[derive(Debug, Clone)]
pub enum EcsEvent {
    TransformChanged { entity: u64, transform: TransformComponent },
    MeshChanged { entity: u64, mesh: MeshComponent },
    MaterialChanged { entity: u64, material: MaterialComponent },
    ComponentRemoved { entity: u64, kind: ComponentKind },
    EntityDestroyed { entity: u64 },
}

/// Implemented by an ECS integration that can push component-lifecycle
/// events. The tracker calls [`subscribe`](EcsObserverSource::subscribe)
/// exactly once at startup; the listener closure may be called from any
/// thread the ECS happens to raise events from (spec.md §5).
pub trait EcsObserverSource {
    fn subscribe(&mut self, listener: Box<dyn FnMut(EcsEvent) + Send>);
}

/// One entity's transform as carried in a per-frame ECS snapshot
/// (spec.md §4.5.3).
#[derive(Debug, Clone, Copy)]
pub struct FrameEntityTransform {
    pub entity_id: u64,
    pub position: Vec3,
    pub rotation_euler: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

/// The viewport camera as carried in a per-frame ECS snapshot.
#[derive(Debug, Clone, Copy)]
pub struct FrameCamera {
    pub position: Vec3,
    pub rotation_euler: Vec3,
    pub rotation: Quat,
    pub fov_y_radians: f32,
    pub width: f32,
    pub height: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for FrameCamera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            fov_y_radians: 60f32.to_radians(),
            width: 1920.0,
            height: 1080.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

/// Snapshot of the scene's single directional light.
#[derive(Debug, Clone, Copy)]
pub struct FrameSun {
    pub direction: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for FrameSun {
    fn default() -> Self {
        Self { direction: Vec3::new(0.0, -1.0, 0.0), color: Vec3::ONE, intensity: 1.0 }
    }
}

/// Snapshot of one point light, mirroring [`crate::scene::PointLight`].
#[derive(Debug, Clone, Copy)]
pub struct FramePointLight {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub inner_radius: f32,
    pub outer_radius: f32,
}

/// Per-frame ECS snapshot (spec.md §4.5.3): the viewport camera, the sun
/// and point lights (consumed by `updateLightsFromECS`, spec.md §4.5.6),
/// and every tracked entity's current transform.
#[derive(Debug, Clone, Default)]
pub struct RenderFrameData {
    pub camera: FrameCamera,
    pub sun: FrameSun,
    pub point_lights: Vec<FramePointLight>,
    pub entities: Vec<FrameEntityTransform>,
}

/// Implemented by an ECS integration that can be pulled from once per
/// frame, rather than pushing events.
pub trait EcsFrameSource {
    fn frame_data(&self) -> RenderFrameData;
}
