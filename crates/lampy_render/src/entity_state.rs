//! Per-entity cached render state and the diff record the observer
//! produces from it (spec.md §3.4, §4.5.1).

use glam::{Quat, Vec3};
use lampy_assets::AssetID;

use crate::scene::{MaterialComponent, RenderObject};

/// The four asset identities that make up an entity's "mesh identity"
/// (spec.md §4.5.1): the mesh itself, its vertex/fragment shaders, and its
/// albedo texture. A change to any of the four is a mesh-identity change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MeshRefs {
    pub mesh: AssetID,
    pub vertex_shader: AssetID,
    pub fragment_shader: AssetID,
    pub texture: AssetID,
}

/// Cached per-entity state the tracker owns (spec.md §3.4). `is_valid` is
/// true iff the source entity carries both a transform and a mesh
/// component — entities without both never enter the tracker at all, so in
/// practice every `EntityRenderState` the tracker holds has `is_valid ==
/// true` (spec.md §4.5.1's `Added` invariant).
#[derive(Debug, Clone)]
pub struct EntityRenderState {
    pub entity_id: u64,
    pub is_valid: bool,
    pub position: Vec3,
    pub rotation_euler: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub mesh: MeshRefs,
    pub material: MaterialComponent,
}

impl EntityRenderState {
    #[must_use]
    pub fn new(entity_id: u64) -> Self {
        Self {
            entity_id,
            is_valid: true,
            position: Vec3::ZERO,
            rotation_euler: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            mesh: MeshRefs::default(),
            material: MaterialComponent::default(),
        }
    }

    /// Builds the GPU-ready [`RenderObject`] this state currently
    /// describes. Shader/texture handles are resolved by the caller (the
    /// render list manager holds only asset ids, not GPU handles) so this
    /// returns `None` for those fields; [`crate::list_manager::RenderListManager`]
    /// fills them in at insertion time once resources are bound.
    #[must_use]
    pub fn to_render_object(&self) -> RenderObject {
        let model_matrix =
            glam::Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position);
        RenderObject {
            model_matrix,
            mesh: self.mesh.mesh,
            shader_handle: None,
            texture_handle: None,
            material: self.material,
        }
    }
}

/// One entry in a frame's diff (spec.md §3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffKind {
    Added,
    Updated,
    Removed,
}

#[derive(Debug, Clone)]
pub struct DiffEntry {
    pub kind: DiffKind,
    pub entity_id: u64,
    /// Present for `Added`/`Updated`; `None` for `Removed` (spec.md §3.4's
    /// `newState?`).
    pub new_state: Option<EntityRenderState>,
}

/// An ordered list of diff entries, consumed exactly once per frame
/// (spec.md §4.5.1).
pub type RenderDiff = Vec<DiffEntry>;
