//! ECS → render-state diff producer (spec.md §4.5.1).
//!
//! [`RenderEntityTracker`] owns the authoritative `entityId → cached state`
//! map. [`RenderEntityTracker::register`] subscribes to an
//! [`EcsObserverSource`]; the resulting closure may fire from any thread
//! the ECS raises events from (spec.md §5), so the shared state lives
//! behind a [`parking_lot::Mutex`] and [`RenderEntityTracker::consume_diff`]
//! is the sole transfer point back to the render thread.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::ecs::{
    ComponentKind, EcsEvent, EcsObserverSource, FrameEntityTransform, MeshComponent, TransformComponent,
};
use crate::entity_state::{DiffEntry, DiffKind, EntityRenderState, MeshRefs, RenderDiff};
use crate::scene::MaterialComponent;

/// Everything the tracker knows about an entity that has *not yet* (or no
/// longer) become a fully valid renderable — the raw component pieces seen
/// so far. Once both `transform` and `mesh` are `Some`, the entity is
/// promoted into `Inner::states`.
#[derive(Default, Clone)]
struct Partial {
    transform: Option<TransformComponent>,
    mesh: Option<MeshComponent>,
    material: MaterialComponent,
}

struct Inner {
    partial: HashMap<u64, Partial>,
    states: HashMap<u64, EntityRenderState>,
    diff: RenderDiff,
    /// Index into `diff` of this frame's entry for a given entity, so a
    /// second event for the same entity in one frame updates in place
    /// rather than appending a duplicate (spec.md §4.5.1 invariant: at
    /// most one `Added`, one `Updated`, one `Removed` per entity per frame).
    diff_index: HashMap<u64, usize>,
}

impl Inner {
    fn new() -> Self {
        Self {
            partial: HashMap::new(),
            states: HashMap::new(),
            diff: Vec::new(),
            diff_index: HashMap::new(),
        }
    }

    fn record(&mut self, entity: u64, kind: DiffKind, new_state: Option<EntityRenderState>) {
        if kind == DiffKind::Removed {
            self.diff.retain(|e| e.entity_id != entity);
            self.diff.push(DiffEntry {
                kind: DiffKind::Removed,
                entity_id: entity,
                new_state: None,
            });
            self.reindex();
            return;
        }

        if let Some(&idx) = self.diff_index.get(&entity) {
            let existing = &mut self.diff[idx];
            if existing.kind != DiffKind::Added {
                existing.kind = DiffKind::Updated;
            }
            existing.new_state = new_state;
        } else {
            self.diff_index.insert(entity, self.diff.len());
            self.diff.push(DiffEntry { kind, entity_id: entity, new_state });
        }
    }

    /// Rebuilds `diff_index` after a `retain` shifted indices.
    fn reindex(&mut self) {
        self.diff_index.clear();
        for (i, entry) in self.diff.iter().enumerate() {
            self.diff_index.insert(entry.entity_id, i);
        }
    }

    fn apply(&mut self, event: EcsEvent) {
        match event {
            EcsEvent::TransformChanged { entity, transform } => {
                let partial = self.partial.entry(entity).or_default();
                partial.transform = Some(transform);
                let material = partial.material;

                if let Some(state) = self.states.get_mut(&entity) {
                    state.position = transform.position;
                    state.rotation_euler = transform.rotation_euler;
                    state.rotation = transform.rotation;
                    state.scale = transform.scale;
                    let snapshot = state.clone();
                    self.record(entity, DiffKind::Updated, Some(snapshot));
                } else if let Some(mesh) = self.partial.get(&entity).and_then(|p| p.mesh) {
                    let state = promote(entity, transform, mesh, material);
                    self.states.insert(entity, state.clone());
                    self.record(entity, DiffKind::Added, Some(state));
                }
            }

            EcsEvent::MeshChanged { entity, mesh } => {
                let partial = self.partial.entry(entity).or_default();
                partial.mesh = Some(mesh);
                let material = partial.material;

                if let Some(state) = self.states.get_mut(&entity) {
                    state.mesh = MeshRefs {
                        mesh: mesh.mesh,
                        vertex_shader: mesh.vertex_shader,
                        fragment_shader: mesh.fragment_shader,
                        texture: mesh.texture,
                    };
                    let snapshot = state.clone();
                    self.record(entity, DiffKind::Updated, Some(snapshot));
                } else if let Some(transform) = self.partial.get(&entity).and_then(|p| p.transform) {
                    let state = promote(entity, transform, mesh, material);
                    self.states.insert(entity, state.clone());
                    self.record(entity, DiffKind::Added, Some(state));
                }
            }

            EcsEvent::MaterialChanged { entity, material } => {
                self.partial.entry(entity).or_default().material = material;
                if let Some(state) = self.states.get_mut(&entity) {
                    state.material = material;
                    let snapshot = state.clone();
                    self.record(entity, DiffKind::Updated, Some(snapshot));
                }
            }

            EcsEvent::ComponentRemoved { entity, kind } => match kind {
                ComponentKind::Mesh => {
                    if let Some(partial) = self.partial.get_mut(&entity) {
                        partial.mesh = None;
                    }
                    if self.states.remove(&entity).is_some() {
                        self.record(entity, DiffKind::Removed, None);
                    }
                }
                ComponentKind::Transform => {
                    // spec.md §4.5.1 defines `Removed` only for mesh removal
                    // and entity destruction; a bare transform removal
                    // leaves the entity tracked (it simply stops moving)
                    // until one of those two fires.
                    if let Some(partial) = self.partial.get_mut(&entity) {
                        partial.transform = None;
                    }
                }
                ComponentKind::Material => {
                    if let Some(partial) = self.partial.get_mut(&entity) {
                        partial.material = MaterialComponent::default();
                    }
                    if let Some(state) = self.states.get_mut(&entity) {
                        state.material = MaterialComponent::default();
                        let snapshot = state.clone();
                        self.record(entity, DiffKind::Updated, Some(snapshot));
                    }
                }
            },

            EcsEvent::EntityDestroyed { entity } => {
                self.partial.remove(&entity);
                if self.states.remove(&entity).is_some() {
                    self.record(entity, DiffKind::Removed, None);
                }
            }
        }
    }
}

fn promote(
    entity: u64,
    transform: TransformComponent,
    mesh: MeshComponent,
    material: MaterialComponent,
) -> EntityRenderState {
    EntityRenderState {
        entity_id: entity,
        is_valid: true,
        position: transform.position,
        rotation_euler: transform.rotation_euler,
        rotation: transform.rotation,
        scale: transform.scale,
        mesh: MeshRefs {
            mesh: mesh.mesh,
            vertex_shader: mesh.vertex_shader,
            fragment_shader: mesh.fragment_shader,
            texture: mesh.texture,
        },
        material,
    }
}

/// Owns the authoritative entity → render state map and the current
/// frame's accumulating diff. Cheap to clone (an `Arc` handle) so the
/// listener closure registered with the ECS can hold one independently of
/// the tracker the renderer keeps.
#[derive(Clone)]
pub struct RenderEntityTracker {
    inner: Arc<Mutex<Inner>>,
}

impl Default for RenderEntityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEntityTracker {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Arc::new(Mutex::new(Inner::new())) }
    }

    /// Subscribes to `source`; every event it raises from now on is folded
    /// into this tracker's state, from whatever thread the ECS calls back
    /// on.
    pub fn register(&self, source: &mut impl EcsObserverSource) {
        let handle = self.clone();
        source.subscribe(Box::new(move |event| handle.inner.lock().apply(event)));
    }

    /// Directly applies a single event — used by push-model callers that
    /// don't go through [`register`](Self::register) (e.g. a synchronous
    /// test harness) and internally by the registered closure.
    pub fn apply_event(&self, event: EcsEvent) {
        self.inner.lock().apply(event);
    }

    /// Moves the accumulated diff out and clears it. Per spec.md §4.5.1,
    /// the renderer calls this exactly once per frame.
    #[must_use]
    pub fn consume_diff(&self) -> RenderDiff {
        let mut inner = self.inner.lock();
        inner.diff_index.clear();
        std::mem::take(&mut inner.diff)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains(&self, entity_id: u64) -> bool {
        self.inner.lock().states.contains_key(&entity_id)
    }

    #[must_use]
    pub fn get(&self, entity_id: u64) -> Option<EntityRenderState> {
        self.inner.lock().states.get(&entity_id).cloned()
    }

    /// Snapshot of every currently-tracked (therefore valid, per spec.md
    /// §3.4) entity's state — used for a full rebuild.
    #[must_use]
    pub fn valid_states(&self) -> Vec<EntityRenderState> {
        self.inner.lock().states.values().cloned().collect()
    }

    /// Applied once per frame by the transform updater (spec.md §4.5.3):
    /// pushes each entry's transform into the matching tracked entity,
    /// silently skipping entries whose entity isn't (yet, or no longer)
    /// tracked — an add/remove race with the observer is expected, not an
    /// error.
    pub fn apply_frame_transforms(&self, entities: &[FrameEntityTransform]) {
        let mut inner = self.inner.lock();
        for entry in entities {
            let Some(state) = inner.states.get_mut(&entry.entity_id) else {
                continue;
            };
            state.position = entry.position;
            state.rotation_euler = entry.rotation_euler;
            state.rotation = entry.rotation;
            state.scale = entry.scale;
            let snapshot = state.clone();
            inner.record(entry.entity_id, DiffKind::Updated, Some(snapshot));
        }
    }
}
