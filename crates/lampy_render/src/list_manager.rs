//! Stable `entityId → objectIndex` mapping over a flat, contiguous render
//! list (spec.md §4.5.2).

use std::collections::HashMap;

use crate::entity_state::{DiffKind, RenderDiff};
use crate::scene::RenderObject;
use crate::tracker::RenderEntityTracker;

/// Holds the flat `objects` array the render graph's PBR pass iterates,
/// plus the index each tracked entity currently occupies. Removal
/// swap-removes the tail element into the gap and fixes up that element's
/// index, keeping `objects` contiguous without shifting every later entry.
#[derive(Default)]
pub struct RenderListManager {
    objects: Vec<RenderObject>,
    entity_at_index: Vec<u64>,
    index_of_entity: HashMap<u64, usize>,
}

impl RenderListManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn objects(&self) -> &[RenderObject] {
        &self.objects
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// O(1): the index of `entity_id`'s `RenderObject` in [`objects`](Self::objects).
    #[must_use]
    pub fn get_object_index(&self, entity_id: u64) -> Option<usize> {
        self.index_of_entity.get(&entity_id).copied()
    }

    /// Inserts a new entity's object, or overwrites it in place if already
    /// present.
    pub fn upsert_object(&mut self, entity_id: u64, object: RenderObject) {
        if let Some(&idx) = self.index_of_entity.get(&entity_id) {
            self.objects[idx] = object;
            return;
        }
        let idx = self.objects.len();
        self.objects.push(object);
        self.entity_at_index.push(entity_id);
        self.index_of_entity.insert(entity_id, idx);
    }

    /// O(n): swap-removes `entity_id`'s slot with the tail slot, then
    /// reindexes the entity that moved into the gap.
    pub fn remove_object(&mut self, entity_id: u64) {
        let Some(idx) = self.index_of_entity.remove(&entity_id) else {
            return;
        };
        let last = self.objects.len() - 1;
        self.objects.swap_remove(idx);
        self.entity_at_index.swap_remove(idx);
        if idx != last {
            let moved_entity = self.entity_at_index[idx];
            self.index_of_entity.insert(moved_entity, idx);
        }
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.entity_at_index.clear();
        self.index_of_entity.clear();
    }

    /// Folds one frame's diff into the list (spec.md §4.5.6's
    /// `applyRenderDiff`). `Added`/`Updated` upsert the entity's object;
    /// `Removed` drops it. Maintains the invariant that after this call
    /// every tracked entity has a valid index (spec.md §8.1).
    pub fn apply_diff(&mut self, diff: &RenderDiff) {
        for entry in diff {
            match entry.kind {
                DiffKind::Added | DiffKind::Updated => {
                    if let Some(state) = &entry.new_state {
                        self.upsert_object(entry.entity_id, state.to_render_object());
                    }
                }
                DiffKind::Removed => self.remove_object(entry.entity_id),
            }
        }
    }

    /// Discards the current list and rebuilds it from every entity the
    /// tracker currently considers valid — the `needsFullRebuild` path of
    /// spec.md §4.5.6.
    pub fn rebuild_from_tracker(&mut self, tracker: &RenderEntityTracker) {
        self.clear();
        for state in tracker.valid_states() {
            self.upsert_object(state.entity_id, state.to_render_object());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use lampy_assets::AssetID;

    fn object() -> RenderObject {
        RenderObject {
            model_matrix: Mat4::IDENTITY,
            mesh: AssetID::random(),
            shader_handle: None,
            texture_handle: None,
            material: crate::scene::MaterialComponent::default(),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut m = RenderListManager::new();
        m.upsert_object(1, object());
        m.upsert_object(2, object());
        m.upsert_object(3, object());
        assert_eq!(m.get_object_index(1), Some(0));
        assert_eq!(m.get_object_index(2), Some(1));
        assert_eq!(m.get_object_index(3), Some(2));
        assert_eq!(m.len(), 3);
    }

    #[test]
    fn remove_swaps_tail_and_fixes_up_index() {
        let mut m = RenderListManager::new();
        m.upsert_object(1, object());
        m.upsert_object(2, object());
        m.upsert_object(3, object());

        m.remove_object(1);
        assert_eq!(m.len(), 2);
        assert_eq!(m.get_object_index(1), None);
        // entity 3 (the tail) moved into slot 0.
        assert_eq!(m.get_object_index(3), Some(0));
        assert_eq!(m.get_object_index(2), Some(1));

        for id in [2u64, 3] {
            let idx = m.get_object_index(id).unwrap();
            assert!(idx < m.len());
        }
    }

    #[test]
    fn removing_tail_is_a_plain_shrink() {
        let mut m = RenderListManager::new();
        m.upsert_object(1, object());
        m.upsert_object(2, object());
        m.remove_object(2);
        assert_eq!(m.len(), 1);
        assert_eq!(m.get_object_index(1), Some(0));
    }

    #[test]
    fn remove_unknown_entity_is_a_no_op() {
        let mut m = RenderListManager::new();
        m.upsert_object(1, object());
        m.remove_object(999);
        assert_eq!(m.len(), 1);
    }

    #[test]
    fn apply_diff_and_rebuild_agree_with_tracker() {
        use crate::ecs::{EcsEvent, MeshComponent, TransformComponent};
        use crate::tracker::RenderEntityTracker;

        let tracker = RenderEntityTracker::new();
        for entity in [10u64, 20] {
            tracker.apply_event(EcsEvent::TransformChanged { entity, transform: TransformComponent::default() });
            tracker.apply_event(EcsEvent::MeshChanged {
                entity,
                mesh: MeshComponent { mesh: AssetID::random(), ..Default::default() },
            });
        }
        let diff = tracker.consume_diff();

        let mut m = RenderListManager::new();
        m.apply_diff(&diff);
        assert_eq!(m.len(), tracker.len());
        for entity in [10u64, 20] {
            assert!(m.get_object_index(entity).unwrap() < m.len());
        }

        let mut rebuilt = RenderListManager::new();
        rebuilt.rebuild_from_tracker(&tracker);
        assert_eq!(rebuilt.len(), tracker.len());
    }
}
