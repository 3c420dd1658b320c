//! In-memory fake ECS integration (SPEC_FULL §4.5's `FakeEcs`): exercises
//! the tracker/observer/updater chain (spec.md §4.5.1–§4.5.3) without a
//! real ECS dependency. Mirrors [`crate::gpu::testing::NullGpu`] — a
//! publicly exported, deliberately minimal stand-in rather than a
//! `#[cfg(test)]`-only mock, so downstream crates' own tests can use it too.

use std::sync::Mutex;

use crate::ecs::{EcsEvent, EcsFrameSource, EcsObserverSource, RenderFrameData};

/// Implements both [`EcsObserverSource`] (push) and [`EcsFrameSource`]
/// (pull). `raise` fans a single event out to the registered listener, if
/// any; `set_frame_data`/`frame_data` stage and retrieve the per-frame
/// snapshot the camera/transform updaters pull once per frame.
#[derive(Default)]
pub struct FakeEcs {
    listener: Mutex<Option<Box<dyn FnMut(EcsEvent) + Send>>>,
    frame_data: Mutex<RenderFrameData>,
}

impl FakeEcs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fans `event` out to the registered listener, if
    /// [`subscribe`](EcsObserverSource::subscribe) has been called.
    pub fn raise(&self, event: EcsEvent) {
        if let Some(listener) = self.listener.lock().unwrap().as_mut() {
            listener(event);
        }
    }

    pub fn set_frame_data(&self, data: RenderFrameData) {
        *self.frame_data.lock().unwrap() = data;
    }
}

impl EcsObserverSource for FakeEcs {
    fn subscribe(&mut self, listener: Box<dyn FnMut(EcsEvent) + Send>) {
        *self.listener.lock().unwrap() = Some(listener);
    }
}

impl EcsFrameSource for FakeEcs {
    fn frame_data(&self) -> RenderFrameData {
        self.frame_data.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::{MeshComponent, TransformComponent};
    use crate::tracker::RenderEntityTracker;

    #[test]
    fn registering_a_tracker_drives_its_diff_from_raised_events() {
        let mut ecs = FakeEcs::new();
        let tracker = RenderEntityTracker::new();
        tracker.register(&mut ecs);

        ecs.raise(EcsEvent::TransformChanged { entity: 1, transform: TransformComponent::default() });
        ecs.raise(EcsEvent::MeshChanged {
            entity: 1,
            mesh: MeshComponent { mesh: lampy_assets::AssetID::random(), ..Default::default() },
        });

        let diff = tracker.consume_diff();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].kind, crate::entity_state::DiffKind::Added);
    }

    #[test]
    fn frame_data_round_trips() {
        let ecs = FakeEcs::new();
        let mut data = RenderFrameData::default();
        data.camera.width = 42.0;
        ecs.set_frame_data(data);
        assert_eq!(ecs.frame_data().camera.width, 42.0);
    }
}
