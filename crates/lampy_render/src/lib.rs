//! Declarative render-graph pass DAG, per-frame ECS → scene extraction
//! through an observer/diff channel, and the fixed Shadow → PBR → Grid →
//! Debug → FinalCompose built-in pass chain (spec.md §1, §4.5).
//!
//! Layered bottom-up: [`gpu`] is the capability-trait seam hiding the GPU
//! backend; [`scene`]/[`entity_state`] are the plain-data per-frame
//! record; [`ecs`] is the trait boundary to a third-party ECS world;
//! [`tracker`] turns ECS events into a diff, [`list_manager`] folds that
//! diff into a flat render list, [`updaters`] pulls transform/camera/light
//! state once per frame; [`graph`] is the declarative pass DAG and
//! [`passes`] its fixed built-ins; [`renderer`] is the per-frame
//! orchestrator binding everything together.

pub mod context;
pub mod ecs;
pub mod entity_state;
pub mod error;
pub mod gpu;
pub mod graph;
pub mod handle;
pub mod list_manager;
pub mod passes;
pub mod renderer;
pub mod scene;
pub mod testing;
pub mod tracker;
pub mod updaters;

pub use context::RenderContext;
pub use ecs::{EcsEvent, EcsFrameSource, EcsObserverSource, RenderFrameData};
pub use entity_state::{DiffEntry, DiffKind, EntityRenderState, MeshRefs, RenderDiff};
pub use error::{Error, Result};
pub use gpu::GpuBackend;
pub use graph::{Pass, RenderGraph, RenderGraphBuilder, RenderGraphResource};
pub use handle::TextureHandle;
pub use list_manager::RenderListManager;
pub use renderer::{PhysicsDebugDraw, RenderOutput, Renderer, UiOverlay, WindowPresenter};
pub use scene::RenderScene;
pub use tracker::RenderEntityTracker;
