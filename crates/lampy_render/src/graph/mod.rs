//! Declarative pass DAG (spec.md §4.5.4): a resource table plus a linear
//! pass schedule, built by [`builder::RenderGraphBuilder`] and executed
//! once per frame as a [`graph::RenderGraph`].

pub mod builder;
pub mod graph;
pub mod pass;
pub mod resource;

pub use builder::RenderGraphBuilder;
pub use graph::RenderGraph;
pub use pass::{Pass, PassExecContext, PassIo};
pub use resource::RenderGraphResource;
