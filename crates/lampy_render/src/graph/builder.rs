//! Declarative builder for a [`RenderGraph`] (spec.md §4.5.4).
//!
//! Mirrors the teacher's builder/executor split (`renderer/graph/builder.rs`
//! + `renderer/graph/graph.rs`): `RenderGraphBuilder` accumulates resources
//! and passes, `build()` validates the wiring once and hands back an
//! immutable, per-frame-executable [`RenderGraph`].

use std::collections::HashSet;

use rustc_hash::FxHashMap;

use super::graph::{GraphPass, RenderGraph};
use super::pass::Pass;
use super::resource::RenderGraphResource;
use crate::error::{Error, Result};

#[derive(Default)]
pub struct RenderGraphBuilder {
    resources: FxHashMap<String, RenderGraphResource>,
    passes: Vec<GraphPass>,
    pass_names: HashSet<String>,
}

impl RenderGraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn add_resource(mut self, name: impl Into<String>, width: u32, height: u32) -> Self {
        let name = name.into();
        self.resources.insert(name.clone(), RenderGraphResource::new(name, width, height));
        self
    }

    /// Adds a pass reading `reads` and writing `writes` (both named
    /// logical resources), executed by `body`. Passes execute in the
    /// order they are added — the graph performs no dependency sorting
    /// (spec.md §4.5.4).
    #[must_use]
    pub fn add_pass(
        mut self,
        name: impl Into<String>,
        reads: &[&str],
        writes: &[&str],
        body: Box<dyn Pass>,
    ) -> Self {
        let name = name.into();
        self.pass_names.insert(name.clone());
        self.passes.push(GraphPass {
            name,
            reads: reads.iter().map(|s| (*s).to_string()).collect(),
            writes: writes.iter().map(|s| (*s).to_string()).collect(),
            body,
        });
        self
    }

    /// Assembles the fixed Shadow → PBR → Grid → Debug → FinalCompose
    /// chain (spec.md §4.5.5) in one call, declaring `shadow_depth`,
    /// `color`, and `final` plus `grid_color`/`debug_color` when their
    /// passes are enabled. The common case for
    /// [`crate::renderer::Renderer`]; `add_pass`/`add_resource` remain
    /// available for custom graphs.
    #[must_use]
    pub fn add_builtin_pipeline(self, width: u32, height: u32, enable_grid: bool, enable_debug: bool) -> Self {
        let mut builder = self
            .add_resource("shadow_depth", 2048, 2048)
            .add_resource("color", width, height)
            .add_pass("Shadow", &[], &["shadow_depth"], Box::new(crate::passes::ShadowPass::new(2048)))
            .add_pass("PBR", &["shadow_depth"], &["color"], Box::new(crate::passes::PbrPass::new()));

        let mut upstream = "color";
        if enable_grid {
            builder = builder.add_resource("grid_color", width, height).add_pass(
                "Grid",
                &[upstream],
                &["grid_color"],
                Box::new(crate::passes::GridPass::new()),
            );
            upstream = "grid_color";
        }
        if enable_debug {
            builder = builder.add_resource("debug_color", width, height).add_pass(
                "Debug",
                &[upstream],
                &["debug_color"],
                Box::new(crate::passes::DebugPass::new()),
            );
            upstream = "debug_color";
        }

        builder.add_resource("final", width, height).add_pass(
            "Final",
            &[upstream],
            &["final"],
            Box::new(crate::passes::FinalComposePass::new()),
        )
    }

    /// Validates the wiring and produces an executable [`RenderGraph`]:
    ///
    /// - every pass name is unique,
    /// - every `read`/`write` name refers to a declared resource,
    /// - every `read` refers to a resource some *earlier* pass has already
    ///   written (spec.md §9's open question on unwritten-resource reads
    ///   is resolved here as a loud build-time error rather than a silent
    ///   all-zero handle — see DESIGN.md).
    pub fn build(self) -> Result<RenderGraph> {
        let mut seen_names = HashSet::new();
        let mut written: HashSet<&str> = HashSet::new();

        for pass in &self.passes {
            if !seen_names.insert(pass.name.clone()) {
                return Err(Error::DuplicatePassName(pass.name.clone()));
            }

            for name in &pass.reads {
                if !self.resources.contains_key(name) {
                    return Err(Error::UnknownResource(name.clone()));
                }
                if !written.contains(name.as_str()) {
                    return Err(Error::ReadBeforeWrite { pass: pass.name.clone(), resource: name.clone() });
                }
            }
            for name in &pass.writes {
                if !self.resources.contains_key(name) {
                    return Err(Error::UnknownResource(name.clone()));
                }
                written.insert(name.as_str());
            }
        }

        Ok(RenderGraph::new(self.resources, self.passes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::pass::{PassExecContext, PassIo};
    use crate::handle::TextureHandle;

    struct StubPass {
        name: &'static str,
        output: TextureHandle,
    }

    impl Pass for StubPass {
        fn name(&self) -> &str {
            self.name
        }
        fn exec(&mut self, _ctx: &PassExecContext<'_>, io: PassIo<'_>) {
            for out in io.outputs {
                *out = self.output;
            }
        }
    }

    #[test]
    fn linear_schedule_propagates_handles_to_final() {
        let builder = RenderGraphBuilder::new()
            .add_resource("shadow_depth", 1024, 1024)
            .add_resource("color", 1920, 1080)
            .add_resource("final", 1920, 1080)
            .add_pass("Shadow", &[], &["shadow_depth"], Box::new(StubPass { name: "Shadow", output: TextureHandle::new(1) }))
            .add_pass(
                "PBR",
                &["shadow_depth"],
                &["color"],
                Box::new(StubPass { name: "PBR", output: TextureHandle::new(2) }),
            )
            .add_pass("Final", &["color"], &["final"], Box::new(StubPass { name: "Final", output: TextureHandle::new(3) }));

        let mut graph = builder.build().unwrap();
        let gpu = crate::gpu::testing::NullGpu::new();
        let scene = crate::scene::RenderScene::new();
        let result = graph.execute(&scene, &gpu, 1920, 1080);
        assert_eq!(result, TextureHandle::new(3));
    }

    #[test]
    fn read_before_write_is_rejected_at_build() {
        let builder = RenderGraphBuilder::new()
            .add_resource("color", 1, 1)
            .add_pass("Oops", &["color"], &[], Box::new(StubPass { name: "Oops", output: TextureHandle::UNSET }));
        assert!(matches!(builder.build(), Err(Error::ReadBeforeWrite { .. })));
    }

    #[test]
    fn unknown_resource_is_rejected_at_build() {
        let builder = RenderGraphBuilder::new()
            .add_pass("Oops", &[], &["nope"], Box::new(StubPass { name: "Oops", output: TextureHandle::UNSET }));
        assert!(matches!(builder.build(), Err(Error::UnknownResource(_))));
    }

    #[test]
    fn duplicate_pass_name_is_rejected_at_build() {
        let builder = RenderGraphBuilder::new()
            .add_resource("a", 1, 1)
            .add_pass("Dup", &[], &["a"], Box::new(StubPass { name: "Dup", output: TextureHandle::UNSET }))
            .add_pass("Dup", &[], &["a"], Box::new(StubPass { name: "Dup", output: TextureHandle::UNSET }));
        assert!(matches!(builder.build(), Err(Error::DuplicatePassName(_))));
    }

    #[test]
    fn builtin_pipeline_builds_and_runs_end_to_end() {
        let mut graph = RenderGraphBuilder::new().add_builtin_pipeline(1920, 1080, true, true).build().unwrap();
        assert_eq!(graph.pass_count(), 5);

        let gpu = crate::gpu::testing::NullGpu::new();
        let scene = crate::scene::RenderScene::new();
        let result = graph.execute(&scene, &gpu, 1920, 1080);
        assert!(result.is_set());
    }

    #[test]
    fn builtin_pipeline_without_optional_passes_still_reaches_final() {
        let mut graph = RenderGraphBuilder::new().add_builtin_pipeline(800, 600, false, false).build().unwrap();
        assert_eq!(graph.pass_count(), 3);

        let gpu = crate::gpu::testing::NullGpu::new();
        let scene = crate::scene::RenderScene::new();
        let result = graph.execute(&scene, &gpu, 800, 600);
        assert!(result.is_set());
    }

    #[test]
    fn resize_all_rewrites_every_resource_dimension() {
        let mut graph = RenderGraphBuilder::new().add_resource("color", 100, 100).build().unwrap();
        graph.resize_all(200, 150);
        let resource = graph.resource("color").unwrap();
        assert_eq!((resource.width, resource.height), (200, 150));
    }
}
