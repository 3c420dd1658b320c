//! GPU backend capability interfaces (spec.md §1): the render core depends
//! on these traits, never on a concrete backend. A real OpenGL/wgpu backend
//! implements them; [`testing::NullGpu`] is the in-process recording
//! implementation used by tests and headless builds, so the built-in
//! passes (§4.5.5) and orchestrator (§4.5.6) are exercised without a GPU
//! context — mirrors the teacher's `RenderNode::prepare`/`run` split
//! hiding `wgpu` behind a thin resource-manager seam
//! (`renderer/graph/node.rs`), generalized to a backend-agnostic trait set
//! per REDESIGN FLAGS' "model as capability sets, not inheritance
//! hierarchies".

use crate::handle::TextureHandle;

/// A compiled shader program (vertex+fragment pair or compute kernel).
pub trait IShader: Send + Sync {
    fn name(&self) -> &str;
}

/// A GPU vertex/index buffer pair ready to draw.
pub trait IMesh: Send + Sync {
    fn vertex_count(&self) -> u32;
    fn index_count(&self) -> u32;
}

/// A sampleable GPU texture.
pub trait ITexture: Send + Sync {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn handle(&self) -> TextureHandle;
}

/// A render target the pass code can bind and resize.
pub trait IFramebuffer: Send + Sync {
    fn color_handle(&self) -> TextureHandle;
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Resizes the backing attachments to match the viewport. A no-op if
    /// already at that size.
    fn resize(&mut self, width: u32, height: u32);
}

/// Capability set a built-in pass needs to lazily construct its shaders,
/// framebuffers, and full-screen quad mesh on first execution, and to
/// issue draws thereafter. Baked in at graph-build time per REDESIGN
/// FLAGS — no virtual dispatch inside the hot per-object loop.
pub trait GpuBackend: Send + Sync {
    fn create_framebuffer(&self, width: u32, height: u32, label: &str) -> Box<dyn IFramebuffer>;
    fn create_shader(&self, label: &str) -> Box<dyn IShader>;
    fn create_fullscreen_quad(&self) -> Box<dyn IMesh>;
    /// Allocates a fresh handle id, used by [`IFramebuffer`] implementations
    /// and by passes that bind to a resource name for the first time.
    fn allocate_handle(&self) -> TextureHandle;
}

pub mod testing {
    //! In-process recording GPU backend used by tests and headless builds.

    use std::sync::atomic::{AtomicU32, Ordering};

    use super::{GpuBackend, IFramebuffer, IMesh, IShader};
    use crate::handle::TextureHandle;

    pub struct NullFramebuffer {
        handle: TextureHandle,
        width: u32,
        height: u32,
    }

    impl IFramebuffer for NullFramebuffer {
        fn color_handle(&self) -> TextureHandle {
            self.handle
        }
        fn width(&self) -> u32 {
            self.width
        }
        fn height(&self) -> u32 {
            self.height
        }
        fn resize(&mut self, width: u32, height: u32) {
            self.width = width;
            self.height = height;
        }
    }

    pub struct NullShader {
        name: String,
    }

    impl IShader for NullShader {
        fn name(&self) -> &str {
            &self.name
        }
    }

    pub struct NullMesh;

    impl IMesh for NullMesh {
        fn vertex_count(&self) -> u32 {
            4
        }
        fn index_count(&self) -> u32 {
            6
        }
    }

    /// Hands out monotonically increasing handle ids starting at 1 (`0` is
    /// reserved for "unset").
    #[derive(Default)]
    pub struct NullGpu {
        next_id: AtomicU32,
    }

    impl NullGpu {
        #[must_use]
        pub fn new() -> Self {
            Self {
                next_id: AtomicU32::new(1),
            }
        }
    }

    impl GpuBackend for NullGpu {
        fn create_framebuffer(&self, width: u32, height: u32, _label: &str) -> Box<dyn IFramebuffer> {
            Box::new(NullFramebuffer {
                handle: self.allocate_handle(),
                width,
                height,
            })
        }

        fn create_shader(&self, label: &str) -> Box<dyn IShader> {
            Box::new(NullShader { name: label.to_string() })
        }

        fn create_fullscreen_quad(&self) -> Box<dyn IMesh> {
            Box::new(NullMesh)
        }

        fn allocate_handle(&self) -> TextureHandle {
            TextureHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed))
        }
    }
}
