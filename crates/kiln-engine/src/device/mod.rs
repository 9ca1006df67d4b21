//! GPU backend seam.
//!
//! This module is responsible for:
//! - the typed handles the rest of the engine passes around
//! - the [`GraphicsBackend`] trait, the single place GPU calls are issued
//! - an OpenGL implementation (`glow`) and a headless recording implementation
//!
//! Everything here runs on the one thread that owns the GPU context.

mod backend;
mod handle;
mod recording;

#[cfg(not(target_arch = "wasm32"))]
mod gl;

pub use backend::{
    DrawMode, GraphicsBackend, ShaderStage, Vertex, VertexArray, VertexAttribute,
};
pub use handle::{BufferId, ProgramId, ShaderId, TextureId, UniformLocation, VertexArrayId};
pub use recording::{GpuCall, RecordingBackend};

#[cfg(not(target_arch = "wasm32"))]
pub use gl::GlowBackend;
