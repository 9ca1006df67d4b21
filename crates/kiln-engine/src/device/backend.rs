use std::fmt;

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;
use crate::shader::UniformValue;
use crate::Result;

use super::handle::{BufferId, ProgramId, ShaderId, TextureId, UniformLocation, VertexArrayId};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Geometry,
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Geometry => "geometry",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Primitive assembly mode for `draw_arrays`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    TriangleFan,
    LineStrip,
}

/// Two-component vertex attribute element (position or UV).
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

impl Vertex {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { pos: [x, y] }
    }
}

/// One attribute stream uploaded into its own buffer.
#[derive(Debug, Copy, Clone)]
pub struct VertexAttribute<'a> {
    /// Shader attribute location (`layout(location = N)`).
    pub location: u32,
    pub data: &'a [Vertex],
}

/// GPU mesh: a vertex array plus the buffers that back its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexArray {
    pub id: VertexArrayId,
    pub buffers: Vec<BufferId>,
}

/// The only surface through which the engine talks to the GPU.
///
/// The interface mirrors the subset of a bind-based graphics API that the
/// rendering core needs. Implementations are not thread-safe and must be used
/// from the thread that owns the GPU context.
///
/// Uniform uploads apply to the program currently selected with
/// [`use_program`](Self::use_program).
pub trait GraphicsBackend {
    fn create_program(&mut self) -> Result<ProgramId>;

    /// Compiles one stage. Failure carries the driver's info log.
    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId>;

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);

    /// Links `program`. Failure carries the driver's info log.
    fn link_program(&mut self, program: ProgramId) -> Result<()>;

    fn delete_shader(&mut self, shader: ShaderId);

    fn delete_program(&mut self, program: ProgramId);

    /// Queries the GPU for a uniform location. `None` if the program has no
    /// active uniform with that name.
    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    fn upload_uniform(&mut self, location: UniformLocation, value: &UniformValue);

    fn use_program(&mut self, program: ProgramId);

    fn bind_texture(&mut self, texture: TextureId);

    /// Creates a vertex array with one buffer per attribute stream.
    fn create_vertex_array(&mut self, attributes: &[VertexAttribute<'_>]) -> Result<VertexArray>;

    fn delete_vertex_array(&mut self, vertex_array: &VertexArray);

    fn draw_arrays(&mut self, vertex_array: VertexArrayId, mode: DrawMode, count: u32);

    /// Sets up the fixed 2D state: depth test (`LEQUAL`) with depth writes and
    /// straight-alpha blending.
    fn configure_2d_state(&mut self);

    /// Clears color and depth.
    fn clear(&mut self, color: Color);
}
