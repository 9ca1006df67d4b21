//! Headless backend that records every GPU call.
//!
//! Used by tests and tools to observe bind/draw traffic without a GPU. Object
//! names are handed out from a single counter starting at 1, so every handle
//! the recorder returns is unique across kinds.

use std::collections::HashMap;

use crate::paint::Color;
use crate::shader::UniformValue;
use crate::{Error, Result};

use super::backend::{DrawMode, GraphicsBackend, ShaderStage, VertexArray, VertexAttribute};
use super::handle::{BufferId, ProgramId, ShaderId, TextureId, UniformLocation, VertexArrayId};

/// One recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateProgram(ProgramId),
    CompileShader { stage: ShaderStage, shader: ShaderId },
    AttachShader { program: ProgramId, shader: ShaderId },
    LinkProgram(ProgramId),
    DeleteShader(ShaderId),
    DeleteProgram(ProgramId),
    UniformLocation { program: ProgramId, name: String },
    Uniform { location: UniformLocation, value: UniformValue },
    UseProgram(ProgramId),
    BindTexture(TextureId),
    CreateVertexArray { id: VertexArrayId, vertices: usize },
    DeleteVertexArray(VertexArrayId),
    DrawArrays { vertex_array: VertexArrayId, mode: DrawMode, count: u32 },
    Configure2dState,
    Clear(Color),
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<GpuCall>,
    next_name: u32,
    /// Per-program uniform table: `(program, name) -> location`.
    locations: HashMap<(ProgramId, String), UniformLocation>,
    location_names: HashMap<UniformLocation, String>,
    /// Uniform names every program reports as inactive.
    missing_uniforms: Vec<String>,
    fail_compile: Option<(ShaderStage, String)>,
    fail_link: Option<String>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every compile of `stage` fail with `log`.
    pub fn fail_compile(mut self, stage: ShaderStage, log: impl Into<String>) -> Self {
        self.fail_compile = Some((stage, log.into()));
        self
    }

    /// Makes every link fail with `log`.
    pub fn fail_link(mut self, log: impl Into<String>) -> Self {
        self.fail_link = Some(log.into());
        self
    }

    /// Makes `uniform_location(_, name)` report the uniform as inactive.
    pub fn without_uniform(mut self, name: impl Into<String>) -> Self {
        self.missing_uniforms.push(name.into());
        self
    }

    /// Hands out a texture name the way an external texture provider would.
    pub fn create_texture(&mut self) -> TextureId {
        TextureId::new(self.next_non_zero())
    }

    #[inline]
    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    /// Forgets recorded calls; allocated names and uniform tables are kept.
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    pub fn count(&self, pred: impl Fn(&GpuCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    /// Textures bound, in call order.
    pub fn texture_binds(&self) -> Vec<TextureId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::BindTexture(t) => Some(*t),
                _ => None,
            })
            .collect()
    }

    /// Programs selected, in call order.
    pub fn program_binds(&self) -> Vec<ProgramId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::UseProgram(p) => Some(*p),
                _ => None,
            })
            .collect()
    }

    /// Vertex arrays drawn, in call order.
    pub fn draws(&self) -> Vec<VertexArrayId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::DrawArrays { vertex_array, .. } => Some(*vertex_array),
                _ => None,
            })
            .collect()
    }

    /// Names of uploaded uniforms, in call order.
    pub fn uniform_uploads(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::Uniform { location, .. } => {
                    self.location_names.get(location).map(String::as_str)
                }
                _ => None,
            })
            .collect()
    }

    /// Last value uploaded to the uniform `name` of `program`.
    pub fn last_uniform(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        let location = self.locations.get(&(program, name.to_owned()))?;
        self.calls.iter().rev().find_map(|c| match c {
            GpuCall::Uniform { location: l, value } if l == location => Some(value),
            _ => None,
        })
    }

    /// Number of location queries issued for `name`, across all programs.
    pub fn location_queries(&self, name: &str) -> usize {
        self.count(|c| matches!(c, GpuCall::UniformLocation { name: n, .. } if n == name))
    }

    fn next_non_zero(&mut self) -> std::num::NonZeroU32 {
        self.next_name += 1;
        std::num::NonZeroU32::new(self.next_name).unwrap_or(std::num::NonZeroU32::MIN)
    }
}

impl GraphicsBackend for RecordingBackend {
    fn create_program(&mut self) -> Result<ProgramId> {
        let id = ProgramId::new(self.next_non_zero());
        self.calls.push(GpuCall::CreateProgram(id));
        Ok(id)
    }

    fn compile_shader(&mut self, stage: ShaderStage, _source: &str) -> Result<ShaderId> {
        if let Some((failing, log)) = &self.fail_compile {
            if *failing == stage {
                return Err(Error::ShaderCompile { stage, log: log.clone() });
            }
        }
        let shader = ShaderId::new(self.next_non_zero());
        self.calls.push(GpuCall::CompileShader { stage, shader });
        Ok(shader)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        self.calls.push(GpuCall::AttachShader { program, shader });
    }

    fn link_program(&mut self, program: ProgramId) -> Result<()> {
        self.calls.push(GpuCall::LinkProgram(program));
        match &self.fail_link {
            Some(log) => Err(Error::ProgramLink { log: log.clone() }),
            None => Ok(()),
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.calls.push(GpuCall::DeleteShader(shader));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.calls.push(GpuCall::DeleteProgram(program));
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.calls.push(GpuCall::UniformLocation { program, name: name.to_owned() });
        if self.missing_uniforms.iter().any(|m| m == name) {
            return None;
        }

        let key = (program, name.to_owned());
        if let Some(location) = self.locations.get(&key) {
            return Some(*location);
        }
        let location = UniformLocation::new(self.next_non_zero().get());
        self.locations.insert(key, location);
        self.location_names.insert(location, name.to_owned());
        Some(location)
    }

    fn upload_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        self.calls.push(GpuCall::Uniform { location, value: *value });
    }

    fn use_program(&mut self, program: ProgramId) {
        self.calls.push(GpuCall::UseProgram(program));
    }

    fn bind_texture(&mut self, texture: TextureId) {
        self.calls.push(GpuCall::BindTexture(texture));
    }

    fn create_vertex_array(&mut self, attributes: &[VertexAttribute<'_>]) -> Result<VertexArray> {
        let id = VertexArrayId::new(self.next_non_zero());
        let buffers = attributes
            .iter()
            .map(|_| BufferId::new(self.next_non_zero()))
            .collect();
        let vertices = attributes.first().map_or(0, |a| a.data.len());
        self.calls.push(GpuCall::CreateVertexArray { id, vertices });
        Ok(VertexArray { id, buffers })
    }

    fn delete_vertex_array(&mut self, vertex_array: &VertexArray) {
        self.calls.push(GpuCall::DeleteVertexArray(vertex_array.id));
    }

    fn draw_arrays(&mut self, vertex_array: VertexArrayId, mode: DrawMode, count: u32) {
        self.calls.push(GpuCall::DrawArrays { vertex_array, mode, count });
    }

    fn configure_2d_state(&mut self) {
        self.calls.push(GpuCall::Configure2dState);
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(GpuCall::Clear(color));
    }
}
