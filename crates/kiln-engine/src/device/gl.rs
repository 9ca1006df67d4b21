//! OpenGL backend over [`glow`].

use glow::HasContext;

use crate::paint::Color;
use crate::shader::UniformValue;
use crate::{Error, Result};

use super::backend::{DrawMode, GraphicsBackend, ShaderStage, VertexArray, VertexAttribute};
use super::handle::{BufferId, ProgramId, ShaderId, TextureId, UniformLocation, VertexArrayId};

/// [`GraphicsBackend`] issuing raw OpenGL calls.
///
/// Window and context creation belong to the host; this type only wraps an
/// already-current context.
pub struct GlowBackend {
    gl: glow::Context,
}

impl GlowBackend {
    /// Wraps a loaded GL context.
    ///
    /// # Safety
    /// `gl` must be current on the calling thread, and every later call on the
    /// backend must happen on that same thread while the context is alive.
    pub unsafe fn new(gl: glow::Context) -> Self {
        let backend = Self { gl };
        log::info!("OpenGL version {}", backend.version());
        backend
    }

    /// Driver-reported `GL_VERSION` string.
    pub fn version(&self) -> String {
        unsafe { self.gl.get_parameter_string(glow::VERSION) }
    }

    #[inline]
    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }
}

fn gl_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Geometry => glow::GEOMETRY_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn gl_mode(mode: DrawMode) -> u32 {
    match mode {
        DrawMode::TriangleFan => glow::TRIANGLE_FAN,
        DrawMode::LineStrip => glow::LINE_STRIP,
    }
}

fn native_program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.non_zero())
}

fn native_shader(id: ShaderId) -> glow::NativeShader {
    glow::NativeShader(id.non_zero())
}

impl GraphicsBackend for GlowBackend {
    fn create_program(&mut self) -> Result<ProgramId> {
        let program = unsafe { self.gl.create_program() }.map_err(Error::Allocation)?;
        Ok(ProgramId::new(program.0))
    }

    fn compile_shader(&mut self, stage: ShaderStage, source: &str) -> Result<ShaderId> {
        unsafe {
            let shader = self.gl.create_shader(gl_stage(stage)).map_err(Error::Allocation)?;
            self.gl.shader_source(shader, source);
            self.gl.compile_shader(shader);

            if !self.gl.get_shader_compile_status(shader) {
                let log = self.gl.get_shader_info_log(shader);
                self.gl.delete_shader(shader);
                return Err(Error::ShaderCompile { stage, log });
            }
            Ok(ShaderId::new(shader.0))
        }
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        unsafe { self.gl.attach_shader(native_program(program), native_shader(shader)) };
    }

    fn link_program(&mut self, program: ProgramId) -> Result<()> {
        let program = native_program(program);
        unsafe {
            self.gl.link_program(program);
            if !self.gl.get_program_link_status(program) {
                let log = self.gl.get_program_info_log(program);
                return Err(Error::ProgramLink { log });
            }
        }
        Ok(())
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        unsafe { self.gl.delete_shader(native_shader(shader)) };
    }

    fn delete_program(&mut self, program: ProgramId) {
        unsafe { self.gl.delete_program(native_program(program)) };
    }

    fn uniform_location(&mut self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        unsafe { self.gl.get_uniform_location(native_program(program), name) }
            .map(|loc| UniformLocation::new(loc.0))
    }

    fn upload_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        let loc = glow::NativeUniformLocation(location.get());
        let loc = Some(&loc);
        unsafe {
            match value {
                UniformValue::Float(v) => self.gl.uniform_1_f32(loc, *v),
                UniformValue::Vec2(v) => self.gl.uniform_2_f32_slice(loc, &v.to_array()),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32_slice(loc, &v.to_array()),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32_slice(loc, &v.to_array()),
                // Colors go through the vec4 path.
                UniformValue::Color(c) => self.gl.uniform_4_f32_slice(loc, &c.to_array()),
                UniformValue::Mat2(m) => {
                    self.gl.uniform_matrix_2_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat3(m) => {
                    self.gl.uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.gl.uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
            }
        }
    }

    fn use_program(&mut self, program: ProgramId) {
        unsafe { self.gl.use_program(Some(native_program(program))) };
    }

    fn bind_texture(&mut self, texture: TextureId) {
        let texture = glow::NativeTexture(texture.non_zero());
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, Some(texture)) };
    }

    fn create_vertex_array(&mut self, attributes: &[VertexAttribute<'_>]) -> Result<VertexArray> {
        unsafe {
            let vao = self.gl.create_vertex_array().map_err(Error::Allocation)?;
            self.gl.bind_vertex_array(Some(vao));

            let mut buffers: Vec<BufferId> = Vec::with_capacity(attributes.len());
            for attr in attributes {
                let vbo = match self.gl.create_buffer() {
                    Ok(vbo) => vbo,
                    Err(err) => {
                        self.gl.bind_vertex_array(None);
                        for buffer in &buffers {
                            self.gl.delete_buffer(glow::NativeBuffer(buffer.non_zero()));
                        }
                        self.gl.delete_vertex_array(vao);
                        return Err(Error::Allocation(err));
                    }
                };
                self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
                self.gl.buffer_data_u8_slice(
                    glow::ARRAY_BUFFER,
                    bytemuck::cast_slice(attr.data),
                    glow::STATIC_DRAW,
                );
                self.gl.enable_vertex_attrib_array(attr.location);
                let stride = std::mem::size_of::<super::Vertex>() as i32;
                self.gl.vertex_attrib_pointer_f32(attr.location, 2, glow::FLOAT, false, stride, 0);
                buffers.push(BufferId::new(vbo.0));
            }

            self.gl.bind_vertex_array(None);
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(VertexArray { id: VertexArrayId::new(vao.0), buffers })
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: &VertexArray) {
        unsafe {
            for buffer in &vertex_array.buffers {
                self.gl.delete_buffer(glow::NativeBuffer(buffer.non_zero()));
            }
            self.gl.delete_vertex_array(glow::NativeVertexArray(vertex_array.id.non_zero()));
        }
    }

    fn draw_arrays(&mut self, vertex_array: VertexArrayId, mode: DrawMode, count: u32) {
        unsafe {
            let vao = glow::NativeVertexArray(vertex_array.non_zero());
            self.gl.bind_vertex_array(Some(vao));
            self.gl.draw_arrays(gl_mode(mode), 0, count as i32);
        }
    }

    fn configure_2d_state(&mut self) {
        unsafe {
            self.gl.enable(glow::DEPTH_TEST);
            self.gl.depth_mask(true);
            self.gl.depth_func(glow::LEQUAL);
            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
        log::debug!("2D GL state configured (depth LEQUAL, straight-alpha blend)");
    }

    fn clear(&mut self, color: Color) {
        unsafe {
            self.gl.clear_color(color.r, color.g, color.b, color.a);
            self.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
    }
}
