use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use crate::device::{GraphicsBackend, ProgramId, ShaderStage, UniformLocation};
use crate::{Error, Result};

use super::source;
use super::UniformValue;

/// Source text for each stage of a program. Absent stages are skipped.
#[derive(Debug, Copy, Clone, Default)]
pub struct ShaderSources<'a> {
    pub vertex: Option<&'a str>,
    pub geometry: Option<&'a str>,
    pub fragment: Option<&'a str>,
}

impl<'a> ShaderSources<'a> {
    #[inline]
    pub fn new(vertex: &'a str, fragment: &'a str) -> Self {
        Self { vertex: Some(vertex), geometry: None, fragment: Some(fragment) }
    }

    #[inline]
    pub fn with_geometry(mut self, geometry: &'a str) -> Self {
        self.geometry = Some(geometry);
        self
    }

    fn stages(&self) -> impl Iterator<Item = (ShaderStage, &'a str)> {
        [
            (ShaderStage::Vertex, self.vertex),
            (ShaderStage::Geometry, self.geometry),
            (ShaderStage::Fragment, self.fragment),
        ]
        .into_iter()
        .filter_map(|(stage, src)| src.map(|s| (stage, s)))
    }
}

/// Program lifecycle. A `ShaderProgram` value only exists once linked.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProgramState {
    Linked,
    Released,
}

/// Linked GPU program with a name → location cache.
///
/// Programs are shared between drawables (`Rc<ShaderProgram>`), so all
/// mutable bookkeeping lives in cells.
#[derive(Debug)]
pub struct ShaderProgram {
    id: ProgramId,
    uniforms: RefCell<HashMap<String, Option<UniformLocation>>>,
    state: Cell<ProgramState>,
    /// User whose per-shape uniforms are currently loaded in the program.
    uniform_owner: Cell<Option<u64>>,
    next_user: Cell<u64>,
}

impl ShaderProgram {
    /// Compiles every present stage, attaches it and links.
    ///
    /// Shader objects are deleted once linked. On failure nothing is leaked and
    /// the error carries the driver log.
    pub fn new(gpu: &mut dyn GraphicsBackend, sources: ShaderSources<'_>) -> Result<Self> {
        let stages: Vec<_> = sources.stages().collect();
        if stages.is_empty() {
            return Err(Error::NoShaderStages);
        }

        let id = gpu.create_program()?;
        let mut compiled = Vec::with_capacity(stages.len());

        for (stage, src) in stages {
            match gpu.compile_shader(stage, src) {
                Ok(shader) => {
                    gpu.attach_shader(id, shader);
                    compiled.push(shader);
                }
                Err(err) => {
                    for shader in compiled {
                        gpu.delete_shader(shader);
                    }
                    gpu.delete_program(id);
                    return Err(err);
                }
            }
        }

        let linked = gpu.link_program(id);
        // Attached shaders are only flagged here; the GPU frees them with the program.
        for shader in compiled {
            gpu.delete_shader(shader);
        }
        if let Err(err) = linked {
            gpu.delete_program(id);
            return Err(err);
        }

        log::debug!("linked shader program {id}");
        Ok(Self {
            id,
            uniforms: RefCell::new(HashMap::new()),
            state: Cell::new(ProgramState::Linked),
            uniform_owner: Cell::new(None),
            next_user: Cell::new(0),
        })
    }

    /// Primitive vertex stage + texture-sampling fragment stage.
    pub fn textured(gpu: &mut dyn GraphicsBackend) -> Result<Self> {
        Self::new(gpu, ShaderSources::new(source::PRIMITIVE_VERTEX, source::TEXTURE_FRAGMENT))
    }

    /// Primitive vertex stage + `color` fill fragment stage.
    pub fn solid_color(gpu: &mut dyn GraphicsBackend) -> Result<Self> {
        Self::new(gpu, ShaderSources::new(source::PRIMITIVE_VERTEX, source::SOLID_COLOR_FRAGMENT))
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    pub fn state(&self) -> ProgramState {
        self.state.get()
    }

    #[inline]
    pub fn is_released(&self) -> bool {
        self.state.get() == ProgramState::Released
    }

    /// Returns the location of `name`.
    ///
    /// The first call per name queries the GPU; later calls are served from the
    /// cache, including for names the program does not use (`None`).
    pub fn get_uniform(
        &self,
        gpu: &mut dyn GraphicsBackend,
        name: &str,
    ) -> Result<Option<UniformLocation>> {
        self.ensure_linked()?;

        if let Some(location) = self.uniforms.borrow().get(name) {
            return Ok(*location);
        }

        let location = gpu.uniform_location(self.id, name);
        if location.is_none() {
            log::debug!("uniform `{name}` is not active in program {}", self.id);
        }
        self.uniforms.borrow_mut().insert(name.to_owned(), location);
        Ok(location)
    }

    /// Uploads `value` to `name`. The program must be the one in use.
    ///
    /// Uploads to uniforms the program does not declare are dropped.
    pub fn set_uniform(
        &self,
        gpu: &mut dyn GraphicsBackend,
        name: &str,
        value: impl Into<UniformValue>,
    ) -> Result<()> {
        let value = value.into();
        if let Some(location) = self.get_uniform(gpu, name)? {
            gpu.upload_uniform(location, &value);
        }
        Ok(())
    }

    /// Frees the GPU program. Further uniform operations fail.
    pub fn release(&self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
        if self.is_released() {
            return Err(Error::ProgramAlreadyReleased(self.id.get()));
        }
        gpu.delete_program(self.id);
        self.state.set(ProgramState::Released);
        self.uniforms.borrow_mut().clear();
        self.uniform_owner.set(None);
        log::debug!("released shader program {}", self.id);
        Ok(())
    }

    /// Number of memoized uniform names.
    pub fn cached_uniforms(&self) -> usize {
        self.uniforms.borrow().len()
    }

    /// Hands out an id, unique within this program, for a drawable that will
    /// upload per-shape uniforms through it.
    pub(crate) fn register_user(&self) -> u64 {
        let id = self.next_user.get();
        self.next_user.set(id + 1);
        id
    }

    /// Whether the per-shape uniforms currently loaded were uploaded by `user`.
    pub(crate) fn holds_uniforms(&self, user: u64) -> bool {
        self.uniform_owner.get() == Some(user)
    }

    /// Records `user` as holder of the per-shape uniform state. Call only once
    /// its full state is uploaded.
    pub(crate) fn claim_uniforms(&self, user: u64) {
        self.uniform_owner.set(Some(user));
    }

    /// Marks the loaded uniforms as belonging to nobody, forcing the next user
    /// to upload everything.
    pub(crate) fn disown_uniforms(&self) {
        self.uniform_owner.set(None);
    }

    #[cfg(test)]
    pub(crate) fn uniform_owner(&self) -> Option<u64> {
        self.uniform_owner.get()
    }

    fn ensure_linked(&self) -> Result<()> {
        match self.state.get() {
            ProgramState::Linked => Ok(()),
            ProgramState::Released => Err(Error::ProgramReleased(self.id.get())),
        }
    }
}
