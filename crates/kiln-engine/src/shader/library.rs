use std::rc::Rc;

use crate::device::GraphicsBackend;
use crate::Result;

use super::ShaderProgram;

/// Default programs, created on first use and shared by every primitive that
/// asks for them.
///
/// Sharing one program per kind keeps program switches out of the render pass.
#[derive(Debug, Default)]
pub struct ShaderLibrary {
    textured: Option<Rc<ShaderProgram>>,
    solid_color: Option<Rc<ShaderProgram>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn textured(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<Rc<ShaderProgram>> {
        get_or_create(&mut self.textured, || {
            log::debug!("creating default textured program");
            ShaderProgram::textured(gpu)
        })
    }

    pub fn solid_color(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<Rc<ShaderProgram>> {
        get_or_create(&mut self.solid_color, || {
            log::debug!("creating default solid-color program");
            ShaderProgram::solid_color(gpu)
        })
    }

    /// Releases every program created so far.
    ///
    /// Primitives still holding a program will fail their next uniform upload.
    pub fn release(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
        for program in [self.textured.take(), self.solid_color.take()].into_iter().flatten() {
            if !program.is_released() {
                program.release(gpu)?;
            }
        }
        Ok(())
    }
}

fn get_or_create(
    slot: &mut Option<Rc<ShaderProgram>>,
    create: impl FnOnce() -> Result<ShaderProgram>,
) -> Result<Rc<ShaderProgram>> {
    if let Some(program) = slot {
        return Ok(Rc::clone(program));
    }
    let program = Rc::new(create()?);
    *slot = Some(Rc::clone(&program));
    Ok(program)
}
