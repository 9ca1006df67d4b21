//! Shader programs and uniform uploads.
//!
//! A [`ShaderProgram`] is compiled and linked once, then shared between
//! drawables through `Rc`. Uniform locations are looked up lazily and cached
//! per program.

mod library;
mod program;
pub mod source;
mod uniform;

pub use library::ShaderLibrary;
pub use program::{ProgramState, ShaderProgram, ShaderSources};
pub use uniform::UniformValue;
