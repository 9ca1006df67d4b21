//! Kiln engine crate.
//!
//! A small 2D rendering core: shapes with cached transform matrices, shader
//! programs with memoized uniform locations, and render contexts that batch
//! drawables by texture to keep GPU state changes to a minimum.
//!
//! All GPU work goes through [`device::GraphicsBackend`]; the OpenGL
//! implementation lives in [`device::GlowBackend`] and a headless recorder in
//! [`device::RecordingBackend`].

pub mod core;
pub mod device;
pub mod logging;
pub mod paint;
pub mod primitive;
pub mod render;
pub mod shader;
pub mod time;

mod error;

pub use error::{Error, Result};
