//! Color model shared by shaders and the clear pass.

pub mod color;

pub use color::Color;
