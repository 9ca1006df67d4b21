//! Per-frame draw batching.
//!
//! Application code enqueues drawables into a [`RenderContext`] during update;
//! at frame end the context renders every batch, binding textures and programs
//! only when they change, then erases its batches for the next frame.
//!
//! Convention:
//! - world units are pixels divided by the context's screen scale
//! - +Y points down on screen; see [`RenderContext::set_ortho_2d_projection`]

mod batch;
mod ctx;
mod drawable;
mod texture;

pub use ctx::RenderContext;
pub use drawable::{Drawable, DrawableRef};
pub use texture::Texture;
