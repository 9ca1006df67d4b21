use std::cell::RefCell;
use std::rc::Rc;

use crate::device::GraphicsBackend;
use crate::shader::ShaderProgram;
use crate::Result;

use super::{RenderContext, Texture};

/// Anything a [`RenderContext`] can render.
///
/// Implemented by [`Primitive`](crate::primitive::Primitive) (quads and
/// regular polygons) and by external renderers such as text.
pub trait Drawable {
    /// Texture to bind before drawing. `None` lands in the textureless batch.
    fn texture(&self) -> Option<&Texture>;

    fn shader(&self) -> &ShaderProgram;

    /// Immediate draw outside batching: binds its own texture and program,
    /// uploads the context projection and issues the draw call.
    ///
    /// This bypasses the context's bind cache; the next render pass re-asserts
    /// the context's bindings before drawing.
    fn draw(&mut self, gpu: &mut dyn GraphicsBackend, ctx: &RenderContext) -> Result<()>;

    /// Draws assuming texture, program and projection are already in place.
    fn draw_in_batch(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()>;
}

/// Shared handle stored in render batches.
///
/// The render pass borrows each drawable mutably while drawing it; callers
/// must not hold a borrow across
/// [`render_drawable_list`](RenderContext::render_drawable_list).
pub type DrawableRef = Rc<RefCell<dyn Drawable>>;
