use glam::Mat4;

use crate::device::{GraphicsBackend, ProgramId, TextureId};
use crate::Result;

use super::batch::BatchList;
use super::{DrawableRef, Texture};

/// Texture and program this context last bound.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
struct BoundState {
    texture: Option<TextureId>,
    program: Option<ProgramId>,
}

impl BoundState {
    /// Re-issues the cached bindings. Another context (or an immediate draw)
    /// may have changed GPU state since this context last rendered.
    fn reassert(&self, gpu: &mut dyn GraphicsBackend) {
        if let Some(texture) = self.texture {
            gpu.bind_texture(texture);
        }
        if let Some(program) = self.program {
            gpu.use_program(program);
        }
    }

    fn bind_texture(&mut self, gpu: &mut dyn GraphicsBackend, texture: Option<TextureId>) {
        // Textureless drawables keep whatever is bound.
        let Some(texture) = texture else { return };
        if self.texture != Some(texture) {
            log::trace!("bind texture {texture}");
            gpu.bind_texture(texture);
            self.texture = Some(texture);
        }
    }

    fn bind_program(&mut self, gpu: &mut dyn GraphicsBackend, program: ProgramId) {
        if self.program != Some(program) {
            log::trace!("use program {program}");
            gpu.use_program(program);
            self.program = Some(program);
        }
    }
}

/// Collects drawables per frame and renders them with minimal rebinding.
///
/// Only the projection and the last-bound texture/program survive
/// [`erase_drawable_list`](Self::erase_drawable_list); the batches are rebuilt
/// every frame.
///
/// Several contexts may share one GPU (e.g. a world context and a
/// screen-space UI context); each re-asserts its own bindings at the start of
/// its render pass.
pub struct RenderContext {
    label: &'static str,
    projection: Mat4,
    bound: BoundState,
    batches: BatchList,
}

impl RenderContext {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            projection: Mat4::IDENTITY,
            bound: BoundState::default(),
            batches: BatchList::default(),
        }
    }

    #[inline]
    pub fn label(&self) -> &'static str {
        self.label
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn set_projection(&mut self, projection: Mat4) {
        self.projection = projection;
    }

    /// Appends `drawable` to the batch of its current texture.
    ///
    /// Enqueuing the same drawable twice draws it twice.
    pub fn enqueue_for_drawing(&mut self, drawable: DrawableRef) {
        let texture = drawable.borrow().texture().map(Texture::id);
        self.batches.push(texture, drawable);
    }

    /// Renders every batch.
    ///
    /// Batches render in the order their texture was first enqueued this
    /// frame; drawables inside a batch render in enqueue order. No stacking
    /// order is promised between drawables of different textures.
    pub fn render_drawable_list(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
        self.bound.reassert(gpu);

        let projection = self.projection;
        for batch in self.batches.iter() {
            for drawable in &batch.drawables {
                let mut drawable = drawable.borrow_mut();

                self.bound.bind_texture(gpu, drawable.texture().map(Texture::id));
                let shader = drawable.shader();
                self.bound.bind_program(gpu, shader.id());
                shader.set_uniform(gpu, "mProjection", projection)?;

                drawable.draw_in_batch(gpu)?;
            }
        }

        log::trace!(
            "{}: rendered {} drawables in {} batches",
            self.label,
            self.batches.drawable_count(),
            self.batches.batch_count()
        );
        Ok(())
    }

    /// Drops every batch. Call once per frame after rendering.
    pub fn erase_drawable_list(&mut self) {
        self.batches.clear();
    }

    /// Number of draws queued for the next render pass.
    pub fn pending_draws(&self) -> usize {
        self.batches.drawable_count()
    }

    /// Binds `texture` unless it is already this context's bound texture.
    /// `None` leaves the current binding untouched.
    pub fn bind_texture(&mut self, gpu: &mut dyn GraphicsBackend, texture: Option<&Texture>) {
        self.bound.bind_texture(gpu, texture.map(Texture::id));
    }

    /// Selects `program` unless it is already this context's current program.
    pub fn bind_shader(&mut self, gpu: &mut dyn GraphicsBackend, program: ProgramId) {
        self.bound.bind_program(gpu, program);
    }

    /// Builds an orthographic projection for a `width` × `height` window.
    ///
    /// - `centered`: world origin at the window center, visible half-extents
    ///   `width / (2 * scale)` × `height / (2 * scale)`
    /// - otherwise: origin at the top-left corner, extents `0..width` ×
    ///   `0..height`
    ///
    /// +Y points down. Depth runs from near `1` to far `-1`.
    pub fn set_ortho_2d_projection(&mut self, width: u32, height: u32, scale: f32, centered: bool) {
        let (left, right, top, bottom) = if centered {
            let half_w = width as f32 / 2.0 / scale;
            let half_h = height as f32 / 2.0 / scale;
            (-half_w, half_w, -half_h, half_h)
        } else {
            (0.0, width as f32, 0.0, height as f32)
        };
        self.projection = Mat4::orthographic_rh_gl(left, right, bottom, top, 1.0, -1.0);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Vec3, Vec4};

    use super::*;
    use crate::device::{DrawMode, GpuCall, RecordingBackend, VertexArrayId};
    use crate::render::Drawable;
    use crate::shader::{ShaderProgram, UniformValue};

    /// Minimal drawable: draws its own vertex array id, nothing else.
    struct Probe {
        texture: Option<Texture>,
        shader: Rc<ShaderProgram>,
        mesh: VertexArrayId,
    }

    impl Drawable for Probe {
        fn texture(&self) -> Option<&Texture> {
            self.texture.as_ref()
        }

        fn shader(&self) -> &ShaderProgram {
            &self.shader
        }

        fn draw(&mut self, gpu: &mut dyn GraphicsBackend, ctx: &RenderContext) -> Result<()> {
            if let Some(t) = &self.texture {
                gpu.bind_texture(t.id());
            }
            gpu.use_program(self.shader.id());
            self.shader.set_uniform(gpu, "mProjection", ctx.projection())?;
            self.draw_in_batch(gpu)
        }

        fn draw_in_batch(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
            gpu.draw_arrays(self.mesh, DrawMode::TriangleFan, 4);
            Ok(())
        }
    }

    struct Fixture {
        gpu: RecordingBackend,
        shader: Rc<ShaderProgram>,
        next_mesh: u32,
    }

    impl Fixture {
        fn new() -> Self {
            let mut gpu = RecordingBackend::new();
            let shader = Rc::new(ShaderProgram::textured(&mut gpu).unwrap());
            Self { gpu, shader, next_mesh: 1000 }
        }

        fn texture(&mut self) -> Texture {
            Texture::new(self.gpu.create_texture(), 16, 16)
        }

        fn probe(&mut self, texture: Option<Texture>) -> (DrawableRef, VertexArrayId) {
            self.next_mesh += 1;
            let mesh = VertexArrayId::from_raw(self.next_mesh).unwrap();
            let probe: DrawableRef =
                Rc::new(RefCell::new(Probe { texture, shader: Rc::clone(&self.shader), mesh }));
            (probe, mesh)
        }
    }

    #[test]
    fn alternating_textures_bind_once_per_batch() {
        let mut f = Fixture::new();
        let (a, b) = (f.texture(), f.texture());
        let (a1, a1_mesh) = f.probe(Some(a));
        let (b1, b1_mesh) = f.probe(Some(b));
        let (a2, a2_mesh) = f.probe(Some(a));
        f.gpu.clear_calls();

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(a1);
        ctx.enqueue_for_drawing(b1);
        ctx.enqueue_for_drawing(a2);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert_eq!(f.gpu.texture_binds(), vec![a.id(), b.id()]);
        assert_eq!(f.gpu.draws(), vec![a1_mesh, a2_mesh, b1_mesh]);
        assert_eq!(f.gpu.program_binds(), vec![f.shader.id()]);
    }

    #[test]
    fn same_texture_draws_in_enqueue_order() {
        let mut f = Fixture::new();
        let t = f.texture();
        let (x, x_mesh) = f.probe(Some(t));
        let (y, y_mesh) = f.probe(Some(t));

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(x);
        ctx.enqueue_for_drawing(y);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert_eq!(f.gpu.draws(), vec![x_mesh, y_mesh]);
    }

    #[test]
    fn batches_follow_first_enqueue_order() {
        let mut f = Fixture::new();
        let (a, b) = (f.texture(), f.texture());
        let (b1, b1_mesh) = f.probe(Some(b));
        let (a1, a1_mesh) = f.probe(Some(a));
        let (plain, plain_mesh) = f.probe(None);

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(plain);
        ctx.enqueue_for_drawing(b1);
        ctx.enqueue_for_drawing(a1);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert_eq!(f.gpu.draws(), vec![plain_mesh, b1_mesh, a1_mesh]);
    }

    #[test]
    fn erased_list_renders_nothing() {
        let mut f = Fixture::new();
        let t = f.texture();
        let (d, _) = f.probe(Some(t));

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(d);
        ctx.render_drawable_list(&mut f.gpu).unwrap();
        ctx.erase_drawable_list();
        assert_eq!(ctx.pending_draws(), 0);

        f.gpu.clear_calls();
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert!(f.gpu.draws().is_empty());
    }

    #[test]
    fn render_pass_reasserts_last_bindings() {
        let mut f = Fixture::new();
        let t = f.texture();
        let (d, _) = f.probe(Some(t));

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(Rc::clone(&d));
        ctx.render_drawable_list(&mut f.gpu).unwrap();
        ctx.erase_drawable_list();

        // Someone else rebinds in between.
        let other = f.gpu.create_texture();
        f.gpu.bind_texture(other);
        f.gpu.clear_calls();

        ctx.enqueue_for_drawing(d);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        // Only the defensive re-bind; the drawable matches the cached state.
        assert_eq!(f.gpu.texture_binds(), vec![t.id()]);
        assert_eq!(f.gpu.program_binds(), vec![f.shader.id()]);
        assert_eq!(f.gpu.draws().len(), 1);
    }

    #[test]
    fn textureless_drawable_keeps_current_texture() {
        let mut f = Fixture::new();
        let t = f.texture();
        let (textured, _) = f.probe(Some(t));
        let (plain, _) = f.probe(None);

        let mut ctx = RenderContext::new("world");
        ctx.enqueue_for_drawing(textured);
        ctx.enqueue_for_drawing(plain);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert_eq!(f.gpu.texture_binds(), vec![t.id()]);
        assert_eq!(f.gpu.draws().len(), 2);
    }

    #[test]
    fn duplicate_enqueue_draws_twice() {
        let mut f = Fixture::new();
        let (d, mesh) = f.probe(None);

        let mut ctx = RenderContext::new("ui");
        ctx.enqueue_for_drawing(Rc::clone(&d));
        ctx.enqueue_for_drawing(d);
        assert_eq!(ctx.pending_draws(), 2);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        assert_eq!(f.gpu.draws(), vec![mesh, mesh]);
    }

    #[test]
    fn projection_is_uploaded_before_every_draw() {
        let mut f = Fixture::new();
        let (d1, _) = f.probe(None);
        let (d2, _) = f.probe(None);
        f.gpu.clear_calls();

        let mut ctx = RenderContext::new("world");
        ctx.set_ortho_2d_projection(800, 600, 1.0, true);
        ctx.enqueue_for_drawing(d1);
        ctx.enqueue_for_drawing(d2);
        ctx.render_drawable_list(&mut f.gpu).unwrap();

        let kinds: Vec<_> = f
            .gpu
            .calls()
            .iter()
            .filter(|c| matches!(c, GpuCall::Uniform { .. } | GpuCall::DrawArrays { .. }))
            .map(|c| matches!(c, GpuCall::DrawArrays { .. }))
            .collect();
        assert_eq!(kinds, vec![false, true, false, true]);
        assert_eq!(
            f.gpu.last_uniform(f.shader.id(), "mProjection"),
            Some(&UniformValue::Mat4(ctx.projection()))
        );
    }

    #[test]
    fn immediate_draw_bypasses_bind_cache() {
        let mut f = Fixture::new();
        let t = f.texture();
        let (d, mesh) = f.probe(Some(t));
        f.gpu.clear_calls();

        let ctx = RenderContext::new("world");
        d.borrow_mut().draw(&mut f.gpu, &ctx).unwrap();

        assert_eq!(f.gpu.texture_binds(), vec![t.id()]);
        assert_eq!(f.gpu.draws(), vec![mesh]);
    }

    #[test]
    fn centered_projection_maps_origin_to_viewport_center() {
        let mut ctx = RenderContext::new("world");
        ctx.set_ortho_2d_projection(800, 600, 1.0, true);
        let p = ctx.projection();

        let origin = p * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert_eq!((origin.x, origin.y), (0.0, 0.0));

        let corner = p.project_point3(Vec3::new(400.0, 300.0, 0.0));
        assert!((corner.x - 1.0).abs() < 1e-6);
        assert!((corner.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn corner_projection_maps_origin_to_top_left() {
        let mut ctx = RenderContext::new("ui");
        ctx.set_ortho_2d_projection(800, 600, 1.0, false);
        let p = ctx.projection();

        let origin = p.project_point3(Vec3::ZERO);
        assert!((origin.x + 1.0).abs() < 1e-6);
        assert!((origin.y - 1.0).abs() < 1e-6);

        let far_corner = p.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!((far_corner.x - 1.0).abs() < 1e-6);
        assert!((far_corner.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn screen_scale_shrinks_centered_extents() {
        let mut ctx = RenderContext::new("world");
        ctx.set_ortho_2d_projection(800, 600, 2.0, true);

        // Half-extents are 200 × 150 world units.
        let edge = ctx.projection().project_point3(Vec3::new(200.0, 150.0, 0.0));
        assert!((edge.x - 1.0).abs() < 1e-6);
        assert!((edge.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn depth_is_flipped() {
        let mut ctx = RenderContext::new("world");
        ctx.set_ortho_2d_projection(800, 600, 1.0, false);
        let near = ctx.projection().project_point3(Vec3::new(0.0, 0.0, -1.0));
        let far = ctx.projection().project_point3(Vec3::new(0.0, 0.0, 1.0));
        assert!((near.z + 1.0).abs() < 1e-6);
        assert!((far.z - 1.0).abs() < 1e-6);
    }
}
