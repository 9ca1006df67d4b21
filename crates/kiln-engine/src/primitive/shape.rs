use std::rc::Rc;

use glam::{Mat4, Vec2, Vec3};

use crate::device::{DrawMode, GraphicsBackend, VertexArray, VertexArrayId, VertexAttribute};
use crate::paint::Color;
use crate::render::{Drawable, RenderContext, Texture};
use crate::shader::ShaderProgram;
use crate::{Error, Result};

use super::geometry::{QUAD_UVS, QUAD_VERTICES, polygon_outline};
use super::matrix::{KindSet, MatrixKind, MatrixSet, Transform};

/// Geometry a [`Primitive`] was built with.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Shape {
    /// Unit quad with texture coordinates.
    Quad,
    /// Outline of a regular polygon.
    RegularPolygon { segments: u32, show_rotation: bool },
}

impl Shape {
    pub fn draw_mode(self) -> DrawMode {
        match self {
            Shape::Quad => DrawMode::TriangleFan,
            Shape::RegularPolygon { .. } => DrawMode::LineStrip,
        }
    }
}

/// A 2D shape with a cached model transform.
///
/// Each transform attribute maps to one of the five matrices in
/// [`MatrixSet`]; setters flag that matrix only. Before each draw the dirty
/// matrices are rebuilt and uploaded, clean ones are left as they are on the
/// GPU.
///
/// Several primitives may share one program. The program remembers which
/// primitive uploaded its per-shape uniforms last, and a primitive that finds
/// someone else's values loaded uploads all of its cached matrices again.
pub struct Primitive {
    /// Identity among the users of `shader`.
    user: u64,
    shape: Shape,
    mesh: VertexArray,
    vertex_count: u32,
    shader: Rc<ShaderProgram>,
    texture: Option<Texture>,
    transform: Transform,
    matrices: MatrixSet,
    color: Color,
    color_dirty: bool,
}

impl Primitive {
    /// Unit quad at `position`, `size` units large, anchored at its top-left.
    pub fn quad(
        gpu: &mut dyn GraphicsBackend,
        shader: Rc<ShaderProgram>,
        position: Vec3,
        size: Vec2,
    ) -> Result<Self> {
        let mesh = gpu.create_vertex_array(&[
            VertexAttribute { location: 0, data: &QUAD_VERTICES },
            VertexAttribute { location: 1, data: &QUAD_UVS },
        ])?;
        let transform = Transform::new(position, size);
        Ok(Self::with_mesh(Shape::Quad, mesh, QUAD_VERTICES.len() as u32, shader, transform))
    }

    /// Regular polygon outline of `segments` sides inscribed in a circle of
    /// `radius`, centred on `position`. With `show_rotation` a line from the
    /// rim to the center is drawn as well.
    ///
    /// The mesh has no texture coordinates: `shader` must be a solid-color
    /// program such as [`ShaderProgram::solid_color`], tinted with
    /// [`set_color`](Self::set_color).
    pub fn regular_polygon(
        gpu: &mut dyn GraphicsBackend,
        shader: Rc<ShaderProgram>,
        position: Vec3,
        radius: f32,
        segments: u32,
        show_rotation: bool,
    ) -> Result<Self> {
        if segments < 3 {
            return Err(Error::DegenerateShape { segments });
        }
        let outline = polygon_outline(segments, show_rotation);
        let mesh = gpu.create_vertex_array(&[VertexAttribute { location: 0, data: &outline }])?;
        let size = Vec2::splat(radius * 2.0);
        Ok(Self::with_mesh(
            Shape::RegularPolygon { segments, show_rotation },
            mesh,
            outline.len() as u32,
            shader,
            Transform::new(position, size),
        ))
    }

    fn with_mesh(
        shape: Shape,
        mesh: VertexArray,
        vertex_count: u32,
        shader: Rc<ShaderProgram>,
        transform: Transform,
    ) -> Self {
        let user = shader.register_user();
        log::trace!("{shape:?} on vertex array {} (program {} user {user})", mesh.id, shader.id());
        Self {
            user,
            shape,
            mesh,
            vertex_count,
            shader,
            texture: None,
            transform,
            matrices: MatrixSet::new(),
            color: Color::WHITE,
            color_dirty: true,
        }
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    #[inline]
    pub fn vertex_array(&self) -> VertexArrayId {
        self.mesh.id
    }

    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    #[inline]
    pub fn shader_handle(&self) -> &Rc<ShaderProgram> {
        &self.shader
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    pub fn matrices(&self) -> &MatrixSet {
        &self.matrices
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.transform.position
    }

    #[inline]
    pub fn scale(&self) -> Vec2 {
        self.transform.scale
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.transform.size
    }

    #[inline]
    pub fn anchor(&self) -> Vec2 {
        self.transform.anchor
    }

    #[inline]
    pub fn angle(&self) -> f32 {
        self.transform.angle
    }

    #[inline]
    pub fn flip_x(&self) -> bool {
        self.transform.flip_x
    }

    #[inline]
    pub fn flip_y(&self) -> bool {
        self.transform.flip_y
    }

    #[inline]
    pub fn color(&self) -> Color {
        self.color
    }

    /// Model matrix for the current attributes, whether or not it was
    /// uploaded yet.
    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model()
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.transform.position = position;
        self.matrices.mark_dirty(MatrixKind::Translation);
    }

    pub fn set_scale(&mut self, scale: Vec2) {
        self.transform.scale = scale;
        self.matrices.mark_dirty(MatrixKind::Scale);
    }

    pub fn set_size(&mut self, size: Vec2) {
        self.transform.size = size;
        self.matrices.mark_dirty(MatrixKind::Size);
    }

    /// Rotation in radians.
    pub fn set_angle(&mut self, angle: f32) {
        self.transform.angle = angle;
        self.matrices.mark_dirty(MatrixKind::Rotation);
    }

    /// Pivot point in size units, relative to the top-left corner.
    pub fn set_anchor(&mut self, anchor: Vec2) {
        self.transform.anchor = anchor;
        self.matrices.mark_dirty(MatrixKind::Anchor);
    }

    pub fn set_anchor_to_center(&mut self) {
        self.set_anchor(self.transform.size * 0.5);
    }

    pub fn set_anchor_to_bottom_center(&mut self) {
        let size = self.transform.size;
        self.set_anchor(Vec2::new(size.x * 0.5, size.y));
    }

    pub fn set_anchor_to_top_left(&mut self) {
        self.set_anchor(Vec2::ZERO);
    }

    pub fn set_flip_x(&mut self, flip: bool) {
        self.transform.flip_x = flip;
        self.matrices.mark_dirty(MatrixKind::Scale);
    }

    pub fn set_flip_y(&mut self, flip: bool) {
        self.transform.flip_y = flip;
        self.matrices.mark_dirty(MatrixKind::Scale);
    }

    /// Fill color, uploaded to the `color` uniform of programs that declare it.
    pub fn set_color(&mut self, color: Color) {
        if self.color != color {
            self.color = color;
            self.color_dirty = true;
        }
    }

    pub fn set_texture(&mut self, texture: Option<Texture>) {
        self.texture = texture;
    }

    /// Resizes to the pixel size of the current texture. No-op without one.
    pub fn set_size_from_texture(&mut self) {
        if let Some(size) = self.texture.as_ref().map(Texture::size) {
            self.set_size(size);
        }
    }

    /// Rebuilds dirty matrices and uploads what the program is missing.
    ///
    /// The program must be in use.
    pub fn set_matrices(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
        let recomputed = self.matrices.refresh(&self.transform);
        let resident = self.shader.holds_uniforms(self.user);
        if !resident {
            let program = self.shader.id();
            log::trace!("user {} of program {program}: uploading full uniform state", self.user);
        }

        match self.upload_uniforms(gpu, recomputed, resident) {
            Ok(()) => {
                self.shader.claim_uniforms(self.user);
                Ok(())
            }
            Err(err) => {
                // Part of the state may be missing on the GPU.
                self.shader.disown_uniforms();
                Err(err)
            }
        }
    }

    fn upload_uniforms(
        &mut self,
        gpu: &mut dyn GraphicsBackend,
        recomputed: KindSet,
        resident: bool,
    ) -> Result<()> {
        for kind in MatrixKind::ALL {
            if !resident || recomputed.contains(kind) {
                self.shader.set_uniform(gpu, kind.uniform_name(), self.matrices.get(kind))?;
            }
        }
        if !resident || self.color_dirty {
            self.shader.set_uniform(gpu, "color", self.color)?;
            self.color_dirty = false;
        }
        Ok(())
    }

    /// Frees the vertex array. The shared program is left alone.
    pub fn release(self, gpu: &mut dyn GraphicsBackend) {
        gpu.delete_vertex_array(&self.mesh);
    }
}

impl Drawable for Primitive {
    fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    fn shader(&self) -> &ShaderProgram {
        &self.shader
    }

    fn draw(&mut self, gpu: &mut dyn GraphicsBackend, ctx: &RenderContext) -> Result<()> {
        if let Some(texture) = &self.texture {
            gpu.bind_texture(texture.id());
        }
        gpu.use_program(self.shader.id());
        self.shader.set_uniform(gpu, "mProjection", ctx.projection())?;
        self.draw_in_batch(gpu)
    }

    fn draw_in_batch(&mut self, gpu: &mut dyn GraphicsBackend) -> Result<()> {
        self.set_matrices(gpu)?;
        gpu.draw_arrays(self.mesh.id, self.shape.draw_mode(), self.vertex_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::device::{GpuCall, RecordingBackend};
    use crate::render::DrawableRef;
    use crate::shader::UniformValue;

    use super::*;

    const MATRICES: [&str; 5] = ["mTranslate", "mScale", "mSize", "mRotation", "mAnchor"];

    fn setup() -> (RecordingBackend, Rc<ShaderProgram>) {
        let mut gpu = RecordingBackend::new();
        let shader = Rc::new(ShaderProgram::textured(&mut gpu).unwrap());
        (gpu, shader)
    }

    fn solid_setup() -> (RecordingBackend, Rc<ShaderProgram>) {
        let mut gpu = RecordingBackend::new();
        let shader = Rc::new(ShaderProgram::solid_color(&mut gpu).unwrap());
        (gpu, shader)
    }

    fn quad(gpu: &mut RecordingBackend, shader: &Rc<ShaderProgram>) -> Primitive {
        Primitive::quad(gpu, shader.clone(), Vec3::ZERO, Vec2::new(10.0, 10.0)).unwrap()
    }

    fn uploads(gpu: &RecordingBackend) -> Vec<String> {
        gpu.uniform_uploads().into_iter().map(str::to_owned).collect()
    }

    #[test]
    fn first_draw_uploads_every_matrix_once() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        gpu.clear_calls();

        q.draw_in_batch(&mut gpu).unwrap();

        let up = uploads(&gpu);
        for name in MATRICES {
            assert_eq!(up.iter().filter(|n| *n == name).count(), 1, "{name}");
        }
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::DrawArrays { .. })), 1);
    }

    #[test]
    fn setter_reuploads_only_its_matrix() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.draw_in_batch(&mut gpu).unwrap();

        let cases: [(&str, fn(&mut Primitive)); 6] = [
            ("mTranslate", |p| p.set_position(Vec3::new(4.0, 5.0, 0.0))),
            ("mScale", |p| p.set_scale(Vec2::splat(3.0))),
            ("mSize", |p| p.set_size(Vec2::new(20.0, 8.0))),
            ("mRotation", |p| p.set_angle(1.0)),
            ("mAnchor", |p| p.set_anchor(Vec2::new(2.0, 2.0))),
            ("mScale", |p| p.set_flip_y(true)),
        ];
        for (expected, change) in cases {
            gpu.clear_calls();
            change(&mut q);
            q.draw_in_batch(&mut gpu).unwrap();
            assert_eq!(uploads(&gpu), vec![expected.to_owned()]);
        }
    }

    #[test]
    fn unchanged_primitive_uploads_nothing() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.draw_in_batch(&mut gpu).unwrap();
        gpu.clear_calls();

        q.draw_in_batch(&mut gpu).unwrap();
        assert!(uploads(&gpu).is_empty());
        assert_eq!(gpu.draws(), vec![q.vertex_array()]);
    }

    #[test]
    fn anchor_does_not_touch_rotation() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.draw_in_batch(&mut gpu).unwrap();

        q.set_anchor_to_center();
        assert!(q.matrices().is_dirty(MatrixKind::Anchor));
        assert!(!q.matrices().is_dirty(MatrixKind::Rotation));
    }

    #[test]
    fn uploaded_values_match_attributes() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.set_position(Vec3::new(7.0, 8.0, 0.5));
        q.set_flip_x(true);
        q.draw_in_batch(&mut gpu).unwrap();

        let program = shader.id();
        assert_eq!(
            gpu.last_uniform(program, "mTranslate"),
            Some(&UniformValue::Mat4(Mat4::from_translation(Vec3::new(7.0, 8.0, 0.5))))
        );
        assert_eq!(
            gpu.last_uniform(program, "mScale"),
            Some(&UniformValue::Mat4(Mat4::from_scale(Vec3::new(-1.0, 1.0, 1.0))))
        );
    }

    #[test]
    fn model_matrix_matches_cached_composition() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.set_scale(Vec2::splat(2.0));
        q.set_anchor(Vec2::splat(5.0));
        q.draw_in_batch(&mut gpu).unwrap();

        assert_eq!(q.model_matrix(), q.matrices().model());
        assert_eq!(q.model_matrix().transform_point3(Vec3::ZERO), Vec3::new(-10.0, -10.0, 0.0));
        assert_eq!(
            q.model_matrix().transform_point3(Vec3::new(1.0, 1.0, 0.0)),
            Vec3::new(10.0, 10.0, 0.0)
        );
    }

    #[test]
    fn shared_program_reuploads_after_another_primitive() {
        let (mut gpu, shader) = setup();
        let mut a = quad(&mut gpu, &shader);
        let mut b = quad(&mut gpu, &shader);
        a.set_position(Vec3::new(1.0, 0.0, 0.0));
        b.set_position(Vec3::new(2.0, 0.0, 0.0));

        a.draw_in_batch(&mut gpu).unwrap();
        b.draw_in_batch(&mut gpu).unwrap();
        gpu.clear_calls();

        // `b` overwrote the program's matrices; `a` must restore its own.
        a.draw_in_batch(&mut gpu).unwrap();
        let up = uploads(&gpu);
        for name in MATRICES {
            assert!(up.iter().any(|n| n == name), "{name} missing");
        }
        assert_eq!(
            gpu.last_uniform(shader.id(), "mTranslate"),
            Some(&UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0))))
        );
        // Re-uploading did not recompute clean matrices.
        assert!(!a.matrices().is_dirty(MatrixKind::Translation));
    }

    #[test]
    fn color_uploaded_when_changed() {
        let (mut gpu, shader) = solid_setup();
        let mut p = Primitive::regular_polygon(&mut gpu, shader.clone(), Vec3::ZERO, 4.0, 8, false)
            .unwrap();
        p.draw_in_batch(&mut gpu).unwrap();
        assert_eq!(
            gpu.last_uniform(shader.id(), "color"),
            Some(&UniformValue::Color(Color::WHITE))
        );

        gpu.clear_calls();
        p.set_color(Color::WHITE);
        p.draw_in_batch(&mut gpu).unwrap();
        assert!(uploads(&gpu).is_empty());

        let red = Color::rgba(1.0, 0.0, 0.0, 1.0);
        p.set_color(red);
        p.draw_in_batch(&mut gpu).unwrap();
        assert_eq!(uploads(&gpu), vec!["color".to_owned()]);
        assert_eq!(gpu.last_uniform(shader.id(), "color"), Some(&UniformValue::Color(red)));
    }

    #[test]
    fn polygon_spins_around_its_position() {
        let (mut gpu, shader) = solid_setup();
        let position = Vec3::new(100.0, 100.0, 0.0);
        let mut p = Primitive::regular_polygon(&mut gpu, shader, position, 10.0, 8, true).unwrap();

        for angle in [0.0, 1.0, std::f32::consts::FRAC_PI_2, std::f32::consts::PI] {
            p.set_angle(angle);
            // The rotation spoke ends at the local origin.
            let center = p.model_matrix().transform_point3(Vec3::ZERO);
            assert!((center - position).length() < 1e-4, "angle {angle}: {center}");
        }

        p.set_angle(0.0);
        let rim = p.model_matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((rim - Vec3::new(110.0, 100.0, 0.0)).length() < 1e-4);
        p.set_angle(std::f32::consts::FRAC_PI_2);
        let rim = p.model_matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((rim - Vec3::new(100.0, 110.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn polygon_draws_line_strip_of_closed_outline() {
        let (mut gpu, shader) = solid_setup();
        let mut p = Primitive::regular_polygon(&mut gpu, shader, Vec3::ZERO, 3.0, 6, true).unwrap();
        assert_eq!(p.size(), Vec2::splat(6.0));
        assert_eq!(p.vertex_count(), 8);
        gpu.clear_calls();

        p.draw_in_batch(&mut gpu).unwrap();
        assert!(gpu.calls().contains(&GpuCall::DrawArrays {
            vertex_array: p.vertex_array(),
            mode: DrawMode::LineStrip,
            count: 8,
        }));
    }

    #[test]
    fn polygon_needs_three_segments() {
        let (mut gpu, shader) = solid_setup();
        let err = Primitive::regular_polygon(&mut gpu, shader, Vec3::ZERO, 1.0, 2, false);
        assert!(matches!(err, Err(Error::DegenerateShape { segments: 2 })));
    }

    #[test]
    fn quad_draws_triangle_fan() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.draw_in_batch(&mut gpu).unwrap();
        assert!(gpu.calls().contains(&GpuCall::DrawArrays {
            vertex_array: q.vertex_array(),
            mode: DrawMode::TriangleFan,
            count: 4,
        }));
    }

    #[test]
    fn size_from_texture_and_anchor_presets() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        q.set_size_from_texture();
        assert_eq!(q.size(), Vec2::new(10.0, 10.0));

        let id = gpu.create_texture();
        q.set_texture(Some(Texture::new(id, 32, 48)));
        q.set_size_from_texture();
        assert_eq!(q.size(), Vec2::new(32.0, 48.0));
        assert!(q.matrices().is_dirty(MatrixKind::Size));

        q.set_anchor_to_bottom_center();
        assert_eq!(q.anchor(), Vec2::new(16.0, 48.0));
        q.set_anchor_to_center();
        assert_eq!(q.anchor(), Vec2::new(16.0, 24.0));
        q.set_anchor_to_top_left();
        assert_eq!(q.anchor(), Vec2::ZERO);
    }

    #[test]
    fn immediate_draw_binds_and_uploads_projection() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        let id = gpu.create_texture();
        q.set_texture(Some(Texture::new(id, 4, 4)));
        let mut ctx = RenderContext::new("test");
        ctx.set_ortho_2d_projection(100, 100, 1.0, false);
        gpu.clear_calls();

        q.draw(&mut gpu, &ctx).unwrap();
        assert_eq!(gpu.texture_binds(), vec![id]);
        assert_eq!(gpu.program_binds(), vec![shader.id()]);
        assert_eq!(
            gpu.last_uniform(shader.id(), "mProjection"),
            Some(&UniformValue::Mat4(ctx.projection()))
        );
        assert_eq!(gpu.draws(), vec![q.vertex_array()]);
    }

    #[test]
    fn renders_through_context() {
        let (mut gpu, shader) = setup();
        let q: DrawableRef = Rc::new(RefCell::new(quad(&mut gpu, &shader)));
        let mut ctx = RenderContext::new("test");
        ctx.enqueue_for_drawing(q.clone());
        ctx.render_drawable_list(&mut gpu).unwrap();
        assert_eq!(gpu.draws().len(), 1);
    }

    #[test]
    fn release_deletes_vertex_array() {
        let (mut gpu, shader) = setup();
        let q = quad(&mut gpu, &shader);
        let vao = q.vertex_array();
        q.release(&mut gpu);
        assert_eq!(gpu.calls().last(), Some(&GpuCall::DeleteVertexArray(vao)));
        assert!(!shader.is_released());
    }

    #[test]
    fn released_program_fails_draw() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        shader.release(&mut gpu).unwrap();
        assert!(matches!(q.draw_in_batch(&mut gpu), Err(Error::ProgramReleased(_))));
    }

    #[test]
    fn successful_upload_claims_program() {
        let (mut gpu, shader) = setup();
        let mut a = quad(&mut gpu, &shader);
        let mut b = quad(&mut gpu, &shader);
        assert_eq!(shader.uniform_owner(), None);

        a.draw_in_batch(&mut gpu).unwrap();
        assert_eq!(shader.uniform_owner(), Some(a.user));
        b.draw_in_batch(&mut gpu).unwrap();
        assert_eq!(shader.uniform_owner(), Some(b.user));
    }

    #[test]
    fn failed_upload_leaves_program_unclaimed() {
        let (mut gpu, shader) = setup();
        let mut q = quad(&mut gpu, &shader);
        shader.release(&mut gpu).unwrap();

        assert!(q.draw_in_batch(&mut gpu).is_err());
        assert_eq!(shader.uniform_owner(), None);
        assert!(!shader.holds_uniforms(q.user));
    }

    #[test]
    fn primitives_get_distinct_ids_per_program() {
        let (mut gpu, shader) = setup();
        let a = quad(&mut gpu, &shader);
        let b = quad(&mut gpu, &shader);
        assert_ne!(a.user, b.user);
    }
}
