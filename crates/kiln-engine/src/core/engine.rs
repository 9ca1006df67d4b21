use std::rc::Rc;

use anyhow::Context as _;

use crate::device::GraphicsBackend;
use crate::paint::Color;
use crate::render::{DrawableRef, RenderContext};
use crate::shader::{ShaderLibrary, ShaderProgram};
use crate::time::{FpsCounter, FrameClock, FrameTime};

use super::config::EngineConfig;

/// One rendering session.
///
/// Frame lifecycle:
/// 1. [`init`](Self::init) once, with the GL context current
/// 2. per frame: [`begin_frame`](Self::begin_frame), enqueue drawables into
///    [`world_mut`](Self::world_mut) / [`ui_mut`](Self::ui_mut), then
///    [`end_frame`](Self::end_frame)
/// 3. [`shutdown`](Self::shutdown)
///
/// The world context renders first, the UI context on top of it.
pub struct Engine {
    config: EngineConfig,
    world: RenderContext,
    ui: RenderContext,
    shaders: ShaderLibrary,
    clock: FrameClock,
    fps: FpsCounter,
    initialized: bool,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let mut engine = Self {
            world: RenderContext::new("world"),
            ui: RenderContext::new("ui"),
            shaders: ShaderLibrary::new(),
            clock: FrameClock::new(),
            fps: FpsCounter::new(config.fps_interval),
            initialized: false,
            config,
        };
        engine.update_projections();
        engine
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Sets the depth/blend state 2D rendering relies on.
    pub fn init(&mut self, gpu: &mut dyn GraphicsBackend) {
        gpu.configure_2d_state();
        self.clock.reset();
        self.initialized = true;
        log::info!(
            "engine initialized: {}x{}, scale {}, centered {}",
            self.config.width,
            self.config.height,
            self.config.screen_scale,
            self.config.centered
        );
    }

    /// Advances frame timing and clears the framebuffer.
    pub fn begin_frame(&mut self, gpu: &mut dyn GraphicsBackend) -> FrameTime {
        if !self.initialized {
            log::warn!("begin_frame before init; GPU state not configured");
        }
        let time = self.clock.tick();
        self.fps.update(time.dt);
        gpu.clear(self.config.clear_color);
        time
    }

    /// Renders and empties the world queue, then the UI queue.
    ///
    /// Both queues are emptied even when rendering fails.
    pub fn end_frame(&mut self, gpu: &mut dyn GraphicsBackend) -> anyhow::Result<()> {
        let result = render(&mut self.world, gpu).and_then(|()| render(&mut self.ui, gpu));
        self.world.erase_drawable_list();
        self.ui.erase_drawable_list();
        self.config.failure_policy.settle(result)
    }

    pub fn world(&self) -> &RenderContext {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut RenderContext {
        &mut self.world
    }

    pub fn ui(&self) -> &RenderContext {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut RenderContext {
        &mut self.ui
    }

    pub fn enqueue_world(&mut self, drawable: DrawableRef) {
        self.world.enqueue_for_drawing(drawable);
    }

    pub fn enqueue_ui(&mut self, drawable: DrawableRef) {
        self.ui.enqueue_for_drawing(drawable);
    }

    /// Default textured program, created on first use.
    pub fn textured_shader(
        &mut self,
        gpu: &mut dyn GraphicsBackend,
    ) -> anyhow::Result<Rc<ShaderProgram>> {
        let result = self
            .shaders
            .textured(gpu)
            .context("creating default textured shader");
        self.config.failure_policy.settle(result)
    }

    /// Default solid-color program, created on first use.
    pub fn solid_color_shader(
        &mut self,
        gpu: &mut dyn GraphicsBackend,
    ) -> anyhow::Result<Rc<ShaderProgram>> {
        let result = self
            .shaders
            .solid_color(gpu)
            .context("creating default solid-color shader");
        self.config.failure_policy.settle(result)
    }

    /// Reprojects both contexts for a new framebuffer size.
    pub fn resize(&mut self, width: u32, height: u32) {
        log::debug!("resize to {width}x{height}");
        self.config.width = width;
        self.config.height = height;
        self.update_projections();
    }

    pub fn set_screen_scale(&mut self, scale: f32) {
        self.config.screen_scale = scale;
        self.update_projections();
    }

    #[inline]
    pub fn clear_color(&self) -> Color {
        self.config.clear_color
    }

    pub fn set_clear_color(&mut self, color: Color) {
        self.config.clear_color = color;
    }

    /// Last FPS reading.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps.fps()
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.clock.frame_index()
    }

    /// Releases the default shaders.
    pub fn shutdown(mut self, gpu: &mut dyn GraphicsBackend) -> anyhow::Result<()> {
        log::info!("engine shutdown after {} frames", self.clock.frame_index());
        let result = self.shaders.release(gpu).context("releasing default shaders");
        self.config.failure_policy.settle(result)
    }

    fn update_projections(&mut self) {
        let EngineConfig { width, height, screen_scale, centered, .. } = self.config;
        self.world.set_ortho_2d_projection(width, height, screen_scale, centered);
        self.ui.set_ortho_2d_projection(width, height, 1.0, false);
    }
}

fn render(ctx: &mut RenderContext, gpu: &mut dyn GraphicsBackend) -> anyhow::Result<()> {
    let label = ctx.label();
    ctx.render_drawable_list(gpu)
        .with_context(|| format!("rendering {label} context"))
}
