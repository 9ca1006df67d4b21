/// Frames-per-second sampled over a fixed interval.
///
/// Frames are counted until the accumulated time reaches the interval; the
/// reading is then published and the count restarts. Between boundaries
/// [`fps`](Self::fps) keeps returning the last published value.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    interval: f32,
    elapsed: f32,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    pub const DEFAULT_INTERVAL: f32 = 1.0;

    /// `interval` is in seconds; non-positive values fall back to the default.
    pub fn new(interval: f32) -> Self {
        let interval = if interval > 0.0 && interval.is_finite() {
            interval
        } else {
            log::warn!("invalid fps interval {interval}, using {}", Self::DEFAULT_INTERVAL);
            Self::DEFAULT_INTERVAL
        };
        Self { interval, elapsed: 0.0, frames: 0, fps: 0.0 }
    }

    #[inline]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Last published reading. Zero until the first interval completes.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Counts one frame that took `dt` seconds. Returns the new reading when
    /// an interval boundary was crossed.
    pub fn update(&mut self, dt: f32) -> Option<f32> {
        self.frames += 1;
        self.elapsed += dt;
        if self.elapsed < self.interval {
            return None;
        }

        self.fps = self.frames as f32 / self.elapsed;
        self.frames = 0;
        self.elapsed = 0.0;
        log::trace!("fps: {:.1}", self.fps);
        Some(self.fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_INTERVAL)
    }
}
