use crate::paint::Color;
use crate::time::FpsCounter;

/// What happens when an engine operation fails.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum FailurePolicy {
    /// Log the error chain and abort the process.
    #[default]
    Abort,
    /// Hand the error back to the caller.
    Propagate,
}

impl FailurePolicy {
    /// Applies the policy to `result`. Never returns `Err` under
    /// [`Abort`](Self::Abort).
    pub fn settle<T>(self, result: anyhow::Result<T>) -> anyhow::Result<T> {
        match (self, result) {
            (FailurePolicy::Abort, Err(err)) => {
                log::error!("fatal engine error: {err:#}");
                std::process::abort()
            }
            (_, result) => result,
        }
    }
}

/// Engine settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Framebuffer size in pixels.
    pub width: u32,
    pub height: u32,
    /// Put the world origin at the window center instead of the top-left.
    pub centered: bool,
    /// World units per pixel divisor for the world context.
    pub screen_scale: f32,
    pub clear_color: Color,
    /// Seconds between FPS readings.
    pub fps_interval: f32,
    pub failure_policy: FailurePolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            centered: false,
            screen_scale: 1.0,
            clear_color: Color::BLACK,
            fps_interval: FpsCounter::DEFAULT_INTERVAL,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl EngineConfig {
    /// Config that returns errors instead of aborting. Used by tests and tools.
    pub fn propagating() -> Self {
        Self { failure_policy: FailurePolicy::Propagate, ..Self::default() }
    }
}
