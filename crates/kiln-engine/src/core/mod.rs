//! Engine session.
//!
//! [`Engine`] ties together what a running game needs every frame: a
//! world-space and a screen-space [`RenderContext`](crate::render::RenderContext),
//! frame timing, the shared default shaders and the clear color. Hosts own the
//! window and GL context and drive the engine through its frame lifecycle.

mod config;
mod engine;

pub use config::{EngineConfig, FailurePolicy};
pub use engine::Engine;
