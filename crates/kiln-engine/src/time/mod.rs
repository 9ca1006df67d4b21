//! Frame timing.
//!
//! [`FrameClock`] turns wall-clock time into clamped per-frame deltas;
//! [`FpsCounter`] aggregates those deltas into a frames-per-second reading.

mod fps;
mod frame_clock;

pub use fps::FpsCounter;
pub use frame_clock::{FrameClock, FrameTime};
