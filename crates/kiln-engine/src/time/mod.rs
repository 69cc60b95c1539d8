//! Frame timing.
//!
//! The runtime owns one [`FrameClock`] and hands each frame's [`Timestep`] to
//! the layers.

mod frame_clock;

pub use frame_clock::{FrameClock, Timestep};
