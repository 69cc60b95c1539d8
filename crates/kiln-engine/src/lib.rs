//! Kiln engine crate.
//!
//! A layer-stack application framework with a batching 2D renderer on wgpu.
//! Binaries call [`logging::init_logging`], then [`window::Runtime::run`] with
//! a setup closure that pushes their layers.

pub mod core;
pub mod device;
pub mod event;
pub mod input;
pub mod layer;
pub mod logging;
pub mod paint;
pub mod profile;
pub mod render;
pub mod time;
pub mod window;
