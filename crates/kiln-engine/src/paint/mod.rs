//! Color values passed to the 2D renderer.

pub mod color;

pub use color::Color;
