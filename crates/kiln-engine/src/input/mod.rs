//! Input subsystem.
//!
//! Key and button identifiers are platform-agnostic; the window runtime maps
//! winit codes onto them. [`InputState`] answers "is this held right now".

mod state;
mod types;

pub use state::InputState;
pub use types::{Key, MouseButton};
