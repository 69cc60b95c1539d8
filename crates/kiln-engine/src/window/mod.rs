//! Window runtime.
//!
//! Owns the winit event loop and the single application window, translates
//! window events into engine [`Event`](crate::event::Event)s and drives one
//! [`Application`](crate::core::Application) frame per redraw.

mod config;
mod runtime;
mod translate;

pub use config::RuntimeConfig;
pub use runtime::Runtime;
pub use winit::dpi::LogicalSize;
