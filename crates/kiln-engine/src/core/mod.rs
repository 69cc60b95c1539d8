//! Application core.
//!
//! [`Application`] owns the layer stack, the renderer and the pending event
//! queue; the window runtime feeds it events and asks it for frames.

mod application;
mod ctx;

pub use application::{AppState, Application};
pub use ctx::{FrameCtx, WindowInfo};
