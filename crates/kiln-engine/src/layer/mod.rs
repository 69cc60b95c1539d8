//! Layers and the ordered stack that owns them.
//!
//! Regular layers sit in front of overlays. Updates walk front to back, events
//! walk back to front so overlays get first refusal.

mod stack;

#[cfg(test)]
pub(crate) mod journal;

pub use stack::{LayerId, LayerStack};

use crate::core::FrameCtx;
use crate::event::Event;

/// A unit of per-frame behaviour plugged into the application.
///
/// Every hook has an empty default.
pub trait Layer {
    /// Debug name, used in logs.
    fn name(&self) -> &str {
        "Layer"
    }

    /// Called once, right after the layer enters the stack.
    fn on_attach(&mut self) {}

    /// Called once, right before the layer leaves the stack.
    fn on_detach(&mut self) {}

    /// Called every frame while the window is not minimized.
    fn on_update(&mut self, ctx: &mut FrameCtx<'_>) {
        let _ = ctx;
    }

    /// Offered events back to front until one marks it handled.
    fn on_event(&mut self, event: &mut Event) {
        let _ = event;
    }

    /// Called every frame after all updates, even while minimized.
    fn on_ui_render(&mut self, ctx: &mut FrameCtx<'_>) {
        let _ = ctx;
    }
}
