use crate::input::InputState;
use crate::render::Renderer2D;
use crate::time::Timestep;

/// Drawable size of the application window, in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct WindowInfo {
    pub width: u32,
    pub height: u32,
}

impl WindowInfo {
    /// Width over height; `1.0` while either side is zero.
    pub fn aspect_ratio(&self) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 1.0;
        }
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Per-frame context lent to [`Layer::on_update`](crate::layer::Layer::on_update)
/// and [`Layer::on_ui_render`](crate::layer::Layer::on_ui_render).
///
/// The renderer is borrowed exclusively for the duration of each callback.
pub struct FrameCtx<'a> {
    pub timestep: Timestep,
    pub renderer: &'a mut Renderer2D,
    pub input: &'a InputState,
    pub window: WindowInfo,
    close_requested: bool,
}

impl<'a> FrameCtx<'a> {
    pub fn new(
        timestep: Timestep,
        renderer: &'a mut Renderer2D,
        input: &'a InputState,
        window: WindowInfo,
    ) -> Self {
        Self {
            timestep,
            renderer,
            input,
            window,
            close_requested: false,
        }
    }

    /// Stops the application once the current frame completes.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    #[inline]
    pub fn close_requested(&self) -> bool {
        self.close_requested
    }
}
