use std::collections::VecDeque;

use crate::event::{Event, EventDispatcher, EventKind, WindowClose, WindowResize};
use crate::input::InputState;
use crate::layer::{Layer, LayerId, LayerStack};
use crate::render::Renderer2D;
use crate::time::{FrameClock, Timestep};

use super::ctx::{FrameCtx, WindowInfo};

/// Lifecycle of an [`Application`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppState {
    Running,
    Stopped,
}

/// Owns the layer stack and the renderer and drives them one frame at a time.
///
/// Events are queued by the window runtime and delivered during
/// [`run_frame`](Self::run_frame), after the layers have updated. Window close
/// and resize are seen by the application before any layer.
pub struct Application {
    layers: LayerStack,
    renderer: Renderer2D,
    input: InputState,
    clock: FrameClock,

    state: AppState,
    close_requested: bool,
    minimized: bool,
    window: WindowInfo,

    pending: VecDeque<Event>,
}

impl Application {
    pub fn new(mut renderer: Renderer2D, width: u32, height: u32) -> Self {
        if width > 0 && height > 0 {
            renderer.on_window_resize(width, height);
        }

        Self {
            layers: LayerStack::new(),
            renderer,
            input: InputState::new(),
            clock: FrameClock::new(),
            state: AppState::Running,
            close_requested: false,
            minimized: width == 0 || height == 0,
            window: WindowInfo { width, height },
            pending: VecDeque::new(),
        }
    }

    // ── layers ────────────────────────────────────────────────────────────

    pub fn push_layer(&mut self, layer: impl Layer + 'static) -> LayerId {
        self.layers.push_layer(Box::new(layer))
    }

    pub fn push_overlay(&mut self, overlay: impl Layer + 'static) -> LayerId {
        self.layers.push_overlay(Box::new(overlay))
    }

    pub fn pop_layer(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        self.layers.pop_layer(id)
    }

    pub fn pop_overlay(&mut self, id: LayerId) -> Option<Box<dyn Layer>> {
        self.layers.pop_overlay(id)
    }

    #[inline]
    pub fn layers(&self) -> &LayerStack {
        &self.layers
    }

    // ── state ─────────────────────────────────────────────────────────────

    /// Stops the application after the frame in progress, if any.
    pub fn close(&mut self) {
        if !self.close_requested {
            log::info!("application close requested");
        }
        self.close_requested = true;
    }

    #[inline]
    pub fn state(&self) -> AppState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == AppState::Running
    }

    #[inline]
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    #[inline]
    pub fn window(&self) -> WindowInfo {
        self.window
    }

    #[inline]
    pub fn renderer(&self) -> &Renderer2D {
        &self.renderer
    }

    #[inline]
    pub fn renderer_mut(&mut self) -> &mut Renderer2D {
        &mut self.renderer
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Drops held keys and buttons, e.g. when the window loses focus.
    pub fn release_input(&mut self) {
        self.input.release_all();
    }

    /// Forgets the pointer position, e.g. when the cursor leaves the window.
    pub fn pointer_left(&mut self) {
        self.input.pointer_left();
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Queues an event for delivery during the next frame.
    pub fn queue_event(&mut self, event: impl Into<EventKind>) {
        self.pending.push_back(Event::new(event));
    }

    #[inline]
    pub fn pending_events(&self) -> usize {
        self.pending.len()
    }

    /// Delivers every queued event in arrival order.
    pub fn dispatch_pending(&mut self) {
        crate::profile_scope!("Application::dispatch_pending");

        while let Some(mut event) = self.pending.pop_front() {
            self.on_event(&mut event);
        }
        if self.close_requested {
            self.stop();
        }
    }

    /// Delivers one event: input state first, then the application's own
    /// window handlers, then the layer stack back to front.
    pub fn on_event(&mut self, event: &mut Event) {
        self.input.apply_event(event);
        log::trace!("{event}");

        let mut dispatcher = EventDispatcher::new(event);
        dispatcher.dispatch::<WindowClose>(|_| self.on_window_close());
        dispatcher.dispatch::<WindowResize>(|e| self.on_window_resize(e));

        self.layers.dispatch_event(event);
    }

    fn on_window_close(&mut self) -> bool {
        self.close();
        true
    }

    fn on_window_resize(&mut self, e: &WindowResize) -> bool {
        self.window = WindowInfo { width: e.width, height: e.height };

        if e.width == 0 || e.height == 0 {
            if !self.minimized {
                log::info!("window minimized, updates paused");
            }
            self.minimized = true;
            return false;
        }

        if self.minimized {
            log::info!("window restored to {}x{}", e.width, e.height);
        }
        self.minimized = false;
        self.renderer.on_window_resize(e.width, e.height);
        false
    }

    // ── frame ─────────────────────────────────────────────────────────────

    /// Runs one frame timed by the internal clock.
    pub fn run_frame(&mut self) {
        let timestep = self.clock.tick();
        self.run_frame_with(timestep);
    }

    /// Runs one frame with an explicit timestep: update (unless minimized),
    /// UI pass, then pending events.
    pub fn run_frame_with(&mut self, timestep: Timestep) {
        if !self.is_running() {
            return;
        }
        crate::profile_scope!("Application::run_frame");

        let mut ctx = FrameCtx::new(timestep, &mut self.renderer, &self.input, self.window);

        if !self.minimized {
            crate::profile_scope!("LayerStack::on_update");
            for layer in self.layers.iter_mut() {
                layer.on_update(&mut ctx);
            }
        }

        {
            crate::profile_scope!("LayerStack::on_ui_render");
            for layer in self.layers.iter_mut() {
                layer.on_ui_render(&mut ctx);
            }
        }

        if ctx.close_requested() {
            self.close();
        }

        self.dispatch_pending();
    }

    /// Resets the frame clock so time spent suspended is not reported.
    pub fn reset_clock(&mut self) {
        self.clock.reset();
    }

    fn stop(&mut self) {
        if self.state == AppState::Running {
            log::info!("application stopped");
        }
        self.state = AppState::Stopped;
    }
}
