use kiln_engine::core::FrameCtx;
use kiln_engine::event::{Event, EventDispatcher, KeyPressed};
use kiln_engine::input::Key;
use kiln_engine::layer::Layer;

/// Overlay that reports renderer statistics once per second and closes the
/// application on Escape.
#[derive(Default)]
pub struct StatsOverlay {
    elapsed: f32,
    frames: u32,
    quit: bool,
}

impl StatsOverlay {
    const REPORT_INTERVAL: f32 = 1.0;

    pub fn new() -> Self {
        Self::default()
    }
}

impl Layer for StatsOverlay {
    fn name(&self) -> &str {
        "StatsOverlay"
    }

    fn on_ui_render(&mut self, ctx: &mut FrameCtx<'_>) {
        if self.quit {
            ctx.request_close();
            return;
        }

        self.elapsed += ctx.timestep.seconds();
        self.frames += 1;
        if self.elapsed < Self::REPORT_INTERVAL {
            return;
        }

        let stats = ctx.renderer.stats();
        log::info!(
            "{:.1} fps | draw calls: {} | quads: {} | vertices: {} | indices: {}",
            self.frames as f32 / self.elapsed,
            stats.draw_calls,
            stats.quad_count,
            stats.total_vertex_count(),
            stats.total_index_count(),
        );
        self.elapsed = 0.0;
        self.frames = 0;
    }

    fn on_event(&mut self, event: &mut Event) {
        EventDispatcher::new(event).dispatch::<KeyPressed>(|e| {
            if e.key != Key::Escape {
                return false;
            }
            self.quit = true;
            true
        });
    }
}
