//! Demo application: a batched 2D scene with a particle emitter under the
//! mouse, and a statistics overlay. WASD moves, Q/E rotates, the wheel zooms,
//! Escape quits.
//!
//! Set `KILN_PROFILE_DIR` to a directory to write Chrome traces of startup,
//! the running frames and shutdown.

mod particles;
mod sandbox2d;
mod stats;

use anyhow::Result;
use kiln_engine::device::GpuInit;
use kiln_engine::logging::{init_logging, LoggingConfig};
use kiln_engine::render::Renderer2DConfig;
use kiln_engine::window::{Runtime, RuntimeConfig};

use sandbox2d::Sandbox2D;
use stats::StatsOverlay;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut config = RuntimeConfig::new("Kiln Sandbox");
    if let Some(dir) = std::env::var_os("KILN_PROFILE_DIR") {
        config = config.with_profiling(dir);
    }

    Runtime::run(
        config,
        GpuInit::default(),
        Renderer2DConfig::default(),
        |app| {
            let checkerboard = sandbox2d::checkerboard_texture(app.renderer_mut())?;
            app.push_layer(Sandbox2D::new(checkerboard));
            app.push_overlay(StatsOverlay::new());
            Ok(())
        },
    )
}
