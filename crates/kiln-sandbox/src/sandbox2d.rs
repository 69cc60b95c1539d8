use anyhow::Result;
use glam::{Vec2, Vec3};
use kiln_engine::core::{FrameCtx, WindowInfo};
use kiln_engine::event::Event;
use kiln_engine::input::MouseButton;
use kiln_engine::layer::Layer;
use kiln_engine::paint::Color;
use kiln_engine::render::{CameraBounds, OrthographicCameraController, QuadTexture, Renderer2D, Texture2D};
use rand::rngs::ThreadRng;

use crate::particles::{ParticleProps, ParticleSystem};

const CHECKER_SIZE: u32 = 8;
const MAX_PARTICLES: usize = 1000;
const PARTICLES_PER_FRAME: usize = 5;

/// Builds a two-tone checkerboard, one texel per cell.
pub fn checkerboard_texture(renderer: &mut Renderer2D) -> Result<Texture2D> {
    let mut pixels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * Texture2D::BYTES_PER_PIXEL) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let v = if (x + y) % 2 == 0 { 0xcc } else { 0x55 };
            pixels.extend_from_slice(&[v, v, v, 0xff]);
        }
    }
    renderer.create_texture_with_data(CHECKER_SIZE, CHECKER_SIZE, &pixels)
}

/// Maps a window-space pointer position to world space through the camera
/// bounds, with the camera position as the world-space centre.
fn pointer_to_world(pointer: (f32, f32), window: WindowInfo, bounds: CameraBounds, center: Vec2) -> Vec2 {
    let (px, py) = pointer;
    let x = (px / window.width as f32) * bounds.width() - bounds.width() * 0.5;
    let y = bounds.height() * 0.5 - (py / window.height as f32) * bounds.height();
    Vec2::new(x, y) + center
}

pub struct Sandbox2D {
    camera: OrthographicCameraController,
    checkerboard: Texture2D,
    square_color: Color,
    rect_color: Color,
    rotation: f32,
    particle: ParticleProps,
    particles: ParticleSystem<ThreadRng>,
}

impl Sandbox2D {
    pub fn new(checkerboard: Texture2D) -> Self {
        Self {
            camera: OrthographicCameraController::new(1280.0 / 720.0, true),
            checkerboard,
            square_color: Color::new(0.8, 0.2, 0.3, 1.0),
            rect_color: Color::new(0.2, 0.3, 0.8, 1.0),
            rotation: 0.0,
            particle: ParticleProps::default(),
            particles: ParticleSystem::new(MAX_PARTICLES, rand::rng()),
        }
    }

    fn emit_particles(&mut self, ctx: &FrameCtx<'_>) {
        let Some(pointer) = ctx.input.pointer_position() else {
            return;
        };
        if ctx.window.is_empty() {
            return;
        }

        let center = self.camera.camera().position().truncate();
        self.particle.position = pointer_to_world(pointer, ctx.window, self.camera.bounds(), center);
        for _ in 0..PARTICLES_PER_FRAME {
            self.particles.emit(&self.particle);
        }
    }
}

impl Layer for Sandbox2D {
    fn name(&self) -> &str {
        "Sandbox2D"
    }

    fn on_attach(&mut self) {
        self.camera.set_zoom_level(5.0);
    }

    fn on_update(&mut self, ctx: &mut FrameCtx<'_>) {
        kiln_engine::profile_scope!("Sandbox2D::on_update");

        let dt = ctx.timestep.seconds();
        self.camera.on_update(ctx.timestep, ctx.input);

        let renderer = &mut *ctx.renderer;
        renderer.reset_stats();
        {
            kiln_engine::profile_scope!("Sandbox2D::clear");
            renderer.set_clear_color(Color::new(0.1, 0.1, 0.1, 1.0));
            renderer.clear();
        }

        self.rotation += dt * 40.0;

        renderer.begin_scene(self.camera.camera());
        renderer.draw_rotated_quad(Vec2::new(1.0, 0.0), Vec2::splat(0.8), (-self.rotation).to_radians(), self.square_color);
        renderer.draw_quad(Vec2::new(-1.0, 0.0), Vec2::splat(0.8), self.square_color);
        renderer.draw_quad(Vec2::new(0.5, -0.5), Vec2::new(0.5, 0.75), self.rect_color);
        renderer.draw_textured_quad(
            Vec3::new(0.0, 0.0, -0.1),
            Vec2::splat(20.0),
            &self.checkerboard,
            QuadTexture::tiled(10.0),
        );
        renderer.draw_rotated_textured_quad(
            Vec3::new(-2.0, 0.0, 0.0),
            Vec2::ONE,
            self.rotation.to_radians(),
            &self.checkerboard,
            QuadTexture::tiled(20.0).tinted(Color::new(0.9, 1.0, 0.9, 1.0)),
        );
        renderer.end_scene();

        renderer.begin_scene(self.camera.camera());
        for yi in 0..20 {
            for xi in 0..20 {
                let x = -5.0 + xi as f32 * 0.5;
                let y = -5.0 + yi as f32 * 0.5;
                let color = Color::new((x + 5.0) / 10.0, 0.4, (y + 5.0) / 10.0, 0.7);
                renderer.draw_quad(Vec2::new(x, y), Vec2::splat(0.45), color);
            }
        }
        renderer.end_scene();

        if ctx.input.button_down(MouseButton::Left) {
            self.emit_particles(ctx);
        }

        self.particles.on_update(dt);
        self.particles.on_render(ctx.renderer, self.camera.camera());
    }

    fn on_event(&mut self, event: &mut Event) {
        self.camera.on_event(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> CameraBounds {
        CameraBounds { left: -2.0, right: 2.0, bottom: -1.0, top: 1.0 }
    }

    #[test]
    fn window_centre_maps_to_camera_position() {
        let window = WindowInfo { width: 800, height: 400 };
        let p = pointer_to_world((400.0, 200.0), window, bounds(), Vec2::new(3.0, -1.0));
        assert!((p - Vec2::new(3.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn top_left_corner_maps_to_upper_left_bound() {
        let window = WindowInfo { width: 800, height: 400 };
        let p = pointer_to_world((0.0, 0.0), window, bounds(), Vec2::ZERO);
        assert!((p - Vec2::new(-2.0, 1.0)).length() < 1e-5);
    }
}
