use std::f32::consts::TAU;

use glam::Vec2;
use kiln_engine::paint::Color;
use kiln_engine::render::{OrthographicCamera, Renderer2D};
use rand::Rng;

/// Emission parameters shared by every particle of one burst.
#[derive(Debug, Copy, Clone)]
pub struct ParticleProps {
    pub position: Vec2,
    pub velocity: Vec2,
    pub velocity_variation: Vec2,
    pub color_begin: Color,
    pub color_end: Color,
    pub size_begin: f32,
    pub size_end: f32,
    pub size_variation: f32,
    /// Seconds.
    pub lifetime: f32,
}

impl Default for ParticleProps {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            velocity_variation: Vec2::new(3.0, 1.0),
            color_begin: Color::from_srgb_u8(254, 212, 123, 255),
            color_end: Color::from_srgb_u8(254, 109, 41, 255),
            size_begin: 0.5,
            size_end: 0.0,
            size_variation: 0.3,
            lifetime: 1.0,
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct Particle {
    position: Vec2,
    velocity: Vec2,
    color_begin: Color,
    color_end: Color,
    rotation: f32,
    size_begin: f32,
    size_end: f32,
    lifetime: f32,
    life_remaining: f32,
    active: bool,
}

impl Particle {
    /// `1.0` when freshly emitted, `0.0` at end of life.
    fn life_fraction(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (self.life_remaining / self.lifetime).clamp(0.0, 1.0)
    }
}

/// Fixed-size ring of particles. Emitting past capacity recycles the oldest
/// slot.
pub struct ParticleSystem<R> {
    pool: Vec<Particle>,
    next: usize,
    rng: R,
}

impl<R: Rng> ParticleSystem<R> {
    pub fn new(max_particles: usize, rng: R) -> Self {
        Self {
            pool: vec![Particle::default(); max_particles.max(1)],
            next: 0,
            rng,
        }
    }

    pub fn emit(&mut self, props: &ParticleProps) {
        let rotation = self.rng.random::<f32>() * TAU;
        let jitter = Vec2::new(self.rng.random::<f32>() - 0.5, self.rng.random::<f32>() - 0.5);
        let size_jitter = self.rng.random::<f32>() - 0.6;

        self.pool[self.next] = Particle {
            position: props.position,
            velocity: props.velocity + props.velocity_variation * jitter,
            color_begin: props.color_begin,
            color_end: props.color_end,
            rotation,
            size_begin: props.size_begin + props.size_variation * size_jitter,
            size_end: props.size_end,
            lifetime: props.lifetime,
            life_remaining: props.lifetime,
            active: true,
        };

        self.next = (self.next + 1) % self.pool.len();
    }

    pub fn on_update(&mut self, dt: f32) {
        for p in self.pool.iter_mut().filter(|p| p.active) {
            if p.life_remaining <= 0.0 {
                p.active = false;
                continue;
            }

            p.life_remaining -= dt;
            p.position += p.velocity * dt;
            p.rotation += 0.01 * dt;
        }
    }

    /// Draws live particles in their own scene, above the rest of the frame.
    pub fn on_render(&self, renderer: &mut Renderer2D, camera: &OrthographicCamera) {
        renderer.begin_scene(camera);
        for p in self.pool.iter().filter(|p| p.active) {
            let life = p.life_fraction();
            let color = p.color_end.lerp(p.color_begin, life);
            let size = p.size_end + (p.size_begin - p.size_end) * life;
            renderer.draw_rotated_quad(p.position.extend(0.2), Vec2::splat(size), p.rotation, color);
        }
        renderer.end_scene();
    }

    pub fn active_count(&self) -> usize {
        self.pool.iter().filter(|p| p.active).count()
    }

    pub fn capacity(&self) -> usize {
        self.pool.len()
    }
}
