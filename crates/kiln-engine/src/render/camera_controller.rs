use glam::Vec3;

use crate::event::{Event, EventDispatcher, MouseScrolled, WindowResize};
use crate::input::{InputState, Key};
use crate::time::Timestep;

use super::camera::OrthographicCamera;

/// Visible world rectangle of an [`OrthographicCameraController`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CameraBounds {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
}

impl CameraBounds {
    fn from_zoom(aspect_ratio: f32, zoom: f32) -> Self {
        Self {
            left: -aspect_ratio * zoom,
            right: aspect_ratio * zoom,
            bottom: -zoom,
            top: zoom,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.top - self.bottom
    }
}

/// Drives an [`OrthographicCamera`] from keyboard, wheel and resize input.
///
/// `W`/`A`/`S`/`D` pan relative to the current rotation, `Q`/`E` rotate when
/// rotation is enabled, the wheel zooms. Pan speed follows the zoom level so
/// the on-screen speed stays constant.
#[derive(Debug, Clone)]
pub struct OrthographicCameraController {
    aspect_ratio: f32,
    zoom_level: f32,
    bounds: CameraBounds,
    camera: OrthographicCamera,

    rotation_enabled: bool,
    position: Vec3,
    rotation: f32,
    translation_speed: f32,
    rotation_speed: f32,
}

impl OrthographicCameraController {
    pub const MIN_ZOOM: f32 = 0.25;

    pub fn new(aspect_ratio: f32, rotation_enabled: bool) -> Self {
        let zoom_level = 1.0;
        let bounds = CameraBounds::from_zoom(aspect_ratio, zoom_level);
        Self {
            aspect_ratio,
            zoom_level,
            bounds,
            camera: OrthographicCamera::new(bounds.left, bounds.right, bounds.bottom, bounds.top),
            rotation_enabled,
            position: Vec3::ZERO,
            rotation: 0.0,
            translation_speed: 2.0,
            rotation_speed: 90.0,
        }
    }

    pub fn on_update(&mut self, ts: Timestep, input: &InputState) {
        crate::profile_scope!("OrthographicCameraController::on_update");

        let step = self.translation_speed * ts.seconds();
        let (sin, cos) = self.rotation.to_radians().sin_cos();

        if input.key_down(Key::W) {
            self.position.x += -sin * step;
            self.position.y += cos * step;
        }
        if input.key_down(Key::A) {
            self.position.x -= cos * step;
            self.position.y -= sin * step;
        }
        if input.key_down(Key::D) {
            self.position.x += cos * step;
            self.position.y += sin * step;
        }
        if input.key_down(Key::S) {
            self.position.x -= -sin * step;
            self.position.y -= cos * step;
        }
        self.camera.set_position(self.position);

        if self.rotation_enabled {
            if input.key_down(Key::Q) {
                self.rotation += self.rotation_speed * ts.seconds();
            } else if input.key_down(Key::E) {
                self.rotation -= self.rotation_speed * ts.seconds();
            }

            if self.rotation > 180.0 {
                self.rotation -= 360.0;
            } else if self.rotation <= -180.0 {
                self.rotation += 360.0;
            }

            self.camera.set_rotation(self.rotation);
        }

        self.translation_speed = self.zoom_level;
    }

    /// Reacts to wheel and resize. Never marks the event handled.
    pub fn on_event(&mut self, event: &mut Event) {
        crate::profile_scope!("OrthographicCameraController::on_event");

        let mut dispatcher = EventDispatcher::new(event);
        dispatcher.dispatch::<MouseScrolled>(|e| self.on_mouse_scrolled(e));
        dispatcher.dispatch::<WindowResize>(|e| self.on_window_resized(e));
    }

    /// Adopts a new viewport size. A zero height (minimized) is ignored.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        if height <= 0.0 {
            return;
        }
        self.aspect_ratio = width / height;
        self.recalculate_projection();
    }

    fn on_mouse_scrolled(&mut self, e: &MouseScrolled) -> bool {
        self.zoom_level = (self.zoom_level - e.y_offset / 3.0).max(Self::MIN_ZOOM);
        self.recalculate_projection();
        false
    }

    fn on_window_resized(&mut self, e: &WindowResize) -> bool {
        self.on_resize(e.width as f32, e.height as f32);
        false
    }

    fn recalculate_projection(&mut self) {
        self.bounds = CameraBounds::from_zoom(self.aspect_ratio, self.zoom_level);
        let b = self.bounds;
        self.camera.set_projection(b.left, b.right, b.bottom, b.top);
    }

    #[inline]
    pub fn camera(&self) -> &OrthographicCamera {
        &self.camera
    }

    #[inline]
    pub fn bounds(&self) -> CameraBounds {
        self.bounds
    }

    #[inline]
    pub fn zoom_level(&self) -> f32 {
        self.zoom_level
    }

    pub fn set_zoom_level(&mut self, level: f32) {
        self.zoom_level = level;
        self.recalculate_projection();
    }

    #[inline]
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::KeyPressed;

    fn held(keys: &[Key]) -> InputState {
        let mut input = InputState::new();
        for &key in keys {
            input.apply_event(&Event::new(KeyPressed { key, repeat_count: 0 }));
        }
        input
    }

    // ── projection ────────────────────────────────────────────────────────

    #[test]
    fn bounds_follow_aspect_and_zoom() {
        let mut c = OrthographicCameraController::new(2.0, false);
        assert_eq!(c.bounds(), CameraBounds { left: -2.0, right: 2.0, bottom: -1.0, top: 1.0 });

        c.set_zoom_level(3.0);
        assert_eq!(c.bounds().width(), 12.0);
        assert_eq!(c.bounds().height(), 6.0);
    }

    #[test]
    fn scrolling_zooms_and_clamps() {
        let mut c = OrthographicCameraController::new(1.0, false);
        let mut ev = Event::new(MouseScrolled { x_offset: 0.0, y_offset: -3.0 });
        c.on_event(&mut ev);
        assert_eq!(c.zoom_level(), 2.0);
        assert!(!ev.handled);

        c.on_event(&mut Event::new(MouseScrolled { x_offset: 0.0, y_offset: 30.0 }));
        assert_eq!(c.zoom_level(), OrthographicCameraController::MIN_ZOOM);
    }

    #[test]
    fn resize_updates_aspect_but_ignores_zero_height() {
        let mut c = OrthographicCameraController::new(1.0, false);
        c.on_event(&mut Event::new(WindowResize { width: 1600, height: 800 }));
        assert_eq!(c.aspect_ratio(), 2.0);

        c.on_event(&mut Event::new(WindowResize { width: 1600, height: 0 }));
        assert_eq!(c.aspect_ratio(), 2.0);
    }

    // ── movement ──────────────────────────────────────────────────────────

    #[test]
    fn w_moves_up_at_translation_speed() {
        let mut c = OrthographicCameraController::new(1.0, false);
        c.on_update(Timestep::from_seconds(0.5), &held(&[Key::W]));
        let p = c.camera().position();
        assert!((p.y - 1.0).abs() < 1e-6);
        assert!(p.x.abs() < 1e-6);
    }

    #[test]
    fn translation_speed_tracks_zoom_from_next_frame() {
        let mut c = OrthographicCameraController::new(1.0, false);
        c.set_zoom_level(4.0);
        c.on_update(Timestep::from_seconds(1.0), &InputState::new());
        c.on_update(Timestep::from_seconds(1.0), &held(&[Key::D]));
        assert!((c.camera().position().x - 4.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_wraps_into_half_open_range() {
        let mut c = OrthographicCameraController::new(1.0, true);
        // 90°/s for 2.5 s overshoots 180 and wraps.
        c.on_update(Timestep::from_seconds(2.5), &held(&[Key::Q]));
        assert!((c.camera().rotation() - -135.0).abs() < 1e-4);
    }

    #[test]
    fn rotation_keys_ignored_when_disabled() {
        let mut c = OrthographicCameraController::new(1.0, false);
        c.on_update(Timestep::from_seconds(1.0), &held(&[Key::Q]));
        assert_eq!(c.camera().rotation(), 0.0);
    }
}
