use glam::{Mat4, Vec3};

/// 2D camera with an orthographic projection.
///
/// `rotation` is in degrees around +Z. The view matrix is the inverse of the
/// camera's own transform; view-projection is recomputed on every setter.
#[derive(Debug, Clone, PartialEq)]
pub struct OrthographicCamera {
    projection: Mat4,
    view: Mat4,
    view_projection: Mat4,

    position: Vec3,
    rotation: f32,
}

impl OrthographicCamera {
    pub fn new(left: f32, right: f32, bottom: f32, top: f32) -> Self {
        let projection = Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0);
        Self {
            projection,
            view: Mat4::IDENTITY,
            view_projection: projection,
            position: Vec3::ZERO,
            rotation: 0.0,
        }
    }

    pub fn set_projection(&mut self, left: f32, right: f32, bottom: f32, top: f32) {
        self.projection = Mat4::orthographic_rh(left, right, bottom, top, -1.0, 1.0);
        self.view_projection = self.projection * self.view;
    }

    #[inline]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.recalculate_view();
    }

    /// Degrees.
    #[inline]
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
        self.recalculate_view();
    }

    #[inline]
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    #[inline]
    pub fn view(&self) -> Mat4 {
        self.view
    }

    #[inline]
    pub fn view_projection(&self) -> Mat4 {
        self.view_projection
    }

    fn recalculate_view(&mut self) {
        let transform = Mat4::from_translation(self.position)
            * Mat4::from_rotation_z(self.rotation.to_radians());

        self.view = transform.inverse();
        self.view_projection = self.projection * self.view;
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec3, Vec4};

    use super::*;

    fn approx(a: Vec4, b: Vec4) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn bounds_map_to_clip_edges() {
        let cam = OrthographicCamera::new(-2.0, 2.0, -1.0, 1.0);
        let vp = cam.view_projection();
        assert!(approx(vp * Vec4::new(2.0, 1.0, 0.0, 1.0), Vec4::new(1.0, 1.0, 0.5, 1.0)));
        assert!(approx(vp * Vec4::new(-2.0, -1.0, 0.0, 1.0), Vec4::new(-1.0, -1.0, 0.5, 1.0)));
    }

    #[test]
    fn moving_the_camera_moves_the_world_the_other_way() {
        let mut cam = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        cam.set_position(Vec3::new(0.5, 0.0, 0.0));
        let p = cam.view_projection() * Vec4::new(0.5, 0.0, 0.0, 1.0);
        assert!(approx(p, Vec4::new(0.0, 0.0, 0.5, 1.0)));
    }

    #[test]
    fn rotation_is_in_degrees() {
        let mut cam = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        cam.set_rotation(90.0);
        // World +Y lands on screen +X when the camera turns left.
        let p = cam.view() * Vec4::new(0.0, 1.0, 0.0, 1.0);
        assert!(approx(p, Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn set_projection_keeps_view() {
        let mut cam = OrthographicCamera::new(-1.0, 1.0, -1.0, 1.0);
        cam.set_position(Vec3::new(1.0, 2.0, 0.0));
        let view = cam.view();
        cam.set_projection(-4.0, 4.0, -2.0, 2.0);
        assert_eq!(cam.view(), view);
        assert_eq!(cam.view_projection(), cam.projection() * view);
    }
}
