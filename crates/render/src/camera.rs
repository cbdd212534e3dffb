use glam::{Mat4, Vec3};
use serde::Serialize;
use std::f32::consts::FRAC_PI_2;

/// Radians per key press or repeat for manual orbit nudges.
pub const ORBIT_NUDGE: f32 = 0.1;

/// Auto-orbit angular speed in radians per second.
pub const ORBIT_SPEED: f32 = 1.0;

/// Orbiting look-at camera with perspective projection parameters.
///
/// The eye position is derived from the orbit angles component-wise:
/// `x = r·cos(azimuth)`, `z = r·sin(azimuth)`, `y = r·cos(polar)`. Azimuth
/// changes only touch x/z and polar changes only touch y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrbitCamera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub azimuth: f32,
    pub polar: f32,
    pub radius: f32,
    pub orbiting: bool,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            eye: Self::HOME_EYE,
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            azimuth: FRAC_PI_2,
            polar: FRAC_PI_2,
            radius: 100.0,
            orbiting: false,
        }
    }
}

impl OrbitCamera {
    /// Eye position restored by [`OrbitCamera::reset`].
    pub const HOME_EYE: Vec3 = Vec3::new(0.0, 0.0, 100.0);

    /// Unit vector from the eye toward the look-at target.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.eye).normalize()
    }

    /// Distance from the eye to the look-at target.
    pub fn target_distance(&self) -> f32 {
        (self.target - self.eye).length()
    }

    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Integrate auto-orbit over `dt` seconds. No-op while orbiting is off.
    pub fn advance(&mut self, dt: f32) {
        if self.orbiting {
            self.azimuth += ORBIT_SPEED * dt;
            self.sync_azimuth();
        }
    }

    pub fn nudge_azimuth(&mut self, delta: f32) {
        self.azimuth += delta;
        self.sync_azimuth();
    }

    pub fn nudge_polar(&mut self, delta: f32) {
        self.polar += delta;
        self.sync_polar();
    }

    /// Flip auto-orbit and return the new state.
    pub fn toggle_orbit(&mut self) -> bool {
        self.orbiting = !self.orbiting;
        self.orbiting
    }

    /// Return to the home eye position and orbit angles, and stop orbiting.
    /// Projection parameters and radius are left alone.
    pub fn reset(&mut self) {
        let home = Self::default();
        self.orbiting = false;
        self.eye = home.eye;
        self.azimuth = home.azimuth;
        self.polar = home.polar;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Symmetric perspective projection, depth mapped to `[0, 1]`.
    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_radians(), aspect, self.near, self.far)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }

    fn sync_azimuth(&mut self) {
        self.eye.x = self.radius * self.azimuth.cos();
        self.eye.z = self.radius * self.azimuth.sin();
    }

    fn sync_polar(&mut self) {
        self.eye.y = self.radius * self.polar.cos();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_camera() {
        let cam = OrbitCamera::default();
        assert_eq!(cam.eye, Vec3::new(0.0, 0.0, 100.0));
        assert!(cam.direction().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        let vp = cam.view_projection(1024.0 / 768.0);
        assert!(!vp.col(0).x.is_nan());
    }

    #[test]
    fn auto_orbit_runs_at_one_radian_per_second() {
        let mut cam = OrbitCamera::default();
        cam.advance(1.0);
        assert_eq!(cam.azimuth, FRAC_PI_2, "idle camera must not move");

        assert!(cam.toggle_orbit());
        cam.advance(0.5);
        cam.advance(0.5);
        assert!((cam.azimuth - (FRAC_PI_2 + 1.0)).abs() < 1e-6);
        let expected = Vec3::new(
            100.0 * cam.azimuth.cos(),
            cam.eye.y,
            100.0 * cam.azimuth.sin(),
        );
        assert!(cam.eye.abs_diff_eq(expected, 1e-4));
    }

    #[test]
    fn polar_nudge_only_moves_height() {
        let mut cam = OrbitCamera::default();
        let before = cam.eye;
        cam.nudge_polar(-ORBIT_NUDGE);
        assert_eq!(cam.eye.x, before.x);
        assert_eq!(cam.eye.z, before.z);
        assert!((cam.eye.y - 100.0 * (FRAC_PI_2 - ORBIT_NUDGE).cos()).abs() < 1e-4);
        assert!(cam.eye.y > 0.0);
    }

    #[test]
    fn azimuth_nudge_only_moves_horizontally() {
        let mut cam = OrbitCamera::default();
        cam.nudge_polar(0.3);
        let height = cam.eye.y;
        cam.nudge_azimuth(ORBIT_NUDGE);
        assert_eq!(cam.eye.y, height);
        assert!(cam.eye.x < 0.0);
    }

    #[test]
    fn reset_restores_home_and_stops_orbit() {
        let mut cam = OrbitCamera::default();
        cam.toggle_orbit();
        cam.advance(2.0);
        cam.nudge_polar(0.4);
        cam.reset();
        assert!(!cam.orbiting);
        assert_eq!(cam.eye, OrbitCamera::HOME_EYE);
        assert_eq!(cam.azimuth, FRAC_PI_2);
        assert_eq!(cam.polar, FRAC_PI_2);
    }

    #[test]
    fn up_never_parallel_to_view_direction() {
        let mut cam = OrbitCamera::default();
        for _ in 0..200 {
            cam.nudge_polar(ORBIT_NUDGE);
            cam.nudge_azimuth(0.37);
            let d = cam.direction();
            assert!(d.cross(cam.up).length() > 1e-3);
        }
    }
}
