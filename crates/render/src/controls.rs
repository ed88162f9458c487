use crate::camera::PerspectiveCamera;
use glam::Vec3;
use std::f32::consts::{PI, TAU};

const POLAR_EPSILON: f32 = 1e-4;

/// Orbit camera controller: rotates around a target, dollies in and out,
/// and pans the target in the view plane.
///
/// Angles follow the usual spherical convention with +Y up: `theta` is the
/// azimuth around Y measured from +Z, `phi` the polar angle from +Y.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitControls {
    pub target: Vec3,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Upper bound on the polar angle, in radians.
    pub max_polar_angle: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    radius: f32,
    theta: f32,
    phi: f32,
}

impl OrbitControls {
    /// Take the current camera pose as the starting orbit.
    pub fn from_camera(camera: &PerspectiveCamera) -> Self {
        let offset = camera.position - camera.target;
        let radius = offset.length().max(f32::EPSILON);
        Self {
            target: camera.target,
            min_distance: 0.5,
            max_distance: 500.0,
            max_polar_angle: PI,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn distance(&self) -> f32 {
        self.radius
    }

    pub fn polar_angle(&self) -> f32 {
        self.phi
    }

    pub fn azimuth(&self) -> f32 {
        self.theta
    }

    /// Rotate by a pointer drag of `(dx, dy)` pixels on a viewport
    /// `viewport_height` pixels tall. A drag across the full height is one turn.
    pub fn rotate(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        self.theta -= TAU * dx / h * self.rotate_speed;
        self.phi -= TAU * dy / h * self.rotate_speed;
        self.phi = self
            .phi
            .clamp(POLAR_EPSILON, self.max_polar_angle.min(PI) - POLAR_EPSILON);
    }

    /// Scroll zoom. Positive `steps` move the camera closer.
    pub fn zoom(&mut self, steps: f32) {
        let scale = 0.95_f32.powf(self.zoom_speed * steps.abs());
        if steps > 0.0 {
            self.radius *= scale;
        } else if steps < 0.0 {
            self.radius /= scale;
        }
        self.radius = self.radius.clamp(self.min_distance, self.max_distance);
    }

    /// Shift the target in the camera's view plane by a pointer drag.
    pub fn pan(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &PerspectiveCamera) {
        let h = viewport_height.max(1.0);
        // world units covered by the viewport height at the target distance
        let span = 2.0 * self.radius * (camera.fov_degrees.to_radians() * 0.5).tan();
        let right = camera.right();
        let up = right.cross(camera.forward()).normalize_or(Vec3::Y);
        self.target += (-right * dx + up * dy) * span / h;
    }

    /// Camera position implied by the current orbit.
    pub fn eye(&self) -> Vec3 {
        let sin_phi = self.phi.sin();
        self.target
            + Vec3::new(
                self.radius * sin_phi * self.theta.sin(),
                self.radius * self.phi.cos(),
                self.radius * sin_phi * self.theta.cos(),
            )
    }

    /// Write the orbit pose into the camera. Projection is untouched.
    pub fn apply(&self, camera: &mut PerspectiveCamera) {
        camera.position = self.eye();
        camera.target = self.target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_camera_round_trips_pose() {
        let cam = PerspectiveCamera::default();
        let controls = OrbitControls::from_camera(&cam);
        assert!((controls.eye() - cam.position).length() < 1e-4);
    }

    #[test]
    fn rotate_keeps_distance() {
        let mut cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        let d = controls.distance();
        controls.rotate(120.0, 30.0, 600.0);
        controls.apply(&mut cam);
        assert!(((cam.position - cam.target).length() - d).abs() < 1e-3);
    }

    #[test]
    fn polar_angle_is_clamped() {
        let cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.rotate(0.0, 10_000.0, 600.0);
        assert!(controls.polar_angle() > 0.0);
        controls.rotate(0.0, -10_000.0, 600.0);
        assert!(controls.polar_angle() < PI);
    }

    #[test]
    fn zoom_in_and_out_respects_limits() {
        let cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        let d = controls.distance();
        controls.zoom(1.0);
        assert!(controls.distance() < d);
        controls.zoom(-2.0);
        assert!(controls.distance() > d);
        controls.zoom(1_000.0);
        assert_eq!(controls.distance(), controls.min_distance);
    }

    #[test]
    fn pan_moves_target_sideways() {
        let cam = PerspectiveCamera::default();
        let mut controls = OrbitControls::from_camera(&cam);
        controls.pan(100.0, 0.0, 600.0, &cam);
        assert!(controls.target.x < 0.0);
        assert!(controls.target.y.abs() < 1e-4);
    }
}
