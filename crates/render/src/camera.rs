use glam::{Mat4, Vec3};

/// Perspective camera with a cached projection matrix.
///
/// Changing `fov_degrees`, `near`, `far` or the aspect ratio has no effect on
/// [`projection_matrix`](Self::projection_matrix) until
/// [`update_projection_matrix`](Self::update_projection_matrix) is called.
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    aspect: f32,
    projection: Mat4,
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        let mut cam = Self {
            position: Vec3::new(0.0, 8.0, 13.0),
            target: Vec3::ZERO,
            fov_degrees: 55.0,
            near: 0.1,
            far: 1000.0,
            aspect: 1.0,
            projection: Mat4::IDENTITY,
        };
        cam.update_projection_matrix();
        cam
    }
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut cam = Self {
            fov_degrees,
            near,
            far,
            ..Self::default()
        };
        cam.set_aspect(aspect);
        cam.update_projection_matrix();
        cam
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    /// Set the aspect ratio. Non-finite or non-positive values are ignored
    /// and reported by returning `false`.
    pub fn set_aspect(&mut self, aspect: f32) -> bool {
        if aspect.is_finite() && aspect > 0.0 {
            self.aspect = aspect;
            true
        } else {
            tracing::warn!(aspect, "ignoring invalid camera aspect ratio");
            false
        }
    }

    /// Recompute the cached projection from fov, aspect and clip planes.
    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Z)
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize_or(Vec3::X)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }

    /// True when the pose and projection are usable for a first render.
    pub fn is_valid(&self) -> bool {
        self.position != self.target
            && self.position.is_finite()
            && self.projection.is_finite()
    }
}
