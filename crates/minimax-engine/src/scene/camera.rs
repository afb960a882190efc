use glam::{Mat4, Vec3};

use super::Bounds;

/// Perspective camera looking at a target point.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.0, -2.5),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y_deg: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Camera {
    /// Default camera pulled back along its viewing direction until `bounds`
    /// fits in the vertical field of view.
    pub fn framing(bounds: &Bounds) -> Self {
        let base = Self::default();
        let radius = bounds.radius().max(1e-3);
        let half_fov = (base.fov_y_deg.to_radians() * 0.5).max(1e-3);
        let distance = radius / half_fov.sin();

        let dir = (base.eye - base.target).normalize_or(Vec3::NEG_Z);
        let target = bounds.center();
        Self {
            eye: target + dir * distance,
            target,
            far: base.far.max(distance + radius * 2.0),
            ..base
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection for the given aspect ratio.
    ///
    /// `homogeneous_depth` selects a [-1, 1] clip-space depth range instead
    /// of [0, 1].
    pub fn projection(&self, aspect: f32, homogeneous_depth: bool) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let fov = self.fov_y_deg.to_radians();
        if homogeneous_depth {
            Mat4::perspective_rh_gl(fov, aspect, self.near, self.far)
        } else {
            Mat4::perspective_rh(fov, aspect, self.near, self.far)
        }
    }

    pub fn view_projection(&self, aspect: f32, homogeneous_depth: bool) -> Mat4 {
        self.projection(aspect, homogeneous_depth) * self.view()
    }
}
