//! # Camera
//!
//! Perspective and orthographic cameras with on-demand matrix generation.
//! The projection matrix is cached and only rebuilt by
//! [`Camera::update_projection`], mirroring how the host engine expects the
//! aspect ratio to be pushed in from the container before a repaint.

use nalgebra::{Orthographic3, Perspective3};

use crate::foundation::math::{deg_to_rad, Mat4, Point3, Vec3};

/// Projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in degrees
        fov_degrees: f32,
        /// Width / height
        aspect: f32,
        /// Near clipping plane
        near: f32,
        /// Far clipping plane
        far: f32,
    },
    /// Orthographic projection; has no aspect ratio of its own
    Orthographic {
        /// Left plane
        left: f32,
        /// Right plane
        right: f32,
        /// Top plane
        top: f32,
        /// Bottom plane
        bottom: f32,
        /// Near clipping plane
        near: f32,
        /// Far clipping plane
        far: f32,
    },
}

fn coincide(a: f32, b: f32) -> bool {
    let diff = (a - b).abs();
    diff <= f32::EPSILON || diff <= a.abs().max(b.abs()) * f32::EPSILON
}

impl Projection {
    fn degenerate(&self) -> Option<&'static str> {
        match *self {
            Self::Perspective { fov_degrees, aspect, near, far } => {
                if ![fov_degrees, aspect, near, far].iter().all(|v| v.is_finite()) {
                    Some("non-finite parameter")
                } else if coincide(aspect, 0.0) {
                    Some("zero aspect ratio")
                } else if coincide(near, far) {
                    Some("near and far planes coincide")
                } else {
                    None
                }
            }
            Self::Orthographic { left, right, top, bottom, near, far } => {
                if ![left, right, top, bottom, near, far].iter().all(|v| v.is_finite()) {
                    Some("non-finite parameter")
                } else if coincide(left, right) {
                    Some("left and right planes coincide")
                } else if coincide(top, bottom) {
                    Some("top and bottom planes coincide")
                } else if coincide(near, far) {
                    Some("near and far planes coincide")
                } else {
                    None
                }
            }
        }
    }
}

/// 3D camera
#[derive(Debug, Clone)]
pub struct Camera {
    /// Projection parameters
    pub projection: Projection,
    /// Position in world space
    pub position: Vec3,
    /// Look-at point in world space
    pub target: Vec3,
    /// Up vector
    pub up: Vec3,
    projection_matrix: Mat4,
}

impl Camera {
    /// Create a perspective camera at the origin looking down -Z
    pub fn perspective(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::with_projection(Projection::Perspective { fov_degrees, aspect, near, far })
    }

    /// Create an orthographic camera
    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self::with_projection(Projection::Orthographic { left, right, top, bottom, near, far })
    }

    fn with_projection(projection: Projection) -> Self {
        let mut camera = Self {
            projection,
            position: Vec3::zeros(),
            target: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection_matrix: Mat4::identity(),
        };
        camera.update_projection();
        camera
    }

    /// Point the camera at `target`
    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
        log::trace!("Camera target updated to: {:?}", target);
    }

    /// Current aspect ratio; orthographic cameras report their frustum ratio
    pub fn aspect(&self) -> f32 {
        match self.projection {
            Projection::Perspective { aspect, .. } => aspect,
            Projection::Orthographic { left, right, top, bottom, .. } => {
                (right - left) / (top - bottom)
            }
        }
    }

    /// Set the aspect ratio. Orthographic cameras ignore it.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = new_aspect;
        }
    }

    /// Rebuild the cached projection matrix from the current parameters.
    ///
    /// Degenerate parameters (zero aspect, coincident planes, non-finite
    /// values) keep the previous matrix and return `false`.
    pub fn update_projection(&mut self) -> bool {
        if let Some(reason) = self.projection.degenerate() {
            log::warn!("Camera projection not updated: {} ({:?})", reason, self.projection);
            return false;
        }
        self.projection_matrix = match self.projection {
            Projection::Perspective { fov_degrees, aspect, near, far } => {
                Perspective3::new(aspect, deg_to_rad(fov_degrees), near, far).to_homogeneous()
            }
            Projection::Orthographic { left, right, top, bottom, near, far } => {
                Orthographic3::new(left, right, bottom, top, near, far).to_homogeneous()
            }
        };
        true
    }

    /// Cached projection matrix
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection_matrix
    }

    /// View matrix from position, target and up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(self.position), &Point3::from(self.target), &self.up)
    }

    /// Projection * view
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_only_changes_on_update() {
        let mut camera = Camera::perspective(50.0, 1.0, 0.1, 2000.0);
        let before = camera.projection_matrix();

        camera.set_aspect(2.0);
        assert_eq!(camera.projection_matrix(), before);

        camera.update_projection();
        assert_relative_eq!(camera.aspect(), 2.0);
        assert_relative_eq!(camera.projection_matrix()[(0, 0)], before[(0, 0)] / 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_degenerate_parameters_keep_previous_matrix() {
        let mut camera = Camera::perspective(50.0, 1.5, 0.1, 100.0);
        let before = camera.projection_matrix();

        camera.set_aspect(0.0);
        assert!(!camera.update_projection());
        assert_eq!(camera.projection_matrix(), before);

        camera.set_aspect(f32::NAN);
        assert!(!camera.update_projection());
        assert_eq!(camera.projection_matrix(), before);

        let flat = Camera::perspective(50.0, 1.0, 10.0, 10.0);
        assert_eq!(flat.projection_matrix(), Mat4::identity());
        let thin = Camera::orthographic(1.0, 1.0, 1.0, -1.0, 0.1, 100.0);
        assert_eq!(thin.projection_matrix(), Mat4::identity());
    }

    #[test]
    fn test_orthographic_ignores_aspect() {
        let mut camera = Camera::orthographic(-1.0, 1.0, 1.0, -1.0, 0.1, 100.0);
        camera.set_aspect(3.0);
        assert_relative_eq!(camera.aspect(), 1.0);
    }
}
