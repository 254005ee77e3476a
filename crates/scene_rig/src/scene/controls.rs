//! Orbit controls
//!
//! Keeps the camera pointed at a target, clamps its distance and optionally
//! spins it around the target's vertical axis.

use crate::foundation::math::{rotate_y, Vec3};
use super::camera::Camera;

/// Orbit camera controller
#[derive(Debug, Clone)]
pub struct OrbitControls {
    /// Orbit centre
    pub target: Vec3,
    /// Closest allowed distance to the target
    pub min_distance: f32,
    /// Farthest allowed distance to the target
    pub max_distance: f32,
    /// Smooth rotation with inertia
    pub enable_damping: bool,
    /// Fraction of the remaining velocity applied each update, 0..1
    pub damping_factor: f32,
    /// Spin around the target automatically
    pub auto_rotate: bool,
    /// Spin speed in radians per second
    pub auto_rotate_speed: f32,
    angular_velocity: f32,
    updates: u64,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::zeros(),
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            enable_damping: false,
            damping_factor: 0.05,
            auto_rotate: false,
            auto_rotate_speed: 2.0 * std::f32::consts::PI / 30.0,
            angular_velocity: 0.0,
            updates: 0,
        }
    }
}

impl OrbitControls {
    /// Controls orbiting the origin
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `update` has run
    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Advance by `delta` seconds and write the result into `camera`
    pub fn update(&mut self, camera: &mut Camera, delta: f32) {
        self.updates += 1;

        let requested = if self.auto_rotate { self.auto_rotate_speed * delta } else { 0.0 };
        let angle = if self.enable_damping {
            let factor = self.damping_factor.clamp(0.0, 1.0);
            self.angular_velocity += (requested - self.angular_velocity) * factor;
            self.angular_velocity
        } else {
            requested
        };

        let mut offset = camera.position - self.target;
        if angle != 0.0 {
            offset = rotate_y(offset, angle);
        }

        let distance = offset.norm();
        if distance > f32::EPSILON {
            let clamped = distance.clamp(self.min_distance, self.max_distance.max(self.min_distance));
            offset *= clamped / distance;
        }

        camera.position = self.target + offset;
        camera.look_at(self.target);
    }
}
