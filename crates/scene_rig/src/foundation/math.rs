//! Math utilities and types
//!
//! Thin aliases over `nalgebra` so the rest of the crate never spells out the
//! generic types.

pub use nalgebra::{Matrix4, Rotation3, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Mathematical constants
pub mod constants {
    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = std::f32::consts::PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / std::f32::consts::PI;
}

/// Convert degrees to radians
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * constants::DEG_TO_RAD
}

/// Convert radians to degrees
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * constants::RAD_TO_DEG
}

/// Component-wise degrees to radians
pub fn vec_deg_to_rad(degrees: Vec3) -> Vec3 {
    degrees * constants::DEG_TO_RAD
}

/// Rotate `v` around the world Y axis by `angle` radians
pub fn rotate_y(v: Vec3, angle: f32) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::y_axis(), angle) * v
}
