//! Light sources

use crate::foundation::math::Vec3;

/// Light variants and their kind-specific parameters
#[derive(Debug, Clone, PartialEq)]
pub enum LightKind {
    /// Uniform light from everywhere
    Ambient,
    /// Parallel rays toward `target`
    Directional {
        /// Point the light aims at
        target: Vec3,
    },
    /// Omnidirectional light from a point
    Point {
        /// Cut-off distance, 0 for infinite
        distance: f32,
        /// Falloff exponent
        decay: f32,
    },
    /// Cone light
    Spot {
        /// Cut-off distance, 0 for infinite
        distance: f32,
        /// Cone half-angle in radians
        angle: f32,
        /// Edge softness 0..1
        penumbra: f32,
        /// Falloff exponent
        decay: f32,
        /// Point the light aims at
        target: Vec3,
    },
    /// Sky/ground gradient
    Hemisphere {
        /// Ground colour; the light's own colour is the sky
        ground_color: u32,
    },
    /// Rectangular area emitter
    RectArea {
        /// Emitter width
        width: f32,
        /// Emitter height
        height: f32,
    },
    /// Baked environment probe
    Probe,
}

impl LightKind {
    /// Short lowercase name used for node names and log lines
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ambient => "ambient",
            Self::Directional { .. } => "directional",
            Self::Point { .. } => "point",
            Self::Spot { .. } => "spot",
            Self::Hemisphere { .. } => "hemisphere",
            Self::RectArea { .. } => "rect_area",
            Self::Probe => "probe",
        }
    }

    /// Whether the engine offers a helper gizmo for this kind
    pub fn has_helper(&self) -> bool {
        matches!(
            self,
            Self::Directional { .. } | Self::Point { .. } | Self::Spot { .. } | Self::Hemisphere { .. }
        )
    }
}

/// A light
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Kind-specific parameters
    pub kind: LightKind,
    /// Colour as 0xRRGGBB
    pub color: u32,
    /// Intensity multiplier
    pub intensity: f32,
    /// Position in world space
    pub position: Vec3,
    /// Whether the light casts shadows
    pub cast_shadow: bool,
}

impl Light {
    /// Create a white light of the given kind at the origin
    pub fn new(kind: LightKind) -> Self {
        Self {
            kind,
            color: 0xff_ff_ff,
            intensity: 1.0,
            position: Vec3::zeros(),
            cast_shadow: false,
        }
    }
}
