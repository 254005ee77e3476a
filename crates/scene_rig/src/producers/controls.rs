//! Orbit controls producer

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::context::{ContextError, Handles, Registration, SceneContext};
use crate::foundation::math::Vec3;
use crate::scene::OrbitControls;

/// Orbit controls props. Unset fields keep the controller defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsProps {
    /// Closest zoom distance
    pub min_distance: Option<f32>,
    /// Farthest zoom distance
    pub max_distance: Option<f32>,
    /// Orbit centre
    pub target: Option<Vec3>,
    /// Smooth rotation with inertia
    pub enable_damping: bool,
    /// Damping factor 0..1
    pub damping_factor: Option<f32>,
    /// Spin around the target
    pub auto_rotate: bool,
    /// Spin speed in radians per second
    pub auto_rotate_speed: Option<f32>,
}

impl ControlsProps {
    fn build(&self) -> OrbitControls {
        let mut controls = OrbitControls::new();
        if let Some(min) = self.min_distance {
            controls.min_distance = min;
        }
        if let Some(max) = self.max_distance {
            controls.max_distance = max;
        }
        if let Some(target) = self.target {
            controls.target = target;
        }
        controls.enable_damping = self.enable_damping;
        if let Some(factor) = self.damping_factor {
            controls.damping_factor = factor;
        }
        controls.auto_rotate = self.auto_rotate;
        if let Some(speed) = self.auto_rotate_speed {
            controls.auto_rotate_speed = speed;
        }
        controls
    }
}

/// Creates orbit controls once the camera and renderer exist, then updates them every frame
#[derive(Debug, Clone, Default)]
pub struct ControlsProducer {
    props: ControlsProps,
}

impl ControlsProducer {
    /// Producer with the given props
    pub fn new(props: ControlsProps) -> Self {
        Self { props }
    }
}

impl Producer for ControlsProducer {
    fn name(&self) -> &str {
        "controls"
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        let props = self.props;
        let registration = Registration::new("controls.create")
            .requires(Handles::CAMERA | Handles::RENDERER)
            .provides(Handles::CONTROLS);

        ctx.register_init(registration, move |ctx| {
            ctx.require("controls.create", Handles::CAMERA | Handles::RENDERER)?;
            let mut controls = props.build();
            if let Some(camera) = ctx.camera_mut() {
                controls.update(camera, 0.0);
            }
            ctx.set_controls(controls)?;

            ctx.register_frame(
                Registration::new("controls.update").requires(Handles::CONTROLS | Handles::CAMERA),
                |ctx, tick| ctx.update_controls(tick.delta),
            );
            Ok(())
        });
        Ok(())
    }
}
