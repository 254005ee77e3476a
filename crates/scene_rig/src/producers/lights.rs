//! Light producer

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::context::{ContextError, Handles, Registration, SceneContext};
use crate::foundation::collections::NodeId;
use crate::foundation::math::{deg_to_rad, Vec3};
use crate::scene::{HelperKind, Light, LightKind, NodeKind, SceneNode};

/// Light family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LightType {
    /// Uniform fill light
    #[default]
    Ambient,
    /// Sun-like parallel light
    Directional,
    /// Bulb-like point light
    Point,
    /// Cone light
    Spot,
    /// Sky/ground gradient
    Hemisphere,
    /// Rectangular area light
    RectArea,
    /// Environment probe
    Probe,
}

/// Light props. Fields that do not apply to the chosen type are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightProps {
    /// Light family
    pub kind: LightType,
    /// Colour as 0xRRGGBB; the sky colour for hemisphere lights
    pub color: u32,
    /// Intensity
    pub intensity: f32,
    /// Position
    pub position: Option<Vec3>,
    /// Aim point for directional and spot lights
    pub target: Option<Vec3>,
    /// Cut-off distance for point and spot lights, 0 for none
    pub distance: f32,
    /// Falloff exponent for point and spot lights
    pub decay: f32,
    /// Spot cone half-angle in degrees
    pub angle: f32,
    /// Spot edge softness 0..1
    pub penumbra: f32,
    /// Hemisphere ground colour
    pub ground_color: u32,
    /// Rect area width
    pub width: f32,
    /// Rect area height
    pub height: f32,
    /// Add a helper gizmo where the light type has one
    pub helper: bool,
    /// Helper gizmo size
    pub helper_size: Option<f32>,
    /// Cast shadows
    pub cast_shadow: bool,
    /// Build the light but leave it out of the scene
    pub detached: bool,
}

impl Default for LightProps {
    fn default() -> Self {
        Self {
            kind: LightType::Ambient,
            color: 0xff_ff_ff,
            intensity: 1.0,
            position: None,
            target: None,
            distance: 0.0,
            decay: 2.0,
            angle: 60.0,
            penumbra: 0.0,
            ground_color: 0x44_44_44,
            width: 10.0,
            height: 10.0,
            helper: false,
            helper_size: None,
            cast_shadow: false,
            detached: false,
        }
    }
}

impl LightProps {
    fn build(&self) -> Light {
        let target = self.target.unwrap_or_else(Vec3::zeros);
        let kind = match self.kind {
            LightType::Ambient => LightKind::Ambient,
            LightType::Directional => LightKind::Directional { target },
            LightType::Point => LightKind::Point {
                distance: self.distance,
                decay: self.decay,
            },
            LightType::Spot => LightKind::Spot {
                distance: self.distance,
                angle: deg_to_rad(self.angle),
                penumbra: self.penumbra.clamp(0.0, 1.0),
                decay: self.decay,
                target,
            },
            LightType::Hemisphere => LightKind::Hemisphere {
                ground_color: self.ground_color,
            },
            LightType::RectArea => LightKind::RectArea {
                width: self.width,
                height: self.height,
            },
            LightType::Probe => LightKind::Probe,
        };

        let mut light = Light::new(kind);
        light.color = self.color;
        light.intensity = self.intensity;
        light.cast_shadow = self.cast_shadow;
        if let Some(position) = self.position {
            light.position = position;
        }
        light
    }

    fn helper_size(&self) -> f32 {
        let fallback = if self.kind == LightType::Hemisphere { 5.0 } else { 1.0 };
        self.helper_size.unwrap_or(fallback)
    }
}

/// Adds one light (and its helper) to the scene at mount and removes them on dispose
#[derive(Debug, Clone, Default)]
pub struct LightProducer {
    props: LightProps,
}

impl LightProducer {
    /// Producer with the given props
    pub fn new(props: LightProps) -> Self {
        Self { props }
    }
}

impl Producer for LightProducer {
    fn name(&self) -> &str {
        "light"
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        let light = self.props.build();
        let name = light.kind.name();
        if self.props.detached {
            log::debug!("{} light is detached, not adding it to the scene", name);
            return Ok(());
        }

        let helper = (self.props.helper && light.kind.has_helper()).then(|| self.props.helper_size());
        let added: Rc<RefCell<Vec<NodeId>>> = Rc::new(RefCell::new(Vec::new()));
        let label = format!("light.{name}");

        let on_init = Rc::clone(&added);
        ctx.register_init(Registration::new(label.clone()).requires(Handles::SCENE), move |ctx| {
            let Some(scene) = ctx.scene_mut() else {
                return Err(ContextError::missing(format!("light.{name}"), Handles::SCENE));
            };
            let position = light.position;
            let mut ids = on_init.borrow_mut();
            ids.push(scene.add(SceneNode::new(format!("{name}_light"), NodeKind::Light(light.clone())).with_position(position)));
            if let Some(size) = helper {
                ids.push(scene.add(
                    SceneNode::new(format!("{name}_light_helper"), NodeKind::Helper(HelperKind::Light { size }))
                        .with_position(position),
                ));
            }
            Ok(())
        });

        ctx.register_dispose(label, move |ctx| {
            let ids: Vec<NodeId> = added.borrow_mut().drain(..).collect();
            if let Some(scene) = ctx.scene_mut() {
                for id in ids {
                    scene.remove(id);
                }
            }
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{Container, PoolKind};
    use crate::core::StageConfig;
    use crate::scene::Scene;
    use crate::stage::Stage;
    use approx::assert_relative_eq;

    #[test]
    fn test_spot_angle_is_converted() {
        let props = LightProps { kind: LightType::Spot, angle: 90.0, ..LightProps::default() };
        match props.build().kind {
            LightKind::Spot { angle, .. } => assert_relative_eq!(angle, std::f32::consts::FRAC_PI_2),
            other => panic!("unexpected kind {other:?}"),
        }
    }

    #[test]
    fn test_detached_light_registers_nothing() {
        let mut ctx = SceneContext::default();
        LightProducer::new(LightProps { detached: true, ..LightProps::default() })
            .setup(&mut ctx)
            .unwrap();
        assert_eq!(ctx.pools().len(PoolKind::Init), 0);
        assert_eq!(ctx.pools().len(PoolKind::Dispose), 0);
    }

    #[test]
    fn test_light_and_helper_added_then_removed() {
        let mut stage = Stage::new(StageConfig::default());
        stage.context_mut().set_scene(Scene::new()).unwrap();
        stage
            .compose(LightProducer::new(LightProps {
                kind: LightType::Hemisphere,
                helper: true,
                ..LightProps::default()
            }))
            .unwrap();
        stage.mount(Container::new(1, 100, 100)).unwrap();

        let scene = stage.context().scene().unwrap();
        assert_eq!(scene.len(), 2);
        assert_eq!(
            scene.count_where(|node| matches!(node.kind, NodeKind::Helper(HelperKind::Light { size }) if size == 5.0)),
            1
        );

        stage.unmount().unwrap();
        assert!(stage.context().scene().unwrap().is_empty());
    }

    #[test]
    fn test_ambient_has_no_helper() {
        let mut stage = Stage::new(StageConfig::default());
        stage.context_mut().set_scene(Scene::new()).unwrap();
        stage
            .compose(LightProducer::new(LightProps { helper: true, ..LightProps::default() }))
            .unwrap();
        stage.mount(Container::new(1, 100, 100)).unwrap();
        assert_eq!(stage.context().scene().unwrap().len(), 1);
    }
}
