//! Scene root producer

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::context::{ContextError, Handles, SceneContext};
use crate::scene::Scene;

/// Scene root props
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneProps {
    /// Background colour as 0xRRGGBB
    pub background: Option<u32>,
}

/// Creates the scene root
#[derive(Debug, Clone, Default)]
pub struct SceneProducer {
    props: SceneProps,
}

impl SceneProducer {
    /// Producer with the given props
    pub fn new(props: SceneProps) -> Self {
        Self { props }
    }
}

impl Producer for SceneProducer {
    fn name(&self) -> &str {
        "scene"
    }

    fn provides(&self) -> Handles {
        Handles::SCENE
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        let mut scene = Scene::new();
        scene.background = self.props.background;
        ctx.set_scene(scene)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_scene_once() {
        let mut ctx = SceneContext::default();
        SceneProducer::new(SceneProps { background: Some(0x20_20_20) }).setup(&mut ctx).unwrap();
        assert_eq!(ctx.scene().unwrap().background, Some(0x20_20_20));

        let second = SceneProducer::default().setup(&mut ctx);
        assert!(matches!(second, Err(ContextError::HandleAlreadySet(_))));
    }
}
