//! Camera producer

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::Producer;
use crate::context::{Container, ContextError, Handles, Registration, SceneContext};
use crate::foundation::math::Vec3;
use crate::scene::{Camera, HelperKind, NodeKind, SceneNode};

/// Projection family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionType {
    /// Perspective camera
    #[default]
    Perspective,
    /// Orthographic camera
    Orthographic,
}

/// Camera props
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraProps {
    /// Projection family
    pub projection: ProjectionType,
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Initial aspect ratio, replaced by the container's at mount
    pub aspect: f32,
    /// Orthographic left plane
    pub left: f32,
    /// Orthographic right plane
    pub right: f32,
    /// Orthographic top plane
    pub top: f32,
    /// Orthographic bottom plane
    pub bottom: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
    /// Camera position
    pub position: Option<Vec3>,
    /// Point to look at
    pub look_at: Option<Vec3>,
    /// Add a frustum helper to the scene
    pub helper: bool,
}

impl Default for CameraProps {
    fn default() -> Self {
        Self {
            projection: ProjectionType::Perspective,
            fov: 50.0,
            aspect: 1.0,
            left: -1.0,
            right: 1.0,
            top: 1.0,
            bottom: -1.0,
            near: 0.1,
            far: 2000.0,
            position: None,
            look_at: None,
            helper: false,
        }
    }
}

impl CameraProps {
    fn build(&self) -> Camera {
        let mut camera = match self.projection {
            ProjectionType::Perspective => Camera::perspective(self.fov, self.aspect, self.near, self.far),
            ProjectionType::Orthographic => {
                Camera::orthographic(self.left, self.right, self.top, self.bottom, self.near, self.far)
            }
        };
        if let Some(position) = self.position {
            camera.position = position;
        }
        if let Some(target) = self.look_at {
            camera.look_at(target);
        }
        camera.update_projection();
        camera
    }
}

/// Creates the camera and keeps its aspect ratio matched to the container
#[derive(Debug, Clone, Default)]
pub struct CameraProducer {
    props: CameraProps,
}

impl CameraProducer {
    /// Producer with the given props
    pub fn new(props: CameraProps) -> Self {
        Self { props }
    }
}

fn match_container_aspect(ctx: &mut SceneContext) -> Result<(), ContextError> {
    let aspect = ctx.container().and_then(Container::aspect);
    let camera = ctx
        .camera_mut()
        .ok_or_else(|| ContextError::missing("camera.aspect", Handles::CAMERA))?;
    match aspect {
        Some(aspect) => {
            camera.set_aspect(aspect);
            camera.update_projection();
        }
        None => log::debug!("Container is collapsed, keeping camera aspect {}", camera.aspect()),
    }
    Ok(())
}

impl Producer for CameraProducer {
    fn name(&self) -> &str {
        "camera"
    }

    fn provides(&self) -> Handles {
        Handles::CAMERA
    }

    fn setup(self, ctx: &mut SceneContext) -> Result<(), ContextError> {
        ctx.set_camera(self.props.build())?;

        if self.props.helper {
            let helper = Rc::new(Cell::new(None));
            let added = Rc::clone(&helper);
            ctx.register_init(Registration::new("camera.helper").requires(Handles::SCENE), move |ctx| {
                if let Some(scene) = ctx.scene_mut() {
                    added.set(Some(scene.add(SceneNode::new("camera_helper", NodeKind::Helper(HelperKind::Camera)))));
                }
                Ok(())
            });
            ctx.register_dispose("camera.helper", move |ctx| {
                if let (Some(id), Some(scene)) = (helper.take(), ctx.scene_mut()) {
                    scene.remove(id);
                }
                Ok(())
            });
        }

        let dependencies = Handles::CONTAINER | Handles::CAMERA;
        ctx.register_init(Registration::new("camera.aspect").requires(dependencies), match_container_aspect);
        ctx.register_resize(Registration::new("camera.aspect").requires(dependencies), match_container_aspect);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PoolKind;
    use approx::assert_relative_eq;

    #[test]
    fn test_props_from_toml() {
        let props: CameraProps = toml::from_str(
            r#"
            projection = "orthographic"
            near = 1.0
            position = [0.0, 5.0, 10.0]
            "#,
        )
        .unwrap();
        assert_eq!(props.projection, ProjectionType::Orthographic);
        assert_relative_eq!(props.near, 1.0);
        assert_relative_eq!(props.far, 2000.0);
        assert_eq!(props.position, Some(Vec3::new(0.0, 5.0, 10.0)));
    }

    #[test]
    fn test_registers_aspect_callbacks() {
        let mut ctx = SceneContext::default();
        CameraProducer::new(CameraProps { helper: true, ..CameraProps::default() })
            .setup(&mut ctx)
            .unwrap();
        assert!(ctx.camera().is_some());
        assert_eq!(ctx.pools().labels(PoolKind::Init), ["camera.helper", "camera.aspect"]);
        assert_eq!(ctx.pools().labels(PoolKind::Resize), ["camera.aspect"]);
        assert_eq!(ctx.pools().labels(PoolKind::Dispose), ["camera.helper"]);
    }

    #[test]
    fn test_flat_frustum_props_do_not_abort_setup() {
        let mut ctx = SceneContext::default();
        CameraProducer::new(CameraProps { near: 5.0, far: 5.0, ..CameraProps::default() })
            .setup(&mut ctx)
            .unwrap();
        CameraProducer::new(CameraProps {
            projection: ProjectionType::Orthographic,
            left: 2.0,
            right: 2.0,
            ..CameraProps::default()
        })
        .setup(&mut SceneContext::default())
        .unwrap();
        assert!(ctx.camera().is_some());
    }

    #[test]
    fn test_collapsed_container_keeps_aspect() {
        let mut ctx = SceneContext::default();
        CameraProducer::default().setup(&mut ctx).unwrap();
        ctx.set_container(Container::new(1, 0, 600));
        match_container_aspect(&mut ctx).unwrap();
        assert_relative_eq!(ctx.camera().unwrap().aspect(), 1.0);
    }

    #[test]
    fn test_aspect_follows_container() {
        let mut ctx = SceneContext::default();
        CameraProducer::default().setup(&mut ctx).unwrap();
        ctx.set_container(Container::new(1, 1600, 800));
        match_container_aspect(&mut ctx).unwrap();
        assert_relative_eq!(ctx.camera().unwrap().aspect(), 2.0);
    }
}
