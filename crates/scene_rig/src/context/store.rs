//! The context store and its registration API

use super::error::ContextError;
use super::handle::{Container, HandleKind, Handles, Slot};
use super::loads::{LoadQueue, LoadWatch};
use super::pool::{LifecyclePools, PoolKind, Registration};
use crate::assets::{LoadEvent, LoadTask};
use crate::foundation::collections::CallbackId;
use crate::scene::{BindingTarget, BindingValue, Camera, GuiPanel, OrbitControls, RenderBackend, Scene};
use crate::stage::FrameTick;

/// Shared state for one mounted scene
///
/// Created by the [`Stage`](crate::stage::Stage), lent to each producer's
/// setup and to every callback while its pool flushes, and dropped with the
/// stage. Handle fields are written once by the producer responsible for
/// them; everything else reads them.
#[derive(Default)]
pub struct SceneContext {
    container: Option<Container>,
    scene: Slot<Scene>,
    camera: Slot<Camera>,
    renderer: Slot<Box<dyn RenderBackend>>,
    controls: Slot<OrbitControls>,
    gui: Slot<GuiPanel>,
    pub(crate) pools: LifecyclePools,
    pub(crate) loads: LoadQueue,
}

impl SceneContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    // --- container -------------------------------------------------------

    /// Host container, `None` until mount
    pub fn container(&self) -> Option<&Container> {
        self.container.as_ref()
    }

    pub(crate) fn set_container(&mut self, container: Container) {
        self.container = Some(container);
    }

    pub(crate) fn container_mut(&mut self) -> Option<&mut Container> {
        self.container.as_mut()
    }

    // --- handles ---------------------------------------------------------

    /// Scene root
    pub fn scene(&self) -> Option<&Scene> {
        self.scene.get()
    }

    /// Scene root, mutably
    pub fn scene_mut(&mut self) -> Option<&mut Scene> {
        self.scene.get_mut()
    }

    /// Assign the scene root
    pub fn set_scene(&mut self, scene: Scene) -> Result<(), ContextError> {
        self.scene.set(HandleKind::Scene, scene)
    }

    /// Camera
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.get()
    }

    /// Camera, mutably
    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.get_mut()
    }

    /// Assign the camera
    pub fn set_camera(&mut self, camera: Camera) -> Result<(), ContextError> {
        self.camera.set(HandleKind::Camera, camera)
    }

    /// Renderer
    pub fn renderer(&self) -> Option<&(dyn RenderBackend + 'static)> {
        self.renderer.get().map(AsRef::as_ref)
    }

    /// Renderer, mutably
    pub fn renderer_mut(&mut self) -> Option<&mut (dyn RenderBackend + 'static)> {
        self.renderer.get_mut().map(AsMut::as_mut)
    }

    /// Assign the renderer
    pub fn set_renderer(&mut self, renderer: Box<dyn RenderBackend>) -> Result<(), ContextError> {
        self.renderer.set(HandleKind::Renderer, renderer)
    }

    /// Orbit controls
    pub fn controls(&self) -> Option<&OrbitControls> {
        self.controls.get()
    }

    /// Orbit controls, mutably
    pub fn controls_mut(&mut self) -> Option<&mut OrbitControls> {
        self.controls.get_mut()
    }

    /// Assign the orbit controls
    pub fn set_controls(&mut self, controls: OrbitControls) -> Result<(), ContextError> {
        self.controls.set(HandleKind::Controls, controls)
    }

    /// Debug control panel
    pub fn gui(&self) -> Option<&GuiPanel> {
        self.gui.get()
    }

    /// Debug control panel, mutably
    pub fn gui_mut(&mut self) -> Option<&mut GuiPanel> {
        self.gui.get_mut()
    }

    /// Assign the debug control panel
    pub fn set_gui(&mut self, gui: GuiPanel) -> Result<(), ContextError> {
        self.gui.set(HandleKind::Gui, gui)
    }

    /// Handles currently set
    pub fn present(&self) -> Handles {
        let mut handles = Handles::empty();
        handles.set(Handles::CONTAINER, self.container.is_some());
        handles.set(Handles::SCENE, self.scene.is_set());
        handles.set(Handles::CAMERA, self.camera.is_set());
        handles.set(Handles::RENDERER, self.renderer.is_set());
        handles.set(Handles::CONTROLS, self.controls.is_set());
        handles.set(Handles::GUI, self.gui.is_set());
        handles
    }

    /// Fail with [`ContextError::MissingDependency`] unless every handle in `needed` is set
    pub fn require(&self, consumer: &str, needed: Handles) -> Result<(), ContextError> {
        let missing = needed - self.present();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContextError::missing(consumer, missing))
        }
    }

    // --- operations ------------------------------------------------------

    /// Paint one frame with the current scene, camera and renderer.
    ///
    /// Returns `false` without painting while any of the three is unset.
    pub fn redraw_now(&mut self) -> bool {
        match (self.scene.get(), self.camera.get(), self.renderer.get_mut()) {
            (Some(scene), Some(camera), Some(renderer)) => {
                renderer.render(scene, camera);
                true
            }
            _ => {
                log::trace!("redraw_now skipped: scene, camera and renderer are not all set");
                false
            }
        }
    }

    /// Advance the orbit controls by `delta` seconds and move the camera
    pub fn update_controls(&mut self, delta: f32) -> Result<(), ContextError> {
        match (self.controls.get_mut(), self.camera.get_mut()) {
            (Some(controls), Some(camera)) => {
                controls.update(camera, delta);
                Ok(())
            }
            _ => Err(ContextError::missing(
                "controls.update",
                (Handles::CONTROLS | Handles::CAMERA) - self.present(),
            )),
        }
    }

    /// Apply an edit coming from the debug panel and repaint.
    ///
    /// Returns whether the edit was accepted.
    pub fn apply_gui_edit(&mut self, target: BindingTarget, value: BindingValue) -> Result<bool, ContextError> {
        let scene = self
            .scene
            .get_mut()
            .ok_or_else(|| ContextError::missing("gui.edit", Handles::SCENE))?;
        let accepted = GuiPanel::apply(scene, target, value);
        if accepted {
            self.redraw_now();
        } else {
            log::debug!("GUI edit rejected for {:?}", target);
        }
        Ok(accepted)
    }

    // --- registration ----------------------------------------------------

    /// Append a callback to the init pool
    pub fn register_init<F>(&mut self, registration: impl Into<Registration>, callback: F) -> CallbackId
    where
        F: FnMut(&mut SceneContext) -> Result<(), ContextError> + 'static,
    {
        self.pools.init.push(registration.into(), Box::new(callback))
    }

    /// Append a callback to the frame pool
    pub fn register_frame<F>(&mut self, registration: impl Into<Registration>, callback: F) -> CallbackId
    where
        F: FnMut(&mut SceneContext, &FrameTick) -> Result<(), ContextError> + 'static,
    {
        self.pools.frame.push(registration.into(), Box::new(callback))
    }

    /// Append a callback to the resize pool
    pub fn register_resize<F>(&mut self, registration: impl Into<Registration>, callback: F) -> CallbackId
    where
        F: FnMut(&mut SceneContext) -> Result<(), ContextError> + 'static,
    {
        self.pools.resize.push(registration.into(), Box::new(callback))
    }

    /// Append a callback to the dispose pool
    pub fn register_dispose<F>(&mut self, registration: impl Into<Registration>, callback: F) -> CallbackId
    where
        F: FnMut(&mut SceneContext) -> Result<(), ContextError> + 'static,
    {
        self.pools.dispose.push(registration.into(), Box::new(callback))
    }

    /// Remove a registered callback without disturbing the order of the rest
    pub fn unregister(&mut self, kind: PoolKind, id: CallbackId) -> bool {
        self.pools.remove(kind, id)
    }

    /// Read-only view of the pools
    pub fn pools(&self) -> &LifecyclePools {
        &self.pools
    }

    /// Deliver events of `task` to `handler` on the coordinator thread
    pub fn watch_load<H>(&mut self, task: LoadTask, handler: H)
    where
        H: FnMut(&mut SceneContext, LoadEvent) + 'static,
    {
        log::debug!("Watching asset load for {}", task.url());
        self.loads.push(LoadWatch {
            task,
            handler: Box::new(handler),
        });
    }

    /// Number of loads still being watched
    pub fn pending_loads(&self) -> usize {
        self.loads.len()
    }
}
